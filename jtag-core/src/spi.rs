//! SPI-over-JTAG flash façade.
//!
//! Writing a configuration flash behind an FPGA needs the device switched
//! into an SPI pass-through mode first and restored afterwards. The two
//! hooks of [`SpiInterface`] are implemented per device family; the
//! generic operations wrap every flash job between them, swallow probe
//! failures into a logged `false`, and always attempt the restore.
//! The flash command set itself (erase geometry, status bits, ...) is the
//! business of an external [`SpiFlash`] engine.

use crate::error::{JtagError, ProbeError};

/// Contract of an external SPI flash engine operating through a device in
/// pass-through mode.
pub trait SpiFlash {
    fn reset(&mut self) -> Result<(), ProbeError>;
    fn read_status(&mut self) -> Result<u8, ProbeError>;
    /// Enables write protection covering the first `len` bytes.
    fn enable_protection(&mut self, len: u32) -> Result<(), ProbeError>;
    fn disable_protection(&mut self) -> Result<(), ProbeError>;
    fn erase_and_program(&mut self, offset: u32, data: &[u8]) -> Result<(), ProbeError>;
    fn verify(&mut self, offset: u32, data: &[u8]) -> Result<(), ProbeError>;
}

/// Device-mode hooks plus the generic flash orchestration built on them.
pub trait SpiInterface {
    /// Places the device in SPI pass-through mode.
    fn prepare_flash_access(&mut self) -> Result<(), JtagError>;

    /// Restores the device (typically reloading its bitstream).
    fn post_flash_access(&mut self) -> Result<(), JtagError>;

    /// Write-protects the first `len` bytes of the flash.
    fn protect_flash(&mut self, flash: &mut dyn SpiFlash, len: u32) -> bool {
        log::info!("protect flash ({} bytes)", len);
        if let Err(err) = self.prepare_flash_access() {
            log::error!("failed to enter flash access mode: {}", err);
            return false;
        }
        let body = flash.reset().and_then(|_| flash.enable_protection(len));
        let ok = match body {
            Ok(()) => true,
            Err(err) => {
                log::error!("enabling flash protection failed: {}", err);
                false
            }
        };
        ok & self.restore()
    }

    /// Clears the flash write protection.
    fn unprotect_flash(&mut self, flash: &mut dyn SpiFlash) -> bool {
        log::info!("unprotect flash");
        if let Err(err) = self.prepare_flash_access() {
            log::error!("failed to enter flash access mode: {}", err);
            return false;
        }
        let body = flash.reset().and_then(|_| flash.disable_protection());
        let ok = match body {
            Ok(()) => true,
            Err(err) => {
                log::error!("disabling flash protection failed: {}", err);
                false
            }
        };
        ok & self.restore()
    }

    /// Erases and programs `data` at `offset`, optionally lifting the
    /// write protection first and reading the data back afterwards.
    fn write(
        &mut self,
        flash: &mut dyn SpiFlash,
        offset: u32,
        data: &[u8],
        verify: bool,
        allow_unprotect: bool,
    ) -> bool {
        log::info!("write {} bytes at 0x{:08x}", data.len(), offset);
        if let Err(err) = self.prepare_flash_access() {
            log::error!("failed to enter flash access mode: {}", err);
            return false;
        }
        let body = (|| {
            let status = flash.read_status()?;
            log::debug!("flash status register: 0x{:02x}", status);
            if allow_unprotect {
                flash.disable_protection()?;
            }
            flash.erase_and_program(offset, data)?;
            if verify {
                flash.verify(offset, data)?;
            }
            Ok::<(), ProbeError>(())
        })();
        let ok = match body {
            Ok(()) => true,
            Err(err) => {
                log::error!("flash write failed: {}", err);
                false
            }
        };
        ok & self.restore()
    }

    /// Runs the restore hook; its failure taints the overall result but
    /// never masks a body failure.
    #[doc(hidden)]
    fn restore(&mut self) -> bool {
        match self.post_flash_access() {
            Ok(()) => true,
            Err(err) => {
                log::error!("failed to leave flash access mode: {}", err);
                false
            }
        }
    }
}
