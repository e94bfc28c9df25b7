//! Xilinx-specific use of the JTAG core: family classification, device
//! reset, and the SPI flash access hooks for the 7-series fabric.

use jtag_core::error::JtagError;
use jtag_core::spi::SpiInterface;
use jtag_core::{Jtag, Probe, TapState};

// 7-series instruction codes.
pub const USER1: u8 = 0x02;
pub const CFG_IN: u8 = 0x05;
pub const USERCODE: u8 = 0x08;
pub const IDCODE: u8 = 0x09;
pub const JPROGRAM: u8 = 0x0B;
pub const JSTART: u8 = 0x0C;
pub const JSHUTDOWN: u8 = 0x0D;
pub const BYPASS: u8 = 0xFF;

/// Family string of the currently addressed device, if the part tables
/// recognize it as an FPGA.
pub fn family<P: Probe>(jtag: &Jtag<P>) -> Option<&'static str> {
    let device = jtag.active_device()?;
    jtag.part_table().fpga_family(device.idcode)
}

/// Operations shared by the Xilinx FPGA families.
pub struct XilinxJtag<'a, P: Probe> {
    jtag: &'a mut Jtag<P>,
    irlen: usize,
}

impl<'a, P: Probe> XilinxJtag<'a, P> {
    /// 7-series parts carry a six-bit instruction register.
    pub fn new(jtag: &'a mut Jtag<P>) -> XilinxJtag<'a, P> {
        XilinxJtag { jtag, irlen: 6 }
    }

    /// Shuts the fabric down and restarts configuration, leaving the
    /// device reloading its bitstream.
    pub fn reset(&mut self) -> Result<(), JtagError> {
        self.jtag.shift_ir_u8(JSHUTDOWN, self.irlen, TapState::RunTestIdle)?;
        self.jtag.shift_ir_u8(JPROGRAM, self.irlen, TapState::RunTestIdle)?;
        self.jtag.set_state(TapState::RunTestIdle)?;
        self.jtag.toggle_clk(120_000)?;

        self.jtag.set_state(TapState::RunTestIdle)?;
        self.jtag.toggle_clk(2_000)?;

        self.jtag.shift_ir_u8(BYPASS, self.irlen, TapState::RunTestIdle)?;
        self.jtag.set_state(TapState::RunTestIdle)?;
        self.jtag.toggle_clk(2_000)?;
        Ok(())
    }

    /// Reads the 32-bit IDCODE off the DR path after a reset; the
    /// identification register is preselected in Test-Logic-Reset.
    pub fn read_idcode(&mut self) -> Result<u32, JtagError> {
        self.jtag.go_test_logic_reset()?;
        let tx = [0u8; 4];
        let mut rx = [0u8; 4];
        self.jtag.shift_dr(&tx, Some(&mut rx), 32, TapState::RunTestIdle)?;
        self.jtag.go_test_logic_reset()?;
        Ok(u32::from_le_bytes(rx))
    }
}

impl<P: Probe> SpiInterface for XilinxJtag<'_, P> {
    /// Routes JTAG through the spi-over-jtag user register so the
    /// configuration flash answers on the DR path.
    fn prepare_flash_access(&mut self) -> Result<(), JtagError> {
        self.jtag.shift_ir_u8(USER1, self.irlen, TapState::RunTestIdle)?;
        self.jtag.toggle_clk(16)?;
        Ok(())
    }

    /// Restores the fabric by restarting configuration from flash.
    fn post_flash_access(&mut self) -> Result<(), JtagError> {
        self.reset()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use jtag_core::parts::PartTable;
    use jtag_core::probe::sim::SimProbe;

    fn artix_jtag() -> Jtag<SimProbe> {
        let mut jtag = Jtag::new(SimProbe::new(&[(0x0362F093, 6)]), PartTable::default());
        jtag.detect_chain(5).unwrap();
        jtag.device_select(0).unwrap();
        jtag
    }

    #[test]
    fn family_resolves_through_the_part_table() {
        let jtag = artix_jtag();
        assert_eq!(family(&jtag), Some("artix7"));
    }

    #[test]
    fn read_idcode_matches_the_chain() {
        let mut jtag = artix_jtag();
        let idcode = XilinxJtag::new(&mut jtag).read_idcode().unwrap();
        assert_eq!(idcode, 0x0362F093);
        assert_eq!(jtag.state(), TapState::TestLogicReset);
    }

    #[test]
    fn reset_parks_in_run_test_idle() {
        let mut jtag = artix_jtag();
        XilinxJtag::new(&mut jtag).reset().unwrap();
        assert_eq!(jtag.state(), TapState::RunTestIdle);
    }
}
