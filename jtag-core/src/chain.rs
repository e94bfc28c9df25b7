//! Scan-chain bookkeeping: the ordered device list, the active device and
//! the bypass padding arithmetic for addressing one device among many.

use crate::error::JtagError;

/// One device on the scan chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChainDevice {
    pub idcode: u32,
    pub irlen: u16,
}

/// The enumerated chain plus the index of the currently addressed device.
///
/// Devices are kept in discovery order: enumeration prepends each IDCODE it
/// reads, so the device whose IDCODE left the chain last sits at index 0.
#[derive(Debug, Default)]
pub struct Chain {
    devices: Vec<ChainDevice>,
    active: usize,
}

impl Chain {
    pub fn clear(&mut self) {
        self.devices.clear();
        self.active = 0;
    }

    /// Prepends a device. Enumeration uses this for every IDCODE it reads;
    /// bring-up sequences use it to register a device they know will
    /// appear after reconfiguration.
    pub fn insert_first(&mut self, idcode: u32, irlen: u16) {
        self.devices.insert(0, ChainDevice { idcode, irlen });
    }

    /// Makes `index` the addressed device.
    pub fn select(&mut self, index: u16) -> Result<(), JtagError> {
        if usize::from(index) >= self.devices.len() {
            return Err(JtagError::IndexOutOfRange {
                index,
                len: self.devices.len(),
            });
        }
        self.active = usize::from(index);
        Ok(())
    }

    pub fn devices(&self) -> &[ChainDevice] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&ChainDevice> {
        self.devices.get(self.active)
    }

    /// Bypass bits to clock ahead of the data of a DR shift: one per
    /// device past the active index.
    pub fn dr_bits_before(&self) -> usize {
        self.devices.len().saturating_sub(self.active + 1)
    }

    /// Bypass bits to clock after the data of a DR shift: one per device
    /// below the active index.
    pub fn dr_bits_after(&self) -> usize {
        self.active
    }

    /// Bypass instruction bits ahead of the data of an IR shift: the
    /// summed IR widths of every device past the active index.
    pub fn ir_bits_before(&self) -> usize {
        self.devices
            .get(self.active + 1..)
            .unwrap_or(&[])
            .iter()
            .map(|dev| usize::from(dev.irlen))
            .sum()
    }

    /// Bypass instruction bits after the data of an IR shift: the summed
    /// IR widths of every device below the active index.
    pub fn ir_bits_after(&self) -> usize {
        self.devices[..self.active]
            .iter()
            .map(|dev| usize::from(dev.irlen))
            .sum()
    }
}
