//! Cable construction.
//!
//! Dispatches a [`CableKind`] to a concrete probe exactly once; everything
//! after construction goes through the [`Probe`] trait. The USB cable
//! families are driven by external driver crates and are not part of this
//! build; the two software cables below cover bring-up and testing.

use jtag_core::error::{JtagError, ProbeError};
use jtag_core::probe::sim::SimProbe;
use jtag_core::{CableKind, Probe};

/// Software cable that mirrors TDI straight back on TDO.
///
/// Useful for validating an XVC client end to end without hardware: every
/// shift returns exactly the TDI vector it sent.
pub struct LoopbackProbe;

impl Probe for LoopbackProbe {
    fn write_tms(&mut self, _tms: &[u8], _bits: usize, _flush: bool) -> Result<(), ProbeError> {
        Ok(())
    }

    fn write_tdi(
        &mut self,
        tdi: &[u8],
        tdo: Option<&mut [u8]>,
        bits: usize,
        _last: bool,
    ) -> Result<(), ProbeError> {
        if let Some(tdo) = tdo {
            let n = bits.div_ceil(8);
            tdo[..n].copy_from_slice(&tdi[..n]);
        }
        Ok(())
    }

    fn write_tms_tdi(
        &mut self,
        _tms: &[u8],
        tdi: &[u8],
        tdo: &mut [u8],
        bits: usize,
    ) -> Result<(), ProbeError> {
        let n = bits.div_ceil(8);
        tdo[..n].copy_from_slice(&tdi[..n]);
        Ok(())
    }

    fn toggle_clk(&mut self, _tms: bool, _tdi: bool, _clocks: usize) -> Result<(), ProbeError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ProbeError> {
        Ok(())
    }
}

/// The chain the `sim` cable presents: a single Artix-7.
pub const SIM_CHAIN: &[(u32, u16)] = &[(0x0362F093, 6)];

/// Opens the probe for a cable selection.
pub fn open(kind: CableKind) -> Result<Box<dyn Probe>, JtagError> {
    log::info!("opening {} cable", kind);
    match kind {
        CableKind::Loopback => Ok(Box::new(LoopbackProbe)),
        CableKind::Sim => Ok(Box::new(SimProbe::new(SIM_CHAIN))),
        other => Err(JtagError::Config(format!(
            "the {} cable needs its external USB driver, which is not part of this build",
            other
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loopback_mirrors_tdi() {
        let mut probe = LoopbackProbe;
        let tdi = [0xA5u8];
        let mut tdo = [0u8];
        probe.write_tms_tdi(&[0x00], &tdi, &mut tdo, 8).unwrap();
        assert_eq!(tdo, tdi);
    }

    #[test]
    fn usb_cables_are_external() {
        match open(CableKind::JLink) {
            Err(JtagError::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }
}
