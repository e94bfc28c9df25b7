//! ZynqMP bring-up.
//!
//! A powered-up ZynqMP keeps its PL TAP and ARM DAP off the scan chain;
//! only the PS TAP and a reserved dummy are visible. Writing 0x3 into the
//! JTAG_CTRL register enables both, after which the chain must be scanned
//! again and shows the PL TAP followed by the Cortex-A53 DAP.

use jtag_core::error::JtagError;
use jtag_core::{Jtag, Probe, TapState};

/// IDCODE of the ARM Cortex-A53 DAP that must appear after the unlock.
const ARM_DAP_IDCODE: u32 = 0x5BA00477;

/// JTAG_CTRL instruction of the PS TAP.
const JTAG_CTRL: u16 = 0x824;

/// Enables the PL/ARM TAPs if needed and validates the resulting chain.
///
/// On success the chain carries a placeholder entry for the PS-side TAP
/// and the PL TAP is the addressed device.
pub fn init<P: Probe>(jtag: &mut Jtag<P>, family: &str) -> Result<(), JtagError> {
    if family == "zynqmp_cfgn" {
        log::info!("zynqmp: enabling PL TAP and ARM DAP via JTAG_CTRL");
        // The PS TAP answers on a twelve-bit IR; the instruction is fed in
        // two chunks, holding Shift-IR between them.
        jtag.device_select(0)?;
        jtag.shift_ir_u8((JTAG_CTRL & 0xFF) as u8, 8, TapState::ShiftIr)?;
        jtag.shift_ir_u8((JTAG_CTRL >> 8) as u8 & 0x0F, 4, TapState::RunTestIdle)?;
        let ctrl = [0x03, 0x00, 0x00, 0x00];
        jtag.shift_dr(&ctrl, None, 32, TapState::RunTestIdle)?;

        // Let the new TAPs settle, then rescan.
        jtag.set_state(TapState::TestLogicReset)?;
        jtag.toggle_clk(10)?;
        jtag.set_state(TapState::RunTestIdle)?;
        jtag.toggle_clk(100)?;
        jtag.detect_chain(5)?;
    }

    // The unlocked chain must be: PL TAP, then the Cortex-A53 DAP.
    let devices = jtag.devices();
    if devices.len() != 2 {
        return Err(JtagError::Config(format!(
            "zynqmp: wrong chain length: {} instead of 2",
            devices.len()
        )));
    }
    let pl = devices[0].idcode;
    if jtag.part_table().fpga_family(pl) != Some("zynqmp") {
        return Err(JtagError::Config(format!(
            "zynqmp: first device is not the PL TAP: 0x{:08x}",
            pl
        )));
    }
    if devices[1].idcode != ARM_DAP_IDCODE {
        return Err(JtagError::Config(format!(
            "zynqmp: second device is not the ARM DAP: 0x{:08x}",
            devices[1].idcode
        )));
    }

    // The PS side still clocks through the scan even though it never
    // showed an IDCODE; account for it, then address the PL TAP.
    jtag.insert_first(0xDEADBEEF, 6);
    jtag.device_select(1)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use jtag_core::parts::PartTable;
    use jtag_core::probe::sim::SimProbe;

    #[test]
    fn unlocked_chain_passes_validation() {
        // Wire order: the DAP sits nearest TDO, so the scan reads it
        // first and the PL TAP ends up at index 0.
        let sim = SimProbe::new(&[(ARM_DAP_IDCODE, 4), (0x14710093, 12)]);
        let mut jtag = Jtag::new(sim, PartTable::default());
        jtag.detect_chain(5).unwrap();
        jtag.device_select(0).unwrap();

        init(&mut jtag, "zynqmp").unwrap();

        // Placeholder prepended, PL TAP addressed.
        assert_eq!(jtag.devices().len(), 3);
        assert_eq!(jtag.devices()[0].idcode, 0xDEADBEEF);
        assert_eq!(jtag.active_index(), 1);
        assert_eq!(jtag.devices()[1].idcode, 0x14710093);
    }

    #[test]
    fn wrong_chain_length_is_rejected() {
        let sim = SimProbe::new(&[(0x14710093, 12)]);
        let mut jtag = Jtag::new(sim, PartTable::default());
        jtag.detect_chain(5).unwrap();
        match init(&mut jtag, "zynqmp") {
            Err(JtagError::Config(message)) => assert!(message.contains("chain length")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn wrong_second_device_is_rejected() {
        // An Artix where the DAP should be.
        let sim = SimProbe::new(&[(0x0362F093, 6), (0x14710093, 12)]);
        let mut jtag = Jtag::new(sim, PartTable::default());
        jtag.detect_chain(5).unwrap();
        match init(&mut jtag, "zynqmp") {
            Err(JtagError::Config(message)) => assert!(message.contains("ARM DAP")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }
}
