//! # Simulated scan chain
//!
//! A software [`Probe`] modelling a chain of TAPs well enough for chain
//! enumeration, IR/DR shifting and the raw XVC path to run against it
//! without hardware: the daemon's `sim` cable and most of the test suite
//! use it.
//!
//! The model tracks the TAP controller by applying the canonical
//! transition function to every TMS bit it is clocked with. Entering
//! Capture-DR preloads each device's IDCODE register (or the single bypass
//! bit once its IR holds all-ones); entering Capture-IR preloads the
//! 1149.1 `..01` pattern; Update-IR decodes the shifted instruction per
//! device. Devices are held in wire order with index 0 closest to TDO, so
//! a reset-then-scan shifts out `devices[0]`'s IDCODE first.

use std::collections::VecDeque;

use crate::bits;
use crate::error::ProbeError;
use crate::probe::Probe;
use crate::tap::TapState;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Instruction {
    /// Selects the 32-bit identification register.
    Idcode,
    /// All-ones instruction: the 1-bit bypass register.
    Bypass,
    /// Anything else behaves like bypass as far as the model cares.
    Other(u64),
}

struct SimDevice {
    idcode: u32,
    irlen: u16,
    instruction: Instruction,
}

impl SimDevice {
    fn dr_bits(&self) -> Vec<bool> {
        match self.instruction {
            Instruction::Idcode => (0..32).map(|k| self.idcode >> k & 1 != 0).collect(),
            Instruction::Bypass | Instruction::Other(_) => vec![false],
        }
    }
}

/// Software probe simulating a JTAG chain.
pub struct SimProbe {
    devices: Vec<SimDevice>,
    state: TapState,
    /// Concatenated data registers, front bit next out of TDO.
    dr: VecDeque<bool>,
    /// Concatenated instruction registers, same orientation.
    ir: VecDeque<bool>,
    clocks: u64,
}

impl SimProbe {
    /// Builds a chain from `(idcode, irlen)` pairs, index 0 closest to TDO.
    pub fn new(devices: &[(u32, u16)]) -> SimProbe {
        let mut sim = SimProbe {
            devices: devices
                .iter()
                .map(|&(idcode, irlen)| SimDevice {
                    idcode,
                    irlen,
                    instruction: Instruction::Idcode,
                })
                .collect(),
            state: TapState::TestLogicReset,
            dr: VecDeque::new(),
            ir: VecDeque::new(),
            clocks: 0,
        };
        sim.load_dr();
        sim
    }

    /// The controller state the chain believes it is in.
    pub fn state(&self) -> TapState {
        self.state
    }

    /// Total clocks the chain has seen.
    pub fn clocks(&self) -> u64 {
        self.clocks
    }

    fn load_dr(&mut self) {
        self.dr.clear();
        for dev in &self.devices {
            self.dr.extend(dev.dr_bits());
        }
    }

    fn load_ir(&mut self) {
        self.ir.clear();
        for dev in &self.devices {
            for k in 0..dev.irlen {
                // Mandatory capture pattern: the two least significant
                // cells read back 01.
                self.ir.push_back(k == 0);
            }
        }
    }

    fn update_ir(&mut self) {
        let shifted: Vec<bool> = self.ir.iter().copied().collect();
        let mut offset = 0;
        for dev in &mut self.devices {
            let width = dev.irlen as usize;
            let mut value: u64 = 0;
            for k in 0..width.min(64) {
                if shifted.get(offset + k).copied().unwrap_or(false) {
                    value |= 1 << k;
                }
            }
            offset += width;
            dev.instruction = if width < 64 && value == (1 << width) - 1 {
                Instruction::Bypass
            } else {
                Instruction::Other(value)
            };
        }
    }

    /// One TCK cycle. Returns the TDO level sampled during this clock.
    fn step(&mut self, tms: bool, tdi: bool) -> bool {
        self.clocks += 1;
        let mut tdo = false;
        match self.state {
            TapState::ShiftDr => {
                tdo = self.dr.pop_front().unwrap_or(true);
                self.dr.push_back(tdi);
            }
            TapState::ShiftIr => {
                tdo = self.ir.pop_front().unwrap_or(true);
                self.ir.push_back(tdi);
            }
            _ => {}
        }
        self.state = self.state.next(tms);
        match self.state {
            TapState::TestLogicReset => {
                for dev in &mut self.devices {
                    dev.instruction = Instruction::Idcode;
                }
            }
            TapState::CaptureDr => self.load_dr(),
            TapState::CaptureIr => self.load_ir(),
            TapState::UpdateIr => self.update_ir(),
            _ => {}
        }
        tdo
    }
}

impl Probe for SimProbe {
    fn write_tms(&mut self, tms: &[u8], nbits: usize, _flush: bool) -> Result<(), ProbeError> {
        for k in 0..nbits {
            self.step(bits::get(tms, k), false);
        }
        Ok(())
    }

    fn write_tdi(
        &mut self,
        tdi: &[u8],
        tdo: Option<&mut [u8]>,
        nbits: usize,
        last: bool,
    ) -> Result<(), ProbeError> {
        let mut tdo = tdo;
        for k in 0..nbits {
            let tms = last && k == nbits - 1;
            let out = self.step(tms, bits::get(tdi, k));
            if let Some(buf) = tdo.as_deref_mut() {
                bits::put(buf, k, out);
            }
        }
        Ok(())
    }

    fn write_tms_tdi(
        &mut self,
        tms: &[u8],
        tdi: &[u8],
        tdo: &mut [u8],
        nbits: usize,
    ) -> Result<(), ProbeError> {
        for k in 0..nbits {
            let out = self.step(bits::get(tms, k), bits::get(tdi, k));
            bits::put(tdo, k, out);
        }
        Ok(())
    }

    fn toggle_clk(&mut self, tms: bool, tdi: bool, clocks: usize) -> Result<(), ProbeError> {
        for _ in 0..clocks {
            self.step(tms, tdi);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ProbeError> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Clocks `sequence` of (tms, tdi) pairs, returning the sampled TDO.
    fn clock(sim: &mut SimProbe, sequence: &[(bool, bool)]) -> Vec<bool> {
        sequence
            .iter()
            .map(|&(tms, tdi)| sim.step(tms, tdi))
            .collect()
    }

    #[test]
    fn idcode_shifts_out_after_reset() {
        let mut sim = SimProbe::new(&[(0x0362F093, 6)]);
        // TLR -> RTI -> Select-DR -> Capture-DR -> Shift-DR
        clock(&mut sim, &[(false, false), (true, false), (false, false), (false, false)]);
        assert_eq!(sim.state(), TapState::ShiftDr);
        let out = clock(&mut sim, &[(false, true); 32]);
        let mut idcode = 0u32;
        for (k, bit) in out.iter().enumerate() {
            if *bit {
                idcode |= 1 << k;
            }
        }
        assert_eq!(idcode, 0x0362F093);
        // The chain is drained; TDI fill (ones) follows.
        assert!(clock(&mut sim, &[(false, true); 8]).iter().all(|b| *b));
    }

    #[test]
    fn two_devices_shift_tdo_closest_first() {
        let mut sim = SimProbe::new(&[(0x5BA00477, 4), (0x14710093, 12)]);
        clock(&mut sim, &[(false, false), (true, false), (false, false), (false, false)]);
        let first: Vec<bool> = clock(&mut sim, &[(false, true); 32]);
        let second: Vec<bool> = clock(&mut sim, &[(false, true); 32]);
        let decode = |bits: &[bool]| {
            bits.iter()
                .enumerate()
                .fold(0u32, |acc, (k, b)| if *b { acc | 1 << k } else { acc })
        };
        assert_eq!(decode(&first), 0x5BA00477);
        assert_eq!(decode(&second), 0x14710093);
    }

    #[test]
    fn all_ones_instruction_selects_bypass() {
        let mut sim = SimProbe::new(&[(0x0362F093, 6)]);
        // Walk to Shift-IR and load the bypass instruction.
        clock(
            &mut sim,
            &[(false, false), (true, false), (true, false), (false, false), (false, false)],
        );
        assert_eq!(sim.state(), TapState::ShiftIr);
        // Five bits plus exit on the sixth.
        clock(&mut sim, &[(false, true); 5]);
        clock(&mut sim, &[(true, true)]);
        // Exit1-IR -> Update-IR -> Select-DR -> Capture-DR -> Shift-DR
        clock(&mut sim, &[(true, false), (true, false), (false, false), (false, false)]);
        assert_eq!(sim.state(), TapState::ShiftDr);
        // A bypassed device presents a single captured zero, then TDI fill.
        let out = clock(&mut sim, &[(false, true), (false, true), (false, true)]);
        assert_eq!(out, vec![false, true, true]);
    }
}
