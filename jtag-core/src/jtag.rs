//! The JTAG façade: TAP engine, chain enumeration and the shift
//! operations that address one device among many.
//!
//! A [`Jtag`] owns the probe, the controller state, the pending-TMS buffer
//! and the enumerated chain. TMS transitions are accumulated and flushed
//! in batches; a shadow lookahead state tracks where the controller will
//! land once the pending bits hit the wire, so planning can continue
//! without a round-trip per bit.

use crate::bits;
use crate::chain::{Chain, ChainDevice};
use crate::error::JtagError;
use crate::parts::{IdCode, PartTable};
use crate::probe::Probe;
use crate::tap::{TapState, TmsBuffer};

/// Default size of the pending-TMS buffer in bytes.
pub const TMS_BUFFER_BYTES: usize = 2048;

/// How many TMS=1 bits a reset clocks out. Five reach Test-Logic-Reset
/// from any state; one more is margin for cables that eat a clock.
const RESET_TMS_CLOCKS: usize = 6;

pub struct Jtag<P: Probe> {
    probe: P,
    /// Committed controller state: where the hardware actually is.
    state: TapState,
    /// Where the hardware will be once the pending TMS bits are flushed.
    lookahead: TapState,
    tms: TmsBuffer,
    chain: Chain,
    parts: PartTable,
}

impl<P: Probe> Jtag<P> {
    /// Wraps a probe with the default TMS buffer size.
    pub fn new(probe: P, parts: PartTable) -> Jtag<P> {
        Jtag::with_tms_capacity(probe, parts, TMS_BUFFER_BYTES)
    }

    /// Wraps a probe with an explicit TMS buffer size in bytes.
    pub fn with_tms_capacity(probe: P, parts: PartTable, bytes: usize) -> Jtag<P> {
        Jtag {
            probe,
            state: TapState::RunTestIdle,
            lookahead: TapState::RunTestIdle,
            tms: TmsBuffer::with_capacity(bytes),
            chain: Chain::default(),
            parts,
        }
    }

    /// The committed controller state.
    pub fn state(&self) -> TapState {
        self.state
    }

    pub fn devices(&self) -> &[ChainDevice] {
        self.chain.devices()
    }

    pub fn active_index(&self) -> usize {
        self.chain.active_index()
    }

    pub fn active_device(&self) -> Option<&ChainDevice> {
        self.chain.active()
    }

    pub fn part_table(&self) -> &PartTable {
        &self.parts
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Appends one TMS bit and advances the lookahead state.
    ///
    /// A full buffer is flushed (without finalizing) before the append.
    pub fn set_tms(&mut self, tms: bool) -> Result<(), JtagError> {
        if self.tms.is_full() {
            self.flush_tms(false)?;
        }
        if self.tms.bits() == 0 {
            self.lookahead = self.state;
        }
        self.tms.push(tms);
        self.lookahead = self.lookahead.next(tms);
        log::trace!("tms {} -> {} ({} pending)", tms as u8, self.lookahead, self.tms.bits());
        Ok(())
    }

    /// Sends the pending TMS bits to the probe and commits the lookahead
    /// state.
    ///
    /// With nothing pending, `finalize` still drains the probe's own
    /// command queue; without it the call is a no-op. A probe failure
    /// discards the pending bits so the engine is not left torn.
    pub fn flush_tms(&mut self, finalize: bool) -> Result<(), JtagError> {
        if self.tms.bits() != 0 {
            log::trace!("flush {} tms bits, landing in {}", self.tms.bits(), self.lookahead);
            let sent = self.probe.write_tms(self.tms.as_bytes(), self.tms.bits(), finalize);
            self.tms.clear();
            match sent {
                Ok(()) => self.state = self.lookahead,
                Err(err) => {
                    self.lookahead = self.state;
                    return Err(err.into());
                }
            }
        } else if finalize {
            self.probe.flush()?;
        }
        Ok(())
    }

    /// Discards pending TMS bits without transmitting.
    pub fn clean_tms(&mut self) {
        self.tms.clear();
        self.lookahead = self.state;
    }

    /// Drives the controller to `target` along the shortest path and
    /// flushes.
    pub fn set_state(&mut self, target: TapState) -> Result<(), JtagError> {
        let from = if self.tms.bits() == 0 { self.state } else { self.lookahead };
        for tms in from.path_to(target) {
            self.set_tms(tms)?;
        }
        self.flush_tms(false)
    }

    /// Unconditionally resets the controller to Test-Logic-Reset.
    pub fn go_test_logic_reset(&mut self) -> Result<(), JtagError> {
        for _ in 0..RESET_TMS_CLOCKS {
            self.set_tms(true)?;
        }
        self.flush_tms(false)
    }

    /// Emits `clocks` idle clocks, holding TMS high only in
    /// Test-Logic-Reset so the controller stays parked.
    pub fn toggle_clk(&mut self, clocks: usize) -> Result<(), JtagError> {
        self.flush_tms(false)?;
        let tms = self.state == TapState::TestLogicReset;
        self.probe.toggle_clk(tms, false, clocks)?;
        Ok(())
    }

    /// Simulates a packed TMS vector from the committed state without
    /// emitting anything.
    pub fn calculate_tms(&self, tms: &[u8], nbits: usize) -> TapState {
        (0..nbits).fold(self.state, |state, k| state.next(bits::get(tms, k)))
    }

    /// Raw per-bit TMS+TDI path for the XVC bridge.
    ///
    /// Bypasses the path planner entirely; the client is authoritative
    /// over the controller. The committed state is resynchronized from the
    /// vector afterwards so façade-driven operations can follow on the
    /// same session.
    pub fn direct_read_write(
        &mut self,
        tms: &[u8],
        tdi: &[u8],
        tdo: &mut [u8],
        nbits: usize,
    ) -> Result<(), JtagError> {
        self.probe.write_tms_tdi(tms, tdi, tdo, nbits)?;
        self.state = self.calculate_tms(tms, nbits);
        self.lookahead = self.state;
        Ok(())
    }

    /// Flushes pending TMS, shifts `nbits` of TDI and tracks the
    /// Shift→Exit1 transition when `last` raises TMS on the final bit.
    fn read_write(
        &mut self,
        tdi: &[u8],
        tdo: Option<&mut [u8]>,
        nbits: usize,
        last: bool,
    ) -> Result<(), JtagError> {
        self.flush_tms(false)?;
        self.probe.write_tdi(tdi, tdo, nbits, last)?;
        if last {
            self.state = if self.state == TapState::ShiftDr {
                TapState::Exit1Dr
            } else {
                TapState::Exit1Ir
            };
            self.lookahead = self.state;
        }
        Ok(())
    }

    /// Clocks `nbits` of all-ones padding, used for neighbours in bypass.
    fn shift_ones(&mut self, nbits: usize, last: bool) -> Result<(), JtagError> {
        let tx = vec![0xFF; bits::bytes_for(nbits)];
        self.read_write(&tx, None, nbits, last)
    }

    /// Shifts `drlen` bits through the active device's data register.
    ///
    /// Neighbours are assumed to sit in bypass: entering Shift-DR clocks
    /// one padding bit per device beyond the active index first, and
    /// leaving it clocks one per device below the index with the exit on
    /// the final bit. With `end_state == ShiftDr` the controller stays put
    /// so the next call continues the same scan without padding.
    pub fn shift_dr(
        &mut self,
        tdi: &[u8],
        tdo: Option<&mut [u8]>,
        drlen: usize,
        end_state: TapState,
    ) -> Result<(), JtagError> {
        let bits_after = self.chain.dr_bits_after();

        if self.state != TapState::ShiftDr {
            self.set_state(TapState::ShiftDr)?;
            self.flush_tms(false)?;
            let bits_before = self.chain.dr_bits_before();
            if bits_before > 0 {
                self.shift_ones(bits_before, false)?;
            }
        }

        // The exit rides on the data only when no padding follows it.
        self.read_write(tdi, tdo, drlen, bits_after == 0 && end_state != TapState::ShiftDr)?;

        if end_state != TapState::ShiftDr {
            if bits_after > 0 {
                self.shift_ones(bits_after, true)?;
            }
            self.set_state(end_state)?;
        }
        Ok(())
    }

    /// Shifts `irlen` bits through the active device's instruction
    /// register, feeding every other device its all-ones bypass code.
    pub fn shift_ir(
        &mut self,
        tdi: &[u8],
        tdo: Option<&mut [u8]>,
        irlen: usize,
        end_state: TapState,
    ) -> Result<(), JtagError> {
        let bypass_after = if end_state != TapState::ShiftIr {
            self.chain.ir_bits_after()
        } else {
            0
        };

        if self.state != TapState::ShiftIr {
            self.set_state(TapState::ShiftIr)?;
            self.flush_tms(false)?;
            let bypass_before = self.chain.ir_bits_before();
            if bypass_before > 0 {
                self.shift_ones(bypass_before, false)?;
            }
        }

        self.read_write(tdi, tdo, irlen, bypass_after == 0 && end_state != TapState::ShiftIr)?;

        if end_state != TapState::ShiftIr {
            if bypass_after > 0 {
                self.shift_ones(bypass_after, true)?;
            }
            self.set_state(end_state)?;
        }
        Ok(())
    }

    /// Single-byte convenience form of [`Jtag::shift_ir`] for instruction
    /// registers up to eight bits.
    pub fn shift_ir_u8(
        &mut self,
        tdi: u8,
        irlen: usize,
        end_state: TapState,
    ) -> Result<(), JtagError> {
        if irlen > 8 {
            return Err(JtagError::IrTooWide { irlen });
        }
        self.shift_ir(&[tdi], None, irlen, end_state)
    }

    /// Enumerates the scan chain.
    ///
    /// Resets to Test-Logic-Reset (which selects every IDCODE register),
    /// then reads `max_devices` 32-bit words out of the DR path with TDI
    /// held high. Every non-zero, non-all-ones word must resolve through
    /// the part tables; the chain list is rebuilt by prepending each
    /// resolved device. Ends parked in Test-Logic-Reset with the probe
    /// drained.
    pub fn detect_chain(&mut self, max_devices: usize) -> Result<usize, JtagError> {
        self.chain.clear();

        self.go_test_logic_reset()?;
        self.set_state(TapState::ShiftDr)?;

        // Some cables only clock when given write data, so feed ones;
        // they double as the fill pattern marking the end of the chain.
        let tx = [0xFF; 4];
        for i in 0..max_devices {
            let mut rx = [0; 4];
            self.read_write(&tx, Some(&mut rx), 32, i == max_devices - 1)?;
            let raw = u32::from_le_bytes(rx);
            log::debug!("raw idcode {}: 0x{:08x}", i, raw);

            if raw == 0 || raw == u32::MAX {
                continue;
            }
            match self.parts.lookup(raw) {
                Some(found) => {
                    log::info!(
                        "detected {} (idcode 0x{:08x}, irlen {})",
                        found.name,
                        found.idcode,
                        found.irlen
                    );
                    self.chain.insert_first(found.idcode, found.irlen);
                }
                None => {
                    let id = IdCode(raw);
                    return Err(JtagError::UnknownDevice {
                        idcode: raw,
                        manufacturer: id.manufacturer(),
                        manufacturer_name: self.parts.manufacturer_name(id.manufacturer()),
                        part: id.part(),
                        version: id.version(),
                    });
                }
            }
        }

        self.go_test_logic_reset()?;
        self.flush_tms(true)?;
        Ok(self.chain.len())
    }

    /// Registers a device at the head of the chain without re-scanning.
    pub fn insert_first(&mut self, idcode: u32, irlen: u16) {
        self.chain.insert_first(idcode, irlen);
    }

    /// Makes device `index` the target of subsequent IR/DR shifts.
    pub fn device_select(&mut self, index: u16) -> Result<(), JtagError> {
        self.chain.select(index)
    }
}
