//! # JTAG core
//!
//! Building blocks for driving an IEEE 1149.1 scan chain through a USB
//! probe: the TAP controller state machine with buffered TMS planning, a
//! chain manager that enumerates IDCODEs and addresses one device among
//! many, and the shift operations tying both to a cable behind the
//! [`probe::Probe`] capability trait.
//!
//! ## Overview
//!
//! The central type is [`jtag::Jtag`], constructed over any probe
//! implementation and a [`parts::PartTable`] of device reference data:
//!
//! ```
//! use jtag_core::jtag::Jtag;
//! use jtag_core::parts::PartTable;
//! use jtag_core::probe::sim::SimProbe;
//! use jtag_core::tap::TapState;
//!
//! // A simulated chain with one Artix-7 on it.
//! let probe = SimProbe::new(&[(0x0362F093, 6)]);
//! let mut jtag = Jtag::new(probe, PartTable::default());
//!
//! let devices = jtag.detect_chain(5).unwrap();
//! assert_eq!(devices, 1);
//! jtag.device_select(0).unwrap();
//!
//! // Load the BYPASS instruction and park in Run-Test/Idle.
//! jtag.shift_ir_u8(0x3F, 6, TapState::RunTestIdle).unwrap();
//! assert_eq!(jtag.state(), TapState::RunTestIdle);
//! ```
//!
//! ## Shifts and padding
//!
//! [`jtag::Jtag::shift_ir`] and [`jtag::Jtag::shift_dr`] transparently pad
//! the scan around the devices that are not addressed: neighbours receive
//! their all-ones bypass instruction during IR scans and one filler bit
//! each during DR scans, with the Shift-state exit riding on the very last
//! bit of the scan.
//!
//! ## Raw access
//!
//! The XVC bridge bypasses the planner and forwards client-supplied
//! per-bit TMS/TDI vectors through [`jtag::Jtag::direct_read_write`],
//! which resynchronizes the tracked controller state afterwards.
//!
//! ## Errors
//!
//! Operations return [`error::JtagError`]; cable drivers report through
//! [`error::ProbeError`]. Construction-time misconfiguration is the only
//! fatal case.

pub mod bits;
pub mod chain;
pub mod error;
pub mod jtag;
pub mod parts;
pub mod probe;
pub mod spi;
pub mod tap;

pub use error::{JtagError, ProbeError};
pub use jtag::Jtag;
pub use probe::{CableKind, Probe};
pub use tap::TapState;
