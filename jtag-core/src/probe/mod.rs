//! The cable capability interface.
//!
//! A probe is the physical USB adapter driving the JTAG signals. The core
//! only ever talks to one through the [`Probe`] trait; the concrete USB
//! drivers (FTDI MPSSE, J-Link, ...) live in external crates and are
//! selected once at construction via [`CableKind`]. Everything in-tree that
//! implements the trait is a software probe: the chain simulator in
//! [`sim`], and the loopback cable of the daemon.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{JtagError, ProbeError};

pub mod sim;

/// Bit-level TMS/TDI/TDO transport to a physical adapter.
///
/// All packed vectors are LSB-first: bit `k` of the stream lives at
/// `buf[k >> 3] & (1 << (k & 7))`. Implementations may coalesce writes
/// internally; [`Probe::flush`] drains any such queue.
pub trait Probe {
    /// Emits `bits` TMS transitions with TDI held constant.
    fn write_tms(&mut self, tms: &[u8], bits: usize, flush: bool) -> Result<(), ProbeError>;

    /// Emits `bits` TDI bits, capturing TDO when `tdo` is given.
    ///
    /// With `last` set, the probe raises TMS on the final clock so the TAP
    /// leaves its Shift state together with the last data bit.
    fn write_tdi(
        &mut self,
        tdi: &[u8],
        tdo: Option<&mut [u8]>,
        bits: usize,
        last: bool,
    ) -> Result<(), ProbeError>;

    /// Emits per-bit TMS and TDI simultaneously, capturing TDO.
    ///
    /// Only the raw XVC path uses this; the TAP engine never does.
    fn write_tms_tdi(
        &mut self,
        tms: &[u8],
        tdi: &[u8],
        tdo: &mut [u8],
        bits: usize,
    ) -> Result<(), ProbeError>;

    /// Emits `clocks` idle clocks with TMS and TDI held at fixed levels.
    fn toggle_clk(&mut self, tms: bool, tdi: bool, clocks: usize) -> Result<(), ProbeError>;

    /// Drains all internally buffered commands.
    fn flush(&mut self) -> Result<(), ProbeError>;
}

impl<P: Probe + ?Sized> Probe for Box<P> {
    fn write_tms(&mut self, tms: &[u8], bits: usize, flush: bool) -> Result<(), ProbeError> {
        (**self).write_tms(tms, bits, flush)
    }

    fn write_tdi(
        &mut self,
        tdi: &[u8],
        tdo: Option<&mut [u8]>,
        bits: usize,
        last: bool,
    ) -> Result<(), ProbeError> {
        (**self).write_tdi(tdi, tdo, bits, last)
    }

    fn write_tms_tdi(
        &mut self,
        tms: &[u8],
        tdi: &[u8],
        tdo: &mut [u8],
        bits: usize,
    ) -> Result<(), ProbeError> {
        (**self).write_tms_tdi(tms, tdi, tdo, bits)
    }

    fn toggle_clk(&mut self, tms: bool, tdi: bool, clocks: usize) -> Result<(), ProbeError> {
        (**self).toggle_clk(tms, tdi, clocks)
    }

    fn flush(&mut self) -> Result<(), ProbeError> {
        (**self).flush()
    }
}

/// The cable families a daemon can be asked to open.
///
/// Construction dispatches on this exactly once; after that every probe
/// call goes through the instance and stays monomorphic.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CableKind {
    Anlogic,
    FtdiBitbang,
    FtdiMpsse,
    Ch552,
    DirtyJtag,
    JLink,
    UsbBlaster,
    CmsisDap,
    /// Software cable that mirrors TDI back on TDO.
    Loopback,
    /// Software cable simulating a small scan chain.
    Sim,
}

impl CableKind {
    pub fn name(&self) -> &'static str {
        match self {
            CableKind::Anlogic => "anlogic",
            CableKind::FtdiBitbang => "ft232rl",
            CableKind::FtdiMpsse => "ftdi",
            CableKind::Ch552 => "ch552",
            CableKind::DirtyJtag => "dirtyjtag",
            CableKind::JLink => "jlink",
            CableKind::UsbBlaster => "usb-blaster",
            CableKind::CmsisDap => "cmsisdap",
            CableKind::Loopback => "loopback",
            CableKind::Sim => "sim",
        }
    }
}

impl Display for CableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CableKind {
    type Err = JtagError;

    fn from_str(s: &str) -> Result<CableKind, JtagError> {
        match s {
            "anlogic" => Ok(CableKind::Anlogic),
            "ft232rl" | "ft231x" => Ok(CableKind::FtdiBitbang),
            "ftdi" | "ft2232" | "digilent_hs2" => Ok(CableKind::FtdiMpsse),
            "ch552" | "tangnano" => Ok(CableKind::Ch552),
            "dirtyjtag" => Ok(CableKind::DirtyJtag),
            "jlink" => Ok(CableKind::JLink),
            "usb-blaster" => Ok(CableKind::UsbBlaster),
            "cmsisdap" => Ok(CableKind::CmsisDap),
            "loopback" => Ok(CableKind::Loopback),
            "sim" => Ok(CableKind::Sim),
            other => Err(JtagError::Config(format!("unknown cable type '{}'", other))),
        }
    }
}
