//! # xvcd
//!
//! Daemon gluing the JTAG core to the XVC bridge: it opens a cable,
//! enumerates the scan chain, runs family-specific bring-up where needed
//! (ZynqMP), and then serves the chain to remote tools over the XVC 1.0
//! protocol.
//!
//! The library half exists so the integration tests can assemble the same
//! stack the binary runs: [`cables`] opens a probe from a [`jtag_core::CableKind`],
//! [`bridge::JtagXvcBackend`] adapts a [`jtag_core::Jtag`] to the server's
//! backend seam, and [`xilinx`]/[`zynqmp`] hold the device-specific
//! bring-up sequences.
pub mod bridge;
pub mod cables;
pub mod xilinx;
pub mod zynqmp;
