//! # XVC bridge server
//!
//! A blocking TCP server speaking the XVC 1.0 protocol and forwarding
//! every command to a cable backend. The protocol layer lives in
//! [`xvc_proto`](https://docs.rs/xvc-proto/); this crate owns the socket,
//! the session loop and the [`XvcBackend`] seam that a daemon implements
//! over its JTAG stack.
//!
//! ## Architecture
//!
//! - [`XvcBackend`]: the two operations a backend must provide — TCK
//!   configuration and raw vector shifting
//! - [`server::Server`]: accepts connections, decodes commands, dispatches
//!   them to the backend and writes the replies
//! - [`server::bind_listener`]: socket construction with the daemon's
//!   conventions (`SO_REUSEADDR`, backlog of one, a leading `-` in the
//!   interface string binds all interfaces)
//!
//! ## Session model
//!
//! One client is served at a time, to completion: every command finishes
//! its probe round-trip before the next is read, so the JTAG chain never
//! sees interleaved traffic. A disconnect or malformed command closes the
//! session and the server goes back to accepting; per-session shift
//! statistics are logged on the way out.
//!
//! ## Basic usage
//!
//! ```ignore
//! use xvc_bridge::server::{Builder, bind_listener};
//!
//! let listener = bind_listener("-", 2542)?;
//! let mut server = Builder::new().build(my_backend);
//! server.serve(listener)?;
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through the `log` facade: connection lifecycle at info,
//! per-command detail at debug, vector hex dumps at trace.
pub mod server;

/// Cable-side interface of the bridge.
///
/// The protocol has no in-band error channel, so both operations are
/// infallible at the seam: a backend that cannot perform a shift returns
/// an empty vector, which ends the session.
pub trait XvcBackend {
    /// Configures the TCK period and reports the period actually in
    /// effect, which may differ if the cable cannot honour the request.
    fn set_tck(&mut self, period_ns: u32) -> u32;

    /// Clocks `num_bits` of per-bit TMS/TDI and returns the captured TDO
    /// vector of `⌈num_bits/8⌉` bytes, or an empty vector on failure.
    fn shift(&mut self, num_bits: u32, tms: &[u8], tdi: &[u8]) -> Box<[u8]>;
}
