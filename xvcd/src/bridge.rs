//! Adapter from the JTAG façade to the XVC server's backend seam.

use jtag_core::{Jtag, Probe};
use xvc_bridge::XvcBackend;
use xvc_proto::period_to_hz;

/// Serves XVC requests straight off a [`Jtag`] instance.
///
/// The `shift` path forwards the client's per-bit TMS/TDI vectors to the
/// cable unmodified — the client owns the TAP state machine — and the
/// façade resynchronizes its tracked controller state afterwards, so
/// tool-side operations can still follow on the same chain.
pub struct JtagXvcBackend<P: Probe> {
    jtag: Jtag<P>,
    /// TCK frequency the daemon was launched at, in Hz.
    fixed_hz: u32,
}

impl<P: Probe> JtagXvcBackend<P> {
    pub fn new(jtag: Jtag<P>, fixed_hz: u32) -> JtagXvcBackend<P> {
        JtagXvcBackend { jtag, fixed_hz }
    }

    pub fn jtag(&self) -> &Jtag<P> {
        &self.jtag
    }

    pub fn jtag_mut(&mut self) -> &mut Jtag<P> {
        &mut self.jtag
    }
}

impl<P: Probe> XvcBackend for JtagXvcBackend<P> {
    /// Acknowledges the requested period without reprogramming the cable.
    ///
    /// The operator fixes the TCK frequency at launch; clients still get
    /// their period echoed back, as the reference server does.
    fn set_tck(&mut self, period_ns: u32) -> u32 {
        log::info!(
            "keeping the fixed {} Hz launch clock instead of the requested {} ns period ({} Hz)",
            self.fixed_hz,
            period_ns,
            period_to_hz(period_ns)
        );
        period_ns
    }

    fn shift(&mut self, num_bits: u32, tms: &[u8], tdi: &[u8]) -> Box<[u8]> {
        let mut tdo = vec![0u8; num_bits.div_ceil(8) as usize].into_boxed_slice();
        match self.jtag.direct_read_write(tms, tdi, &mut tdo, num_bits as usize) {
            Ok(()) => tdo,
            Err(err) => {
                log::error!("xvc shift failed: {}", err);
                // No error channel in the protocol; an empty reply ends
                // the session.
                Box::default()
            }
        }
    }
}
