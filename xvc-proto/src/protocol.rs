//! Protocol-level data model.

/// Protocol version this implementation speaks.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Default per-session vector buffer size in bytes.
///
/// Clients learn it from the `getinfo:` reply and must keep their shift
/// requests within it; a request past the advertised size means the two
/// sides disagree about buffering and the session cannot continue.
pub const XVC_BUFSIZE: usize = 2048;

/// One client command.
///
/// Clients send a command and wait for its reply before sending the next;
/// the server processes commands strictly in order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Message {
    /// Capability query; answered with an [`XvcInfo`] line.
    GetInfo,
    /// Requests a TCK period in nanoseconds; answered with the period the
    /// server actually runs at.
    SetTck { period_ns: u32 },
    /// Clocks `num_bits` of per-bit TMS and TDI; answered with the
    /// captured TDO vector. All three vectors are `⌈num_bits/8⌉` bytes.
    Shift {
        num_bits: u32,
        tms: Box<[u8]>,
        tdi: Box<[u8]>,
    },
}

/// Server capability line: protocol version and maximum vector length.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct XvcInfo {
    max_vector_len: u32,
}

impl XvcInfo {
    pub fn new(max_vector_len: u32) -> XvcInfo {
        XvcInfo { max_vector_len }
    }

    /// The largest shift vector, in bytes, the server accepts.
    pub fn max_vector_len(&self) -> u32 {
        self.max_vector_len
    }
}

impl Default for XvcInfo {
    fn default() -> XvcInfo {
        XvcInfo {
            max_vector_len: XVC_BUFSIZE as u32,
        }
    }
}

/// The TCK frequency a `settck` period asks for.
pub fn period_to_hz(period_ns: u32) -> u32 {
    1_000_000_000 / period_ns.max(1)
}

#[test]
fn period_conversion() {
    assert_eq!(period_to_hz(16_000), 62_500);
    assert_eq!(period_to_hz(100), 10_000_000);
    // A zero period must not divide by zero.
    assert_eq!(period_to_hz(0), 1_000_000_000);
}
