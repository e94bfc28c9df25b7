use thiserror::Error;

/// Failure of a concrete cable driver.
///
/// Drivers live outside this crate; they all report through this type so
/// that the core can treat any cable uniformly.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("USB transfer failed: {0}")]
    Usb(String),
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the JTAG core.
#[derive(Debug, Error)]
pub enum JtagError {
    /// Invalid probe selection or cable configuration. Fatal at
    /// construction time.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The probe failed while moving bits on the wire.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Chain enumeration found an IDCODE that none of the part tables
    /// resolve.
    #[error(
        "unknown device with IDCODE 0x{idcode:08x} (manufacturer 0x{manufacturer:03x} \
         ({manufacturer_name}), part 0x{part:04x}, version 0x{version:x})"
    )]
    UnknownDevice {
        idcode: u32,
        manufacturer: u16,
        manufacturer_name: &'static str,
        part: u16,
        version: u8,
    },

    /// A device index past the end of the scan chain.
    #[error("device index {index} out of range for a chain of {len}")]
    IndexOutOfRange { index: u16, len: usize },

    /// The single-byte `shift_ir` form only carries instructions up to
    /// eight bits.
    #[error("instruction register of {irlen} bits does not fit the single-byte shift")]
    IrTooWide { irlen: usize },
}
