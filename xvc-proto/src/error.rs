use std::{
    error::Error,
    fmt::Display,
    io,
    num::ParseIntError,
    str::Utf8Error,
};

/// Errors raised while decoding protocol data from a stream.
#[derive(Debug)]
pub enum ReadError {
    Io(io::Error),
    /// The tag bytes did not spell a known command.
    BadCommand { got: String },
    /// A shift request larger than the negotiated buffer. The session
    /// cannot continue; the two sides disagree about buffer sizes.
    OversizeShift { max: usize, got: usize },
    /// A capability line that does not parse.
    BadInfo(String),
    /// A capability line advertising a protocol we do not speak.
    UnsupportedVersion(String),
}

impl From<io::Error> for ReadError {
    fn from(value: io::Error) -> Self {
        ReadError::Io(value)
    }
}

impl From<Utf8Error> for ReadError {
    fn from(value: Utf8Error) -> Self {
        ReadError::BadInfo(format!("invalid UTF-8: {}", value))
    }
}

impl From<ParseIntError> for ReadError {
    fn from(value: ParseIntError) -> Self {
        ReadError::BadInfo(format!("invalid integer: {}", value))
    }
}

impl Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Io(error) => write!(f, "{}", error),
            ReadError::BadCommand { got } => {
                write!(f, "unrecognized command starting with {:?}", got)
            }
            ReadError::OversizeShift { max, got } => {
                write!(f, "shift of {} bytes exceeds the {} byte buffer", got, max)
            }
            ReadError::BadInfo(detail) => write!(f, "malformed server info: {}", detail),
            ReadError::UnsupportedVersion(version) => {
                write!(f, "unsupported protocol version {}", version)
            }
        }
    }
}

impl Error for ReadError {}

impl ReadError {
    /// True when the error is a plain end-of-stream, i.e. the peer hung up
    /// between commands rather than sending garbage.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ReadError::Io(err) if matches!(
            err.kind(),
            io::ErrorKind::UnexpectedEof
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
        ))
    }
}
