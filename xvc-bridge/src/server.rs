use std::io::{self, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::os::fd::AsRawFd;
use std::time::Duration;

use nix::sys::socket::{
    AddressFamily, Backlog, SockFlag, SockType, SockaddrIn, bind, listen, setsockopt, socket,
    sockopt::ReuseAddr,
};

use crate::XvcBackend;
use xvc_proto::error::ReadError;
use xvc_proto::{Message, XVC_BUFSIZE, XvcInfo, period_to_hz};

#[derive(Debug, Clone)]
pub struct Config {
    /// Largest shift vector accepted from a client, in bytes. Advertised
    /// through `getinfo:`.
    pub max_vector_size: u32,
    /// Socket read/write timeout. `None` blocks indefinitely, which
    /// matches the cable side: probe calls have no timeout either.
    pub io_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_vector_size: XVC_BUFSIZE as u32,
            io_timeout: None,
        }
    }
}

/// Builder to create a [`Server`] and adjust configuration options.
///
/// # Example
///
/// ```ignore
/// use xvc_bridge::server::Builder;
/// use std::time::Duration;
///
/// let server = Builder::new()
///     .max_vector_size(4096)
///     .io_timeout(Some(Duration::from_secs(30)))
///     .build(my_backend);
/// ```
#[derive(Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Sets the largest vector size this server accepts.
    pub fn max_vector_size(mut self, size: u32) -> Self {
        self.config.max_vector_size = size;
        self
    }

    /// Sets the TCP read and write timeout.
    pub fn io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.io_timeout = timeout;
        self
    }

    /// Builds the server over a backend.
    pub fn build<T: XvcBackend>(self, backend: T) -> Server<T> {
        Server::new(backend, self.config)
    }
}

/// Creates the listening socket the daemon's way: `SO_REUSEADDR` so a
/// restart can rebind immediately, and a backlog of one since sessions
/// are served strictly one at a time.
///
/// An interface string starting with `-` binds every interface; anything
/// else must parse as a dotted-quad IPv4 address.
pub fn bind_listener(interface: &str, port: u16) -> io::Result<TcpListener> {
    let addr = if interface.starts_with('-') {
        Ipv4Addr::UNSPECIFIED
    } else {
        interface.parse::<Ipv4Addr>().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("bad bind address '{}'", interface),
            )
        })?
    };

    let fd = socket(AddressFamily::Inet, SockType::Stream, SockFlag::empty(), None)
        .map_err(io::Error::from)?;
    setsockopt(&fd, ReuseAddr, &true).map_err(io::Error::from)?;
    let [a, b, c, d] = addr.octets();
    bind(fd.as_raw_fd(), &SockaddrIn::new(a, b, c, d, port)).map_err(io::Error::from)?;
    listen(&fd, Backlog::new(1).map_err(io::Error::from)?).map_err(io::Error::from)?;
    Ok(TcpListener::from(fd))
}

/// Rolling per-session counters, reported when the session ends.
#[derive(Debug, Default)]
struct SessionStats {
    shifts: u64,
    bits: u64,
    largest_bits: u32,
}

#[derive(Debug)]
pub struct Server<T: XvcBackend> {
    backend: T,
    config: Config,
}

impl<T: XvcBackend> Server<T> {
    pub fn new(backend: T, config: Config) -> Server<T> {
        Server { backend, config }
    }

    /// Accepts and serves clients forever, one session at a time.
    ///
    /// A failed session is logged and the next client is accepted; only
    /// accept-loop failures end the server.
    pub fn serve(&mut self, listener: TcpListener) -> io::Result<()> {
        log::info!("xvc server ready on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(tcp) => {
                    if let Ok(peer) = tcp.peer_addr() {
                        log::info!("client connected from {}", peer);
                    }
                    if let Err(err) = self.handle_session(tcp) {
                        log::error!("session failed: {}", err);
                    }
                }
                Err(err) => log::error!("accept failed: {}", err),
            }
        }
        Ok(())
    }

    fn handle_session(&mut self, mut tcp: TcpStream) -> Result<(), ReadError> {
        tcp.set_read_timeout(self.config.io_timeout)?;
        tcp.set_write_timeout(self.config.io_timeout)?;

        let mut stats = SessionStats::default();
        let result = loop {
            match Message::from_reader(&mut tcp, self.config.max_vector_size as usize) {
                Ok(message) => {
                    if let Err(err) = self.process(message, &mut tcp, &mut stats) {
                        break Err(err);
                    }
                }
                Err(err) if err.is_disconnect() => {
                    log::info!("client disconnected");
                    break Ok(());
                }
                Err(err) => break Err(err),
            }
        };
        log::info!(
            "session closed after {} shifts ({} bits, largest {} bits)",
            stats.shifts,
            stats.bits,
            stats.largest_bits
        );
        result
    }

    fn process(
        &mut self,
        message: Message,
        tcp: &mut TcpStream,
        stats: &mut SessionStats,
    ) -> Result<(), ReadError> {
        match message {
            Message::GetInfo => {
                log::debug!("getinfo");
                XvcInfo::new(self.config.max_vector_size).write_to(tcp)?;
            }
            Message::SetTck { period_ns } => {
                log::debug!("settck: {} ns ({} Hz)", period_ns, period_to_hz(period_ns));
                let actual = self.backend.set_tck(period_ns);
                tcp.write_all(&actual.to_le_bytes())?;
            }
            Message::Shift { num_bits, tms, tdi } => {
                log::debug!("shift: {} bits", num_bits);
                log::trace!("shift tms: {:02x?}", &tms[..]);
                log::trace!("shift tdi: {:02x?}", &tdi[..]);

                stats.shifts += 1;
                stats.bits += u64::from(num_bits);
                stats.largest_bits = stats.largest_bits.max(num_bits);

                let tdo = self.backend.shift(num_bits, &tms, &tdi);
                let expected = num_bits.div_ceil(8) as usize;
                if tdo.len() != expected {
                    // The protocol cannot carry an error, so the session
                    // ends instead of replying short.
                    return Err(ReadError::Io(io::Error::other(
                        "cable backend failed the shift",
                    )));
                }
                log::trace!("shift tdo: {:02x?}", &tdo[..]);
                tcp.write_all(&tdo)?;
            }
        }
        Ok(())
    }
}
