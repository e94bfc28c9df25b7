//! Integration-test support: a minimal blocking XVC client and a helper
//! that spins up a server over any probe on an ephemeral port.

use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;

use jtag_core::parts::PartTable;
use jtag_core::{Jtag, Probe};
use xvc_bridge::server::{Builder, bind_listener};
use xvc_proto::error::ReadError;
use xvc_proto::{Message, XvcInfo};

/// Blocking client for exercising a server over real TCP.
pub struct XvcClient {
    tcp: TcpStream,
}

impl XvcClient {
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<XvcClient> {
        Ok(XvcClient {
            tcp: TcpStream::connect(addr)?,
        })
    }

    /// Queries the server's capability line.
    pub fn get_info(&mut self) -> Result<XvcInfo, ReadError> {
        Message::GetInfo.write_to(&mut self.tcp)?;
        XvcInfo::from_reader(&mut self.tcp)
    }

    /// Requests a TCK period and returns the period the server runs at.
    pub fn set_tck(&mut self, period_ns: u32) -> io::Result<u32> {
        Message::SetTck { period_ns }.write_to(&mut self.tcp)?;
        let mut buf = [0u8; 4];
        self.tcp.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Shifts per-bit TMS/TDI vectors and returns the captured TDO.
    pub fn shift(&mut self, num_bits: u32, tms: &[u8], tdi: &[u8]) -> io::Result<Box<[u8]>> {
        Message::Shift {
            num_bits,
            tms: tms.into(),
            tdi: tdi.into(),
        }
        .write_to(&mut self.tcp)?;
        let mut buf = vec![0; num_bits.div_ceil(8) as usize];
        self.tcp.read_exact(&mut buf)?;
        Ok(buf.into_boxed_slice())
    }

    /// The raw stream, for tests that speak bytes directly.
    pub fn stream(&mut self) -> &mut TcpStream {
        &mut self.tcp
    }
}

/// Starts a server over `probe` on an ephemeral localhost port and
/// returns its address. The server thread runs until the process exits.
pub fn spawn_server<P: Probe + Send + 'static>(probe: P) -> SocketAddr {
    let jtag = Jtag::new(probe, PartTable::default());
    let backend = xvcd::bridge::JtagXvcBackend::new(jtag, 6_000_000);
    let listener = bind_listener("127.0.0.1", 0).expect("ephemeral bind");
    let addr = listener.local_addr().expect("bound address");
    let mut server = Builder::new().build(backend);
    thread::spawn(move || {
        let _ = server.serve(listener);
    });
    addr
}
