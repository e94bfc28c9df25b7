//! # XVC wire protocol
//!
//! Encoding and decoding of the [Xilinx Virtual Cable](https://github.com/Xilinx/XilinxVirtualCable)
//! 1.0 protocol, the small binary-over-TCP language design tools use to
//! drive a remote JTAG cable.
//!
//! ## Commands
//!
//! Each command is an ASCII tag followed by little-endian binary fields:
//!
//! - `getinfo:` — capability query; the server answers
//!   `xvcServer_v1.0:<max_vector_len>\n`
//! - `settck:<period u32>` — requests a TCK period in nanoseconds; the
//!   server answers with the period it actually runs at
//! - `shift:<num_bits u32><tms bytes><tdi bytes>` — clocks per-bit TMS and
//!   TDI vectors of `⌈num_bits/8⌉` bytes each; the server answers with the
//!   captured TDO vector of the same length
//!
//! Vectors are LSB-first: bit `k` of the stream lives at
//! `buf[k >> 3] & (1 << (k & 7))`.
//!
//! ## Reading and writing
//!
//! [`Message::from_reader`] decodes one client command from any
//! [`std::io::Read`], enforcing a maximum shift size before allocating;
//! [`Message::write_to`] is the client-side encoder. Server capability
//! lines go through [`XvcInfo`]:
//!
//! ```
//! use std::io::Cursor;
//! use xvc_proto::{Message, XvcInfo, XVC_BUFSIZE};
//!
//! let mut wire = Vec::new();
//! Message::SetTck { period_ns: 16_000 }.write_to(&mut wire).unwrap();
//! assert_eq!(&wire[..7], b"settck:");
//!
//! let decoded = Message::from_reader(&mut Cursor::new(wire), XVC_BUFSIZE).unwrap();
//! assert_eq!(decoded, Message::SetTck { period_ns: 16_000 });
//!
//! let mut reply = Vec::new();
//! XvcInfo::new(XVC_BUFSIZE as u32).write_to(&mut reply).unwrap();
//! assert_eq!(reply, b"xvcServer_v1.0:2048\n");
//! ```
//!
//! ## Errors
//!
//! Malformed input surfaces as [`error::ReadError`]; the protocol itself
//! has no in-band error channel, so a server simply closes a session it
//! cannot parse.

pub mod codec;
pub mod error;
pub mod protocol;
pub use protocol::*;
