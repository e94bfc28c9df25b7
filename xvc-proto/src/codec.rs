//! Stream encoding and decoding of protocol messages.

use std::io::{self, BufRead, BufReader, Read, Write};

use crate::error::ReadError;
use crate::protocol::{Message, PROTOCOL_VERSION, XvcInfo};

/// Reads the remainder of a command tag and checks it byte for byte.
fn expect_tag(reader: &mut impl Read, seen: &[u8], rest: &[u8]) -> Result<(), ReadError> {
    let mut buf = [0u8; 8];
    let tail = &mut buf[..rest.len()];
    reader.read_exact(tail)?;
    if tail != rest {
        let mut got = seen.to_vec();
        got.extend_from_slice(tail);
        return Err(ReadError::BadCommand {
            got: String::from_utf8_lossy(&got).to_string(),
        });
    }
    Ok(())
}

fn read_u32_le(reader: &mut impl Read) -> Result<u32, ReadError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

impl Message {
    /// Decodes one command from the stream.
    ///
    /// Dispatches on the leading tag character the way the reference
    /// servers do: `g` can only start `getinfo:`, `s` needs a second byte
    /// to split `settck:` from `shift:`. Shift vectors larger than
    /// `max_shift_bytes` are rejected before anything is allocated.
    pub fn from_reader(
        reader: &mut impl Read,
        max_shift_bytes: usize,
    ) -> Result<Message, ReadError> {
        let mut tag = [0u8; 1];
        reader.read_exact(&mut tag)?;
        match tag[0] {
            b'g' => {
                expect_tag(reader, b"g", b"etinfo:")?;
                Ok(Message::GetInfo)
            }
            b's' => {
                reader.read_exact(&mut tag)?;
                match tag[0] {
                    b'e' => {
                        expect_tag(reader, b"se", b"ttck:")?;
                        let period_ns = read_u32_le(reader)?;
                        Ok(Message::SetTck { period_ns })
                    }
                    b'h' => {
                        expect_tag(reader, b"sh", b"ift:")?;
                        let num_bits = read_u32_le(reader)?;
                        let num_bytes = num_bits.div_ceil(8) as usize;
                        if num_bytes > max_shift_bytes {
                            return Err(ReadError::OversizeShift {
                                max: max_shift_bytes,
                                got: num_bytes,
                            });
                        }
                        let mut tms = vec![0u8; num_bytes].into_boxed_slice();
                        reader.read_exact(&mut tms)?;
                        let mut tdi = vec![0u8; num_bytes].into_boxed_slice();
                        reader.read_exact(&mut tdi)?;
                        Ok(Message::Shift { num_bits, tms, tdi })
                    }
                    other => Err(ReadError::BadCommand {
                        got: String::from_utf8_lossy(&[b's', other]).to_string(),
                    }),
                }
            }
            other => Err(ReadError::BadCommand {
                got: String::from_utf8_lossy(&[other]).to_string(),
            }),
        }
    }

    /// Encodes the command for the wire.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        match self {
            Message::GetInfo => writer.write_all(b"getinfo:"),
            Message::SetTck { period_ns } => {
                writer.write_all(b"settck:")?;
                writer.write_all(&period_ns.to_le_bytes())
            }
            Message::Shift { num_bits, tms, tdi } => {
                writer.write_all(b"shift:")?;
                writer.write_all(&num_bits.to_le_bytes())?;
                writer.write_all(tms)?;
                writer.write_all(tdi)
            }
        }
    }
}

const INFO_PREFIX: &str = "xvcServer_v";

impl XvcInfo {
    /// Renders the capability line, e.g. `xvcServer_v1.0:2048\n`.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(
            writer,
            "{}{}:{}",
            INFO_PREFIX,
            PROTOCOL_VERSION,
            self.max_vector_len()
        )
    }

    /// Parses a capability line as received by a client.
    pub fn from_reader(reader: &mut impl Read) -> Result<XvcInfo, ReadError> {
        let mut lines = BufReader::with_capacity(64, reader);
        let mut line = Vec::with_capacity(64);
        lines.read_until(b'\n', &mut line)?;

        let line = std::str::from_utf8(line.trim_ascii_end())?;
        let body = line
            .strip_prefix(INFO_PREFIX)
            .ok_or_else(|| ReadError::BadInfo(format!("unexpected prefix in {:?}", line)))?;
        let (version, len) = body
            .split_once(':')
            .ok_or_else(|| ReadError::BadInfo("missing ':' separator".to_string()))?;
        if version != PROTOCOL_VERSION {
            return Err(ReadError::UnsupportedVersion(version.to_string()));
        }
        Ok(XvcInfo::new(len.parse::<u32>()?))
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use crate::error::ReadError;
    use crate::protocol::{Message, XVC_BUFSIZE, XvcInfo};

    #[test]
    fn getinfo_round_trip() {
        let mut wire = Vec::new();
        Message::GetInfo.write_to(&mut wire).unwrap();
        assert_eq!(wire, b"getinfo:");
        let decoded = Message::from_reader(&mut Cursor::new(wire), XVC_BUFSIZE).unwrap();
        assert_eq!(decoded, Message::GetInfo);
    }

    #[test]
    fn settck_round_trip() {
        let mut wire = Vec::new();
        Message::SetTck { period_ns: 0x3E80 }.write_to(&mut wire).unwrap();
        let mut expected = b"settck:".to_vec();
        expected.extend_from_slice(&0x3E80u32.to_le_bytes());
        assert_eq!(wire, expected);
        let decoded = Message::from_reader(&mut Cursor::new(wire), XVC_BUFSIZE).unwrap();
        assert_eq!(decoded, Message::SetTck { period_ns: 0x3E80 });
    }

    #[test]
    fn shift_round_trip() {
        let num_bits = 13u32; // two bytes, partial tail
        let tms: Box<[u8]> = vec![0xAA, 0x01].into();
        let tdi: Box<[u8]> = vec![0x55, 0x02].into();
        let msg = Message::Shift { num_bits, tms: tms.clone(), tdi: tdi.clone() };

        let mut wire = Vec::new();
        msg.write_to(&mut wire).unwrap();
        assert_eq!(&wire[..6], b"shift:");
        assert_eq!(&wire[6..10], &num_bits.to_le_bytes());

        match Message::from_reader(&mut Cursor::new(wire), XVC_BUFSIZE).unwrap() {
            Message::Shift { num_bits: n, tms: t, tdi: d } => {
                assert_eq!(n, num_bits);
                assert_eq!(t, tms);
                assert_eq!(d, tdi);
            }
            other => panic!("expected Shift, got {:?}", other),
        }
    }

    #[test]
    fn oversize_shift_is_rejected_before_reading_vectors() {
        let num_bits = ((XVC_BUFSIZE + 1) * 8) as u32;
        let mut wire = b"shift:".to_vec();
        wire.extend_from_slice(&num_bits.to_le_bytes());
        // Note: no vector bytes follow; the size check must fire first.
        match Message::from_reader(&mut Cursor::new(wire), XVC_BUFSIZE) {
            Err(ReadError::OversizeShift { max, got }) => {
                assert_eq!(max, XVC_BUFSIZE);
                assert_eq!(got, XVC_BUFSIZE + 1);
            }
            other => panic!("expected OversizeShift, got {:?}", other),
        }
    }

    #[test]
    fn unknown_tags_fail() {
        for wire in [&b"x"[..], b"sx", b"gotinfo:"] {
            match Message::from_reader(&mut Cursor::new(wire.to_vec()), XVC_BUFSIZE) {
                Err(ReadError::BadCommand { .. }) => {}
                other => panic!("{:?}: expected BadCommand, got {:?}", wire, other),
            }
        }
    }

    #[test]
    fn truncated_commands_are_io_errors() {
        let mut wire = b"settck:".to_vec();
        wire.extend_from_slice(&[0x80, 0x3E]); // two of four period bytes
        match Message::from_reader(&mut Cursor::new(wire), XVC_BUFSIZE) {
            Err(err @ ReadError::Io(_)) => assert!(err.is_disconnect()),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn info_line_round_trip() {
        let mut wire = Vec::new();
        XvcInfo::default().write_to(&mut wire).unwrap();
        assert_eq!(wire, b"xvcServer_v1.0:2048\n");
        let info = XvcInfo::from_reader(&mut Cursor::new(wire)).unwrap();
        assert_eq!(info.max_vector_len(), 2048);
    }

    #[test]
    fn foreign_info_lines_fail() {
        let cases: [(&[u8], fn(&ReadError) -> bool); 3] = [
            (b"notAnXvcServer\n", |e| matches!(e, ReadError::BadInfo(_))),
            (b"xvcServer_v2.0:2048\n", |e| {
                matches!(e, ReadError::UnsupportedVersion(v) if v == "2.0")
            }),
            (b"xvcServer_v1.0:many\n", |e| matches!(e, ReadError::BadInfo(_))),
        ];
        for (wire, check) in cases {
            match XvcInfo::from_reader(&mut Cursor::new(wire.to_vec())) {
                Err(err) if check(&err) => {}
                other => panic!("{:?}: unexpected result {:?}", wire, other),
            }
        }
    }
}
