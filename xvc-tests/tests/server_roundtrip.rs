//! End-to-end tests over real TCP: client socket, protocol codec, server
//! session loop, JTAG bridge and a software probe.

use std::io::{Read, Write};
use std::net::TcpStream;

use jtag_core::bits;
use jtag_core::probe::sim::SimProbe;
use xvc_tests::{XvcClient, spawn_server};
use xvcd::cables::LoopbackProbe;

#[test]
fn getinfo_replies_the_exact_capability_line() {
    let addr = spawn_server(LoopbackProbe);
    let mut tcp = TcpStream::connect(addr).unwrap();
    tcp.write_all(b"getinfo:").unwrap();

    let mut reply = [0u8; 20];
    tcp.read_exact(&mut reply).unwrap();
    assert_eq!(&reply, b"xvcServer_v1.0:2048\n");
}

#[test]
fn settck_echoes_the_requested_period() {
    let addr = spawn_server(LoopbackProbe);
    let mut tcp = TcpStream::connect(addr).unwrap();
    tcp.write_all(b"settck:").unwrap();
    tcp.write_all(&0x0000_3E80u32.to_le_bytes()).unwrap();

    let mut reply = [0u8; 4];
    tcp.read_exact(&mut reply).unwrap();
    assert_eq!(reply, 0x0000_3E80u32.to_le_bytes());
}

#[test]
fn shift_mirrors_tdi_through_the_loopback_cable() {
    let addr = spawn_server(LoopbackProbe);
    let mut client = XvcClient::connect(addr).unwrap();
    let tdo = client.shift(8, &[0x00], &[0xA5]).unwrap();
    assert_eq!(&tdo[..], &[0xA5]);
}

#[test]
fn shift_replies_are_sized_by_the_bit_count() {
    let addr = spawn_server(LoopbackProbe);
    let mut client = XvcClient::connect(addr).unwrap();
    for num_bits in [1u32, 7, 8, 9, 16, 63, 2048] {
        let bytes = num_bits.div_ceil(8) as usize;
        let tdo = client
            .shift(num_bits, &vec![0; bytes], &vec![0xFF; bytes])
            .unwrap();
        assert_eq!(tdo.len(), bytes, "{} bits", num_bits);
    }
}

#[test]
fn sequential_commands_share_one_session() {
    let addr = spawn_server(LoopbackProbe);
    let mut client = XvcClient::connect(addr).unwrap();
    let info = client.get_info().unwrap();
    assert_eq!(info.max_vector_len(), 2048);
    assert_eq!(client.set_tck(1000).unwrap(), 1000);
    let tdo = client.shift(16, &[0, 0], &[0x34, 0x12]).unwrap();
    assert_eq!(&tdo[..], &[0x34, 0x12]);
}

#[test]
fn oversize_shift_closes_the_session_but_not_the_server() {
    let addr = spawn_server(LoopbackProbe);

    let mut tcp = TcpStream::connect(addr).unwrap();
    let num_bits = ((2048 + 1) * 8) as u32;
    tcp.write_all(b"shift:").unwrap();
    tcp.write_all(&num_bits.to_le_bytes()).unwrap();
    // The server drops the session without replying.
    let mut sink = Vec::new();
    assert_eq!(tcp.read_to_end(&mut sink).unwrap(), 0);

    // The daemon keeps accepting.
    let mut client = XvcClient::connect(addr).unwrap();
    assert_eq!(client.get_info().unwrap().max_vector_len(), 2048);
}

/// Drives a real chain-level transaction through the raw XVC path: reset
/// the simulated TAP, walk to Shift-DR and clock the IDCODE out.
#[test]
fn idcode_scan_over_the_wire() {
    let addr = spawn_server(SimProbe::new(&[(0x0362F093, 6)]));
    let mut client = XvcClient::connect(addr).unwrap();

    const NUM_BITS: usize = 41;
    let mut tms = vec![0u8; bits::bytes_for(NUM_BITS)];
    // Five ones park the TAP in Test-Logic-Reset...
    for k in 0..5 {
        bits::set(&mut tms, k);
    }
    // ...then 0-1-0-0 walks it into Shift-DR via Capture-DR.
    bits::set(&mut tms, 6);
    let tdi = vec![0u8; bits::bytes_for(NUM_BITS)];

    let tdo = client.shift(NUM_BITS as u32, &tms, &tdi).unwrap();

    let mut idcode = 0u32;
    for k in 0..32 {
        if bits::get(&tdo, 9 + k) {
            idcode |= 1 << k;
        }
    }
    assert_eq!(idcode, 0x0362F093);
}
