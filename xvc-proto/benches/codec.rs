use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::io::Cursor;
use xvc_proto::{Message, XVC_BUFSIZE};

fn encode_shift(c: &mut Criterion) {
    let tms: Box<[u8]> = vec![0xAA; XVC_BUFSIZE].into();
    let tdi: Box<[u8]> = vec![0x55; XVC_BUFSIZE].into();
    let msg = Message::Shift {
        num_bits: (XVC_BUFSIZE * 8) as u32,
        tms,
        tdi,
    };
    c.bench_function("encode full-buffer shift", |b| {
        b.iter(|| {
            let mut wire = Vec::with_capacity(2 * XVC_BUFSIZE + 16);
            black_box(&msg).write_to(&mut wire).unwrap();
            black_box(wire)
        })
    });
}

fn decode_shift(c: &mut Criterion) {
    let msg = Message::Shift {
        num_bits: (XVC_BUFSIZE * 8) as u32,
        tms: vec![0xAA; XVC_BUFSIZE].into(),
        tdi: vec![0x55; XVC_BUFSIZE].into(),
    };
    let mut wire = Vec::new();
    msg.write_to(&mut wire).unwrap();
    c.bench_function("decode full-buffer shift", |b| {
        b.iter(|| {
            let decoded =
                Message::from_reader(&mut Cursor::new(black_box(&wire)), XVC_BUFSIZE).unwrap();
            black_box(decoded)
        })
    });
}

fn decode_small_commands(c: &mut Criterion) {
    let mut settck = Vec::new();
    Message::SetTck { period_ns: 16_000 }.write_to(&mut settck).unwrap();
    c.bench_function("decode settck", |b| {
        b.iter(|| {
            Message::from_reader(&mut Cursor::new(black_box(&settck)), XVC_BUFSIZE).unwrap()
        })
    });
}

criterion_group!(benches, encode_shift, decode_shift, decode_small_commands);
criterion_main!(benches);
