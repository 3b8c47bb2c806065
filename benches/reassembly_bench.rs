//! Performance benchmarks for frame reassembly and the alarm codec.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench reassembly_bench
//! ```

use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use homealarm_core::{Delimiters, Device, SwitchValue};
use homealarm_protocol::{AlarmCodec, Command, FrameReassembler};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

/// Build a stream of `count` mixed sensor messages.
fn sensor_stream(count: usize) -> Vec<u8> {
    let delimiters = Delimiters::default();
    (0..count)
        .map(|i| match i % 3 {
            0 => Command::decode("0 12 ").unwrap_or_default(),
            1 => Command::switch(Device::Door1, SwitchValue::On),
            _ => Command::for_device(Device::Temperature1, "21.5"),
        })
        .flat_map(|cmd| cmd.encode(&delimiters).into_bytes())
        .collect()
}

/// Benchmark feeding a whole burst in one read.
fn bench_reassemble_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassemble_burst");

    for count in [1usize, 10, 100] {
        let stream = sensor_stream(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &stream, |b, stream| {
            b.iter(|| {
                let mut reassembler = FrameReassembler::new(Delimiters::default());
                reassembler.feed(black_box(stream));
                black_box(reassembler.drain_frames().count());
            });
        });
    }

    group.finish();
}

/// Benchmark worst-case fragmentation: one byte per read.
fn bench_reassemble_byte_by_byte(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassemble_byte_by_byte");
    let stream = sensor_stream(10);
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("ten_messages", |b| {
        b.iter(|| {
            let mut reassembler = FrameReassembler::new(Delimiters::default());
            for byte in &stream {
                reassembler.feed(std::slice::from_ref(black_box(byte)));
            }
            black_box(reassembler.drain_frames().count());
        });
    });

    group.finish();
}

/// Benchmark the codec in both directions.
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Elements(1));

    let cmd = Command::switch(Device::LedGreen, SwitchValue::On);
    group.bench_function("encode_switch", |b| {
        b.iter(|| {
            let mut codec = AlarmCodec::new();
            let mut buffer = BytesMut::new();
            codec.encode(black_box(cmd.clone()), &mut buffer).unwrap();
            black_box(buffer);
        });
    });

    group.bench_function("decode_and_parse", |b| {
        b.iter(|| {
            let mut codec = AlarmCodec::new();
            let mut buffer = BytesMut::from(&b">2 22 21.5<"[..]);
            let frame = codec.decode(black_box(&mut buffer)).unwrap().unwrap();
            black_box(Command::try_from(frame).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_reassemble_burst,
    bench_reassemble_byte_by_byte,
    bench_codec
);
criterion_main!(benches);
