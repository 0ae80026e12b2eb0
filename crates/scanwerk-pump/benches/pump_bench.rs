// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Criterion benchmarks for the scanwerk-pump crate.  Measures end-to-end
// throughput of one scan sequence from an in-memory source into a memory
// sink, in both inline and two-thread mode.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use scanwerk_core::{Context, PixelType};
use scanwerk_pump::Pump;
use scanwerk_stream::{MemorySource, ScanDevice, VecSink};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// One A4-ish grayscale page at 300 dpi, roughly 8.7 MB of raster data.
const WIDTH: u32 = 2480;
const HEIGHT: u32 = 3508;

fn page() -> Vec<u8> {
    (0..WIDTH as usize * HEIGHT as usize)
        .map(|i| (i % 251) as u8)
        .collect()
}

fn run_sequence(image: &[u8], async_mode: bool) -> usize {
    let ctx = Context::new(WIDTH, HEIGHT, PixelType::Gray8);
    let source = MemorySource::new(image.to_vec(), 1, ctx);
    let mut pump = Pump::new(Box::new(ScanDevice::new(Box::new(source))));
    pump.options()
        .option("acquire-async")
        .expect("option")
        .set(async_mode)
        .expect("set");

    let sink = VecSink::new();
    pump.start(Box::new(sink.clone())).expect("start");
    pump.wait();
    sink.data().len()
}

/// Pump a full single-page sequence through the inline loop and through
/// the bucket brigade.  The brigade's copy into buckets and the thread
/// handoff are the costs under test.
fn bench_pump_throughput(c: &mut Criterion) {
    let image = page();

    let mut group = c.benchmark_group("pump_sequence");
    group.throughput(Throughput::Bytes(image.len() as u64));
    group.sample_size(10);
    group.bench_function("sync", |b| {
        b.iter(|| assert_eq!(run_sequence(&image, false), image.len()));
    });
    group.bench_function("async", |b| {
        b.iter(|| assert_eq!(run_sequence(&image, true), image.len()));
    });
    group.finish();
}

criterion_group!(benches, bench_pump_throughput);
criterion_main!(benches);
