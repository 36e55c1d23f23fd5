//! Filter pipeline benchmarks
//!
//! Run with: cargo bench --bench pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vhs_camera::{config::Config, filters::Preset, FilterMode, FilterPipeline, Frame};

fn pipeline() -> FilterPipeline {
    let mut config = Config::default();
    config.noise.seed = Some(7);
    FilterPipeline::new(&config).expect("default config is valid")
}

fn hd_frame() -> Frame {
    let mut frame = Frame::new_filled(1280, 720, [0, 0, 0]);
    for y in 0..720 {
        for x in 0..1280 {
            frame.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8, 255]);
        }
    }
    frame
}

/// Full five-stage chain on a 720p frame
fn bench_vhs_chain(c: &mut Criterion) {
    let pipeline = pipeline();
    let frame = hd_frame();

    let mut group = c.benchmark_group("vhs_chain");
    group.throughput(Throughput::Elements(1));
    group.bench_function("1280x720", |b| {
        b.iter(|| black_box(pipeline.process(black_box(&frame), FilterMode::VhsChain)))
    });
    group.finish();
}

/// Each single-stage preset on a 720p frame
fn bench_presets(c: &mut Criterion) {
    let pipeline = pipeline();
    let frame = hd_frame();

    let mut group = c.benchmark_group("presets");
    group.throughput(Throughput::Elements(1));
    for preset in Preset::ALL {
        group.bench_function(preset.name(), |b| {
            b.iter(|| black_box(pipeline.process(black_box(&frame), FilterMode::Preset(preset))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_vhs_chain, bench_presets);
criterion_main!(benches);
