//! Benchmark of the CPU-side image pipeline: pyramid construction and
//! tensor conversion.

use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, RgbImage};

use burn::backend::NdArray;
use deep_dream::{build_pyramid, to_image, to_tensor};

fn synthetic_image(size: u32) -> DynamicImage {
    let img = RgbImage::from_fn(size, size, |x, y| {
        image::Rgb([
            ((x * 7 + y * 13) % 256) as u8,
            ((x * 3 + y * 5) % 256) as u8,
            ((x + y * 2) % 256) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

fn benchmark_pyramid(c: &mut Criterion) {
    let mut group = c.benchmark_group("pyramid");
    group.sample_size(10);

    let image = synthetic_image(512);
    group.bench_function("build_pyramid_512_5_levels", |b| {
        b.iter(|| {
            let _pyramid = build_pyramid(&image, 5, 0.7, 60.0);
        })
    });

    group.finish();
}

fn benchmark_tensor_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("tensor_round_trip");
    group.sample_size(10);

    let device = Default::default();
    let image = synthetic_image(512);
    group.bench_function("to_tensor_to_image_512", |b| {
        b.iter(|| {
            let tensor = to_tensor::<NdArray>(&image, 512, &device).unwrap();
            let _image = to_image(tensor).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_pyramid, benchmark_tensor_round_trip);
criterion_main!(benches);
