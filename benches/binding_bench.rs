#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tilegpu::gpu::recording::RecordingDevice;
use tilegpu::{Context, IndexBuffer, TriangleIndexArray};

fn elided_bind_benchmark(c: &mut Criterion) {
    let mut ctx = Context::new(RecordingDevice::new());
    let mut array = TriangleIndexArray::from_elements(&[[0, 1, 2]; 64]);
    let mut buffer = IndexBuffer::new(&mut ctx, &mut array, false).unwrap();

    c.bench_function("bind_same_buffer", |b| {
        b.iter(|| buffer.bind(black_box(&mut ctx)).unwrap());
    });
    buffer.destroy(&mut ctx);
}

fn alternating_bind_benchmark(c: &mut Criterion) {
    let mut ctx = Context::new(RecordingDevice::new());
    let mut a_src = TriangleIndexArray::from_elements(&[[0, 1, 2]; 64]);
    let mut b_src = TriangleIndexArray::from_elements(&[[3, 4, 5]; 64]);
    let mut a = IndexBuffer::new(&mut ctx, &mut a_src, false).unwrap();
    let mut b = IndexBuffer::new(&mut ctx, &mut b_src, false).unwrap();

    c.bench_function("bind_alternating_buffers", |bench| {
        bench.iter(|| {
            a.bind(&mut ctx).unwrap();
            b.bind(&mut ctx).unwrap();
            ctx.device_mut().clear_calls();
        });
    });
    a.destroy(&mut ctx);
    b.destroy(&mut ctx);
}

fn dynamic_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_update");

    for count in [16usize, 256, 4096] {
        let mut ctx = Context::new(RecordingDevice::new());
        let elements: Vec<[u16; 3]> =
            (0..count).map(|i| [i as u16, i as u16 + 1, i as u16 + 2]).collect();
        let mut array = TriangleIndexArray::from_elements(&elements);
        let mut buffer = IndexBuffer::new(&mut ctx, &mut array, true).unwrap();

        group.bench_function(format!("{count}_triangles"), |b| {
            b.iter(|| {
                buffer.update_data(&mut ctx, black_box(&array)).unwrap();
                ctx.device_mut().clear_calls();
            });
        });
        buffer.destroy(&mut ctx);
    }
    group.finish();
}

criterion_group!(
    benches,
    elided_bind_benchmark,
    alternating_bind_benchmark,
    dynamic_update_benchmark
);
criterion_main!(benches);
