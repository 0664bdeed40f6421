use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use stresslines::{
    loaders::binlines_reader::{decode_binlines, encode_binlines},
    normalization::normalize_set,
    LoadParams, Trajectory, TrajectorySet, Vec3,
};

/// Helix-shaped lines with two attribute channels.
fn synthetic_set(num_lines: usize, points_per_line: usize) -> TrajectorySet {
    (0..num_lines)
        .map(|l| {
            let positions: Vec<Vec3> = (0..points_per_line)
                .map(|i| {
                    let t = i as f32 * 0.05 + l as f32;
                    Vec3::new(t.cos() * (1.0 + l as f32), t.sin(), i as f32 * 0.01)
                })
                .collect();
            let speed = (0..points_per_line).map(|i| (i * l) as f32).collect();
            let vorticity = (0..points_per_line).map(|i| (i as f32).sqrt()).collect();
            Trajectory::new(positions, vec![speed, vorticity])
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let set = synthetic_set(512, 1024);
    let points = (512 * 1024) as u64;

    let mut group = c.benchmark_group("normalize_set");
    group.throughput(Throughput::Elements(points));

    for num_threads in [None, Some(1), Some(2), Some(4), Some(8)].iter() {
        let mut builder = LoadParams::builder();
        if let Some(n) = num_threads {
            builder = builder.num_threads(*n);
        }
        let params = builder.build().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", num_threads)),
            &params,
            |b, params| {
                b.iter_batched(
                    || set.clone(),
                    |set| normalize_set(set, params).unwrap(),
                    BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_decode_binlines(c: &mut Criterion) {
    let buffer = encode_binlines(&synthetic_set(512, 1024)).unwrap();

    let mut group = c.benchmark_group("decode_binlines");
    group.throughput(Throughput::Bytes(buffer.len() as u64));
    group.bench_function("512x1024", |b| b.iter(|| decode_binlines(&buffer).unwrap()));
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_decode_binlines);
criterion_main!(benches);
