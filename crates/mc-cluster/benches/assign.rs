use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mc_cluster::assign_targets_to_regions;
use mc_core::Point2f;

fn circle_boundary(cx: f32, cy: f32, radius: f32, points: usize) -> Vec<Point2f> {
    (0..points)
        .map(|i| {
            let angle = i as f32 / points as f32 * core::f32::consts::TAU;
            Point2f {
                x: cx + radius * angle.cos(),
                y: cy + radius * angle.sin(),
            }
        })
        .collect()
}

fn bench_assign(c: &mut Criterion) {
    let mut regions = BTreeMap::new();
    for i in 0..50u32 {
        let cx = (i % 10) as f32 * 100.0;
        let cy = (i / 10) as f32 * 100.0;
        regions.insert(i, circle_boundary(cx, cy, 20.0, 128));
    }

    let mut targets = BTreeMap::new();
    for i in 0..200u32 {
        targets.insert(
            i,
            Point2f {
                x: (i % 20) as f32 * 47.0,
                y: (i / 20) as f32 * 41.0,
            },
        );
    }

    c.bench_function("mc_cluster_assign_200x50x128", |b| {
        b.iter(|| {
            let clusters = assign_targets_to_regions(
                black_box(&targets),
                black_box(&regions),
                black_box(30.0),
            )
            .expect("valid input");
            black_box(clusters.len());
        });
    });
}

criterion_group!(benches, bench_assign);
criterion_main!(benches);
