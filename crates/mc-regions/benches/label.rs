use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mc_core::Image;
use mc_regions::{label_components, region_props, Connectivity};

fn synthetic_blob_mask(width: usize, height: usize) -> Image<u8> {
    let mut mask = Image::new_fill(width, height, 0u8);

    for by in (8..height.saturating_sub(24)).step_by(28) {
        for bx in (8..width.saturating_sub(24)).step_by(28) {
            for dy in 0..16 {
                for dx in 0..16 {
                    if let Some(px) = mask.get_mut(bx + dx, by + dy) {
                        *px = 255;
                    }
                }
            }
        }
    }

    mask
}

fn bench_label_and_props(c: &mut Criterion) {
    let mask = synthetic_blob_mask(1280, 1024);

    c.bench_function("mc_regions_label_1280x1024", |b| {
        b.iter(|| {
            let (labels, count) = label_components(black_box(&mask), Connectivity::C8);
            black_box((labels, count));
        });
    });

    let (labels, count) = label_components(&mask, Connectivity::C8);
    c.bench_function("mc_regions_props_1280x1024", |b| {
        b.iter(|| {
            let props = region_props(black_box(&labels), black_box(count));
            black_box(props.len());
        });
    });
}

criterion_group!(benches, bench_label_and_props);
criterion_main!(benches);
