use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lanms_core::{locality_merge, quad_iou, standard_nms, LanmsParams, MergeReference, Quad};

/// Sliding-window style output: `per_object` heavily overlapping quads for
/// each of `objects` text lines laid out on a row, in raster order.
fn dense_candidates(objects: usize, per_object: usize) -> Vec<Quad> {
    let mut out = Vec::with_capacity(objects * per_object);
    for o in 0..objects {
        let x0 = 4_000_000.0 * o as f64;
        for k in 0..per_object {
            let dx = 10_000.0 * k as f64;
            out.push(Quad::from_coords(
                [
                    x0 + dx,
                    0.0,
                    x0 + dx + 3_000_000.0,
                    20_000.0,
                    x0 + dx + 3_000_000.0,
                    820_000.0,
                    x0 + dx,
                    800_000.0,
                ],
                0.5 + 0.01 * (k % 50) as f32,
            ));
        }
    }
    out
}

fn bench_iou(c: &mut Criterion) {
    let quads = dense_candidates(1, 2);
    c.bench_function("quad_iou", |b| {
        b.iter(|| quad_iou(black_box(&quads[0]), black_box(&quads[1])))
    });
}

fn bench_merge(c: &mut Criterion) {
    let params = LanmsParams::default();
    let candidates = dense_candidates(40, 50);
    c.bench_function("locality_merge_2000", |b| {
        b.iter(|| {
            locality_merge(
                black_box(&candidates),
                params.merge_threshold,
                MergeReference::MergedView,
            )
        })
    });

    let merged = locality_merge(&candidates, params.merge_threshold, MergeReference::MergedView);
    c.bench_function("standard_nms_merged", |b| {
        b.iter(|| standard_nms(black_box(&merged), params.nms_threshold))
    });
}

criterion_group!(benches, bench_iou, bench_merge);
criterion_main!(benches);
