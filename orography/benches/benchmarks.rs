use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orography::{
    crs::{CrsRegistry, LAMBERT72},
    geodesic::ring_samples,
    overlay::site_overlays,
    GeoPoint,
};

const BRUSSELS: GeoPoint = GeoPoint::new(50.8503, 4.3517);

fn geodesic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Geodesic");
    group.bench_function("ring samples", |b| {
        b.iter(|| ring_samples(black_box(BRUSSELS)))
    });
    group.bench_function("site overlays", |b| {
        b.iter(|| site_overlays(black_box(BRUSSELS)))
    });
}

fn projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Projection");
    let registry = CrsRegistry::builtin().unwrap();
    group.bench_with_input("lambert72 round trip", &registry, |b, registry| {
        b.iter(|| {
            let projected = registry.project(black_box(BRUSSELS), LAMBERT72).unwrap();
            registry.unproject(&projected).unwrap()
        })
    });
}

criterion_group!(benches, geodesic, projection);
criterion_main!(benches);
