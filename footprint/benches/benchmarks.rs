use criterion::{criterion_group, criterion_main, Criterion};
use footprint::{
    geo::{coord, Coord, Line},
    Centerline, Pipeline, ProfileAnalyzer, SurfaceFn, TerrainSampler, Thresholds,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn thresholds() -> Thresholds {
    Thresholds::builder()
        .slope_deg(5.0)
        .curvature(2.0)
        .min_elev_drop(0.5)
        .min_horiz_dist(2.0)
        .max_horiz_dist(15.0)
        .build()
        .unwrap()
}

/// A meandering levee: crest follows `y = 10 sin(x / 50)`.
fn levee(c: Coord<f64>) -> Option<f64> {
    let offset = (c.y - 10.0 * (c.x / 50.0).sin()).abs();
    Some((5.0 - 5.0 * offset / 8.0).max(0.0))
}

fn profile_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("Profile Analysis");

    let surface = SurfaceFn::new(levee);
    let profile = surface
        .drape(&Line::new(coord!(x: 0.0, y: -20.0), coord!(x: 0.0, y: 20.0)))
        .unwrap();
    let analyzer = ProfileAnalyzer::new(thresholds());

    group.bench_with_input("40m section", &(analyzer, profile), |b, (a, p)| {
        b.iter(|| a.analyze(p))
    });
}

fn footprint_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Footprint Pipeline");

    let centerline = Centerline::new(
        (0..=100)
            .map(|i| {
                let x = f64::from(i) * 10.0;
                (x, 10.0 * (x / 50.0).sin())
            })
            .collect(),
    )
    .unwrap();
    let pipeline = Pipeline::builder().thresholds(thresholds()).build().unwrap();
    let surface = SurfaceFn::new(levee);

    group.bench_with_input(
        "1km centerline",
        &(pipeline, centerline, surface),
        |b, (p, l, s)| b.iter(|| p.run(l, s).unwrap()),
    );
}

criterion_group!(benches, profile_analysis, footprint_pipeline);
criterion_main!(benches);
