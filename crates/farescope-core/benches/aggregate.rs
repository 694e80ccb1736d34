use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use farescope_core::charts::demand_heatmap;
use farescope_core::{build_all, summarize, template_bundle, MockGenerator, RouteQuery};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn table(rows: usize) -> Vec<farescope_core::FlightRecord> {
    let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
    let query = RouteQuery::new("SYD", "MEL", from, to).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    MockGenerator::default().generate_with_rng(&query, Some(rows), &mut rng)
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for rows in [100, 1_000, 10_000] {
        let records = table(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &records, |b, records| {
            b.iter(|| summarize(records));
        });
    }
    group.finish();
}

fn bench_charts(c: &mut Criterion) {
    let records = table(5_000);
    c.bench_function("build all charts (5k rows)", |b| {
        b.iter(|| build_all(&records));
    });
    c.bench_function("demand heatmap (5k rows)", |b| {
        b.iter(|| demand_heatmap(&records));
    });
}

fn bench_generate(c: &mut Criterion) {
    let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    let query = RouteQuery::new("SYD", "PER", from, to).unwrap();
    let generator = MockGenerator::default();
    c.bench_function("generate one year", |b| {
        let mut rng = StdRng::seed_from_u64(9);
        b.iter(|| generator.generate_with_rng(&query, None, &mut rng));
    });
}

fn bench_template(c: &mut Criterion) {
    let summary = summarize(&table(2_000));
    c.bench_function("template insights", |b| {
        b.iter(|| template_bundle(&summary));
    });
}

criterion_group!(benches, bench_summarize, bench_charts, bench_generate, bench_template);
criterion_main!(benches);
