/// Benchmarks for trend computation.
use case_trends::dataset::Dataset;
use case_trends::models::{Aggregate, TrendQuery};
use case_trends::processor;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;

const COUNTRIES: [&str; 8] = [
    "USA", "Canada", "India", "Brazil", "France", "Japan", "Kenya", "Peru",
];

/// Generate a CSV dataset with one row per country per day.
fn generate_csv(days: usize) -> String {
    let mut csv = String::from("date,country,confirmed,deaths,recovered\n");
    let start = time::macros::date!(2020 - 01 - 22);
    for day in 0..days {
        let date = start + time::Duration::days(day as i64);
        for (i, country) in COUNTRIES.iter().enumerate() {
            let confirmed = (day * 31 + i * 7) % 10_000;
            writeln!(
                csv,
                "{},{},{},{},{}.5",
                date,
                country,
                confirmed,
                confirmed / 50,
                confirmed / 2
            )
            .unwrap();
        }
    }
    csv
}

fn criterion_benchmark(c: &mut Criterion) {
    for days in [100, 1000] {
        let csv = generate_csv(days);
        c.bench_function(&format!("load({})", days), |b| {
            b.iter(|| Dataset::from_reader(black_box(csv.as_bytes())).unwrap())
        });

        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let aggregates = [
            Aggregate::Count,
            Aggregate::Max,
            Aggregate::Mean,
            Aggregate::Min,
            Aggregate::Sum,
        ];
        for country in ["Global", "USA"] {
            for metric in ["confirmed", "recovered"] {
                for aggregate in aggregates {
                    let query = TrendQuery {
                        aggregate,
                        ..TrendQuery::new(country, metric)
                    };
                    let name = format!("{}({}, {}, {})", aggregate, days, country, metric);
                    c.bench_function(&name, |b| {
                        b.iter(|| processor::trends(black_box(&dataset), black_box(&query)))
                    });
                }
            }
        }
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
