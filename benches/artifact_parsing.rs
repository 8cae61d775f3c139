/// Summary pipeline benchmarks
///
/// Measures duration extraction from captured run output and statistics over
/// a realistic results folder.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iterbench::aggregate::compute_statistics;
use iterbench::artifact::ArtifactId;
use iterbench::parser::{parse_output, scan_directory, ResultSet};

/// Run output with `noise` progress lines before the duration line
fn run_output(noise: usize) -> String {
    let mut out = String::new();
    for i in 0..noise {
        out.push_str(&format!("visiting data/corpus/file_{i:06}.bin\n"));
    }
    out.push_str("hashing data/corpus took 12.345s\n");
    out
}

fn bench_parse_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_output");

    for noise in [0, 100, 10_000] {
        let text = run_output(noise);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(noise), &text, |b, text| {
            b.iter(|| parse_output(black_box(text)));
        });
    }

    group.finish();
}

fn bench_artifact_names(c: &mut Criterion) {
    let names: Vec<String> = (1..=1000)
        .map(|i| format!("D__datasets_photos_c64_{i}"))
        .collect();

    c.bench_function("artifact_id_parse_1000", |b| {
        b.iter(|| {
            names
                .iter()
                .filter_map(|n| ArtifactId::parse(black_box(n)))
                .count()
        });
    });
}

fn bench_compute_statistics(c: &mut Criterion) {
    let mut results = ResultSet::new();
    for corpus in ["photos", "sources", "videos"] {
        for strategy in ["a", "a64", "r", "r64", "f", "f64", "c", "c64"] {
            for run in 1..=50 {
                if let Some(id) = ArtifactId::parse(&format!("{corpus}_{strategy}_{run}")) {
                    results.insert(id, f64::from(run) * 0.01);
                }
            }
        }
    }

    c.bench_function("compute_statistics_1200_runs", |b| {
        b.iter(|| compute_statistics(black_box(&results)));
    });
}

fn bench_scan_directory(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let output = run_output(200);
    for strategy in ["a", "a64", "c", "c64"] {
        for run in 1..=25 {
            std::fs::write(dir.path().join(format!("corpus_{strategy}_{run}")), &output).unwrap();
        }
    }

    c.bench_function("scan_directory_100_artifacts", |b| {
        b.iter(|| scan_directory(black_box(dir.path())).unwrap());
    });
}

criterion_group!(
    benches,
    bench_parse_output,
    bench_artifact_names,
    bench_compute_statistics,
    bench_scan_directory
);
criterion_main!(benches);
