use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use timeline_rs_layout::config::LayoutConfig;
use timeline_rs_layout::layout::compute_layout;
use timeline_rs_layout::parser::parse_timeline;

fn dense_timeline_source(items: usize) -> String {
    let mut out = String::from("timeline\n");
    for i in 0..items {
        let kind = match i % 7 {
            3 => "note",
            5 => "period",
            _ => "event",
        };
        let day = 1 + (i * 3) % 28;
        let month = 1 + (i / 28) % 12;
        if kind == "period" {
            out.push_str(&format!(
                "period [i{i}] Phase {i} : 2025-{month:02}-{day:02} -> 2025-{month:02}-{:02}\n",
                (day + 5).min(28)
            ));
        } else {
            out.push_str(&format!(
                "{kind} [i{i}] Item number {i} : 2025-{month:02}-{day:02} {:02}:00\n",
                i % 24
            ));
        }
    }
    out
}

fn fixture(name: &str) -> &'static str {
    match name {
        "launch_day" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/launch_day.tl"
        )),
        "roadmap" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/roadmap.json5"
        )),
        "crowded_week" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/crowded_week.tl"
        )),
        "carousel_year" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/carousel_year.tl"
        )),
        "sparse_history" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/sparse_history.tl"
        )),
        _ => panic!("unknown fixture"),
    }
}

const FIXTURES: [&str; 5] = [
    "launch_day",
    "roadmap",
    "crowded_week",
    "carousel_year",
    "sparse_history",
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for name in FIXTURES {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let items = parse_timeline(black_box(data)).expect("parse failed");
                black_box(items.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for name in FIXTURES {
        let items = parse_timeline(fixture(name)).expect("parse failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &items, |b, items| {
            b.iter(|| {
                let layout = compute_layout(black_box(items), &config);
                black_box(layout.entries.len());
            });
        });
    }
    group.finish();
}

fn bench_dense_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_dense_modes");
    let single = LayoutConfig::default();
    let carousel = LayoutConfig {
        total_slices: 4,
        avoid_split_across_slides: true,
        compress_gaps: true,
        ..LayoutConfig::default()
    };
    for count in [50usize, 200, 800] {
        let items = parse_timeline(&dense_timeline_source(count)).expect("parse failed");
        let name = format!("dense_{count}");
        group.bench_with_input(BenchmarkId::new("single", &name), &items, |b, items| {
            b.iter(|| {
                let layout = compute_layout(black_box(items), &single);
                black_box(layout.entries.len());
            });
        });
        group.bench_with_input(BenchmarkId::new("carousel", &name), &items, |b, items| {
            b.iter(|| {
                let layout = compute_layout(black_box(items), &carousel);
                black_box(layout.entries.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_layout, bench_dense_modes
);
criterion_main!(benches);
