//! Criterion benchmarks for the load/save passes.
//!
//! Measures a full save and load of a derived struct against the in-memory
//! store, with array properties of increasing length, plus XML document
//! parsing for a section of the same size.
//!
//! Run with:
//! ```bash
//! cargo bench --package appsettings-core --bench engine_bench
//! ```

use appsettings_core::infrastructure::xml::XmlDocument;
use appsettings_core::{load_settings, save_settings, LoadOptions, MemoryStore, Settings};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[derive(Debug, Default, Settings)]
struct Workload {
    #[setting(rename = "Name")]
    name: String,
    #[setting(rename = "Port")]
    port: u16,
    #[setting(rename = "Enabled")]
    enabled: bool,
    #[setting(rename = "Hosts")]
    hosts: Vec<String>,
    #[setting(rename = "Weights")]
    weights: Vec<f64>,
}

// ── Fixture builders ──────────────────────────────────────────────────────────

fn build_workload(len: usize) -> Workload {
    Workload {
        name: "bench".to_string(),
        port: 24800,
        enabled: true,
        hosts: (0..len).map(|i| format!("host-{i}")).collect(),
        weights: (0..len).map(|i| i as f64 * 0.5).collect(),
    }
}

fn build_xml(len: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<configuration>\n  <appSettings>\n");
    for i in 0..len {
        xml.push_str(&format!("    <add key=\"Hosts[{i}]\" value=\"host-{i}\"/>\n"));
    }
    xml.push_str("  </appSettings>\n</configuration>\n");
    xml
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_settings");
    for len in [1usize, 16, 128] {
        let workload = build_workload(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &workload, |b, w| {
            b.iter(|| {
                let mut store = MemoryStore::new();
                save_settings(black_box(w), &mut store).expect("memory store never fails");
                store
            })
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_settings");
    for len in [1usize, 16, 128] {
        let mut store = MemoryStore::new();
        save_settings(&build_workload(len), &mut store).expect("memory store never fails");
        group.bench_with_input(BenchmarkId::from_parameter(len), &store, |b, s| {
            b.iter(|| {
                let mut target = Workload::default();
                load_settings(&mut target, black_box(s), &LoadOptions::default())
                    .expect("every key is present");
                target
            })
        });
    }
    group.finish();
}

fn bench_xml_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("xml_parse");
    for len in [16usize, 256] {
        let xml = build_xml(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &xml, |b, x| {
            b.iter(|| XmlDocument::parse(black_box(x)).expect("fixture is well-formed"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_save, bench_load, bench_xml_parse);
criterion_main!(benches);
