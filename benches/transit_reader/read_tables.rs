use criterion::{black_box, criterion_group, criterion_main, Criterion};
use route_core::network::{BuildParams, Network};
use transit_reader::ReferenceTables;

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = read_tables, build_network
}
criterion_main!(benches);

fn read_tables(c: &mut Criterion) {
    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../crates/route_core/test_data");

    c.bench_function("read_tables", |b| {
        b.iter(|| {
            let _ = ReferenceTables::from_dir(black_box(&path));
        })
    });
}

fn build_network(c: &mut Criterion) {
    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../crates/route_core/test_data");
    let tables = ReferenceTables::from_dir(&path).unwrap();

    c.bench_function("build_network", |b| {
        b.iter(|| {
            let _ = Network::build(black_box(&tables), &BuildParams::default());
        })
    });
}
