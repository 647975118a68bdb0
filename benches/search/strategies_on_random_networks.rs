use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use route_core::{
    cost::{CostModel, CostParams},
    network::{BuildParams, Coord, NetworkTopology, TopologyName},
    search::{SearchEngine, Strategy},
    transfer::TransferTable,
    util::math::haversine_km,
};
use transit_reader::{ConnectionRecord, StationRecord};

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn gen_rand_network(number_stations: usize) -> NetworkTopology {
    let mut rng = StdRng::seed_from_u64(number_stations as u64);

    // 2.5 connections per station on average, each in both directions
    let number_connections: usize = (number_stations as f32 * 1.25) as usize;

    let stations: Vec<StationRecord> = (0..number_stations)
        .map(|i| {
            StationRecord::new(
                &format!("S{}", i),
                &["L"],
                rng.gen_range(1.25..1.45),
                rng.gen_range(103.6..104.0),
            )
        })
        .collect();

    let mut connections = Vec::with_capacity(number_connections * 2);
    for _ in 0..number_connections {
        let a = &stations[rng.gen_range(0..number_stations)];
        let b = &stations[rng.gen_range(0..number_stations)];
        let (Some(lat_a), Some(lon_a), Some(lat_b), Some(lon_b)) = (a.lat, a.lon, b.lat, b.lon)
        else {
            continue;
        };
        // 40 km/h plus one minute at the platform
        let km = haversine_km(&Coord::new(lat_a, lon_a), &Coord::new(lat_b, lon_b));
        let minutes = km / 40.0 * 60.0 + 1.0;
        connections.push(ConnectionRecord::ride(&a.name, &b.name, "L", minutes));
        connections.push(ConnectionRecord::ride(&b.name, &a.name, "L", minutes));
    }

    NetworkTopology::build(
        TopologyName::Today,
        &stations,
        &connections,
        Arc::new(TransferTable::default()),
        &BuildParams::default(),
    )
    .unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let networks: Vec<NetworkTopology> = [100, 1000, 10_000]
        .iter()
        .map(|i| gen_rand_network(*i))
        .collect();

    let mut group = c.benchmark_group("strategies");
    let mut rng = rand::thread_rng();
    for network in networks.iter() {
        let cost = CostModel::calibrated(network, CostParams::default());
        let engine = SearchEngine::new(network, &cost);

        for strategy in Strategy::ALL {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), network.station_count()),
                &engine,
                |b, engine| {
                    let src = format!("S{}", rng.gen_range(0..network.station_count()));
                    let dst = format!("S{}", rng.gen_range(0..network.station_count()));
                    let mut runner = engine.runner(strategy);
                    b.iter(|| {
                        let _ = runner.search(&src, &dst);
                    });
                },
            );
        }
    }
    group.finish();
}
