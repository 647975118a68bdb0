use std::{path::Path, time::Duration};

use indicatif::ProgressBar;
use rand::prelude::*;
use route_core::prelude::*;

// Runs all four strategies on the same random station pairs of both
// topologies and prints average expansions, peak frontier and query time.
fn main() {
    env_logger::init();
    const ITERATIONS: usize = 1_000;

    let dir = std::env::args()
        .skip(1)
        .find(|a| !a.starts_with('-'))
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/test_data").to_string());
    let network =
        Network::from_dir(Path::new(&dir), &BuildParams::default()).expect("Invalid data dir");

    let mut rng = StdRng::seed_from_u64(42);

    for name in TopologyName::ALL {
        let topology = network.topology(name);
        let cost = CostModel::calibrated(topology, CostParams::default());
        let profiler = Profiler::new(SearchEngine::new(topology, &cost));

        let names: Vec<&str> = topology.stations().map(|s| s.name.as_str()).collect();

        let mut expanded = [0usize; 4];
        let mut frontier = [0usize; 4];
        let mut timings = [Duration::ZERO; 4];
        let mut worse_than_astar = [0usize; 4];

        println!("Started {} queries on '{}'", ITERATIONS, name);
        let pb = ProgressBar::new(ITERATIONS as u64);
        for _ in 0..ITERATIONS {
            let s = names.choose(&mut rng).unwrap();
            let t = names.choose(&mut rng).unwrap();

            let comparison = profiler.compare(s, t);
            let best = comparison
                .run(Strategy::AStar)
                .and_then(|r| r.metrics.path_total_cost);

            for (i, run) in comparison.runs.iter().enumerate() {
                expanded[i] += run.metrics.stations_expanded;
                frontier[i] = frontier[i].max(run.metrics.peak_frontier);
                timings[i] += run.metrics.elapsed;
                if let (Some(best), Some(path_cost)) = (best, run.metrics.path_total_cost) {
                    if path_cost > best + 1e-9 {
                        worse_than_astar[i] += 1;
                    }
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        println!(
            "{:<5} {:>12} {:>10} {:>12} {:>10}",
            "", "Avg expanded", "Max front", "Avg time", "Worse"
        );
        for (i, strategy) in Strategy::ALL.iter().enumerate() {
            println!(
                "{:<5} {:>12.1} {:>10} {:>12} {:>10}",
                strategy,
                expanded[i] as f64 / ITERATIONS as f64,
                frontier[i],
                format!("{:.2?}", timings[i] / ITERATIONS as u32),
                worse_than_astar[i]
            );
        }
        println!();
    }
}
