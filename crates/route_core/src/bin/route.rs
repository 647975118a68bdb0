use indicatif::ProgressBar;
use rand::prelude::*;
use route_core::{
    prelude::*,
    profiler::compare_topologies,
    statistics::{average_out_degree, degree_out_hist},
    util::cli::{self, Command},
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cfg = cli::parse();
    let network = Network::from_dir(&cfg.data_dir, &cfg.build)?;
    let topology = network.topology(cfg.topology);
    let cost = cfg.cost_model(topology);
    let engine = SearchEngine::new(topology, &cost);

    match &cfg.command {
        Command::Query { strategy, from, to } => {
            let (result, metrics) = Profiler::new(engine).run(*strategy, from, to);
            match result {
                Ok(path) => println!("{}", path.describe(topology)),
                Err(err) => println!("{}", err),
            }
            println!(
                "{}: {} stations expanded, peak frontier {}, took {:?}",
                metrics.strategy, metrics.stations_expanded, metrics.peak_frontier, metrics.elapsed
            );
        }
        Command::Compare { from, to, both } => {
            if *both {
                for comparison in compare_topologies(&network, &cfg.cost, &NoCrowding, from, to) {
                    println!("{}", comparison);
                }
            } else {
                println!("{}", Profiler::new(engine).compare(from, to));
            }
        }
        Command::Check => {
            for name in TopologyName::ALL {
                let topology = network.topology(name);
                topology.print_info();
                println!("{}", topology.integrity());
                println!("{}", cfg.cost_model(topology).admissibility(topology));
                println!("Average out degree: {:.2}", average_out_degree(topology));
                for bucket in degree_out_hist(topology)
                    .into_iter()
                    .filter(|b| b.count() > 0)
                {
                    println!("[{}-{}]: {}", bucket.low(), bucket.high(), bucket.count());
                }
            }
        }
        Command::Sample { n, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            let names: Vec<&str> = topology.stations().map(|s| s.name.as_str()).collect();
            anyhow::ensure!(names.len() >= 2, "Need at least two stations to sample routes");
            anyhow::ensure!(*n > 0, "Sample size must be positive");

            let profiler = Profiler::new(engine);
            let mut expanded = [0usize; 4];
            let mut elapsed = [std::time::Duration::ZERO; 4];
            let mut found = [0usize; 4];

            let pb = ProgressBar::new(*n as u64);
            for _ in 0..*n {
                let pair: Vec<&&str> = names.choose_multiple(&mut rng, 2).collect();
                for (i, strategy) in Strategy::ALL.iter().enumerate() {
                    let (result, metrics) = profiler.run(*strategy, pair[0], pair[1]);
                    expanded[i] += metrics.stations_expanded;
                    elapsed[i] += metrics.elapsed;
                    found[i] += result.is_ok() as usize;
                }
                pb.inc(1);
            }
            pb.finish_and_clear();

            println!("{} random routes on '{}'", n, topology.name());
            for (i, strategy) in Strategy::ALL.iter().enumerate() {
                println!(
                    "{:<5} found {:>5}, avg expanded {:>8.1}, avg time {:?}",
                    strategy,
                    found[i],
                    expanded[i] as f64 / *n as f64,
                    elapsed[i] / *n as u32
                );
            }
        }
    }
    Ok(())
}
