//! Interactive shell to query routes. Station names with spaces are entered
//! with underscores, e.g. `route astar Jurong_East City_Hall`.
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use reedline_repl_rs::clap::{value_parser, Arg, ArgMatches, Command};
use reedline_repl_rs::{Repl, Result};
use route_core::prelude::*;

struct Context {
    network: Network,
    active: TopologyName,
    // Active topology with a disruption applied
    disrupted: Option<NetworkTopology>,
    params: CostParams,
    crowding: CrowdingMap,
}

impl Context {
    fn new(network: Network) -> Self {
        Self {
            network,
            active: TopologyName::Today,
            disrupted: None,
            params: CostParams::default(),
            crowding: CrowdingMap::new(),
        }
    }

    fn topology(&self) -> &NetworkTopology {
        match &self.disrupted {
            Some(topology) => topology,
            None => self.network.topology(self.active).as_ref(),
        }
    }
}

fn station_arg(args: &ArgMatches, name: &str) -> String {
    args.get_one::<String>(name)
        .map(|s| s.replace('_', " "))
        .unwrap_or_default()
}

/// Print topology info
fn info(_args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let t = context.topology();
    Ok(Some(format!(
        "Topology '{}'{} has {} stations, {} connections and {} transfers",
        t.name(),
        if context.disrupted.is_some() {
            " (disrupted)"
        } else {
            ""
        },
        t.station_count(),
        t.connection_count(),
        t.transfers().len()
    )))
}

fn switch_topology(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let name = station_arg(&args, "name");
    match name.parse::<TopologyName>() {
        Ok(name) => {
            context.active = name;
            context.disrupted = None;
            Ok(Some(format!("Switched to '{}'", name)))
        }
        Err(err) => Ok(Some(err)),
    }
}

fn route(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let strategy = match station_arg(&args, "strategy").parse::<Strategy>() {
        Ok(strategy) => strategy,
        Err(err) => return Ok(Some(err)),
    };
    let src = station_arg(&args, "src");
    let dst = station_arg(&args, "dst");

    let t = context.topology();
    let cost = CostModel::calibrated(t, context.params);
    let engine = SearchEngine::new(t, &cost).with_crowding(&context.crowding);

    let (result, metrics) = Profiler::new(engine).run(strategy, &src, &dst);
    let mut out = match result {
        Ok(path) => path.describe(t),
        Err(err) => err.to_string(),
    };
    out.push_str(&format!(
        "\n{} stations expanded, took {:?}",
        metrics.stations_expanded, metrics.elapsed
    ));
    Ok(Some(out))
}

fn compare(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let src = station_arg(&args, "src");
    let dst = station_arg(&args, "dst");

    let t = context.topology();
    let cost = CostModel::calibrated(t, context.params);
    let engine = SearchEngine::new(t, &cost).with_crowding(&context.crowding);

    Ok(Some(Profiler::new(engine).compare(&src, &dst).to_string()))
}

fn heuristic(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    match station_arg(&args, "name").parse::<Heuristic>() {
        Ok(heuristic) => {
            context.params = context.params.heuristic(heuristic);
            Ok(Some(format!("Using the {} heuristic", heuristic)))
        }
        Err(err) => Ok(Some(err)),
    }
}

fn check(_args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let t = context.topology();
    let cost = CostModel::new(context.params);
    Ok(Some(format!(
        "{}\n{}",
        t.integrity(),
        cost.admissibility(t)
    )))
}

fn suspend(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let src = station_arg(&args, "src");
    let dst = station_arg(&args, "dst");

    match Disruption::new().suspend(&src, &dst).apply(context.topology()) {
        Ok(disrupted) => {
            context.disrupted = Some(disrupted);
            Ok(Some(format!("Suspended {} <-> {}", src, dst)))
        }
        Err(err) => Ok(Some(err.to_string())),
    }
}

fn restore(_args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    context.disrupted = None;
    Ok(Some(format!("Restored '{}'", context.active)))
}

fn crowd(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let station = station_arg(&args, "station");
    let level = match station_arg(&args, "level").parse::<RiskLevel>() {
        Ok(level) => level,
        Err(err) => return Ok(Some(err)),
    };
    if context.topology().station_index(&station).is_none() {
        return Ok(Some(format!("Unknown station: {}", station)));
    }

    context.crowding = std::mem::take(&mut context.crowding).with_station(&station, level);
    Ok(Some(format!("Crowding at {} set to {}", station, level)))
}

fn measure(args: ArgMatches, context: &mut Context) -> Result<Option<String>> {
    let n = *args.get_one::<usize>("n").unwrap_or(&10);

    let t = context.topology();
    let cost = CostModel::calibrated(t, context.params);
    let profiler = Profiler::new(SearchEngine::new(t, &cost).with_crowding(&context.crowding));
    let names: Vec<&str> = t.stations().map(|s| s.name.as_str()).collect();

    // Select n random station pairs
    let mut rng = rand::thread_rng();
    let mut res = String::new();
    for _ in 0..n {
        let (Some(src), Some(dst)) = (names.choose(&mut rng), names.choose(&mut rng)) else {
            break;
        };
        res.push_str(&format!("{} -> {}:", src, dst));
        for strategy in Strategy::ALL {
            let (_, metrics) = profiler.run(strategy, src, dst);
            res.push_str(&format!(
                " {} {}/{:?}",
                strategy, metrics.stations_expanded, metrics.elapsed
            ));
        }
        res.push('\n');
    }

    Ok(Some(res))
}

fn station_pair(command: Command) -> Command {
    command
        .arg(
            Arg::new("src")
                .required(true)
                .help("Name of the source station"),
        )
        .arg(
            Arg::new("dst")
                .required(true)
                .help("Name of the destination station"),
        )
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let network = Network::from_dir(Path::new(&data_dir), &BuildParams::default())?;
    let context = Context::new(network);

    let mut repl = Repl::new(context)
        .with_name("Transit")
        .with_version("v0.1.0")
        .with_description("Simple REPL to compare route search strategies")
        .with_banner("Welcome to Transit")
        .with_history(PathBuf::from(r".\history"), 100)
        .with_command(Command::new("info").about("Print topology info"), info)
        .with_command(
            Command::new("topology")
                .arg(Arg::new("name").required(true).help("today or future"))
                .about("Switch the active topology"),
            switch_topology,
        )
        .with_command(
            station_pair(
                Command::new("route").arg(
                    Arg::new("strategy")
                        .required(true)
                        .help("bfs, dfs, gbfs or astar"),
                ),
            )
            .about("Search a route with one strategy"),
            route,
        )
        .with_command(
            station_pair(Command::new("compare")).about("Compare all strategies on one route"),
            compare,
        )
        .with_command(
            Command::new("heuristic")
                .arg(Arg::new("name").required(true).help("straight-line or zero"))
                .about("Choose the estimate of greedy best-first search and A*"),
            heuristic,
        )
        .with_command(
            Command::new("check").about("Print integrity findings and admissibility"),
            check,
        )
        .with_command(
            station_pair(Command::new("suspend"))
                .about("Suspend the connections between two stations"),
            suspend,
        )
        .with_command(
            Command::new("restore").about("Drop all suspensions"),
            restore,
        )
        .with_command(
            Command::new("crowd")
                .arg(Arg::new("station").required(true))
                .arg(Arg::new("level").required(true).help("low, medium or high"))
                .about("Set the crowding risk of a station"),
            crowd,
        )
        .with_command(
            Command::new("measure")
                .arg(
                    Arg::new("n")
                        .value_parser(value_parser!(usize))
                        .required(false)
                        .help("Number of random routes to search"),
                )
                .about("Measure `n` random routes with every strategy"),
            measure,
        );

    repl.run().map_err(|e| anyhow::anyhow!("{:?}", e))
}
