use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    cost::{CostModel, CostParams, Heuristic},
    network::{BuildParams, NetworkTopology, TopologyName},
    search::Strategy,
};

#[derive(Parser)]
#[command(author = "Daniel Holzner", version, about, long_about = None)]
struct Cli {
    /// Directory containing the reference CSV tables
    #[arg(short, long, value_name = "dir", default_value = "data")]
    data: PathBuf,

    /// Topology to search on. Possible values are "today" and "future"
    #[arg(short, long, default_value = "today")]
    topology: TopologyName,

    /// Abort if the reference data has integrity findings
    #[arg(long, default_value = "false")]
    strict: bool,

    /// Set the penalty for line changes without a transfer record
    #[arg(long, value_name = "minutes", value_parser = non_negative)]
    transfer_penalty: Option<f64>,

    /// Add a fixed penalty to every line change
    #[arg(long, value_name = "minutes", value_parser = non_negative)]
    line_change_penalty: Option<f64>,

    /// Estimate used by greedy best-first search and A*. Possible values are "straight-line" and "zero"
    #[arg(long, default_value = "straight-line")]
    heuristic: Heuristic,

    /// Set the speed the heuristic assumes
    #[arg(long, value_name = "km/h", value_parser = positive)]
    speed: Option<f64>,

    /// Keep the given speed even if A* could miss the cheapest path with it
    #[arg(long, default_value = "false")]
    no_calibrate: bool,

    /// Apply the peak factor to peak-sensitive transfers
    #[arg(long, default_value = "false")]
    peak: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Search a route with one strategy. Strategies are "bfs", "dfs", "gbfs" and "astar"
    Query {
        strategy: Strategy,
        from: String,
        to: String,
    },
    /// Compare all strategies on the same route
    Compare {
        from: String,
        to: String,
        /// Compare on both topologies
        #[arg(long)]
        both: bool,
    },
    /// Report integrity findings, heuristic admissibility and degree statistics
    Check,
    /// Compare all strategies on random station pairs
    Sample {
        #[arg(short, default_value = "100")]
        n: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct Cfg {
    pub data_dir: PathBuf,
    pub topology: TopologyName,
    pub build: BuildParams,
    pub cost: CostParams,
    pub calibrate: bool,
    pub command: Command,
}

impl Cfg {
    pub fn cost_model(&self, topology: &NetworkTopology) -> CostModel {
        if self.calibrate {
            CostModel::calibrated(topology, self.cost)
        } else {
            let cost = CostModel::new(self.cost);
            // Warns if not admissible
            cost.admissibility(topology);
            cost
        }
    }
}

fn positive(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("{} is not a number", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{} must be a positive number", s))
    }
}

fn non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("{} is not a number", s))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{} must not be negative", s))
    }
}

pub fn parse() -> Cfg {
    from_cli(Cli::parse())
}

fn from_cli(cli: Cli) -> Cfg {
    let mut cost = CostParams::default()
        .peak_hour(cli.peak)
        .heuristic(cli.heuristic);
    if let Some(minutes) = cli.transfer_penalty {
        cost = cost.default_transfer_penalty(minutes);
    }
    if let Some(minutes) = cli.line_change_penalty {
        cost = cost.line_change_penalty(minutes);
    }
    if let Some(speed) = cli.speed {
        cost = cost.heuristic_speed_kmh(speed);
    }

    Cfg {
        data_dir: cli.data,
        topology: cli.topology,
        build: BuildParams::new().strict(cli.strict),
        cost,
        calibrate: !cli.no_calibrate,
        command: cli.command,
    }
}
