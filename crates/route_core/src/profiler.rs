//! Side-by-side measurements of the search strategies.
use std::{fmt, time::Duration};

use crate::{
    constants::Weight,
    cost::{CostModel, CostParams, CrowdingRisk},
    error::SearchError,
    network::{Network, TopologyName},
    search::{path::PathResult, SearchEngine, Strategy},
    statistics::SearchStats,
};

/// Measurements of a single search
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub strategy: Strategy,
    pub topology: TopologyName,
    pub elapsed: Duration,
    pub stations_expanded: usize,
    pub reopened: usize,
    pub peak_frontier: usize,
    pub path_total_cost: Option<Weight>,
    pub path_hop_count: Option<usize>,
}

impl Metrics {
    fn new(
        strategy: Strategy,
        topology: TopologyName,
        stats: &SearchStats,
        path: Option<&PathResult>,
    ) -> Self {
        Metrics {
            strategy,
            topology,
            elapsed: stats.duration.unwrap_or_default(),
            stations_expanded: stats.stations_expanded,
            reopened: stats.reopened,
            peak_frontier: stats.peak_frontier,
            path_total_cost: path.map(|p| p.total_cost),
            path_hop_count: path.map(|p| p.hops()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Run {
    pub result: Result<PathResult, SearchError>,
    pub metrics: Metrics,
}

/// All four strategies on the same topology and endpoints
#[derive(Debug, Clone)]
pub struct Comparison {
    pub topology: TopologyName,
    pub source: String,
    pub target: String,
    pub runs: Vec<Run>,
}

impl Comparison {
    pub fn run(&self, strategy: Strategy) -> Option<&Run> {
        self.runs.iter().find(|r| r.metrics.strategy == strategy)
    }

    /// The run with the lowest path cost, the earlier one on ties
    pub fn cheapest(&self) -> Option<&Run> {
        self.runs
            .iter()
            .filter(|r| r.metrics.path_total_cost.is_some())
            .min_by(|a, b| {
                let a = a.metrics.path_total_cost.unwrap_or(Weight::INFINITY);
                let b = b.metrics.path_total_cost.unwrap_or(Weight::INFINITY);
                a.total_cmp(&b)
            })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} -> {}", self.topology, self.source, self.target)?;
        writeln!(
            f,
            "{:<5} {:>9} {:>5} {:>9} {:>9} {:>12}",
            "", "Cost", "Hops", "Expanded", "Frontier", "Time"
        )?;
        for run in &self.runs {
            let m = &run.metrics;
            match &run.result {
                Ok(path) => writeln!(
                    f,
                    "{:<5} {:>9.2} {:>5} {:>9} {:>9} {:>12}",
                    m.strategy,
                    path.total_cost,
                    path.hops(),
                    m.stations_expanded,
                    m.peak_frontier,
                    format!("{:.2?}", m.elapsed)
                )?,
                Err(err) => writeln!(f, "{:<5} {}", m.strategy, err)?,
            }
        }
        Ok(())
    }
}

/// Runs searches and records their metrics. Only observes, never changes a result.
#[derive(Debug, Clone, Copy)]
pub struct Profiler<'a> {
    engine: SearchEngine<'a>,
}

impl<'a> Profiler<'a> {
    pub fn new(engine: SearchEngine<'a>) -> Self {
        Profiler { engine }
    }

    pub fn run(
        &self,
        strategy: Strategy,
        source: &str,
        target: &str,
    ) -> (Result<PathResult, SearchError>, Metrics) {
        let mut runner = self.engine.runner(strategy);
        let result = runner.search(source, target);
        let metrics = Metrics::new(
            strategy,
            self.engine.topology().name(),
            runner.stats(),
            result.as_ref().ok(),
        );
        (result, metrics)
    }

    pub fn compare(&self, source: &str, target: &str) -> Comparison {
        let runs = Strategy::ALL
            .iter()
            .map(|strategy| {
                let (result, metrics) = self.run(*strategy, source, target);
                Run { result, metrics }
            })
            .collect();

        Comparison {
            topology: self.engine.topology().name(),
            source: source.to_string(),
            target: target.to_string(),
            runs,
        }
    }
}

/// Compares the strategies on both topologies, each with a calibrated cost model
pub fn compare_topologies(
    network: &Network,
    params: &CostParams,
    crowding: &dyn CrowdingRisk,
    source: &str,
    target: &str,
) -> Vec<Comparison> {
    TopologyName::ALL
        .iter()
        .map(|name| {
            let topology = network.topology(*name);
            let cost = CostModel::calibrated(topology, *params);
            let engine = SearchEngine::new(topology, &cost).with_crowding(crowding);
            Profiler::new(engine).compare(source, target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{cost::NoCrowding, util::test_networks::*};

    #[test]
    fn run_records_metrics() {
        let t = detour_network();
        let cost = CostModel::default();
        let profiler = Profiler::new(SearchEngine::new(&t, &cost));

        let (result, metrics) = profiler.run(Strategy::AStar, "S", "T");
        let path = result.unwrap();

        assert_eq!(metrics.strategy, Strategy::AStar);
        assert_eq!(metrics.topology, TopologyName::Today);
        assert_eq!(metrics.stations_expanded, path.stats.stations_expanded);
        assert_eq!(metrics.path_total_cost, Some(path.total_cost));
        assert_eq!(metrics.path_hop_count, Some(2));
        assert!(metrics.peak_frontier >= 2);
    }

    #[test]
    fn failed_run_has_no_path_metrics() {
        let t = disconnected();
        let cost = CostModel::default();
        let profiler = Profiler::new(SearchEngine::new(&t, &cost));

        let (result, metrics) = profiler.run(Strategy::BreadthFirst, "A", "E");
        assert!(result.is_err());
        assert_eq!(metrics.stations_expanded, 3);
        assert_eq!(metrics.path_total_cost, None);
        assert_eq!(metrics.path_hop_count, None);
    }

    #[test]
    fn compare_all_strategies() {
        let t = detour_network();
        let cost = CostModel::default();
        let comparison = Profiler::new(SearchEngine::new(&t, &cost)).compare("S", "T");

        assert_eq!(comparison.runs.len(), 4);
        let cheapest = comparison.cheapest().unwrap();
        assert_eq!(cheapest.metrics.strategy, Strategy::AStar);
        assert_relative_eq!(cheapest.metrics.path_total_cost.unwrap(), 12.0);
        assert_eq!(
            comparison.run(Strategy::GreedyBestFirst).unwrap().metrics.path_total_cost,
            Some(40.0)
        );

        let table = comparison.to_string();
        assert!(table.starts_with("today: S -> T"));
        for strategy in Strategy::ALL {
            assert!(table.contains(&strategy.to_string()));
        }
    }

    #[test]
    fn compare_on_both_topologies() {
        let network = test_network();
        let comparisons = compare_topologies(
            &network,
            &CostParams::default(),
            &NoCrowding,
            "Orchard",
            "Marina Bay",
        );

        assert_eq!(comparisons.len(), 2);
        assert_eq!(comparisons[0].topology, TopologyName::Today);
        assert_eq!(comparisons[1].topology, TopologyName::Future);

        let today = comparisons[0].run(Strategy::AStar).unwrap();
        let future = comparisons[1].run(Strategy::AStar).unwrap();
        // The planned line can only make things faster
        assert!(
            future.metrics.path_total_cost.unwrap() <= today.metrics.path_total_cost.unwrap()
        );
    }
}
