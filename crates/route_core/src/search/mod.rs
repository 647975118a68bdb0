//! The four search strategies and the engine that dispatches to them.
use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::{
    constants::Weight,
    cost::{CostModel, CrowdingRisk, NoCrowding},
    error::SearchError,
    network::{Connection, ConnectionIndex, NetworkTopology, StationIndex},
    statistics::SearchStats,
};

use self::{
    astar::AStar,
    bfs::Bfs,
    dfs::Dfs,
    frontier::{Frontier, FrontierEntry},
    greedy::GreedyBestFirst,
    path::{reconstruct_path, PathResult},
};

pub mod astar;
pub mod bfs;
pub mod dfs;
pub(crate) mod frontier;
pub mod greedy;
pub mod path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
    GreedyBestFirst,
    AStar,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::BreadthFirst,
        Strategy::DepthFirst,
        Strategy::GreedyBestFirst,
        Strategy::AStar,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::BreadthFirst => "BFS",
            Strategy::DepthFirst => "DFS",
            Strategy::GreedyBestFirst => "GBFS",
            Strategy::AStar => "A*",
        };
        // Pads when a width is given
        f.pad(name)
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Strategy::BreadthFirst),
            "dfs" | "depth-first" => Ok(Strategy::DepthFirst),
            "gbfs" | "greedy" | "greedy-best-first" => Ok(Strategy::GreedyBestFirst),
            "a*" | "astar" | "a-star" => Ok(Strategy::AStar),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

pub trait RouteSearch {
    /// Searches a path between two stations given by name.
    fn search(&mut self, source: &str, target: &str) -> Result<PathResult, SearchError>;

    /// Statistics of the last search
    fn stats(&self) -> &SearchStats;

    fn strategy(&self) -> Strategy;
}

/// Everything a single search reads. Shared, never mutated.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub topology: &'a NetworkTopology,
    pub cost: &'a CostModel,
    pub crowding: &'a dyn CrowdingRisk,
    pub cancel: Option<&'a AtomicBool>,
}

impl<'a> SearchContext<'a> {
    pub fn new(topology: &'a NetworkTopology, cost: &'a CostModel) -> Self {
        SearchContext {
            topology,
            cost,
            crowding: &NoCrowding,
            cancel: None,
        }
    }

    pub fn with_crowding(mut self, crowding: &'a dyn CrowdingRisk) -> Self {
        self.crowding = crowding;
        self
    }

    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[inline]
    pub fn edge_cost(&self, connection: &Connection) -> Weight {
        self.cost.edge_cost(self.topology, connection, self.crowding)
    }

    /// Line ridden on `connection` after arriving on `line`, and the cost of
    /// the connection including any line change before boarding
    #[inline]
    pub fn step(&self, connection: &'a Connection, line: Option<&str>) -> (&'a str, Weight) {
        let (ridden, change) = self.cost.board(self.topology, connection, line);
        (ridden, self.edge_cost(connection) + change)
    }

    /// Lines ridden along `connections` from the source, and their total cost
    pub fn replay(&self, connections: &[ConnectionIndex]) -> (Vec<String>, Weight) {
        let mut line = None;
        let mut lines = Vec::with_capacity(connections.len());
        let mut total = 0.0;
        for idx in connections {
            let (ridden, cost) = self.step(self.topology.connection(*idx), line);
            lines.push(ridden.to_string());
            total += cost;
            line = Some(ridden);
        }
        (lines, total)
    }

    #[inline]
    pub fn heuristic(&self, station: StationIndex, target: StationIndex) -> Weight {
        self.cost.heuristic(self.topology, station, target)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.load(Ordering::Relaxed))
    }

    fn resolve(&self, name: &str) -> Result<StationIndex, SearchError> {
        self.topology
            .station_index(name)
            .ok_or_else(|| SearchError::UnknownStation(name.to_string()))
    }

    /// Outgoing connections in the order a frontier of type `F` needs them
    fn expansion_order<F: Frontier<'a>>(
        &self,
        station: StationIndex,
    ) -> Vec<(ConnectionIndex, &'a Connection)> {
        let mut neighbors: Vec<_> = self.topology.neighbors(station).collect();
        if F::REVERSE_NEIGHBORS {
            neighbors.reverse();
        }
        neighbors
    }
}

impl fmt::Debug for SearchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchContext")
            .field("topology", &self.topology.name())
            .field("cost", self.cost)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// Outcome of endpoint resolution
pub(crate) enum Start {
    Trivial(PathResult),
    Search(StationIndex, StationIndex),
}

/// Resolves both endpoints before the timer starts. Unknown stations fail
/// without any expansion, equal endpoints yield the single-station path.
pub(crate) fn start(
    ctx: &SearchContext,
    stats: &mut SearchStats,
    strategy: Strategy,
    source: &str,
    target: &str,
) -> Result<Start, SearchError> {
    stats.reset();
    let s = ctx.resolve(source)?;
    let t = ctx.resolve(target)?;

    info!(
        "BEGIN {} search from {} to {} on '{}'",
        strategy,
        source,
        target,
        ctx.topology.name()
    );
    stats.init();

    if s == t {
        stats.finish();
        return Ok(Start::Trivial(PathResult::single(s, stats.clone())));
    }
    Ok(Start::Search(s, t))
}

/// Builds the path ending in search state `target`. The cost is summed
/// along the rebuilt path, so it always belongs to the returned stations.
pub(crate) fn found<K: Copy>(
    ctx: &SearchContext,
    stats: &mut SearchStats,
    strategy: Strategy,
    target: K,
    station_of: impl Fn(K) -> StationIndex,
    parent_of: impl Fn(K) -> Option<(K, ConnectionIndex)>,
) -> PathResult {
    stats.finish();
    let (stations, connections) = reconstruct_path(target, station_of, parent_of);
    let (lines, cost) = ctx.replay(&connections);
    let path = PathResult::new(stations, connections, lines, cost, stats.clone());

    debug!("Path found: {:?}", path.station_names(ctx.topology));
    info!(
        "FINISHED {}: path found in {:?}/{} stations expanded",
        strategy, stats.duration, stats.stations_expanded
    );
    path
}

pub(crate) fn exhausted(
    stats: &mut SearchStats,
    strategy: Strategy,
    source: &str,
    target: &str,
) -> SearchError {
    stats.finish();
    info!(
        "FINISHED {}: no path found in {:?}/{} stations expanded",
        strategy, stats.duration, stats.stations_expanded
    );
    SearchError::NoPath {
        from: source.to_string(),
        to: target.to_string(),
        expanded: stats.stations_expanded,
    }
}

pub(crate) fn cancelled(stats: &mut SearchStats, strategy: Strategy) -> SearchError {
    stats.finish();
    info!(
        "{} cancelled after {} stations expanded",
        strategy, stats.stations_expanded
    );
    SearchError::Cancelled
}

/// Search that closes every station the first time it is popped and never
/// expands it again, whatever line it was reached on. Only the frontier and
/// the priority differ between breadth-first, depth-first and greedy
/// best-first search.
pub(crate) fn first_visit_search<'a, F: Frontier<'a>>(
    ctx: &SearchContext<'a>,
    stats: &mut SearchStats,
    strategy: Strategy,
    source: &str,
    target: &str,
    mut frontier: F,
    priority: impl Fn(StationIndex, StationIndex, Weight) -> Weight,
) -> Result<PathResult, SearchError> {
    let (s, t) = match start(ctx, stats, strategy, source, target)? {
        Start::Trivial(path) => return Ok(path),
        Start::Search(s, t) => (s, t),
    };

    // Closed stations with their predecessor
    let mut closed: FxHashMap<StationIndex, Option<(StationIndex, ConnectionIndex)>> =
        FxHashMap::default();

    frontier.push(FrontierEntry::root(s), priority(s, t, 0.0));
    stats.observe_frontier(frontier.len());

    while let Some(entry) = frontier.pop() {
        if closed.contains_key(&entry.station) {
            continue;
        }
        closed.insert(entry.station, entry.parent);

        if entry.station == t {
            return Ok(found(
                ctx,
                stats,
                strategy,
                t,
                |station| station,
                |station| closed.get(&station).copied().flatten(),
            ));
        }

        if ctx.is_cancelled() {
            return Err(cancelled(stats, strategy));
        }
        stats.stations_expanded += 1;

        for (idx, connection) in ctx.expansion_order::<F>(entry.station) {
            if closed.contains_key(&connection.target) {
                continue;
            }
            let (line, step) = ctx.step(connection, entry.line);
            let cost = entry.cost + step;
            frontier.push(
                FrontierEntry {
                    station: connection.target,
                    parent: Some((entry.station, idx)),
                    cost,
                    line: Some(line),
                },
                priority(connection.target, t, cost),
            );
        }
        stats.observe_frontier(frontier.len());
    }

    Err(exhausted(stats, strategy, source, target))
}

/// Runs any of the four strategies over one topology.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    ctx: SearchContext<'a>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(topology: &'a NetworkTopology, cost: &'a CostModel) -> Self {
        SearchEngine {
            ctx: SearchContext::new(topology, cost),
        }
    }

    pub fn with_crowding(mut self, crowding: &'a dyn CrowdingRisk) -> Self {
        self.ctx = self.ctx.with_crowding(crowding);
        self
    }

    /// Searches stop with [`SearchError::Cancelled`] at the next expansion once `cancel` is set
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.ctx = self.ctx.with_cancel(cancel);
        self
    }

    pub fn topology(&self) -> &'a NetworkTopology {
        self.ctx.topology
    }

    pub fn context(&self) -> SearchContext<'a> {
        self.ctx
    }

    pub fn runner(&self, strategy: Strategy) -> Box<dyn RouteSearch + 'a> {
        match strategy {
            Strategy::BreadthFirst => Box::new(Bfs::new(self.ctx)),
            Strategy::DepthFirst => Box::new(Dfs::new(self.ctx)),
            Strategy::GreedyBestFirst => Box::new(GreedyBestFirst::new(self.ctx)),
            Strategy::AStar => Box::new(AStar::new(self.ctx)),
        }
    }

    pub fn search(
        &self,
        strategy: Strategy,
        source: &str,
        target: &str,
    ) -> Result<PathResult, SearchError> {
        self.runner(strategy).search(source, target)
    }
}
