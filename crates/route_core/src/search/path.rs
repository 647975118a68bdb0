use std::fmt::Write;

use crate::{
    constants::Weight,
    network::{ConnectionIndex, ConnectionKind, NetworkTopology, StationIndex},
    statistics::SearchStats,
};

/// A path found by one of the search strategies.
#[derive(Debug, Clone)]
pub struct PathResult {
    /// Source first, destination last
    pub stations: Vec<StationIndex>,
    /// `connections[i]` leads from `stations[i]` to `stations[i + 1]`
    pub connections: Vec<ConnectionIndex>,
    /// Line ridden on each connection
    pub lines: Vec<String>,
    pub total_cost: Weight,
    pub stats: SearchStats,
}

/// One traversed connection, as seen by advisory rules
#[derive(Debug, Clone, PartialEq)]
pub struct Leg<'a> {
    pub from: &'a str,
    pub to: &'a str,
    /// All lines running on the connection
    pub lines: &'a [String],
    /// The line the path rides
    pub line: &'a str,
    /// Line change at `from` before this leg
    pub change: Option<(&'a str, &'a str)>,
    pub minutes: Weight,
}

impl PathResult {
    pub fn new(
        stations: Vec<StationIndex>,
        connections: Vec<ConnectionIndex>,
        lines: Vec<String>,
        total_cost: Weight,
        stats: SearchStats,
    ) -> Self {
        debug_assert_eq!(stations.len(), connections.len() + 1);
        debug_assert_eq!(lines.len(), connections.len());
        PathResult {
            stations,
            connections,
            lines,
            total_cost,
            stats,
        }
    }

    /// Path of a search whose source is also its destination
    pub fn single(station: StationIndex, stats: SearchStats) -> Self {
        PathResult::new(vec![station], Vec::new(), Vec::new(), 0.0, stats)
    }

    pub fn hops(&self) -> usize {
        self.connections.len()
    }

    pub fn source(&self) -> StationIndex {
        self.stations[0]
    }

    pub fn target(&self) -> StationIndex {
        self.stations[self.stations.len() - 1]
    }

    pub fn station_names<'a>(&self, topology: &'a NetworkTopology) -> Vec<&'a str> {
        self.stations
            .iter()
            .map(|s| topology.station(*s).name.as_str())
            .collect()
    }

    pub fn legs<'a>(&'a self, topology: &'a NetworkTopology) -> Vec<Leg<'a>> {
        self.connections
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let connection = topology.connection(*c);
                let line = self.lines[i].as_str();
                let previous = i.checked_sub(1).map(|p| self.lines[p].as_str());
                let change = match &connection.kind {
                    ConnectionKind::Transfer { from_line, to_line } => {
                        Some((from_line.as_str(), to_line.as_str()))
                    }
                    ConnectionKind::Ride => previous
                        .filter(|previous| *previous != line)
                        .map(|previous| (previous, line)),
                };
                Leg {
                    from: &topology.station(connection.source).name,
                    to: &topology.station(connection.target).name,
                    lines: &connection.lines,
                    line,
                    change,
                    minutes: connection.minutes,
                }
            })
            .collect()
    }

    /// Line changes along the path, on transfer connections or between rides
    pub fn transfers(&self, topology: &NetworkTopology) -> usize {
        self.legs(topology)
            .iter()
            .filter(|leg| leg.change.is_some())
            .count()
    }

    /// Every connection starts where the previous one ended
    pub fn is_connected(&self, topology: &NetworkTopology) -> bool {
        !self.stations.is_empty()
            && self.stations.len() == self.connections.len() + 1
            && self.connections.iter().enumerate().all(|(i, c)| {
                let connection = topology.connection(*c);
                connection.source == self.stations[i] && connection.target == self.stations[i + 1]
            })
    }

    pub fn describe(&self, topology: &NetworkTopology) -> String {
        let mut out = format!(
            "{} ({} hops, cost {:.2})",
            self.station_names(topology).join(" -> "),
            self.hops(),
            self.total_cost
        );
        for leg in self.legs(topology) {
            if let Some((from_line, to_line)) = leg.change {
                let _ = write!(
                    out,
                    "\n  transfer {} -> {} at {}",
                    from_line, to_line, leg.from
                );
            }
        }
        out
    }
}

/// Walks the predecessors of search state `target` back to the state
/// without one.
pub(crate) fn reconstruct_path<K: Copy>(
    target: K,
    station_of: impl Fn(K) -> StationIndex,
    parent_of: impl Fn(K) -> Option<(K, ConnectionIndex)>,
) -> (Vec<StationIndex>, Vec<ConnectionIndex>) {
    let mut stations = vec![station_of(target)];
    let mut connections = Vec::new();

    let mut current = target;
    while let Some((previous, connection)) = parent_of(current) {
        connections.push(connection);
        stations.push(station_of(previous));
        current = previous;
    }

    stations.reverse();
    connections.reverse();
    (stations, connections)
}
