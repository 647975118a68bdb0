//! Alternate topologies derived from an existing one, e.g. for disruptions.
use std::sync::Arc;

use log::info;
use rustc_hash::FxHashSet;

use crate::{
    error::BuildError,
    integrity::{Finding, IntegrityReport},
    network::{NetworkTopology, StationIndex},
};

/// Suspended connections and slower transfers.
///
/// Applying a disruption yields a new topology that searches treat like any
/// other. The original topology is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Disruption {
    suspended: Vec<(String, String)>,
    both_directions: bool,
    transfer_factor: f64,
}

impl Default for Disruption {
    fn default() -> Self {
        Disruption {
            suspended: Vec::new(),
            both_directions: true,
            transfer_factor: 1.0,
        }
    }
}

impl Disruption {
    pub fn new() -> Self {
        Default::default()
    }

    /// Suspends every connection from `from` to `to`, whatever line it runs on
    pub fn suspend(mut self, from: &str, to: &str) -> Self {
        self.suspended.push((from.to_string(), to.to_string()));
        self
    }

    pub fn both_directions(mut self, both: bool) -> Self {
        self.both_directions = both;
        self
    }

    pub fn transfer_factor(mut self, factor: f64) -> Self {
        assert!(factor >= 0.0, "Transfer factor must not be negative");
        self.transfer_factor = factor;
        self
    }

    pub fn apply(&self, topology: &NetworkTopology) -> Result<NetworkTopology, BuildError> {
        let mut suspended: FxHashSet<(StationIndex, StationIndex)> = FxHashSet::default();
        for (from, to) in &self.suspended {
            let resolve = |station: &str| {
                topology
                    .station_index(station)
                    .ok_or_else(|| BuildError::UnknownStation {
                        station: station.to_string(),
                        referenced_by: format!("disruption {} -> {}", from, to),
                    })
            };
            let (a, b) = (resolve(from)?, resolve(to)?);
            suspended.insert((a, b));
            if self.both_directions {
                suspended.insert((b, a));
            }
        }

        let stations = topology.stations().cloned().collect();
        let connections: Vec<_> = topology
            .connections()
            .filter(|c| !suspended.contains(&(c.source, c.target)))
            .cloned()
            .collect();

        let transfers = if self.transfer_factor == 1.0 {
            Arc::clone(topology.transfers())
        } else {
            Arc::new(topology.transfers().scaled(self.transfer_factor))
        };

        info!(
            "Disruption on '{}': {} connections suspended, transfer factor {}",
            topology.name(),
            topology.connection_count() - connections.len(),
            self.transfer_factor
        );

        let mut disrupted =
            NetworkTopology::assemble(topology.name(), stations, connections, transfers);
        // Station findings carry over, connection and transfer findings are redone
        let mut findings: Vec<Finding> = topology
            .integrity()
            .iter()
            .filter(|f| {
                matches!(
                    f,
                    Finding::DuplicateStation { .. } | Finding::StationWithoutLines { .. }
                )
            })
            .cloned()
            .collect();
        findings.extend(disrupted.symmetry_check());
        findings.extend(disrupted.transfers().findings().iter().cloned());
        disrupted.set_report(IntegrityReport::new(findings));
        Ok(disrupted)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        cost::CostModel,
        error::SearchError,
        network::{BuildParams, TopologyName},
        ride,
        search::{SearchEngine, Strategy},
        station,
        transfer::TransferTable,
        util::test_networks::*,
    };

    #[test]
    fn suspended_connection_forces_detour() {
        let t = detour_network();
        let disrupted = Disruption::new().suspend("S", "B").apply(&t).unwrap();

        assert_eq!(disrupted.connection_count(), t.connection_count() - 2);
        assert!(disrupted.integrity().is_clean());

        let cost = CostModel::default();
        let path = SearchEngine::new(&disrupted, &cost)
            .search(Strategy::AStar, "S", "T")
            .unwrap();
        assert_eq!(path.station_names(&disrupted), vec!["S", "A", "T"]);
        assert_relative_eq!(path.total_cost, 40.0);

        // The original is unchanged
        let path = SearchEngine::new(&t, &cost)
            .search(Strategy::AStar, "S", "T")
            .unwrap();
        assert_relative_eq!(path.total_cost, 12.0);
    }

    #[test]
    fn one_direction_only() {
        let t = west_line();
        let disrupted = Disruption::new()
            .suspend("Clementi", "Dover")
            .both_directions(false)
            .apply(&t)
            .unwrap();

        assert_eq!(disrupted.connection_count(), t.connection_count() - 1);
        // Dover -> Clementi has no reverse any more
        assert_eq!(disrupted.integrity().len(), 1);

        let cost = CostModel::default();
        let engine = SearchEngine::new(&disrupted, &cost);
        assert!(engine.search(Strategy::BreadthFirst, "Dover", "Clementi").is_ok());
        assert!(matches!(
            engine.search(Strategy::BreadthFirst, "Clementi", "Dover"),
            Err(SearchError::NoPath { .. })
        ));
    }

    #[test]
    fn slower_transfers() {
        let t = jurong_city_hall();
        let disrupted = Disruption::new().transfer_factor(3.0).apply(&t).unwrap();

        let cost = CostModel::default();
        let path = SearchEngine::new(&disrupted, &cost)
            .search(Strategy::AStar, "Jurong East", "City Hall")
            .unwrap();
        assert_relative_eq!(path.total_cost, 20.0 + 30.0 / 60.0);
        assert_eq!(t.transfer("Jurong East", "NSL", "EWL").unwrap().seconds, 10);
    }

    #[test]
    fn keeps_station_findings_of_base() {
        let stations = vec![
            station!("A", ["L1"], 1.30, 103.70),
            station!("A", ["L2"], 1.30, 103.70),
            station!("B", ["L1"], 1.31, 103.71),
            station!("C", [], 1.32, 103.72),
        ];
        let connections = ride!("A", "B", "L1", 2.0);
        let t = NetworkTopology::build(
            TopologyName::Today,
            &stations,
            &connections,
            Arc::new(TransferTable::default()),
            &BuildParams::default(),
        )
        .unwrap();
        assert_eq!(t.integrity().len(), 2);

        let disrupted = Disruption::new()
            .suspend("A", "B")
            .both_directions(false)
            .apply(&t)
            .unwrap();
        let findings = disrupted.integrity().findings();
        assert_eq!(findings.len(), 3);
        assert!(findings.contains(&Finding::DuplicateStation {
            station: "A".to_string()
        }));
        assert!(findings.contains(&Finding::StationWithoutLines {
            station: "C".to_string()
        }));
        assert!(findings.contains(&Finding::AsymmetricConnection {
            from: "B".to_string(),
            to: "A".to_string()
        }));

        // Nothing suspended, nothing new
        let same = Disruption::new().apply(&t).unwrap();
        assert_eq!(same.integrity(), t.integrity());
    }

    #[test]
    fn unknown_station_in_disruption() {
        let t = west_line();
        let err = Disruption::new().suspend("Clementi", "Atlantis").apply(&t);
        assert!(matches!(err, Err(BuildError::UnknownStation { station, .. }) if station == "Atlantis"));
    }
}
