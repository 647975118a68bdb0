use crate::{
    constants::{DEFAULT_RIDE_MINUTES, DEFAULT_TRANSFER_ASYMMETRY_SECS, Weight},
    error::BuildError,
    integrity::{Finding, IntegrityReport},
    transfer::{Transfer, TransferTable},
};
use anyhow::Context;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::{fmt, hash::Hash, path::Path, str::FromStr, sync::Arc};
use transit_reader::{ConnectionRecord, ReferenceTables, StationRecord};

/// Default integer type for station and connection indices
pub type DefaultIdx = u32;

pub trait IndexType: Copy + Default + Hash + Ord + fmt::Debug {
    fn new(idx: usize) -> Self;
    fn index(&self) -> usize;
    fn max() -> Self;
}

impl IndexType for usize {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x
    }
    #[inline(always)]
    fn index(&self) -> Self {
        *self
    }
    #[inline(always)]
    fn max() -> Self {
        usize::MAX
    }
}

impl IndexType for u32 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as u32
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn max() -> Self {
        u32::MAX
    }
}

/// Station identifier inside one topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationIndex<Idx = DefaultIdx>(Idx);

impl StationIndex {
    #[inline]
    pub fn new(x: usize) -> Self {
        StationIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    #[inline]
    pub fn end() -> Self {
        StationIndex(IndexType::max())
    }
}

impl<Idx: IndexType> From<Idx> for StationIndex<Idx> {
    fn from(ix: Idx) -> Self {
        StationIndex(ix)
    }
}

/// Short version of `StationIndex::new`
pub fn station_index(index: usize) -> StationIndex {
    StationIndex::new(index)
}

/// Connection identifier inside one topology.
#[derive(Debug, Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ConnectionIndex<Idx = DefaultIdx>(Idx);

impl<Idx: IndexType> From<Idx> for ConnectionIndex<Idx> {
    fn from(ix: Idx) -> Self {
        ConnectionIndex(ix)
    }
}

impl<Idx: IndexType> ConnectionIndex<Idx> {
    #[inline]
    pub fn new(x: usize) -> Self {
        ConnectionIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    #[inline]
    pub fn end() -> Self {
        ConnectionIndex(IndexType::max())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Coord { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub lines: Vec<String>,
    pub coord: Option<Coord>,
}

impl Station {
    pub fn new(name: &str, lines: Vec<String>, coord: Option<Coord>) -> Self {
        Station {
            name: name.to_string(),
            lines,
            coord,
        }
    }

    pub fn serves(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }

    fn add_line(&mut self, line: &str) {
        if !self.serves(line) {
            self.lines.push(line.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Movement between adjacent stations on the same line
    Ride,
    /// Line change at the source station, or between co-located stations
    Transfer { from_line: String, to_line: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: StationIndex,
    pub target: StationIndex,
    pub minutes: Weight,
    pub lines: Vec<String>,
    pub kind: ConnectionKind,
}

impl Connection {
    pub fn ride(source: StationIndex, target: StationIndex, minutes: Weight, line: &str) -> Self {
        Connection {
            source,
            target,
            minutes,
            lines: vec![line.to_string()],
            kind: ConnectionKind::Ride,
        }
    }

    pub fn transfer(
        source: StationIndex,
        target: StationIndex,
        minutes: Weight,
        from_line: &str,
        to_line: &str,
    ) -> Self {
        Connection {
            source,
            target,
            minutes,
            lines: vec![from_line.to_string(), to_line.to_string()],
            kind: ConnectionKind::Transfer {
                from_line: from_line.to_string(),
                to_line: to_line.to_string(),
            },
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self.kind, ConnectionKind::Transfer { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyName {
    Today,
    Future,
}

impl TopologyName {
    pub const ALL: [TopologyName; 2] = [TopologyName::Today, TopologyName::Future];
}

impl fmt::Display for TopologyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyName::Today => write!(f, "today"),
            TopologyName::Future => write!(f, "future"),
        }
    }
}

impl FromStr for TopologyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "current" => Ok(TopologyName::Today),
            "future" | "planned" => Ok(TopologyName::Future),
            _ => Err(format!("Unknown topology: {}", s)),
        }
    }
}

/// Parameters for building a topology
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildParams {
    // Abort the build if the integrity report is not empty
    pub(crate) strict: bool,
    pub(crate) default_ride_minutes: Weight,
    pub(crate) transfer_asymmetry_secs: u32,
}

impl BuildParams {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn default_ride_minutes(mut self, minutes: Weight) -> Self {
        assert!(minutes > 0.0, "Ride time must be positive");
        self.default_ride_minutes = minutes;
        self
    }

    pub fn transfer_asymmetry_secs(mut self, secs: u32) -> Self {
        self.transfer_asymmetry_secs = secs;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl Default for BuildParams {
    fn default() -> Self {
        BuildParams {
            strict: false,
            default_ride_minutes: DEFAULT_RIDE_MINUTES,
            transfer_asymmetry_secs: DEFAULT_TRANSFER_ASYMMETRY_SECS,
        }
    }
}

/// One complete, immutable station/connection/transfer graph.
#[derive(Debug, Clone)]
pub struct NetworkTopology {
    name: TopologyName,
    stations: Vec<Station>,
    connections: Vec<Connection>,
    edges_out: Vec<Vec<ConnectionIndex>>,
    edges_in: Vec<Vec<ConnectionIndex>>,
    by_name: FxHashMap<String, StationIndex>,
    transfers: Arc<TransferTable>,
    report: IntegrityReport,
}

impl NetworkTopology {
    /// Builds a topology from reference records.
    ///
    /// Ride rows with the same (from, to) pair are merged into one connection
    /// carrying all their lines. Fails if a connection references a station
    /// that is not listed, or if a travel time is not positive. In strict mode
    /// any integrity finding aborts the build as well.
    pub fn build(
        name: TopologyName,
        station_records: &[StationRecord],
        connection_records: &[ConnectionRecord],
        transfers: Arc<TransferTable>,
        params: &BuildParams,
    ) -> Result<Self, BuildError> {
        info!(
            "BEGIN building topology '{}' from {} stations and {} connections",
            name,
            station_records.len(),
            connection_records.len()
        );

        let mut findings = Vec::new();
        let mut stations: Vec<Station> = Vec::with_capacity(station_records.len());
        let mut by_name: FxHashMap<String, StationIndex> = FxHashMap::default();

        for record in station_records {
            if by_name.contains_key(&record.name) {
                findings.push(Finding::DuplicateStation {
                    station: record.name.clone(),
                });
                continue;
            }
            let coord = match (record.lat, record.lon) {
                (Some(lat), Some(lon)) => Some(Coord::new(lat, lon)),
                _ => None,
            };
            let mut station = Station::new(&record.name, Vec::new(), coord);
            for line in &record.lines {
                station.add_line(line);
            }
            by_name.insert(record.name.clone(), StationIndex::new(stations.len()));
            stations.push(station);
        }

        let resolve = |station: &str, record: &ConnectionRecord| {
            by_name
                .get(station)
                .copied()
                .ok_or_else(|| BuildError::UnknownStation {
                    station: station.to_string(),
                    referenced_by: format!("{} -> {}", record.from, record.to),
                })
        };

        let mut connections: Vec<Connection> = Vec::with_capacity(connection_records.len());
        let mut rides: FxHashMap<(StationIndex, StationIndex), usize> = FxHashMap::default();

        for record in connection_records {
            let source = resolve(&record.from, record)?;
            let target = resolve(&record.to, record)?;

            let minutes = record.minutes.unwrap_or(params.default_ride_minutes);
            // Also rejects NaN
            if !(minutes > 0.0) {
                return Err(BuildError::InvalidTravelTime {
                    from: record.from.clone(),
                    to: record.to.clone(),
                    minutes,
                });
            }

            match &record.to_line {
                Some(to_line) if record.is_transfer() => {
                    stations[source.index()].add_line(&record.line);
                    stations[target.index()].add_line(to_line);
                    connections.push(Connection::transfer(
                        source,
                        target,
                        minutes,
                        &record.line,
                        to_line,
                    ));
                }
                _ => {
                    stations[source.index()].add_line(&record.line);
                    stations[target.index()].add_line(&record.line);
                    if let Some(&existing) = rides.get(&(source, target)) {
                        let connection: &mut Connection = &mut connections[existing];
                        if !connection.lines.contains(&record.line) {
                            connection.lines.push(record.line.clone());
                        }
                        continue;
                    }
                    rides.insert((source, target), connections.len());
                    connections.push(Connection::ride(source, target, minutes, &record.line));
                }
            }
        }

        for station in stations.iter().filter(|s| s.lines.is_empty()) {
            findings.push(Finding::StationWithoutLines {
                station: station.name.clone(),
            });
        }

        let mut topology = Self::assemble(name, stations, connections, transfers);
        findings.extend(topology.symmetry_check());
        findings.extend(topology.transfers.findings().iter().cloned());
        let report = IntegrityReport::new(findings);

        if !report.is_clean() {
            if params.strict {
                warn!(
                    "Topology '{}' rejected: {} integrity findings",
                    name,
                    report.len()
                );
                return Err(BuildError::Integrity(report));
            }
            for finding in report.iter() {
                warn!("{}: {}", name, finding);
            }
        }
        topology.report = report;

        info!(
            "FINISHED building topology '{}': {} stations, {} connections, {} findings",
            name,
            topology.station_count(),
            topology.connection_count(),
            topology.report.len()
        );
        Ok(topology)
    }

    /// Wires up adjacency for already validated stations and connections.
    pub(crate) fn assemble(
        name: TopologyName,
        stations: Vec<Station>,
        connections: Vec<Connection>,
        transfers: Arc<TransferTable>,
    ) -> Self {
        assert!(
            StationIndex::end().index() > stations.len(),
            "Maximum number of stations for index type {} exceeded",
            std::any::type_name::<DefaultIdx>()
        );
        assert!(
            ConnectionIndex::<DefaultIdx>::end().index() > connections.len(),
            "Maximum number of connections for index type {} exceeded",
            std::any::type_name::<DefaultIdx>()
        );

        let mut edges_out = vec![Vec::new(); stations.len()];
        let mut edges_in = vec![Vec::new(); stations.len()];
        for (i, connection) in connections.iter().enumerate() {
            edges_out[connection.source.index()].push(ConnectionIndex::new(i));
            edges_in[connection.target.index()].push(ConnectionIndex::new(i));
        }

        let by_name = stations
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), StationIndex::new(i)))
            .collect();

        NetworkTopology {
            name,
            stations,
            connections,
            edges_out,
            edges_in,
            by_name,
            transfers,
            report: IntegrityReport::default(),
        }
    }

    pub(crate) fn set_report(&mut self, report: IntegrityReport) {
        self.report = report;
    }

    pub fn name(&self) -> TopologyName {
        self.name
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn station_index(&self, name: &str) -> Option<StationIndex> {
        self.by_name.get(name).copied()
    }

    /// **Panics** if the index does not belong to this topology
    pub fn station(&self, idx: StationIndex) -> &Station {
        &self.stations[idx.index()]
    }

    pub fn station_by_name(&self, name: &str) -> Option<&Station> {
        self.station_index(name).map(|idx| self.station(idx))
    }

    /// Returns an iterator over all stations in insertion order
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// **Panics** if the index does not belong to this topology
    pub fn connection(&self, idx: ConnectionIndex) -> &Connection {
        &self.connections[idx.index()]
    }

    /// Returns an iterator over all connections in insertion order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Outgoing connections of `station` in the order of the reference data.
    pub fn neighbors(
        &self,
        station: StationIndex,
    ) -> impl Iterator<Item = (ConnectionIndex, &Connection)> + '_ {
        self.edges_out[station.index()]
            .iter()
            .map(move |idx| (*idx, &self.connections[idx.index()]))
    }

    /// Incoming connections of `station`.
    pub fn neighbors_incoming(
        &self,
        station: StationIndex,
    ) -> impl Iterator<Item = (ConnectionIndex, &Connection)> + '_ {
        self.edges_in[station.index()]
            .iter()
            .map(move |idx| (*idx, &self.connections[idx.index()]))
    }

    pub fn out_degree(&self, station: StationIndex) -> usize {
        self.edges_out[station.index()].len()
    }

    pub fn in_degree(&self, station: StationIndex) -> usize {
        self.edges_in[station.index()].len()
    }

    pub fn transfers(&self) -> &Arc<TransferTable> {
        &self.transfers
    }

    pub fn transfer(&self, station: &str, from_line: &str, to_line: &str) -> Option<&Transfer> {
        self.transfers.get(station, from_line, to_line)
    }

    /// Findings collected while building this topology
    pub fn integrity(&self) -> &IntegrityReport {
        &self.report
    }

    /// Reports every connection without a reverse edge, and every ride whose
    /// reverse ride takes a different time. Transfer edges may differ in time
    /// by direction.
    pub fn symmetry_check(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        for connection in self.connections.iter() {
            let reverse: Vec<&Connection> = self
                .neighbors(connection.target)
                .map(|(_, c)| c)
                .filter(|c| c.target == connection.source)
                .collect();

            let from = &self.station(connection.source).name;
            let to = &self.station(connection.target).name;

            if reverse.is_empty() {
                findings.push(Finding::AsymmetricConnection {
                    from: from.clone(),
                    to: to.clone(),
                });
                continue;
            }

            if connection.kind == ConnectionKind::Ride {
                let reverse_ride = reverse.iter().find(|c| c.kind == ConnectionKind::Ride);
                if let Some(reverse_ride) = reverse_ride {
                    if (reverse_ride.minutes - connection.minutes).abs() > f64::EPSILON {
                        findings.push(Finding::RideTimeMismatch {
                            from: from.clone(),
                            to: to.clone(),
                            forward: connection.minutes,
                            backward: reverse_ride.minutes,
                        });
                    }
                }
            }
        }

        debug!(
            "Symmetry check on '{}': {} findings",
            self.name,
            findings.len()
        );
        findings
    }

    pub fn print_info(&self) {
        println!(
            "Topology '{}':\t#Stations: {}, #Connections: {}, #Transfers: {}, #Findings: {}",
            self.name,
            self.stations.len(),
            self.connections.len(),
            self.transfers.len(),
            self.report.len()
        );
    }
}

/// The current and the planned topology, sharing one transfer table.
#[derive(Debug, Clone)]
pub struct Network {
    today: Arc<NetworkTopology>,
    future: Arc<NetworkTopology>,
}

impl Network {
    /// Builds "today" from the current tables and "future" from the current
    /// tables merged with the planned ones.
    pub fn build(tables: &ReferenceTables, params: &BuildParams) -> Result<Self, BuildError> {
        let transfers = Arc::new(TransferTable::from_records(
            &tables.transfers.records,
            params.transfer_asymmetry_secs,
        ));

        let today = NetworkTopology::build(
            TopologyName::Today,
            &tables.stations.records,
            &tables.connections.records,
            Arc::clone(&transfers),
            params,
        )?;

        let future_stations =
            merge_stations(&tables.stations.records, &tables.future_stations.records);
        let future_connections: Vec<ConnectionRecord> = tables
            .connections
            .records
            .iter()
            .chain(tables.future_connections.records.iter())
            .cloned()
            .collect();

        let future = NetworkTopology::build(
            TopologyName::Future,
            &future_stations,
            &future_connections,
            transfers,
            params,
        )?;

        Ok(Network {
            today: Arc::new(today),
            future: Arc::new(future),
        })
    }

    pub fn from_dir(dir: &Path, params: &BuildParams) -> anyhow::Result<Self> {
        let tables = ReferenceTables::from_dir(dir)?;
        Network::build(&tables, params)
            .with_context(|| format!("Failed to build network from {}", dir.display()))
    }

    pub fn topology(&self, name: TopologyName) -> &Arc<NetworkTopology> {
        match name {
            TopologyName::Today => &self.today,
            TopologyName::Future => &self.future,
        }
    }

    pub fn today(&self) -> &Arc<NetworkTopology> {
        &self.today
    }

    pub fn future(&self) -> &Arc<NetworkTopology> {
        &self.future
    }
}

/// Planned station records extend existing stations with the same name.
fn merge_stations(current: &[StationRecord], planned: &[StationRecord]) -> Vec<StationRecord> {
    let mut merged = current.to_vec();
    for record in planned {
        match merged.iter_mut().find(|s| s.name == record.name) {
            Some(existing) => {
                for line in &record.lines {
                    if !existing.lines.contains(line) {
                        existing.lines.push(line.clone());
                    }
                }
                if existing.lat.is_none() || existing.lon.is_none() {
                    existing.lat = record.lat;
                    existing.lon = record.lon;
                }
            }
            None => merged.push(record.clone()),
        }
    }
    merged
}

/// Macro to create ride records between two stations
/// ride!("A" => "B", "L1", 2.0) only from A to B
/// ride!("A", "B", "L1", 2.0) in both directions
#[macro_export]
macro_rules! ride {
    ($from:expr => $to:expr, $line:expr, $minutes:expr) => {
        vec![$crate::transit_reader::ConnectionRecord::ride(
            $from, $to, $line, $minutes,
        )]
    };
    ($from:expr , $to:expr, $line:expr, $minutes:expr) => {
        vec![
            $crate::transit_reader::ConnectionRecord::ride($from, $to, $line, $minutes),
            $crate::transit_reader::ConnectionRecord::ride($to, $from, $line, $minutes),
        ]
    };
}

/// Macro to create transfer records in both directions
/// transfer!("A", "B", "NSL", "EWL", 2.0)
#[macro_export]
macro_rules! transfer {
    ($from:expr, $to:expr, $from_line:expr, $to_line:expr, $minutes:expr) => {
        vec![
            $crate::transit_reader::ConnectionRecord::transfer(
                $from, $to, $from_line, $to_line, $minutes,
            ),
            $crate::transit_reader::ConnectionRecord::transfer(
                $to, $from, $to_line, $from_line, $minutes,
            ),
        ]
    };
}

/// Macro to create a station record with lines and coordinates
/// station!("A", ["L1", "L2"], 1.3, 103.8)
#[macro_export]
macro_rules! station {
    ($name:expr, $lines:expr, $lat:expr, $lon:expr) => {
        $crate::transit_reader::StationRecord::new($name, &$lines, $lat, $lon)
    };
}
