use std::{path::PathBuf, sync::Arc};

use transit_reader::TransferRecord;

use crate::{
    network::{BuildParams, Network, NetworkTopology, TopologyName},
    ride, station, transfer,
    transfer::TransferTable,
};

pub fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data")
}

fn build(
    stations: &[transit_reader::StationRecord],
    connections: &[transit_reader::ConnectionRecord],
    transfers: TransferTable,
) -> NetworkTopology {
    NetworkTopology::build(
        TopologyName::Today,
        stations,
        connections,
        Arc::new(transfers),
        &BuildParams::default(),
    )
    .unwrap()
}

fn west_line_records() -> (
    Vec<transit_reader::StationRecord>,
    Vec<transit_reader::ConnectionRecord>,
) {
    let stations = vec![
        station!("Jurong East", ["NSL", "EWL"], 1.3332, 103.7422),
        station!("Bukit Batok", ["NSL"], 1.3490, 103.7496),
        station!("Bukit Gombak", ["NSL"], 1.3587, 103.7518),
        station!("Clementi", ["EWL"], 1.3151, 103.7652),
        station!("Dover", ["EWL"], 1.3114, 103.7786),
        station!("Buona Vista", ["EWL"], 1.3073, 103.7901),
    ];

    let mut connections = Vec::new();
    connections.extend(ride!("Jurong East", "Bukit Batok", "NSL", 3.0));
    connections.extend(ride!("Bukit Batok", "Bukit Gombak", "NSL", 2.0));
    connections.extend(ride!("Jurong East", "Clementi", "EWL", 4.0));
    connections.extend(ride!("Clementi", "Dover", "EWL", 2.0));
    connections.extend(ride!("Dover", "Buona Vista", "EWL", 2.0));

    (stations, connections)
}

/// Bukit Gombak - Bukit Batok - Jurong East - Clementi - Dover - Buona Vista
///
/// NSL north of Jurong East, EWL east of it, no transfer records.
pub fn west_line() -> NetworkTopology {
    let (stations, connections) = west_line_records();
    build(&stations, &connections, TransferTable::default())
}

/// [`west_line`] with interchange times at Jurong East: 240 s from NSL to
/// EWL, 180 s back.
pub fn west_line_interchange() -> NetworkTopology {
    let (stations, connections) = west_line_records();
    let transfers = TransferTable::from_records(
        &[
            TransferRecord::new("Jurong East", "NSL", "EWL", 240),
            TransferRecord::new("Jurong East", "EWL", "NSL", 180),
        ],
        60,
    );
    build(&stations, &connections, transfers)
}

/// Jurong East and City Hall joined by a single transfer edge NSL -> EWL
pub fn jurong_city_hall() -> NetworkTopology {
    let stations = vec![
        station!("Jurong East", ["NSL", "EWL"], 1.3332, 103.7422),
        station!("City Hall", ["NSL", "EWL"], 1.2931, 103.8520),
    ];
    let connections = transfer!("Jurong East", "City Hall", "NSL", "EWL", 20.0);
    let transfers = TransferTable::from_records(
        &[
            TransferRecord::new("Jurong East", "NSL", "EWL", 10),
            TransferRecord::new("City Hall", "EWL", "NSL", 10),
        ],
        60,
    );

    build(&stations, &connections, transfers)
}

/// Two routes from S to T:
///
/// ```text
///      B
///    /   \
///   S--A--T
/// ```
/// S-A-T looks shorter but takes 40 minutes, S-B-T takes 12.
pub fn detour_network() -> NetworkTopology {
    let stations = vec![
        station!("S", ["L1", "L2"], 1.30, 103.70),
        station!("A", ["L1"], 1.30, 103.75),
        station!("T", ["L1", "L2"], 1.30, 103.80),
        station!("B", ["L2"], 1.35, 103.75),
    ];

    let mut connections = Vec::new();
    connections.extend(ride!("S", "A", "L1", 20.0));
    connections.extend(ride!("A", "T", "L1", 20.0));
    connections.extend(ride!("S", "B", "L2", 6.0));
    connections.extend(ride!("B", "T", "L2", 6.0));

    build(&stations, &connections, TransferTable::default())
}

/// S - N - M - T at one minute per hop and a direct S - T ride of 50 minutes.
/// S and M have no coordinates, N lies about 90 km from T.
pub fn unlocated_shortcut() -> NetworkTopology {
    let stations = vec![
        transit_reader::StationRecord::unlocated("S", &["L1"]),
        station!("N", ["L1"], 1.30, 103.70),
        transit_reader::StationRecord::unlocated("M", &["L1"]),
        station!("T", ["L1"], 1.30, 104.50),
    ];

    let mut connections = Vec::new();
    connections.extend(ride!("S", "N", "L1", 1.0));
    connections.extend(ride!("N", "M", "L1", 1.0));
    connections.extend(ride!("M", "T", "L1", 1.0));
    connections.extend(ride!("S", "T", "L1", 50.0));

    build(&stations, &connections, TransferTable::default())
}

/// A - B - C and D - E without any connection in between
pub fn disconnected() -> NetworkTopology {
    let stations = vec![
        station!("A", ["L1"], 1.30, 103.70),
        station!("B", ["L1"], 1.31, 103.71),
        station!("C", ["L1"], 1.32, 103.72),
        station!("D", ["L2"], 1.40, 103.90),
        station!("E", ["L2"], 1.41, 103.91),
    ];

    let mut connections = Vec::new();
    connections.extend(ride!("A", "B", "L1", 2.0));
    connections.extend(ride!("B", "C", "L1", 2.0));
    connections.extend(ride!("D", "E", "L2", 3.0));

    build(&stations, &connections, TransferTable::default())
}

/// Both topologies built from the CSV tables in `test_data/`
pub fn test_network() -> Network {
    Network::from_dir(&test_data_dir(), &BuildParams::default()).unwrap()
}

/// The current topology of the CSV test data
pub fn central_network() -> NetworkTopology {
    test_network().today().as_ref().clone()
}
