//! Reader for transit reference data stored as CSV tables.
//!
//! Every table is read row by row. A row that misses a required field or
//! carries an unparsable number is reported as a [`RowIssue`] and skipped, the
//! rest of the table is kept. A leading UTF-8 byte-order mark is stripped
//! before parsing.
use anyhow::Context;
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::{fmt, fs, path::Path};

mod rows;
use rows::{RawConnection, RawStation, RawTransfer};

pub const STATIONS_FILE: &str = "stations.csv";
pub const CONNECTIONS_FILE: &str = "connections.csv";
pub const FUTURE_STATIONS_FILE: &str = "future_stations.csv";
pub const FUTURE_CONNECTIONS_FILE: &str = "future_connections.csv";
pub const TRANSFERS_FILE: &str = "transfers.csv";

/// A station as listed in the reference data.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub name: String,
    pub lines: Vec<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl StationRecord {
    pub fn new(name: &str, lines: &[&str], lat: f64, lon: f64) -> Self {
        StationRecord {
            name: name.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    /// Station without a known location.
    pub fn unlocated(name: &str, lines: &[&str]) -> Self {
        StationRecord {
            name: name.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            lat: None,
            lon: None,
        }
    }
}

/// One directed row of the connection table.
///
/// If `to_line` is set and differs from `line` the row describes a line change
/// that happens at `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRecord {
    pub from: String,
    pub to: String,
    pub line: String,
    pub to_line: Option<String>,
    pub minutes: Option<f64>,
}

impl ConnectionRecord {
    pub fn ride(from: &str, to: &str, line: &str, minutes: f64) -> Self {
        ConnectionRecord {
            from: from.to_string(),
            to: to.to_string(),
            line: line.to_string(),
            to_line: None,
            minutes: Some(minutes),
        }
    }

    pub fn transfer(from: &str, to: &str, from_line: &str, to_line: &str, minutes: f64) -> Self {
        ConnectionRecord {
            from: from.to_string(),
            to: to.to_string(),
            line: from_line.to_string(),
            to_line: Some(to_line.to_string()),
            minutes: Some(minutes),
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(&self.to_line, Some(to_line) if *to_line != self.line)
    }
}

/// Walking time between two lines of one interchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub station: String,
    pub from_line: String,
    pub code_from: String,
    pub to_line: String,
    pub code_to: String,
    pub seconds: u32,
    pub direction: Option<String>,
    pub peak_hour: Option<bool>,
}

impl TransferRecord {
    pub fn new(station: &str, from_line: &str, to_line: &str, seconds: u32) -> Self {
        TransferRecord {
            station: station.to_string(),
            from_line: from_line.to_string(),
            code_from: String::new(),
            to_line: to_line.to_string(),
            code_to: String::new(),
            seconds,
            direction: None,
            peak_hour: None,
        }
    }
}

/// A skipped row. `row` is the 1-based position of the record below the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub row: usize,
    pub reason: String,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Parsed rows of one table together with the rows that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    pub records: Vec<T>,
    pub issues: Vec<RowIssue>,
}

impl<T> Table<T> {
    pub fn empty() -> Self {
        Table {
            records: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::empty()
    }
}

fn parse_table<R, T>(name: &str, text: &str, convert: impl Fn(R) -> Result<T, String>) -> Table<T>
where
    R: DeserializeOwned,
{
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut table = Table::empty();
    for (i, result) in reader.deserialize::<R>().enumerate() {
        let row = i + 1;
        match result.map_err(|e| e.to_string()).and_then(&convert) {
            Ok(record) => table.records.push(record),
            Err(reason) => {
                warn!("{}: skipping row {}: {}", name, row, reason);
                table.issues.push(RowIssue { row, reason });
            }
        }
    }

    info!(
        "{}: loaded {} records, skipped {}",
        name,
        table.records.len(),
        table.issues.len()
    );
    table
}

fn read_table<R, T>(path: &Path, convert: impl Fn(R) -> Result<T, String>) -> anyhow::Result<Table<T>>
where
    R: DeserializeOwned,
{
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parse_table(&name, &text, convert))
}

fn read_optional_table<R, T>(
    path: &Path,
    convert: impl Fn(R) -> Result<T, String>,
) -> anyhow::Result<Table<T>>
where
    R: DeserializeOwned,
{
    if path.exists() {
        read_table(path, convert)
    } else {
        info!("{} not present, using an empty table", path.display());
        Ok(Table::empty())
    }
}

pub fn parse_stations(text: &str) -> Table<StationRecord> {
    parse_table(STATIONS_FILE, text, RawStation::into_record)
}

pub fn parse_connections(text: &str) -> Table<ConnectionRecord> {
    parse_table(CONNECTIONS_FILE, text, RawConnection::into_record)
}

pub fn parse_transfers(text: &str) -> Table<TransferRecord> {
    parse_table(TRANSFERS_FILE, text, RawTransfer::into_record)
}

pub fn read_stations(path: &Path) -> anyhow::Result<Table<StationRecord>> {
    read_table(path, RawStation::into_record)
}

pub fn read_connections(path: &Path) -> anyhow::Result<Table<ConnectionRecord>> {
    read_table(path, RawConnection::into_record)
}

pub fn read_transfers(path: &Path) -> anyhow::Result<Table<TransferRecord>> {
    read_table(path, RawTransfer::into_record)
}

/// All reference tables of one data directory.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub stations: Table<StationRecord>,
    pub connections: Table<ConnectionRecord>,
    pub future_stations: Table<StationRecord>,
    pub future_connections: Table<ConnectionRecord>,
    pub transfers: Table<TransferRecord>,
}

impl ReferenceTables {
    /// Reads the tables from `dir`. The current network tables and the
    /// transfer table are required, the planned network tables are optional.
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        info!("BEGIN reading reference data from {}", dir.display());
        let now = std::time::Instant::now();

        let tables = ReferenceTables {
            stations: read_stations(&dir.join(STATIONS_FILE))?,
            connections: read_connections(&dir.join(CONNECTIONS_FILE))?,
            future_stations: read_optional_table(
                &dir.join(FUTURE_STATIONS_FILE),
                RawStation::into_record,
            )?,
            future_connections: read_optional_table(
                &dir.join(FUTURE_CONNECTIONS_FILE),
                RawConnection::into_record,
            )?,
            transfers: read_transfers(&dir.join(TRANSFERS_FILE))?,
        };

        info!("FINISHED reading reference data. Took {:?}", now.elapsed());
        Ok(tables)
    }

    /// Skipped rows of every table, labelled with the table's file name.
    pub fn issues(&self) -> Vec<(&'static str, &RowIssue)> {
        let mut issues = Vec::new();
        issues.extend(self.stations.issues.iter().map(|i| (STATIONS_FILE, i)));
        issues.extend(self.connections.issues.iter().map(|i| (CONNECTIONS_FILE, i)));
        issues.extend(
            self.future_stations
                .issues
                .iter()
                .map(|i| (FUTURE_STATIONS_FILE, i)),
        );
        issues.extend(
            self.future_connections
                .issues
                .iter()
                .map(|i| (FUTURE_CONNECTIONS_FILE, i)),
        );
        issues.extend(self.transfers.issues.iter().map(|i| (TRANSFERS_FILE, i)));
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_data() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
    }

    #[test]
    fn parse_stations_with_and_without_type_column() {
        let with_type = "station_name,type,lat,lng\nJurong East,MRT,1.3332,103.7428\n";
        let without_type = "station_name,lat,lng\nJurong East,1.3332,103.7428\n";

        for text in [with_type, without_type] {
            let table = parse_stations(text);
            assert!(table.issues.is_empty());
            assert_eq!(table.records.len(), 1);
            assert_eq!(table.records[0].name, "Jurong East");
            assert_eq!(table.records[0].lat, Some(1.3332));
            assert_eq!(table.records[0].lon, Some(103.7428));
        }
    }

    #[test]
    fn station_lines_are_split() {
        let table = parse_stations("station_name,lat,lng,lines\nDhoby Ghaut,1.2989,103.8456,NSL;NEL;CCL\n");
        assert_eq!(table.records[0].lines, vec!["NSL", "NEL", "CCL"]);
    }

    #[test]
    fn malformed_rows_are_skipped_individually() {
        let text = "\
Station,Destination,Line,Minutes
Jurong East,Clementi,EWL,3
,Clementi,EWL,3
Clementi,Dover,EWL,abc
Dover,Buona Vista,EWL,
";
        let table = parse_connections(text);

        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].minutes, Some(3.0));
        assert_eq!(table.records[1].minutes, None);
        assert_eq!(table.issues.len(), 2);
        assert_eq!(table.issues[0].row, 2);
        assert_eq!(table.issues[1].row, 3);
    }

    #[test]
    fn transfer_rows_with_transfer_column() {
        let table = parse_connections(
            "Station,Destination,Line,To Line,Minutes\nJurong East,City Hall,NSL,EWL,20\n",
        );
        assert!(table.records[0].is_transfer());
        assert_eq!(table.records[0].to_line.as_deref(), Some("EWL"));
    }

    #[test]
    fn same_line_in_transfer_column_is_a_ride() {
        let table =
            parse_connections("Station,Destination,Line,To Line\nBishan,Braddell,NSL,NSL\n");
        assert!(!table.records[0].is_transfer());
    }

    #[test]
    fn transfer_table_tolerates_bom() {
        let text = "\u{feff}Station Name,Start Line,Start Code,End Line,End Code,Transfer time in seconds\n\
                    Jurong East,NSL,NS1,EWL,EW24,10\n";
        let table = parse_transfers(text);

        assert!(table.issues.is_empty());
        assert_eq!(table.records.len(), 1);
        let t = &table.records[0];
        assert_eq!(t.station, "Jurong East");
        assert_eq!(t.code_from, "NS1");
        assert_eq!(t.code_to, "EW24");
        assert_eq!(t.seconds, 10);
        assert_eq!(t.peak_hour, None);
    }

    #[test]
    fn transfer_metadata_is_optional() {
        let text = "Station Name,Start Line,Start Code,End Line,End Code,Transfer time in seconds,Direction,Peak\n\
                    Bishan,NSL,NS17,CCL,CC15,110,northbound,yes\n\
                    Bishan,CCL,CC15,NSL,NS17,100,,\n\
                    Bishan,CCL,CC15,NSL,NS17,,,\n";
        let table = parse_transfers(text);

        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].direction.as_deref(), Some("northbound"));
        assert_eq!(table.records[0].peak_hour, Some(true));
        assert_eq!(table.records[1].direction, None);
        assert_eq!(table.issues.len(), 1);
        assert_eq!(table.issues[0].row, 3);
    }

    #[test]
    fn read_from_dir() {
        let tables = ReferenceTables::from_dir(&test_data()).unwrap();

        assert_eq!(tables.stations.len(), 6);
        assert_eq!(tables.connections.len(), 10);
        assert_eq!(tables.future_connections.len(), 2);
        assert_eq!(tables.future_stations.len(), 1);
        assert_eq!(tables.transfers.len(), 2);
        assert_eq!(tables.issues().len(), 1);
    }

    #[test]
    fn missing_optional_tables_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        for (file, content) in [
            (STATIONS_FILE, "station_name,lat,lng\nA,1.0,103.0\n"),
            (CONNECTIONS_FILE, "Station,Destination,Line\n"),
            (TRANSFERS_FILE, "\u{feff}Station Name,Start Line,Start Code,End Line,End Code,Transfer time in seconds\n"),
        ] {
            let mut f = fs::File::create(dir.path().join(file)).unwrap();
            f.write_all(content.as_bytes()).unwrap();
        }

        let tables = ReferenceTables::from_dir(dir.path()).unwrap();
        assert_eq!(tables.stations.len(), 1);
        assert!(tables.future_connections.is_empty());
        assert!(tables.future_stations.is_empty());
    }

    #[test]
    fn missing_required_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ReferenceTables::from_dir(dir.path()).is_err());
    }
}
