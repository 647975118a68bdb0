//! Walking times between the lines of an interchange.
use log::debug;
use rustc_hash::FxHashMap;
use transit_reader::TransferRecord;

use crate::{constants::Weight, integrity::Finding};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferKey {
    pub station: String,
    pub from_line: String,
    pub to_line: String,
}

impl TransferKey {
    pub fn new(station: &str, from_line: &str, to_line: &str) -> Self {
        TransferKey {
            station: station.to_string(),
            from_line: from_line.to_string(),
            to_line: to_line.to_string(),
        }
    }

    pub fn reversed(&self) -> Self {
        TransferKey {
            station: self.station.clone(),
            from_line: self.to_line.clone(),
            to_line: self.from_line.clone(),
        }
    }
}

/// Optional metadata, only consulted by the cost model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferMeta {
    pub direction: Option<String>,
    pub peak_hour: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub key: TransferKey,
    pub seconds: u32,
    pub code_from: String,
    pub code_to: String,
    pub meta: TransferMeta,
}

/// Difficulty from 0 (trivial) to 5 (long walk)
pub fn difficulty(seconds: u32) -> u8 {
    match seconds {
        0..=30 => 0,
        31..=60 => 1,
        61..=120 => 2,
        121..=200 => 3,
        201..=300 => 4,
        _ => 5,
    }
}

impl Transfer {
    pub fn from_record(record: &TransferRecord) -> Self {
        Transfer {
            key: TransferKey::new(&record.station, &record.from_line, &record.to_line),
            seconds: record.seconds,
            code_from: record.code_from.clone(),
            code_to: record.code_to.clone(),
            meta: TransferMeta {
                direction: record.direction.clone(),
                peak_hour: record.peak_hour.unwrap_or(false),
            },
        }
    }

    pub fn minutes(&self) -> Weight {
        self.seconds as Weight / 60.0
    }

    pub fn difficulty(&self) -> u8 {
        difficulty(self.seconds)
    }
}

/// Transfers of all interchanges, looked up by (station, from line, to line).
#[derive(Debug, Clone, Default)]
pub struct TransferTable {
    transfers: Vec<Transfer>,
    by_key: FxHashMap<TransferKey, usize>,
    findings: Vec<Finding>,
}

impl TransferTable {
    /// Duplicate keys keep the first record. Directions of one line pair
    /// differing by more than `asymmetry_secs` are kept as they are and
    /// reported.
    pub fn from_records(records: &[TransferRecord], asymmetry_secs: u32) -> Self {
        let mut table = TransferTable::default();

        for record in records {
            let transfer = Transfer::from_record(record);
            if table.by_key.contains_key(&transfer.key) {
                table.findings.push(Finding::DuplicateTransfer {
                    station: record.station.clone(),
                    from_line: record.from_line.clone(),
                    to_line: record.to_line.clone(),
                });
                continue;
            }
            table.insert(transfer);
        }

        for (i, transfer) in table.transfers.iter().enumerate() {
            let Some(&j) = table.by_key.get(&transfer.key.reversed()) else {
                continue;
            };
            // Report every pair once
            if j <= i {
                continue;
            }
            let reverse = &table.transfers[j];
            if transfer.seconds.abs_diff(reverse.seconds) > asymmetry_secs {
                table.findings.push(Finding::TransferAsymmetry {
                    station: transfer.key.station.clone(),
                    line_a: transfer.key.from_line.clone(),
                    line_b: transfer.key.to_line.clone(),
                    forward_secs: transfer.seconds,
                    backward_secs: reverse.seconds,
                });
            }
        }

        debug!(
            "Transfer table: {} transfers, {} findings",
            table.transfers.len(),
            table.findings.len()
        );
        table
    }

    fn insert(&mut self, transfer: Transfer) {
        self.by_key
            .insert(transfer.key.clone(), self.transfers.len());
        self.transfers.push(transfer);
    }

    pub fn get(&self, station: &str, from_line: &str, to_line: &str) -> Option<&Transfer> {
        self.by_key
            .get(&TransferKey::new(station, from_line, to_line))
            .map(|&i| &self.transfers[i])
    }

    pub fn at_station<'a>(&'a self, station: &'a str) -> impl Iterator<Item = &'a Transfer> + 'a {
        self.transfers
            .iter()
            .filter(move |t| t.key.station == station)
    }

    /// Copy of the table with every duration multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> TransferTable {
        assert!(factor >= 0.0, "Transfer factor must not be negative");
        let mut table = self.clone();
        for transfer in table.transfers.iter_mut() {
            transfer.seconds = (transfer.seconds as f64 * factor).round() as u32;
        }
        table
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }
}
