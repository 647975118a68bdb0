use thiserror::Error;

use crate::{constants::Weight, integrity::IntegrityReport};

/// Outcomes of a search that did not produce a path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("Unknown station: {0}")]
    UnknownStation(String),
    /// The frontier ran empty before the destination was reached
    #[error("No path from {from} to {to} ({expanded} stations expanded)")]
    NoPath {
        from: String,
        to: String,
        expanded: usize,
    },
    #[error("Search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Number of stations expanded before the search gave up
    pub fn expanded(&self) -> usize {
        match self {
            SearchError::NoPath { expanded, .. } => *expanded,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Connection {referenced_by} references unknown station {station}")]
    UnknownStation {
        station: String,
        referenced_by: String,
    },
    #[error("Invalid travel time {minutes} min for {from} -> {to}")]
    InvalidTravelTime {
        from: String,
        to: String,
        minutes: Weight,
    },
    #[error("Data integrity check failed with {} findings", .0.len())]
    Integrity(IntegrityReport),
}
