use std::fmt;

use crate::constants::Weight;

/// A single data-integrity problem found while building a topology.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// A -> B exists but B -> A does not
    AsymmetricConnection { from: String, to: String },
    RideTimeMismatch {
        from: String,
        to: String,
        forward: Weight,
        backward: Weight,
    },
    /// Transfer times between two lines differ by direction above the threshold
    TransferAsymmetry {
        station: String,
        line_a: String,
        line_b: String,
        forward_secs: u32,
        backward_secs: u32,
    },
    DuplicateTransfer {
        station: String,
        from_line: String,
        to_line: String,
    },
    DuplicateStation { station: String },
    StationWithoutLines { station: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::AsymmetricConnection { from, to } => {
                write!(f, "connection {} -> {} has no reverse", from, to)
            }
            Finding::RideTimeMismatch {
                from,
                to,
                forward,
                backward,
            } => write!(
                f,
                "ride {} -> {} takes {} min, the reverse {} min",
                from, to, forward, backward
            ),
            Finding::TransferAsymmetry {
                station,
                line_a,
                line_b,
                forward_secs,
                backward_secs,
            } => write!(
                f,
                "transfer {} -> {} at {} takes {}s, the reverse {}s",
                line_a, line_b, station, forward_secs, backward_secs
            ),
            Finding::DuplicateTransfer {
                station,
                from_line,
                to_line,
            } => write!(
                f,
                "duplicate transfer {} -> {} at {}, keeping the first",
                from_line, to_line, station
            ),
            Finding::DuplicateStation { station } => {
                write!(f, "duplicate station {}, keeping the first", station)
            }
            Finding::StationWithoutLines { station } => {
                write!(f, "station {} is not served by any line", station)
            }
        }
    }
}

/// All findings of one topology build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    findings: Vec<Finding>,
}

impl IntegrityReport {
    pub fn new(findings: Vec<Finding>) -> Self {
        IntegrityReport { findings }
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "No integrity findings");
        }
        writeln!(f, "{} integrity findings:", self.len())?;
        for finding in &self.findings {
            writeln!(f, "  - {}", finding)?;
        }
        Ok(())
    }
}
