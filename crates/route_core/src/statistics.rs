use std::{
    fmt::{Debug, Display},
    time::{Duration, Instant},
};

use histogram::Histogram;

use crate::network::{NetworkTopology, StationIndex};

#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub stations_expanded: usize,
    /// A* only: closed stations expanded again with a strictly better cost
    pub reopened: usize,
    pub peak_frontier: usize,
    pub duration: Option<Duration>,
    start_time: Option<Instant>,
}

impl SearchStats {
    pub fn reset(&mut self) {
        *self = SearchStats::default();
    }

    pub fn init(&mut self) {
        self.reset();
        self.start_timer();
    }

    fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        if let Some(start_time) = self.start_time {
            self.duration = Some(start_time.elapsed());
        }
    }

    pub fn observe_frontier(&mut self, len: usize) {
        self.peak_frontier = self.peak_frontier.max(len);
    }
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stats: {} stations expanded ({} reopened, peak frontier {}) in {:?}",
            self.stations_expanded, self.reopened, self.peak_frontier, self.duration
        )
    }
}

pub fn degree_out_hist(t: &NetworkTopology) -> Histogram {
    let hist = Histogram::new(0, 10, 30).unwrap();
    for station in 0..t.station_count() {
        let degree = t.out_degree(StationIndex::new(station));
        hist.increment(degree as u64, 1).unwrap();
    }
    hist
}

pub fn average_out_degree(t: &NetworkTopology) -> f64 {
    if t.station_count() == 0 {
        return 0.0;
    }
    t.connection_count() as f64 / t.station_count() as f64
}
