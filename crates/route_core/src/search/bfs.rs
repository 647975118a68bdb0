use crate::{error::SearchError, statistics::SearchStats};

use super::{
    first_visit_search, frontier::FifoFrontier, path::PathResult, RouteSearch, SearchContext,
    Strategy,
};

/// Breadth-first search. Finds a path with the fewest connections, ignoring costs.
pub struct Bfs<'a> {
    pub stats: SearchStats,
    ctx: SearchContext<'a>,
}

impl<'a> Bfs<'a> {
    pub fn new(ctx: SearchContext<'a>) -> Self {
        Bfs {
            stats: SearchStats::default(),
            ctx,
        }
    }
}

impl RouteSearch for Bfs<'_> {
    fn search(&mut self, source: &str, target: &str) -> Result<PathResult, SearchError> {
        first_visit_search(
            &self.ctx,
            &mut self.stats,
            Strategy::BreadthFirst,
            source,
            target,
            FifoFrontier::default(),
            |_, _, _| 0.0,
        )
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn strategy(&self) -> Strategy {
        Strategy::BreadthFirst
    }
}
