use crate::{error::SearchError, statistics::SearchStats};

use super::{
    first_visit_search, frontier::LifoFrontier, path::PathResult, RouteSearch, SearchContext,
    Strategy,
};

/// Depth-first search. Follows the first listed connection as deep as
/// possible before backtracking. No guarantee on hops or cost.
pub struct Dfs<'a> {
    pub stats: SearchStats,
    ctx: SearchContext<'a>,
}

impl<'a> Dfs<'a> {
    pub fn new(ctx: SearchContext<'a>) -> Self {
        Dfs {
            stats: SearchStats::default(),
            ctx,
        }
    }
}

impl RouteSearch for Dfs<'_> {
    fn search(&mut self, source: &str, target: &str) -> Result<PathResult, SearchError> {
        first_visit_search(
            &self.ctx,
            &mut self.stats,
            Strategy::DepthFirst,
            source,
            target,
            LifoFrontier::default(),
            |_, _, _| 0.0,
        )
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn strategy(&self) -> Strategy {
        Strategy::DepthFirst
    }
}
