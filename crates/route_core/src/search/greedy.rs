use crate::{error::SearchError, statistics::SearchStats};

use super::{
    first_visit_search, frontier::PriorityFrontier, path::PathResult, RouteSearch,
    SearchContext, Strategy,
};

/// Greedy best-first search, always expanding the station that looks
/// closest to the destination.
pub struct GreedyBestFirst<'a> {
    pub stats: SearchStats,
    ctx: SearchContext<'a>,
}

impl<'a> GreedyBestFirst<'a> {
    pub fn new(ctx: SearchContext<'a>) -> Self {
        GreedyBestFirst {
            stats: SearchStats::default(),
            ctx,
        }
    }
}

impl RouteSearch for GreedyBestFirst<'_> {
    fn search(&mut self, source: &str, target: &str) -> Result<PathResult, SearchError> {
        let ctx = self.ctx;
        first_visit_search(
            &ctx,
            &mut self.stats,
            Strategy::GreedyBestFirst,
            source,
            target,
            PriorityFrontier::default(),
            |station, target, _| ctx.heuristic(station, target),
        )
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn strategy(&self) -> Strategy {
        Strategy::GreedyBestFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cost::CostModel, util::test_networks::*};

    #[test]
    fn heads_for_the_destination() {
        let t = west_line();
        let cost = CostModel::default();
        let mut gbfs = GreedyBestFirst::new(SearchContext::new(&t, &cost));

        let path = gbfs.search("Jurong East", "Buona Vista").unwrap();
        assert_eq!(
            path.station_names(&t),
            vec!["Jurong East", "Clementi", "Dover", "Buona Vista"]
        );
        // The NSL branch is never touched
        assert_eq!(gbfs.stats.stations_expanded, 3);
    }

    #[test]
    fn misled_by_straight_line() {
        let t = detour_network();
        let cost = CostModel::default();
        let mut gbfs = GreedyBestFirst::new(SearchContext::new(&t, &cost));

        let path = gbfs.search("S", "T").unwrap();
        assert_eq!(path.station_names(&t), vec!["S", "A", "T"]);
        assert_eq!(path.total_cost, 40.0);
    }
}
