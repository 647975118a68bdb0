use rustc_hash::FxHashMap;

use crate::{
    constants::Weight,
    error::SearchError,
    network::{ConnectionIndex, StationIndex},
    statistics::SearchStats,
};

use super::{
    cancelled, exhausted, found,
    frontier::{Frontier, FrontierEntry, PriorityFrontier},
    path::PathResult,
    start, RouteSearch, SearchContext, Start, Strategy,
};

/// Station and the line a path arrived on. `None` only at the source.
type State<'a> = (StationIndex, Option<&'a str>);

/// A* search ordered by accumulated cost plus the heuristic estimate.
/// Finds the cheapest path as long as the estimate is admissible.
///
/// Line changes cost time, so a station reached on two lines is two states.
pub struct AStar<'a> {
    pub stats: SearchStats,
    ctx: SearchContext<'a>,
}

impl<'a> AStar<'a> {
    pub fn new(ctx: SearchContext<'a>) -> Self {
        AStar {
            stats: SearchStats::default(),
            ctx,
        }
    }
}

impl RouteSearch for AStar<'_> {
    fn search(&mut self, source: &str, target: &str) -> Result<PathResult, SearchError> {
        let ctx = self.ctx;
        let stats = &mut self.stats;
        let (s, t) = match start(&ctx, stats, Strategy::AStar, source, target)? {
            Start::Trivial(path) => return Ok(path),
            Start::Search(s, t) => (s, t),
        };

        // Best known cost and predecessor of every discovered state
        let mut best: FxHashMap<State, (Weight, Option<(State, ConnectionIndex)>)> =
            FxHashMap::default();
        let mut closed: FxHashMap<State, Weight> = FxHashMap::default();
        let mut frontier = PriorityFrontier::default();

        best.insert((s, None), (0.0, None));
        frontier.push(FrontierEntry::root(s), ctx.heuristic(s, t));
        stats.observe_frontier(frontier.len());

        while let Some(entry) = frontier.pop() {
            let state = (entry.station, entry.line);
            // Stale entry, a cheaper one was pushed later
            if best
                .get(&state)
                .is_some_and(|(cost, _)| entry.cost > *cost)
            {
                continue;
            }
            if let Some(closed_cost) = closed.get(&state) {
                if entry.cost >= *closed_cost {
                    continue;
                }
                stats.reopened += 1;
            }
            closed.insert(state, entry.cost);

            if entry.station == t {
                return Ok(found(
                    &ctx,
                    stats,
                    Strategy::AStar,
                    state,
                    |(station, _)| station,
                    |state| best.get(&state).and_then(|(_, parent)| *parent),
                ));
            }

            if ctx.is_cancelled() {
                return Err(cancelled(stats, Strategy::AStar));
            }
            stats.stations_expanded += 1;

            for (idx, connection) in ctx.expansion_order::<PriorityFrontier>(entry.station) {
                // Back at the source without a line is always cheapest
                if connection.target == s {
                    continue;
                }
                let (line, step) = ctx.step(connection, entry.line);
                let cost = entry.cost + step;
                let next = (connection.target, Some(line));
                let known = best
                    .get(&next)
                    .map_or(Weight::INFINITY, |(cost, _)| *cost);
                if cost < known {
                    best.insert(next, (cost, Some((state, idx))));
                    frontier.push(
                        FrontierEntry {
                            station: connection.target,
                            parent: Some((entry.station, idx)),
                            cost,
                            line: Some(line),
                        },
                        cost + ctx.heuristic(connection.target, t),
                    );
                }
            }
            stats.observe_frontier(frontier.len());
        }

        Err(exhausted(stats, Strategy::AStar, source, target))
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn strategy(&self) -> Strategy {
        Strategy::AStar
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        cost::{CostModel, CostParams, Heuristic},
        util::test_networks::*,
    };

    #[test]
    fn finds_cheapest_path() {
        let t = detour_network();
        let cost = CostModel::default();
        let mut astar = AStar::new(SearchContext::new(&t, &cost));

        let path = astar.search("S", "T").unwrap();
        assert_eq!(path.station_names(&t), vec!["S", "B", "T"]);
        assert_relative_eq!(path.total_cost, 12.0);
        // S and B, A is never expanded
        assert_eq!(astar.stats.stations_expanded, 2);
        assert_eq!(astar.stats.reopened, 0);
    }

    #[test]
    fn leaves_distant_branch_unexpanded() {
        let t = west_line();
        let cost = CostModel::calibrated(&t, CostParams::default());
        let mut astar = AStar::new(SearchContext::new(&t, &cost));

        let path = astar.search("Jurong East", "Buona Vista").unwrap();
        assert_eq!(path.hops(), 3);
        assert_relative_eq!(path.total_cost, 4.0 + 2.0 + 2.0);
        // Bukit Batok looks promising once, Bukit Gombak never does
        assert_eq!(astar.stats.stations_expanded, 4);
    }

    #[test]
    fn stays_on_line_when_changing_costs_more() {
        let t = west_line_interchange();
        let cost = CostModel::calibrated(&t, CostParams::default());
        let mut astar = AStar::new(SearchContext::new(&t, &cost));

        // 3 minutes to Jurong East on NSL, 4 to change to EWL, 4 to Clementi
        let path = astar.search("Bukit Batok", "Clementi").unwrap();
        assert_eq!(path.lines, ["NSL", "EWL"]);
        assert_relative_eq!(path.total_cost, 3.0 + 4.0 + 4.0);

        let back = astar.search("Clementi", "Bukit Batok").unwrap();
        assert_relative_eq!(back.total_cost, 4.0 + 3.0 + 3.0);
    }

    #[test]
    fn selected_zero_heuristic_expands_more() {
        let t = central_network();
        let straight = CostModel::calibrated(&t, CostParams::default());
        let zero = CostModel::new(CostParams::new().heuristic(Heuristic::Zero));

        let mut informed = AStar::new(SearchContext::new(&t, &straight));
        let mut uniform = AStar::new(SearchContext::new(&t, &zero));
        let a = informed.search("Jurong East", "Lavender").unwrap();
        let b = uniform.search("Jurong East", "Lavender").unwrap();

        assert_relative_eq!(a.total_cost, b.total_cost);
        assert!(uniform.stats.stations_expanded >= informed.stats.stations_expanded);
    }

    #[test]
    fn zero_heuristic_still_optimal() {
        let t = detour_network();
        // A huge speed flattens the estimate to almost nothing
        let cost = CostModel::new(CostParams::new().heuristic_speed_kmh(1e12));
        let mut astar = AStar::new(SearchContext::new(&t, &cost));

        let path = astar.search("S", "T").unwrap();
        assert_relative_eq!(path.total_cost, 12.0);
        assert_eq!(astar.stats.reopened, 0);
    }
}
