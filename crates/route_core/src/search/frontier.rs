use std::collections::{BinaryHeap, VecDeque};

use crate::{
    constants::Weight,
    network::{ConnectionIndex, StationIndex},
};

/// A station waiting to be expanded, with the connection it was reached through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FrontierEntry<'a> {
    pub station: StationIndex,
    pub parent: Option<(StationIndex, ConnectionIndex)>,
    /// Accumulated cost from the source
    pub cost: Weight,
    /// Line the path arrived on, `None` at the source
    pub line: Option<&'a str>,
}

impl FrontierEntry<'_> {
    pub fn root(station: StationIndex) -> Self {
        FrontierEntry {
            station,
            parent: None,
            cost: 0.0,
            line: None,
        }
    }
}

pub(crate) trait Frontier<'a> {
    /// Push neighbors in reverse order, so that the first listed neighbor is popped first
    const REVERSE_NEIGHBORS: bool = false;

    fn push(&mut self, entry: FrontierEntry<'a>, priority: Weight);
    fn pop(&mut self) -> Option<FrontierEntry<'a>>;
    fn len(&self) -> usize;
}

#[derive(Debug, Default)]
pub(crate) struct FifoFrontier<'a> {
    queue: VecDeque<FrontierEntry<'a>>,
}

impl<'a> Frontier<'a> for FifoFrontier<'a> {
    fn push(&mut self, entry: FrontierEntry<'a>, _priority: Weight) {
        self.queue.push_back(entry);
    }

    fn pop(&mut self) -> Option<FrontierEntry<'a>> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Debug, Default)]
pub(crate) struct LifoFrontier<'a> {
    stack: Vec<FrontierEntry<'a>>,
}

impl<'a> Frontier<'a> for LifoFrontier<'a> {
    const REVERSE_NEIGHBORS: bool = true;

    fn push(&mut self, entry: FrontierEntry<'a>, _priority: Weight) {
        self.stack.push(entry);
    }

    fn pop(&mut self) -> Option<FrontierEntry<'a>> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

#[derive(Debug)]
struct Candidate<'a> {
    priority: Weight,
    seq: u64,
    entry: FrontierEntry<'a>,
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl Ord for Candidate<'_> {
    // Reversed, so the max-heap pops the lowest priority. Ties go to the earlier push.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue with insertion-order tie breaking
#[derive(Debug, Default)]
pub(crate) struct PriorityFrontier<'a> {
    heap: BinaryHeap<Candidate<'a>>,
    seq: u64,
}

impl<'a> Frontier<'a> for PriorityFrontier<'a> {
    fn push(&mut self, entry: FrontierEntry<'a>, priority: Weight) {
        self.heap.push(Candidate {
            priority,
            seq: self.seq,
            entry,
        });
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<FrontierEntry<'a>> {
        self.heap.pop().map(|c| c.entry)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize) -> FrontierEntry<'static> {
        FrontierEntry::root(StationIndex::new(i))
    }

    fn drain(frontier: &mut impl Frontier<'static>) -> Vec<usize> {
        std::iter::from_fn(|| frontier.pop())
            .map(|e| e.station.index())
            .collect()
    }

    #[test]
    fn fifo_and_lifo_order() {
        let mut fifo = FifoFrontier::default();
        let mut lifo = LifoFrontier::default();
        for i in 0..3 {
            fifo.push(entry(i), 0.0);
            lifo.push(entry(i), 0.0);
        }
        assert_eq!(fifo.len(), 3);
        assert_eq!(drain(&mut fifo), vec![0, 1, 2]);
        assert_eq!(drain(&mut lifo), vec![2, 1, 0]);
    }

    #[test]
    fn priority_pops_lowest_first() {
        let mut frontier = PriorityFrontier::default();
        frontier.push(entry(0), 5.0);
        frontier.push(entry(1), 1.5);
        frontier.push(entry(2), 3.0);

        assert_eq!(drain(&mut frontier), vec![1, 2, 0]);
    }

    #[test]
    fn priority_ties_break_by_insertion() {
        let mut frontier = PriorityFrontier::default();
        for i in [4, 2, 7, 1] {
            frontier.push(entry(i), 2.0);
        }
        frontier.push(entry(9), 1.0);

        assert_eq!(drain(&mut frontier), vec![9, 4, 2, 7, 1]);
    }
}
