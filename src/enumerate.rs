//! Path-enumeration strategy.
//!
//! Colors are routed in ascending numeric order. For each color, simple paths
//! between its endpoints are enumerated breadth-first over partial paths; each
//! completion is applied to a board copy and the next color is routed
//! recursively. An A* distance both prunes branches whose remaining pairs are
//! disconnected and gates completions below the open-cell lower bound.
//!
//! Complete but slow: the enumeration is exponential in corridor width, so
//! this strategy is only practical up to roughly 10x10.

use std::collections::{HashSet, VecDeque};

use tracing::trace;

use crate::board::{Board, FlowPair, PairIndex};
use crate::dispatch::{Deadline, Halt};
use crate::location::Location;
use crate::reach::shortest_open_distance;

/// Partial paths as a shared-prefix forest: each entry is a cell plus the
/// index of the path it extends. Extending a path costs one entry instead of
/// one copy of the whole prefix.
struct PathArena {
    cells: Vec<Location>,
    parents: Vec<Option<u32>>,
}

impl PathArena {
    fn new(root: Location) -> Self {
        Self {
            cells: vec![root],
            parents: vec![None],
        }
    }

    fn push(&mut self, cell: Location, parent: u32) -> u32 {
        self.cells.push(cell);
        self.parents.push(Some(parent));
        (self.cells.len() - 1) as u32
    }

    fn cell(&self, id: u32) -> Location {
        self.cells[id as usize]
    }

    /// Whether `cell` already lies on the path ending at `tip`.
    fn contains(&self, tip: u32, cell: Location) -> bool {
        let mut cursor = Some(tip);
        while let Some(id) = cursor {
            if self.cells[id as usize] == cell {
                return true;
            }
            cursor = self.parents[id as usize];
        }
        false
    }

    /// The cells from the root to `tip`, in walk order.
    fn materialize(&self, tip: u32) -> Vec<Location> {
        let mut cells = Vec::new();
        let mut cursor = Some(tip);
        while let Some(id) = cursor {
            cells.push(self.cells[id as usize]);
            cursor = self.parents[id as usize];
        }
        cells.reverse();
        cells
    }
}

pub(crate) fn solve(
    board: &Board,
    pairs: &PairIndex,
    deadline: Deadline,
    nodes: &mut u64,
) -> Result<Board, Halt> {
    route(board, pairs.pairs(), 0, deadline, nodes)
}

fn route(
    board: &Board,
    pairs: &[FlowPair],
    index: usize,
    deadline: Deadline,
    nodes: &mut u64,
) -> Result<Board, Halt> {
    let Some(pair) = pairs.get(index) else {
        // every color is routed; a covering means success
        return if board.empty_count() == 0 {
            Ok(board.clone())
        } else {
            Err(Halt::NoSolution)
        };
    };

    let Some(min_dist) = shortest_open_distance(board, pair.start, pair.finish) else {
        return Err(Halt::NoSolution);
    };
    // lookahead: every later pair must still be connectable through the
    // current empties, or this branch is already dead
    for later in &pairs[index + 1..] {
        if shortest_open_distance(board, later.start, later.finish).is_none() {
            return Err(Halt::NoSolution);
        }
    }
    trace!(color = pair.color, min_dist, "routing color");

    let mut arena = PathArena::new(pair.start);
    let mut frontier = VecDeque::from([0u32]);
    let mut completed: HashSet<Vec<u8>> = HashSet::new();

    while let Some(tip) = frontier.pop_front() {
        if deadline.expired() {
            return Err(Halt::Timeout);
        }
        *nodes += 1;

        let at = arena.cell(tip);
        for next in board.neighbors(at) {
            if next == pair.finish {
                let path = arena.materialize(tip);
                // the cells walked so far equal the edge count once the
                // finish is appended; gate on the open-cell lower bound
                if (path.len() as u32) < min_dist {
                    continue;
                }

                // suppress identical completions reached through different
                // expansion orders: key on the packed ordered coordinates
                let mut digest: Vec<u8> = path.iter().map(|cell| cell.pack()).collect();
                digest.push(pair.finish.pack());
                if !completed.insert(digest) {
                    continue;
                }

                let mut filled = board.clone();
                for &cell in &path {
                    filled.set(cell, pair.color);
                }
                match route(&filled, pairs, index + 1, deadline, nodes) {
                    Err(Halt::NoSolution) => {}
                    other => return other,
                }
            } else if board.is_empty_at(next) && !arena.contains(tip, next) {
                let id = arena.push(next, tip);
                frontier.push_back(id);
            }
        }
    }

    Err(Halt::NoSolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_shares_prefixes() {
        let mut arena = PathArena::new(Location(0, 0));
        let a = arena.push(Location(0, 1), 0);
        let b = arena.push(Location(1, 0), 0);
        let a2 = arena.push(Location(0, 2), a);

        assert_eq!(arena.materialize(a2), vec![
            Location(0, 0),
            Location(0, 1),
            Location(0, 2),
        ]);
        assert_eq!(arena.materialize(b), vec![Location(0, 0), Location(1, 0)]);
        assert!(arena.contains(a2, Location(0, 0)));
        assert!(!arena.contains(a2, Location(1, 0)));
    }
}
