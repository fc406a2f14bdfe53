//! Shortest open-cell distance between two cells.
//!
//! A* over the 4-connected grid with the Manhattan heuristic and unit edge
//! costs. Only empty cells are traversable; the two terminals themselves are
//! exempt since they usually carry a color. Cells are marked closed when
//! generated, which the consistent heuristic and unit edges make safe.
//!
//! The search serves two masters: a feasibility pruner (a `None` means a
//! partial state can never connect the pair) and a lower bound on the length
//! of any path the pair can still take.

use ndarray::Array2;

use crate::board::Board;
use crate::location::Location;
use crate::queue::MinHeap;

#[derive(Eq, Ord, PartialEq, PartialOrd)]
struct Visit {
    // estimate first: the heap orders by f = g + h
    estimate: u32,
    walked: u32,
    at: Location,
}

/// Minimum number of edges in a path from `from` to `to` crossing only empty
/// cells, or `None` if the two are disconnected through the current empties.
pub(crate) fn shortest_open_distance(board: &Board, from: Location, to: Location) -> Option<u32> {
    if from == to {
        return Some(0);
    }

    let n = board.size();
    let mut seen = Array2::from_elem((n, n), false);
    let mut open = MinHeap::with_capacity(n * n);

    seen[from.as_index()] = true;
    open.push(Visit {
        estimate: from.manhattan(to),
        walked: 0,
        at: from,
    });

    while let Some(Visit { walked, at, .. }) = open.pop() {
        for next in board.neighbors(at) {
            if next == to {
                return Some(walked + 1);
            }
            if seen[next.as_index()] || !board.is_empty_at(next) {
                continue;
            }
            seen[next.as_index()] = true;
            open.push(Visit {
                estimate: walked + 1 + next.manhattan(to),
                walked: walked + 1,
                at: next,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire;

    #[test]
    fn walks_around_an_obstacle() {
        // B's pinned cells wall the direct row off
        let board = wire::decode("R.B.\n..B.\n....\n...R\n").unwrap();
        assert_eq!(
            shortest_open_distance(&board, Location(0, 0), Location(3, 3)),
            Some(6)
        );
        // the direct route for B itself is one step down
        assert_eq!(
            shortest_open_distance(&board, Location(0, 2), Location(1, 2)),
            Some(1)
        );
    }

    #[test]
    fn walled_terminals_are_disconnected() {
        let board = wire::decode("RBY\n.B.\n.BR\n").unwrap();
        assert_eq!(
            shortest_open_distance(&board, Location(0, 0), Location(2, 2)),
            None
        );
    }

    #[test]
    fn adjacent_terminals_cost_one_edge() {
        let board = wire::decode("RR\n..\n").unwrap();
        assert_eq!(
            shortest_open_distance(&board, Location(0, 0), Location(0, 1)),
            Some(1)
        );
    }
}
