//! Flow-specific best-first strategy.
//!
//! States are partial boards plus the current tip of every unfinished color.
//! The frontier pops the most-filled state first; within a state, expansion
//! always branches on the most constrained open color. Four prunes keep the
//! frontier small, and each is a necessary condition for completability, so
//! no solution is ever discarded:
//!
//! 1. an open color with no legal forward move kills the state;
//! 2. an open pair whose tip and target share no empty region kills it;
//! 3. an empty region no open tip can enter kills it;
//! 4. an empty cell with fewer than two empty-or-open-terminal neighbors can
//!    never become path interior and kills it.
//!
//! A color with exactly one legal move is advanced in place without touching
//! the frontier, which collapses corridors into a single transition.

use std::cmp::Ordering;
use std::collections::HashSet;

use petgraph::unionfind::UnionFind;
use tracing::trace;

use crate::board::{Board, PairIndex};
use crate::color::ColorId;
use crate::dispatch::{Deadline, Halt};
use crate::location::Location;
use crate::queue::MinHeap;

#[derive(Clone)]
struct Flow {
    color: ColorId,
    head: Location,
    target: Location,
    open: bool,
}

#[derive(Clone)]
struct State {
    board: Board,
    flows: Vec<Flow>,
    empties: u32,
}

/// Frontier entry; ordered by (empty cells remaining, insertion sequence) so
/// the deepest state wins and equal depths pop in insertion order.
struct Pending {
    empties: u32,
    seq: u64,
    state: State,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        (self.empties, self.seq) == (other.empties, other.seq)
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.empties, self.seq).cmp(&(other.empties, other.seq))
    }
}

enum Expansion {
    Solved(Board),
    Dead,
    Branch(Vec<State>),
}

pub(crate) fn solve(
    board: &Board,
    pairs: &PairIndex,
    deadline: Deadline,
    nodes: &mut u64,
) -> Result<Board, Halt> {
    let initial = State {
        board: board.clone(),
        flows: pairs
            .pairs()
            .iter()
            .map(|pair| Flow {
                color: pair.color,
                head: pair.start,
                target: pair.finish,
                open: true,
            })
            .collect(),
        empties: board.empty_count(),
    };

    let mut frontier = MinHeap::new();
    let mut seq = 0u64;
    frontier.push(Pending {
        empties: initial.empties,
        seq,
        state: initial,
    });

    while let Some(pending) = frontier.pop() {
        if deadline.expired() {
            return Err(Halt::Timeout);
        }
        *nodes += 1;

        match expand(pending.state) {
            Expansion::Solved(solution) => {
                trace!(
                    nodes = *nodes,
                    frontier = frontier.len(),
                    "search reached a covering"
                );
                return Ok(solution);
            }
            Expansion::Dead => {}
            Expansion::Branch(children) => {
                for child in children {
                    seq += 1;
                    frontier.push(Pending {
                        empties: child.empties,
                        seq,
                        state: child,
                    });
                }
            }
        }
    }

    Err(Halt::NoSolution)
}

/// Advance `state` through every forced move, then either finish, die, or
/// branch on the most constrained color.
fn expand(mut state: State) -> Expansion {
    loop {
        if state.flows.iter().all(|flow| !flow.open) {
            return if state.empties == 0 {
                Expansion::Solved(state.board)
            } else {
                Expansion::Dead
            };
        }

        // most constrained open color; flows are ascending by color id, so
        // the strict < resolves ties toward the smallest id
        let mut constrained: Option<(usize, Vec<Location>)> = None;
        for (i, flow) in state.flows.iter().enumerate() {
            if !flow.open {
                continue;
            }
            let moves = legal_moves(&state.board, flow);
            if moves.is_empty() {
                return Expansion::Dead;
            }
            if constrained
                .as_ref()
                .map_or(true, |(_, best)| moves.len() < best.len())
            {
                constrained = Some((i, moves));
            }
        }
        let (chosen, moves) = constrained.expect("some flow is open");

        if stranded(&state) || choked(&state) {
            return Expansion::Dead;
        }

        if let [only] = moves.as_slice() {
            apply_move(&mut state, chosen, *only);
            continue;
        }

        return Expansion::Branch(
            moves
                .into_iter()
                .map(|to| {
                    let mut child = state.clone();
                    apply_move(&mut child, chosen, to);
                    child
                })
                .collect(),
        );
    }
}

/// Cells the flow's tip may step to: empty neighbors, or its own target.
fn legal_moves(board: &Board, flow: &Flow) -> Vec<Location> {
    board
        .neighbors(flow.head)
        .filter(|&next| next == flow.target || board.is_empty_at(next))
        .collect()
}

fn apply_move(state: &mut State, chosen: usize, to: Location) {
    let flow = &mut state.flows[chosen];
    if to == flow.target {
        flow.open = false;
    } else {
        state.board.set(to, flow.color);
        flow.head = to;
        state.empties -= 1;
    }
}

/// Stranding check over the connected components of empty cells: every open
/// pair must share a component between tip and target (or touch directly),
/// and every component must be enterable by some open tip.
fn stranded(state: &State) -> bool {
    let n = state.board.size();
    let index = |at: Location| at.0 * n + at.1;

    let mut components = UnionFind::<usize>::new(n * n);
    for row in 0..n {
        for col in 0..n {
            let at = Location(row, col);
            if !state.board.is_empty_at(at) {
                continue;
            }
            for next in state.board.neighbors(at) {
                if state.board.is_empty_at(next) {
                    components.union(index(at), index(next));
                }
            }
        }
    }

    let empty_components_touching = |at: Location| -> HashSet<usize> {
        state
            .board
            .neighbors(at)
            .filter(|&next| state.board.is_empty_at(next))
            .map(|next| components.find(index(next)))
            .collect()
    };

    let mut enterable: HashSet<usize> = HashSet::new();
    let open_flows: Vec<&Flow> = state.flows.iter().filter(|flow| flow.open).collect();
    for flow in &open_flows {
        enterable.extend(empty_components_touching(flow.head));
    }

    for flow in &open_flows {
        if flow.head.manhattan(flow.target) == 1 {
            continue;
        }
        let from_head = empty_components_touching(flow.head);
        if empty_components_touching(flow.target)
            .intersection(&from_head)
            .next()
            .is_none()
        {
            return true;
        }
    }

    for row in 0..n {
        for col in 0..n {
            let at = Location(row, col);
            if state.board.is_empty_at(at) && !enterable.contains(&components.find(index(at))) {
                return true;
            }
        }
    }

    false
}

/// Chokepoint check: an empty cell will eventually be interior to some path,
/// which requires two same-color path neighbors. Only empty cells and the
/// tips and targets of still-open flows can ever supply one, so fewer than
/// two such neighbors dooms the state.
fn choked(state: &State) -> bool {
    let mut open_terminals: HashSet<Location> = HashSet::new();
    for flow in state.flows.iter().filter(|flow| flow.open) {
        open_terminals.insert(flow.head);
        open_terminals.insert(flow.target);
    }

    let n = state.board.size();
    for row in 0..n {
        for col in 0..n {
            let at = Location(row, col);
            if !state.board.is_empty_at(at) {
                continue;
            }
            let support = state
                .board
                .neighbors(at)
                .filter(|next| state.board.is_empty_at(*next) || open_terminals.contains(next))
                .count();
            if support < 2 {
                return true;
            }
        }
    }

    false
}
