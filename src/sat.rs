//! SAT strategy.
//!
//! The board becomes an undirected graph: a vertex per cell, an edge per
//! 4-adjacency. Vertices and edges get one-hot affiliation variables over the
//! colors present on the board plus the null affiliation 0, and the puzzle
//! rules become CNF over those variables:
//!
//! - an endpoint keeps its fixed color and has exactly one incident edge of
//!   that color (the edge by which its path leaves);
//! - every other cell takes exactly one real color and has exactly two
//!   incident edges of it ("flow conservation");
//! - an edge carrying a color implies both of its cells carry that color;
//!   the converse is deliberately not asserted.
//!
//! Path membership lives on the edge variables, and an edge between two
//! same-colored cells must stay free to be null: a path may fold so that two
//! of its cells are adjacent without being consecutive (the two endpoints of
//! a pair may even touch), and forcing such an edge onto the path would
//! overflow the degree limits and render solvable boards unsatisfiable.
//! The degree constraints do admit a monochromatic cycle disjoint
//! from its color's endpoint path, so each model is decoded and checked
//! against the covering rules; a model containing a cycle is blocked with a
//! clause demanding some cell change color, and the back-end is asked again.
//! Assignments are finite, so the refinement terminates.
//!
//! The back-end runs in-process and is not interruptible, so the deadline is
//! checked once before encoding and once more per refinement round.

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use tracing::trace;
use unordered_pair::UnorderedPair;
use varisat::{CnfFormula, Lit, Solver, Var};

use crate::board::{Board, PairIndex};
use crate::color::{ColorId, EMPTY, MAX_COLORS};
use crate::dispatch::{Deadline, Halt};
use crate::location::Location;
use crate::logic::exactly_one;
use crate::step::Step;

#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
struct CellNode {
    at: Location,
    color: ColorId,
}

/// Variable addressing: node variables first, then edge variables, each block
/// one-hot over the affiliation domain (slot 0 is the null affiliation and
/// slot `s > 0` is the `s`-th color present on the board).
struct VarMap {
    n: usize,
    domain: usize,
}

impl VarMap {
    fn node(&self, at: Location, slot: usize) -> Var {
        Var::from_index((at.0 * self.n + at.1) * self.domain + slot)
    }

    fn edge(&self, ends: UnorderedPair<Location>, slot: usize) -> Var {
        let low = ends.0.min(ends.1);
        let high = ends.0.max(ends.1);
        // an edge is addressed by its upper-left cell and whether it points
        // right or down from there
        let direction = usize::from(low.0 != high.0);
        let ordinal = (low.0 * self.n + low.1) * Step::forward().len() + direction;
        Var::from_index((self.n * self.n + ordinal) * self.domain + slot)
    }
}

fn edge_key(triple: (CellNode, CellNode, &())) -> UnorderedPair<Location> {
    UnorderedPair::from((triple.0.at, triple.1.at))
}

fn build_graph(board: &Board) -> UnGraphMap<CellNode, ()> {
    let n = board.size();
    let mut graph = UnGraphMap::with_capacity(n * n, 2 * n * (n - 1));
    let node_at = |at: Location| CellNode {
        at,
        color: board.get(at),
    };

    for row in 0..n {
        for col in 0..n {
            let at = Location(row, col);
            for step in Step::forward() {
                let next = step.attempt_from(at);
                if next.0 < n && next.1 < n {
                    graph.add_edge(node_at(at), node_at(next), ());
                }
            }
        }
    }

    graph
}

pub(crate) fn solve(board: &Board, pairs: &PairIndex, deadline: Deadline) -> Result<Board, Halt> {
    if deadline.expired() {
        return Err(Halt::Timeout);
    }

    let flows = pairs.pairs();
    // no colors means nothing can ever cover the empty cells
    if flows.is_empty() {
        return Err(Halt::NoSolution);
    }

    let vars = VarMap {
        n: board.size(),
        domain: flows.len() + 1,
    };
    let mut slot_of = [0usize; MAX_COLORS + 1];
    for (i, pair) in flows.iter().enumerate() {
        slot_of[pair.color as usize] = i + 1;
    }

    let graph = build_graph(board);
    let mut assumptions: Vec<Lit> = Vec::new();
    let mut formulae: Vec<CnfFormula> = Vec::new();

    for vertex in graph.nodes() {
        let incident = graph.edges(vertex).map(edge_key).collect_vec();

        if vertex.color != EMPTY {
            let slot = slot_of[vertex.color as usize];
            // the affiliation of an endpoint is already known; assume it and no other
            assumptions.extend(
                (0..vars.domain)
                    .map(|maybe| vars.node(vertex.at, maybe).lit(maybe == slot)),
            );

            // exactly one incident edge has the same affiliation (the exit edge)
            formulae.push(CnfFormula::from(exactly_one(
                incident
                    .iter()
                    .map(|&e| vars.edge(e, slot).positive())
                    .collect_vec(),
            )));

            // every other incident edge is unaffiliated; equivalently exactly
            // one incident edge is *not* null
            formulae.push(CnfFormula::from(exactly_one(
                incident
                    .iter()
                    .map(|&e| vars.edge(e, 0).negative())
                    .collect_vec(),
            )));
        } else {
            // a path cell must take some real affiliation, and only one
            assumptions.push(vars.node(vertex.at, 0).negative());
            formulae.push(CnfFormula::from(exactly_one(
                (1..vars.domain)
                    .map(|slot| vars.node(vertex.at, slot).positive())
                    .collect_vec(),
            )));

            for slot in 1..vars.domain {
                // carrying an affiliation implies at least one incident edge carries it
                let mut terms = Vec::with_capacity(1 + incident.len());
                terms.push(vars.node(vertex.at, slot).negative());
                terms.extend(incident.iter().map(|&e| vars.edge(e, slot).positive()));
                formulae.push(CnfFormula::from(vec![terms]));

                // a path passes through: one incident edge of an affiliation
                // demands a second incident edge of the same affiliation
                formulae.push(CnfFormula::from(
                    incident
                        .iter()
                        .map(|&entering| {
                            incident
                                .iter()
                                .map(|&e| vars.edge(e, slot).lit(e != entering))
                                .collect_vec()
                        })
                        .collect_vec(),
                ));

                // ...but never a third: for any choice of three incident
                // edges, at least one does not carry this affiliation
                formulae.push(CnfFormula::from(
                    incident
                        .iter()
                        .combinations(3)
                        .map(|triple| {
                            triple
                                .into_iter()
                                .map(|&e| vars.edge(e, slot).negative())
                                .collect_vec()
                        })
                        .collect_vec(),
                ));
            }
        }
    }

    for triple in graph.all_edges() {
        let key = edge_key(triple);

        // every edge has exactly one affiliation, which may be null
        formulae.push(CnfFormula::from(exactly_one(
            (0..vars.domain)
                .map(|slot| vars.edge(key, slot).positive())
                .collect_vec(),
        )));

        for slot in 1..vars.domain {
            // an edge carrying an affiliation implies both of its cells carry
            // it: A => BC expands to (!A + B)(!A + C). Only this direction is
            // asserted. The converse would force the path through every pair
            // of adjacent same-colored cells, and a path that folds against
            // itself (or a pair whose endpoints touch) has such pairs that
            // the path must be free to skip.
            let a = vars.edge(key, slot);
            let b = vars.node(triple.0.at, slot);
            let c = vars.node(triple.1.at, slot);
            formulae.push(CnfFormula::from(vec![
                vec![a.negative(), b.positive()],
                vec![a.negative(), c.positive()],
            ]));
        }
    }

    trace!(
        clause_groups = formulae.len(),
        assumptions = assumptions.len(),
        "handing constraints to the back-end"
    );

    let mut solver = Solver::new();
    for formula in &formulae {
        solver.add_formula(formula);
    }

    loop {
        solver.assume(&assumptions);
        let satisfiable = match solver.solve() {
            Ok(verdict) => verdict,
            Err(failure) => return Err(Halt::Backend(failure.to_string())),
        };
        if deadline.expired() {
            return Err(Halt::Timeout);
        }
        if !satisfiable {
            return Err(Halt::NoSolution);
        }

        let model = solver.model().ok_or_else(|| {
            Halt::Internal("back-end reported satisfiable but produced no model".to_owned())
        })?;

        // read the affiliation of every formerly empty cell out of the model
        let mut solved = board.clone();
        let mut decoded: Vec<(Location, usize)> = Vec::new();
        for vertex in graph.nodes() {
            if vertex.color != EMPTY {
                continue;
            }
            let slot = (1..vars.domain)
                .find(|&slot| {
                    model
                        .get(vars.node(vertex.at, slot).index())
                        .map_or(false, |lit| lit.is_positive())
                })
                .ok_or_else(|| {
                    Halt::Internal(format!(
                        "no affiliation decoded for cell ({}, {})",
                        vertex.at.0, vertex.at.1
                    ))
                })?;
            decoded.push((vertex.at, slot));
            solved.set(vertex.at, flows[slot - 1].color);
        }

        if solved.is_completed_solution() {
            return Ok(solved);
        }

        // the model hid monochromatic cycles behind too-short paths; demand
        // that some cell of each endpoint-free component change color
        let mut blocking: Vec<Vec<Lit>> = Vec::new();
        for (i, pair) in flows.iter().enumerate() {
            let strays = stray_cells(&solved, pair.color, pair.start);
            if !strays.is_empty() {
                blocking.push(
                    strays
                        .into_iter()
                        .map(|at| vars.node(at, i + 1).negative())
                        .collect_vec(),
                );
            }
        }
        if blocking.is_empty() {
            // no component to pin down; rule out this exact assignment
            blocking.push(
                decoded
                    .iter()
                    .map(|&(at, slot)| vars.node(at, slot).negative())
                    .collect_vec(),
            );
        }
        trace!(
            clauses = blocking.len(),
            "model contains cycles, blocking them"
        );
        solver.add_formula(&CnfFormula::from(blocking));
    }
}

/// Cells of `color` not connected to the endpoint path seeded at `from`.
fn stray_cells(board: &Board, color: ColorId, from: Location) -> Vec<Location> {
    let mut reached = vec![from];
    let mut cursor = 0;
    while cursor < reached.len() {
        let at = reached[cursor];
        cursor += 1;
        for next in board.neighbors(at) {
            if board.get(next) == color && !reached.contains(&next) {
                reached.push(next);
            }
        }
    }

    let n = board.size();
    let mut strays = Vec::new();
    for row in 0..n {
        for col in 0..n {
            let at = Location(row, col);
            if board.get(at) == color && !reached.contains(&at) {
                strays.push(at);
            }
        }
    }
    strays
}
