#![warn(missing_docs)]

//! # `flumen`
//!
//! A solver core for [Numberlink](https://en.wikipedia.org/wiki/Numberlink) puzzles as posited in the mobile game Flow Free.
//! Build a [`Board`] from row-major rows or from its [`wire`] text form, pick a [`Strategy`], and call [`solve()`] with a deadline;
//! the result envelope carries the completed board or a typed failure together with timing and node-count telemetry.
//!
//! # Internals
//! The crate fronts three interchangeable strategies for the same NP-complete covering problem:
//!
//! 1. [`Strategy::PathEnum`] enumerates simple paths per color breadth-first and recurses over colors,
//!    pruned and lower-bounded by an A* distance through the remaining empty cells.
//!    Complete, and the easiest to reason about, but impractical beyond roughly 10x10.
//! 2. [`Strategy::Heuristic`] runs a best-first search over partial boards, always branching on the
//!    most constrained color and discarding states a family of necessary-condition prunes can prove dead
//!    (dead ends, stranded regions, starved chokepoints). This is the workhorse for hard instances.
//! 3. [`Strategy::Sat`] expresses the board as an undirected graph whose vertices and edges take one-hot
//!    affiliation variables, in the manner of the published SAT formulations of Numberlink, and defers to
//!    an in-process SAT back-end. Degree constraints live on edges, not on cell adjacency counts, so paths
//!    that fold against themselves decode correctly.
//!
//! Every strategy observes the same rules: the input board is never mutated, a returned board always
//! satisfies the covering invariants, and a deadline bounds the wall clock. One solve owns all of its
//! state; nothing is shared across solves.

pub use board::{Board, BoardError, MAX_SIZE, MIN_SIZE};
pub use color::{ColorId, MAX_COLORS};
pub use dispatch::{
    solve, solve_default, SolveError, SolveReport, Strategy, UnknownStrategy, DEFAULT_DEADLINE,
};
pub use location::Location;

pub(crate) mod board;
mod tests;
pub(crate) mod color;
pub(crate) mod location;
pub(crate) mod step;
pub(crate) mod queue;
pub(crate) mod reach;
pub(crate) mod logic;
pub(crate) mod enumerate;
pub(crate) mod heuristic;
pub(crate) mod sat;
pub(crate) mod dispatch;
pub mod wire;
