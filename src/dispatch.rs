use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::board::Board;
use crate::{enumerate, heuristic, sat};

/// Deadline applied when the caller does not supply one.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(15);

/// The three interchangeable solver strategies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Per-color breadth-first enumeration of simple paths with recursive
    /// descent over colors. Complete, but impractical past roughly 10x10.
    PathEnum,
    /// Best-first search over partial board states with domain pruning.
    Heuristic,
    /// Constraint encoding handed to an in-process SAT back-end.
    Sat,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::PathEnum => "path_enum",
            Self::Heuristic => "heuristic",
            Self::Sat => "sat",
        })
    }
}

/// Error parsing a strategy name.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown strategy {0:?}, expected path_enum, heuristic, or sat")]
pub struct UnknownStrategy(String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path_enum" => Ok(Self::PathEnum),
            "heuristic" => Ok(Self::Heuristic),
            "sat" => Ok(Self::Sat),
            other => Err(UnknownStrategy(other.to_owned())),
        }
    }
}

/// A monotonic instant after which a solve must terminate.
///
/// Cancellation is modeled as an immediate deadline: pass `Duration::ZERO`
/// and every strategy halts at its next check.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Deadline {
    at: Instant,
}

impl Deadline {
    fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    pub(crate) fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

/// Crate-internal termination signal of the solver engines. Converted into
/// [`SolveError`] at the dispatcher boundary; never surfaced raw.
#[derive(Clone, Debug)]
pub(crate) enum Halt {
    NoSolution,
    Timeout,
    Backend(String),
    Internal(String),
}

/// Failures a solve can report.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SolveError {
    /// Shape or parity violation in the input; not retryable.
    #[error("invalid board: {reason}")]
    InvalidBoard {
        /// Human-readable description of the violation.
        reason: String,
    },
    /// The search space is exhausted. Definitive for the two complete
    /// strategies; for the SAT strategy it is reported only when the verdict
    /// arrived within the deadline.
    #[error("no solution exists")]
    NoSolution,
    /// The deadline expired before a verdict.
    #[error("deadline exceeded")]
    Timeout,
    /// The SAT back-end failed; retrying with another strategy may work.
    #[error("solver back-end unavailable: {0}")]
    BackendUnavailable(String),
    /// Catch-all; strategy internals never propagate past this.
    #[error("internal solver error: {0}")]
    Internal(String),
}

impl From<Halt> for SolveError {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::NoSolution => Self::NoSolution,
            Halt::Timeout => Self::Timeout,
            Halt::Backend(reason) => Self::BackendUnavailable(reason),
            Halt::Internal(reason) => Self::Internal(reason),
        }
    }
}

/// The uniform result envelope every strategy returns through.
#[derive(Clone, Debug)]
pub struct SolveReport {
    /// The completed board, absent on failure. Never a partial fill.
    pub board: Option<Board>,
    /// Whether the deadline expired.
    pub timed_out: bool,
    /// Wall-clock time the solve took.
    pub time_taken: Duration,
    /// Strategy-specific expansion count; 0 for the SAT strategy.
    pub node_count: u64,
    /// The failure, when `board` is absent.
    pub error: Option<SolveError>,
}

impl SolveReport {
    /// Whether the solve produced a completed board.
    pub fn is_solved(&self) -> bool {
        self.board.is_some()
    }
}

/// Solve `board` with `strategy` under `deadline`.
///
/// Validates the board, routes to the engine, and wraps the outcome with
/// timing and node-count telemetry. Engine-internal signals never escape;
/// every failure arrives as a typed [`SolveError`] in the envelope.
pub fn solve(board: &Board, strategy: Strategy, deadline: Duration) -> SolveReport {
    let started = Instant::now();
    let mut nodes = 0u64;

    let outcome = run(board, strategy, Deadline::after(deadline), &mut nodes);
    let time_taken = started.elapsed();

    let (solved, error) = match outcome {
        Ok(solution) => (Some(solution), None),
        Err(failure) => (None, Some(failure)),
    };
    debug!(
        %strategy,
        size = board.size(),
        nodes,
        elapsed_ms = time_taken.as_millis() as u64,
        solved = solved.is_some(),
        "solve finished"
    );

    SolveReport {
        board: solved,
        timed_out: matches!(error, Some(SolveError::Timeout)),
        time_taken,
        node_count: nodes,
        error,
    }
}

/// Solve with the default 15 second deadline.
pub fn solve_default(board: &Board, strategy: Strategy) -> SolveReport {
    solve(board, strategy, DEFAULT_DEADLINE)
}

fn run(
    board: &Board,
    strategy: Strategy,
    deadline: Deadline,
    nodes: &mut u64,
) -> Result<Board, SolveError> {
    // An already-solved board passes through unchanged, making solve a no-op
    // on its own output. Such boards carry more than two cells per color and
    // would otherwise trip the pair parity check below.
    if board.is_completed_solution() {
        return Ok(board.clone());
    }

    let pairs = board.pair_index().map_err(|e| SolveError::InvalidBoard {
        reason: e.to_string(),
    })?;

    let result = match strategy {
        Strategy::PathEnum => enumerate::solve(board, &pairs, deadline, nodes),
        Strategy::Heuristic => heuristic::solve(board, &pairs, deadline, nodes),
        Strategy::Sat => sat::solve(board, &pairs, deadline),
    };

    result.map_err(SolveError::from)
}
