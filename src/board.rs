use std::collections::{HashSet, VecDeque};
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use strum::VariantArray;
use thiserror::Error;

use crate::color::{ColorId, EMPTY, MAX_COLORS};
use crate::location::Location;
use crate::step::Step;
use crate::wire;

/// Smallest supported board side length.
pub const MIN_SIZE: usize = 2;
/// Largest supported board side length.
pub const MAX_SIZE: usize = 15;

// Visit budget for the spanning-path fallback in `is_completed_solution`.
// Plenty for 15x15 classes while still bounding adversarial inputs.
const SPAN_SEARCH_BUDGET: u32 = 1 << 20;

/// Reasons a board fails validation.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BoardError {
    /// The input rows do not form a square grid.
    #[error("board is not square: {rows} rows but row {row} has {len} cells")]
    NotSquare {
        /// Number of rows supplied.
        rows: usize,
        /// Index of the offending row.
        row: usize,
        /// Length of the offending row.
        len: usize,
    },
    /// The side length is outside the supported range.
    #[error("board size {0} outside supported range {MIN_SIZE}..={MAX_SIZE}")]
    SizeOutOfRange(usize),
    /// A cell value is outside the supported color range.
    #[error("color {0} outside supported range 1..={MAX_COLORS}")]
    ColorOutOfRange(ColorId),
    /// A color does not occur exactly twice.
    #[error("color {color} appears {count} times, expected exactly 2")]
    UnpairedColor {
        /// The offending color.
        color: ColorId,
        /// How many cells carry it.
        count: usize,
    },
    /// A character in a wire-format grid is not in the display alphabet.
    #[error("unknown cell glyph {0:?}")]
    UnknownGlyph(char),
}

/// The two endpoints of one color, in first-seen/second-seen row-major order.
/// The scan order matters: `start` seeds every path search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FlowPair {
    pub(crate) color: ColorId,
    pub(crate) start: Location,
    pub(crate) finish: Location,
}

/// Endpoint pairs for every color present on a board, ascending by color id.
/// Built once at solve entry and immutable thereafter.
#[derive(Clone, Debug, Default)]
pub(crate) struct PairIndex {
    pairs: Vec<FlowPair>,
}

impl PairIndex {
    pub(crate) fn pairs(&self) -> &[FlowPair] {
        &self.pairs
    }
}

/// An `N`x`N` Numberlink board: every cell is empty (`0`) or carries a color.
///
/// Boards are value types; the solver strategies fill clones rather than
/// mutating the caller's board.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    cells: Array2<ColorId>,
}

impl Board {
    /// Build a board from row-major rows, validating shape, size, and the
    /// color value range. Pair parity is checked later, at solve entry.
    pub fn from_rows(rows: &[Vec<ColorId>]) -> Result<Self, BoardError> {
        let n = rows.len();
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != n {
                return Err(BoardError::NotSquare {
                    rows: n,
                    row,
                    len: cells.len(),
                });
            }
        }
        if !(MIN_SIZE..=MAX_SIZE).contains(&n) {
            return Err(BoardError::SizeOutOfRange(n));
        }
        if let Some(&bad) = rows
            .iter()
            .flatten()
            .find(|&&color| color as usize > MAX_COLORS)
        {
            return Err(BoardError::ColorOutOfRange(bad));
        }

        Ok(Self {
            cells: Array2::from_shape_fn((n, n), |(r, c)| rows[r][c]),
        })
    }

    /// Side length of the board.
    pub fn size(&self) -> usize {
        self.cells.nrows()
    }

    /// The color at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> ColorId {
        self.cells[(row, col)]
    }

    pub(crate) fn get(&self, at: Location) -> ColorId {
        self.cells[at.as_index()]
    }

    pub(crate) fn set(&mut self, at: Location, color: ColorId) {
        self.cells[at.as_index()] = color;
    }

    pub(crate) fn is_empty_at(&self, at: Location) -> bool {
        self.get(at) == EMPTY
    }

    pub(crate) fn empty_count(&self) -> u32 {
        self.cells.iter().filter(|&&c| c == EMPTY).count() as u32
    }

    /// In-bounds 4-neighbors of `at`.
    pub(crate) fn neighbors(&self, at: Location) -> impl Iterator<Item = Location> + '_ {
        let n = self.size();
        Step::VARIANTS
            .iter()
            .map(move |step| step.attempt_from(at))
            .filter(move |next| next.0 < n && next.1 < n)
    }

    /// Scan the board in row-major order and record the first and second
    /// occurrence of each color. Any other occurrence count is a parity error.
    pub(crate) fn pair_index(&self) -> Result<PairIndex, BoardError> {
        let mut seen: [Vec<Location>; MAX_COLORS + 1] = Default::default();
        for ((r, c), &color) in self.cells.indexed_iter() {
            if color != EMPTY {
                seen[color as usize].push(Location(r, c));
            }
        }

        let mut pairs = Vec::new();
        for (color, occurrences) in seen.iter().enumerate().skip(1) {
            match *occurrences.as_slice() {
                [] => {}
                [start, finish] => pairs.push(FlowPair {
                    color: color as ColorId,
                    start,
                    finish,
                }),
                _ => {
                    return Err(BoardError::UnpairedColor {
                        color: color as ColorId,
                        count: occurrences.len(),
                    })
                }
            }
        }

        Ok(PairIndex { pairs })
    }

    /// Whether this board is already a completed solution: no empty cells, and
    /// every color class is a single simple path.
    ///
    /// A fully drawn board no longer distinguishes endpoints from interior
    /// cells, so the check is structural: each class must be connected and
    /// admit a spanning simple path. Classes whose path folds against itself
    /// (the 2x2 snake) pass a bounded search where the plain degree profile
    /// is inconclusive.
    pub fn is_completed_solution(&self) -> bool {
        if self.cells.iter().any(|&c| c == EMPTY) {
            return false;
        }

        let mut classes: [Vec<Location>; MAX_COLORS + 1] = Default::default();
        for ((r, c), &color) in self.cells.indexed_iter() {
            classes[color as usize].push(Location(r, c));
        }

        classes
            .iter()
            .skip(1)
            .filter(|class| !class.is_empty())
            .all(|class| self.class_is_path(class))
    }

    /// Whether `class` (all cells of one color) forms a single simple path.
    fn class_is_path(&self, class: &[Location]) -> bool {
        if class.len() < 2 {
            return false;
        }
        let color = self.get(class[0]);

        // connectivity over same-color adjacency
        let mut reached = HashSet::with_capacity(class.len());
        let mut frontier = VecDeque::from([class[0]]);
        reached.insert(class[0]);
        while let Some(at) = frontier.pop_front() {
            for next in self.neighbors(at) {
                if self.get(next) == color && reached.insert(next) {
                    frontier.push_back(next);
                }
            }
        }
        if reached.len() != class.len() {
            return false;
        }

        // degree profile of a clean path: two ends of degree 1, the rest degree 2
        let degree = |at: Location| {
            self.neighbors(at)
                .filter(|&next| self.get(next) == color)
                .count()
        };
        let ends = class.iter().filter(|&&at| degree(at) == 1).count();
        if ends == 2 && class.iter().all(|&at| degree(at) <= 2) {
            return true;
        }

        // folded classes: look for a spanning simple path directly
        let members: HashSet<Location> = class.iter().copied().collect();
        spanning_path_exists(class, |at| {
            self.neighbors(at)
                .filter(|next| members.contains(next))
                .collect()
        })
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", wire::encode(self))
    }
}

fn spanning_path_exists<F>(class: &[Location], adjacent: F) -> bool
where
    F: Fn(Location) -> Vec<Location>,
{
    // a spanning path must start at a degree-1 cell if any exists; three or
    // more such cells rule a single path out immediately
    let ones: Vec<Location> = class
        .iter()
        .copied()
        .filter(|&at| adjacent(at).len() == 1)
        .collect();
    let starts = match ones.len() {
        0 => class.to_vec(),
        1 | 2 => ones,
        _ => return false,
    };

    let mut budget = SPAN_SEARCH_BUDGET;
    starts.into_iter().any(|start| {
        let mut on_path = HashSet::with_capacity(class.len());
        on_path.insert(start);
        extend_span(start, class.len(), &mut on_path, &adjacent, &mut budget)
    })
}

fn extend_span<F>(
    tip: Location,
    want: usize,
    on_path: &mut HashSet<Location>,
    adjacent: &F,
    budget: &mut u32,
) -> bool
where
    F: Fn(Location) -> Vec<Location>,
{
    if on_path.len() == want {
        return true;
    }
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    for next in adjacent(tip) {
        if on_path.insert(next) {
            if extend_span(next, want, on_path, adjacent, budget) {
                return true;
            }
            on_path.remove(&next);
        }
    }
    false
}
