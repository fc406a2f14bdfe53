use strum::VariantArray;

use crate::location::Location;

/// The four step directions on a square grid. Adjacency everywhere in this
/// crate is 4-connected.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub(crate) enum Step {
    Up,
    Down,
    Left,
    Right,
}

impl Step {
    /// Attempt the step from `location` in the direction specified by `self`.
    /// Steps off the top or left edge wrap to unrepresentably large coordinates
    /// and fail any subsequent bounds check.
    pub(crate) fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((-1, 0)),
            Self::Down => location.offset_by((1, 0)),
            Self::Left => location.offset_by((0, -1)),
            Self::Right => location.offset_by((0, 1)),
        }
    }

    /// The two directions that reach a higher-indexed cell in row-major order.
    /// Stepping only forward visits every undirected grid edge exactly once.
    pub(crate) fn forward() -> &'static [Self] {
        &[Self::Right, Self::Down]
    }
}
