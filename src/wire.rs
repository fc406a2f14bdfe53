//! Text-grid codec shared with external collaborators.
//!
//! One line per row, `N` glyphs per line, newline terminated. Color `k` is the
//! `k`-th entry (1-indexed) of the fixed alphabet `RBYGOCMmPAWgTbcp`; the empty
//! cell is `.`. Rows are serialized top to bottom in the same `[row][col]`
//! convention the rest of the crate uses; nothing is transposed.

use crate::board::{Board, BoardError};
use crate::color::{color_of, glyph_of, ColorId};

/// Render a board as newline-terminated glyph rows.
pub fn encode(board: &Board) -> String {
    let n = board.size();
    let mut out = String::with_capacity(n * (n + 1));

    for row in 0..n {
        for col in 0..n {
            out.push(glyph_of(board.cell(row, col)));
        }
        out.push('\n');
    }

    out
}

/// Parse a glyph grid back into a board. Accepts any line ending `encode`
/// or an external producer might emit.
pub fn decode(text: &str) -> Result<Board, BoardError> {
    let rows: Vec<Vec<ColorId>> = text
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.chars()
                .map(|glyph| color_of(glyph).ok_or(BoardError::UnknownGlyph(glyph)))
                .collect()
        })
        .collect::<Result<_, _>>()?;

    Board::from_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_fixture() {
        let text = "R..B\n....\n.RB.\n....\n";
        let board = decode(text).unwrap();
        assert_eq!(board.cell(0, 0), 1);
        assert_eq!(board.cell(0, 3), 2);
        assert_eq!(board.cell(2, 1), 1);
        assert_eq!(board.cell(2, 2), 2);
        assert_eq!(encode(&board), text);
    }

    #[test]
    fn rejects_unknown_glyphs() {
        assert_eq!(
            decode("R?\n??\n").unwrap_err(),
            BoardError::UnknownGlyph('?')
        );
    }

    #[test]
    fn case_distinguishes_colors() {
        let board = decode("Mm\nmM\n").unwrap();
        assert_eq!(board.cell(0, 0), 7);
        assert_eq!(board.cell(0, 1), 8);
    }
}
