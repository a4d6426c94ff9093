//! Typed maze errors.
//!
//! An unreachable end cell is not an error: [`crate::pathfinder::search`]
//! reports it as an empty path.

use std::fmt;

use crate::Point;

/// Failure of a grid, generator or search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A grid needs at least one row and one column, and no more cells than
    /// fit in memory.
    InvalidDimensions { rows: usize, cols: usize },
    /// Coordinate outside `[0, rows) × [0, cols)`.
    OutOfBounds {
        point: Point,
        rows: usize,
        cols: usize,
    },
    /// Start or end requested before [`crate::MazeGenerator::generate`].
    NotGenerated,
    /// Unknown character in a text maze.
    UnexpectedSymbol { symbol: char, row: usize, col: usize },
    /// Second `S` or `E` in a text maze.
    DuplicateMarker { symbol: char, row: usize, col: usize },
    /// Text maze row whose length differs from the first row.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { rows, cols } => {
                write!(
                    f,
                    "invalid maze dimensions {rows}x{cols}, both must be positive and the grid must fit in memory"
                )
            }
            Self::OutOfBounds { point, rows, cols } => {
                write!(f, "{point} is outside the {rows}x{cols} grid")
            }
            Self::NotGenerated => write!(f, "maze has not been generated yet"),
            Self::UnexpectedSymbol { symbol, row, col } => {
                write!(f, "unexpected character `{symbol}` at row={row}, col={col}")
            }
            Self::DuplicateMarker { symbol, row, col } => {
                write!(f, "second `{symbol}` marker at row={row}, col={col}")
            }
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} cells, expected {expected} like the first row"
            ),
        }
    }
}

impl std::error::Error for Error {}
