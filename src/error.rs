//! Board errors: placement conflicts, bad colour ids, a halted board.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    /// A put or shift targeted a cell that already holds a tile.
    #[error("cell ({x},{y}) is already occupied")]
    CellOccupied { x: usize, y: usize },
    /// Explicit placement outside the board. Lookups use the sentinel slot instead.
    #[error("cell ({x},{y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },
    /// The tile factory was asked for a colour it does not know.
    #[error("invalid tile colour id: {0}")]
    InvalidColor(u8),
    /// The controller already hit an unrecoverable conflict and refuses to run.
    #[error("board halted after an earlier conflict")]
    Halted,
}
