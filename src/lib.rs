//! Tumbletiles core: a same-colour collapse puzzle on a fixed grid.
//!
//! Clicking a tile discards its 4-connected same-colour group, gravity drops
//! what was above, empty columns condense to the right, and new columns feed
//! in from the right edge until the board is full. Every tile move is
//! tweened by an animator drawn from a fixed-capacity [`pool::SlotPool`].
//!
//! The library is renderer-agnostic: [`board::Board::sprites`] yields
//! `(colour, screen position)` pairs and [`resources::Resources`] maps each
//! colour to whatever handle the front end draws with.

pub mod animation;
pub mod board;
pub mod condense;
pub mod error;
pub mod gravity;
pub mod grid;
pub mod matching;
pub mod pool;
pub mod resources;
pub mod tile;

pub use board::{
    Board, BoardConfig, GameStatus, Phase, SpawnOutcome, SpawnTrigger, TickInput, TickReport,
};
pub use error::BoardError;
pub use gravity::SettleStrategy;
pub use grid::{BoardLayout, TileGrid};
pub use resources::Resources;
pub use tile::{Point, Tile, TileColor, TileFactory, TileId};
