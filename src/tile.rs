//! Tiles: colour, identity, on-screen position, and the factory that builds them.

use crate::error::BoardError;
use rand::Rng;
use std::fmt;

/// Tile colours. Ids are the variant order (0..COUNT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileColor {
    Red,
    Blue,
    Orange,
    Grey,
    Brown,
    Green,
}

impl TileColor {
    pub const COUNT: usize = 6;
    pub const ALL: [Self; Self::COUNT] = [
        Self::Red,
        Self::Blue,
        Self::Orange,
        Self::Grey,
        Self::Brown,
        Self::Green,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Opaque tile identity. Never reused within one factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Continuous screen coordinate. A tile between cells sits at a fractional point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: TileId,
    pub color: TileColor,
    /// Rendered position. The grid cell is authoritative for gameplay; this is display only.
    pub pos: Point,
}

/// Builds tiles with fresh ids from the first `colors` entries of [`TileColor::ALL`].
#[derive(Debug, Clone)]
pub struct TileFactory {
    next_id: u64,
    colors: u8,
}

impl TileFactory {
    /// `colors` is clamped to 1..=TileColor::COUNT.
    pub fn new(colors: u8) -> Self {
        Self {
            next_id: 0,
            colors: colors.clamp(1, TileColor::COUNT as u8),
        }
    }

    pub fn colors(&self) -> u8 {
        self.colors
    }

    /// Build a tile of colour `color_id`. Ids outside the active palette are rejected.
    pub fn create(&mut self, color_id: u8) -> Result<Tile, BoardError> {
        let color = TileColor::from_id(color_id)
            .filter(|_| color_id < self.colors)
            .ok_or(BoardError::InvalidColor(color_id))?;
        Ok(self.build(color))
    }

    pub fn random<R: Rng>(&mut self, rng: &mut R) -> Tile {
        let color = TileColor::ALL[rng.random_range(0..self.colors) as usize];
        self.build(color)
    }

    fn build(&mut self, color: TileColor) -> Tile {
        let id = TileId(self.next_id);
        self.next_id += 1;
        Tile {
            id,
            color,
            pos: Point::default(),
        }
    }
}

impl Default for TileFactory {
    fn default() -> Self {
        Self::new(TileColor::COUNT as u8)
    }
}
