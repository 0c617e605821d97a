//! Tile grid: W x H cells, each empty or holding one tile id, plus the tile store.
//!
//! Coordinates are `(x, y)` with `y = 0` the top row. Lookups outside the
//! board return a shared sentinel slot that is always empty; compare with
//! [`TileGrid::is_sentinel`] to tell it apart from a real cell.

use crate::error::BoardError;
use crate::tile::{Point, Tile, TileColor, TileId};
use std::collections::HashMap;

/// A grid cell: the id of the tile it holds, if any.
pub type Slot = Option<TileId>;

#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    /// Row-major: cells[y * width + x].
    cells: Vec<Slot>,
    tiles: HashMap<TileId, Tile>,
    out_of_bounds: Slot,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
            tiles: HashMap::with_capacity(width * height),
            out_of_bounds: None,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// The slot at `(x, y)`, or the sentinel when out of range.
    pub fn at(&self, x: i32, y: i32) -> &Slot {
        match self.index(x, y) {
            Some(i) => &self.cells[i],
            None => &self.out_of_bounds,
        }
    }

    /// Mutable slot at `(x, y)`, or the sentinel when out of range. The
    /// sentinel is emptied on every hand-out so writes to it never stick.
    fn at_mut(&mut self, x: i32, y: i32) -> &mut Slot {
        match self.index(x, y) {
            Some(i) => &mut self.cells[i],
            None => {
                self.out_of_bounds = None;
                &mut self.out_of_bounds
            }
        }
    }

    /// True when `slot` is the out-of-bounds sentinel rather than a board cell.
    pub fn is_sentinel(&self, slot: &Slot) -> bool {
        std::ptr::eq(slot, &self.out_of_bounds)
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.at(x, y).and_then(|id| self.tiles.get(&id))
    }

    pub fn color_at(&self, x: i32, y: i32) -> Option<TileColor> {
        self.tile_at(x, y).map(|t| t.color)
    }

    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.at(x, y).is_some()
    }

    /// Number of tiles on the board.
    #[inline]
    pub fn occupied(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_column_empty(&self, x: usize) -> bool {
        (0..self.height).all(|y| !self.is_occupied(x as i32, y as i32))
    }

    /// Place a tile. Never overwrites: an occupied or off-board target is
    /// logged and reported, and the tile is dropped.
    pub fn put(&mut self, x: usize, y: usize, tile: Tile) -> Result<TileId, BoardError> {
        let (xi, yi) = (x as i32, y as i32);
        let sentinel: *const Slot = &self.out_of_bounds;
        let slot = self.at_mut(xi, yi);
        if std::ptr::eq(&*slot, sentinel) {
            log::warn!("put: ({x},{y}) is outside the board");
            return Err(BoardError::OutOfBounds { x: xi, y: yi });
        }
        if let Some(existing) = *slot {
            log::warn!("put: there is already a tile {existing} at ({x},{y})");
            return Err(BoardError::CellOccupied { x, y });
        }
        let id = tile.id;
        *slot = Some(id);
        self.tiles.insert(id, tile);
        Ok(id)
    }

    /// Remove the tile at `(x, y)` from the cell and the store together.
    pub fn discard(&mut self, x: i32, y: i32) -> Option<Tile> {
        let id = self.at_mut(x, y).take()?;
        self.tiles.remove(&id)
    }

    /// Move whatever sits at `from` into the empty cell `to`. Returns the
    /// moved id, `None` when `from` was empty.
    pub fn relocate(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<Option<TileId>, BoardError> {
        let (tx, ty) = (to.0 as i32, to.1 as i32);
        if !self.contains(tx, ty) {
            return Err(BoardError::OutOfBounds { x: tx, y: ty });
        }
        if self.is_occupied(tx, ty) {
            return Err(BoardError::CellOccupied { x: to.0, y: to.1 });
        }
        let Some(id) = self.at_mut(from.0 as i32, from.1 as i32).take() else {
            return Ok(None);
        };
        *self.at_mut(tx, ty) = Some(id);
        Ok(Some(id))
    }

    /// Occupied cells in column-major order (x outer, y inner).
    pub fn render_iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).filter_map(move |y| {
                self.tile_at(x as i32, y as i32).map(|tile| (x, y, tile))
            })
        })
    }
}

/// Maps grid cells to screen coordinates: `origin + (x * tile_width, y * tile_height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub origin: Point,
    pub tile_width: f32,
    pub tile_height: f32,
}

/// Tile edge in pixels for a sprite renderer.
pub const DEFAULT_TILE_SIZE: f32 = 64.0;

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            origin: Point::new(0.0, DEFAULT_TILE_SIZE * 2.0),
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
        }
    }
}

impl BoardLayout {
    /// Screen position of cell `(x, y)`. Accepts off-board cells (spawn column).
    pub fn pos_at(&self, x: i32, y: i32) -> Point {
        Point::new(
            self.origin.x + x as f32 * self.tile_width,
            self.origin.y + y as f32 * self.tile_height,
        )
    }

    /// Cell under a screen point, if it falls inside a `width` x `height` board.
    pub fn cell_at(&self, point: Point, width: usize, height: usize) -> Option<(usize, usize)> {
        let fx = ((point.x - self.origin.x) / self.tile_width).floor();
        let fy = ((point.y - self.origin.y) / self.tile_height).floor();
        if fx < 0.0 || fy < 0.0 {
            return None;
        }
        let (x, y) = (fx as usize, fy as usize);
        (x < width && y < height).then_some((x, y))
    }
}
