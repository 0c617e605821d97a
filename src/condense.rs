//! Horizontal compaction: empty columns are squeezed out toward the left,
//! packing occupied columns against the right edge.

use crate::animation::Animations;
use crate::error::BoardError;
use crate::grid::{BoardLayout, TileGrid};

/// Scan right to left counting empty columns; every occupied column found
/// after `n` empties shifts `n` columns right. Returns how many tiles moved.
///
/// A shift onto an occupied cell means the grid was already inconsistent;
/// it is returned as [`BoardError::CellOccupied`] rather than skipped.
pub fn apply(
    grid: &mut TileGrid,
    animations: &mut Animations,
    layout: &BoardLayout,
) -> Result<usize, BoardError> {
    let mut empty_run = 0;
    let mut moved = 0;
    for x in (0..grid.width()).rev() {
        if grid.is_column_empty(x) {
            empty_run += 1;
        } else if empty_run > 0 {
            moved += displace_column(grid, animations, layout, x, x + empty_run)?;
        }
    }
    if moved > 0 {
        log::debug!("condensed {moved} tiles");
    }
    Ok(moved)
}

/// Move every tile of column `from` into the same row of column `to`,
/// tweening each one. All targets are checked before anything moves, so a
/// conflict leaves the column untouched.
pub fn displace_column(
    grid: &mut TileGrid,
    animations: &mut Animations,
    layout: &BoardLayout,
    from: usize,
    to: usize,
) -> Result<usize, BoardError> {
    let height = grid.height();
    if let Some(y) = (0..height)
        .find(|&y| grid.is_occupied(from as i32, y as i32) && grid.is_occupied(to as i32, y as i32))
    {
        log::warn!("shift of column {from} to {to} blocked at row {y}");
        return Err(BoardError::CellOccupied { x: to, y });
    }
    let mut moved = 0;
    for y in 0..height {
        if let Some(id) = grid.relocate((from, y), (to, y))? {
            animations.schedule(grid, id, layout.pos_at(to as i32, y as i32));
            moved += 1;
        }
    }
    Ok(moved)
}

/// True when every empty column lies left of all occupied ones.
pub fn is_condensed(grid: &TileGrid) -> bool {
    let mut seen_occupied = false;
    for x in 0..grid.width() {
        let empty = grid.is_column_empty(x);
        if empty && seen_occupied {
            return false;
        }
        seen_occupied |= !empty;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileFactory;

    fn grid_with(width: usize, height: usize, cells: &[(usize, usize)]) -> TileGrid {
        let mut factory = TileFactory::default();
        let mut grid = TileGrid::new(width, height);
        for &(x, y) in cells {
            grid.put(x, y, factory.create(0).unwrap()).unwrap();
        }
        grid
    }

    #[test]
    fn lone_column_moves_to_right_edge() {
        let mut grid = grid_with(5, 3, &[(2, 1), (2, 2)]);
        let ids = [grid.at(2, 1).unwrap(), grid.at(2, 2).unwrap()];
        let mut anims = Animations::new(8, 4);
        let moved = apply(&mut grid, &mut anims, &BoardLayout::default());
        assert_eq!(moved, Ok(2));
        assert_eq!(*grid.at(4, 1), Some(ids[0]));
        assert_eq!(*grid.at(4, 2), Some(ids[1]));
        assert!(grid.is_column_empty(2));
        assert!(ids.iter().all(|&id| anims.is_animating(id)));
        assert!(is_condensed(&grid));
    }

    #[test]
    fn interior_gaps_close_up() {
        let mut grid = grid_with(6, 1, &[(0, 0), (2, 0), (5, 0)]);
        let mut anims = Animations::new(8, 4);
        apply(&mut grid, &mut anims, &BoardLayout::default()).unwrap();
        assert!(is_condensed(&grid));
        assert!(grid.is_occupied(3, 0) && grid.is_occupied(4, 0) && grid.is_occupied(5, 0));
        assert_eq!(grid.occupied(), 3);
    }

    #[test]
    fn packed_board_is_left_alone() {
        let mut grid = grid_with(3, 1, &[(1, 0), (2, 0)]);
        let mut anims = Animations::new(8, 4);
        assert_eq!(apply(&mut grid, &mut anims, &BoardLayout::default()), Ok(0));
        assert_eq!(anims.in_flight(), 0);
    }

    #[test]
    fn blocked_shift_is_reported_and_atomic() {
        let mut grid = grid_with(3, 2, &[(0, 0), (0, 1), (2, 1)]);
        let mut anims = Animations::new(8, 4);
        let err = displace_column(&mut grid, &mut anims, &BoardLayout::default(), 0, 2);
        assert_eq!(err, Err(BoardError::CellOccupied { x: 2, y: 1 }));
        assert!(grid.is_occupied(0, 0) && grid.is_occupied(0, 1));
        assert_eq!(anims.in_flight(), 0);
    }
}
