//! Column gravity: tiles fall straight down onto the floor or the tile below.

use crate::animation::Animations;
use crate::grid::{BoardLayout, TileGrid};

/// How settling repeats gravity within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStrategy {
    /// Run exactly this many passes, moved or not.
    FixedPasses(u32),
    /// Repeat until a pass moves nothing, giving up after `max_passes`.
    UntilStable { max_passes: u32 },
}

impl Default for SettleStrategy {
    fn default() -> Self {
        Self::FixedPasses(2)
    }
}

/// One gravity pass over every column. Returns how many tiles moved.
///
/// Each column is scanned bottom-up with a running count of empty cells
/// seen so far; an occupied cell above a gap drops by that count and gets a
/// tween to its new cell. The vacated cell keeps the gap the same size, so
/// every tile in the column settles in a single pass and a second pass
/// reports zero.
pub fn apply(grid: &mut TileGrid, animations: &mut Animations, layout: &BoardLayout) -> usize {
    let mut moved = 0;
    for x in 0..grid.width() {
        let mut gap = 0;
        for y in (0..grid.height()).rev() {
            if !grid.is_occupied(x as i32, y as i32) {
                gap += 1;
                continue;
            }
            if gap == 0 {
                continue;
            }
            let to = y + gap;
            match grid.relocate((x, y), (x, to)) {
                Ok(Some(id)) => {
                    animations.schedule(grid, id, layout.pos_at(x as i32, to as i32));
                    moved += 1;
                }
                Ok(None) => {}
                Err(err) => log::warn!("gravity: cannot drop ({x},{y}) by {gap}: {err}"),
            }
        }
    }
    moved
}

/// Run gravity according to `strategy`. Returns the total number of moves.
pub fn settle(
    grid: &mut TileGrid,
    animations: &mut Animations,
    layout: &BoardLayout,
    strategy: SettleStrategy,
) -> usize {
    let mut total = 0;
    match strategy {
        SettleStrategy::FixedPasses(passes) => {
            for pass in 0..passes {
                let moved = apply(grid, animations, layout);
                if moved > 0 {
                    log::debug!("moved by gravity pass {}: {moved}", pass + 1);
                }
                total += moved;
            }
        }
        SettleStrategy::UntilStable { max_passes } => {
            for _ in 0..max_passes {
                let moved = apply(grid, animations, layout);
                total += moved;
                if moved == 0 {
                    break;
                }
            }
        }
    }
    total
}

/// True when no column has an empty cell directly below an occupied one.
pub fn is_settled(grid: &TileGrid) -> bool {
    (0..grid.width() as i32).all(|x| {
        (0..grid.height() as i32 - 1)
            .all(|y| !grid.is_occupied(x, y) || grid.is_occupied(x, y + 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileFactory;

    fn column(height: usize, rows: &[usize]) -> TileGrid {
        let mut factory = TileFactory::default();
        let mut grid = TileGrid::new(1, height);
        for &y in rows {
            grid.put(0, y, factory.create(0).unwrap()).unwrap();
        }
        grid
    }

    #[test]
    fn floor_tile_stays_and_top_tile_lands_on_it() {
        let mut grid = column(4, &[0, 3]);
        let top = grid.at(0, 0).unwrap();
        let bottom = grid.at(0, 3).unwrap();
        let mut anims = Animations::new(8, 4);
        let layout = BoardLayout::default();

        apply(&mut grid, &mut anims, &layout);
        assert_eq!(*grid.at(0, 3), Some(bottom));
        assert!(!anims.is_animating(bottom));

        settle(
            &mut grid,
            &mut anims,
            &layout,
            SettleStrategy::UntilStable { max_passes: 8 },
        );
        assert_eq!(*grid.at(0, 2), Some(top));
        assert!(grid.at(0, 0).is_none());
        assert!(anims.is_animating(top));
        assert!(is_settled(&grid));
    }

    #[test]
    fn stacked_tiles_settle_in_one_pass() {
        let mut grid = column(6, &[0, 1, 3]);
        let mut anims = Animations::new(8, 4);
        let moved = apply(&mut grid, &mut anims, &BoardLayout::default());
        assert_eq!(moved, 3);
        assert!(is_settled(&grid));
        assert_eq!(apply(&mut grid, &mut anims, &BoardLayout::default()), 0);
        assert_eq!(grid.occupied(), 3);
    }

    #[test]
    fn settled_column_reports_no_moves() {
        let mut grid = column(3, &[1, 2]);
        let mut anims = Animations::new(2, 4);
        assert_eq!(apply(&mut grid, &mut anims, &BoardLayout::default()), 0);
        assert_eq!(anims.in_flight(), 0);
    }

    #[test]
    fn fixed_passes_run_even_when_idle() {
        let mut grid = column(3, &[0]);
        let mut anims = Animations::new(2, 4);
        let moved = settle(
            &mut grid,
            &mut anims,
            &BoardLayout::default(),
            SettleStrategy::FixedPasses(2),
        );
        assert_eq!(moved, 1);
        assert!(grid.is_occupied(0, 2));
    }

    #[test]
    fn tiles_still_move_without_free_animators() {
        let mut grid = column(5, &[0, 1]);
        let mut anims = Animations::new(0, 4);
        let layout = BoardLayout::default();
        assert_eq!(apply(&mut grid, &mut anims, &layout), 2);
        assert!(is_settled(&grid));
        assert_eq!(anims.dropped(), 2);
        for y in [3, 4] {
            let tile = grid.tile_at(0, y).unwrap();
            assert_eq!(tile.pos, layout.pos_at(0, y));
        }
    }
}
