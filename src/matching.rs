//! Same-colour cluster discard (4-connected flood fill).

use crate::grid::TileGrid;

const NEIGHBOURS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Discard the 4-connected group of tiles sharing the colour of the tile at
/// `(x, y)`. Returns the number of tiles removed; 0 when the start cell is
/// empty or off the board.
///
/// Uses an explicit work stack. A discarded cell is empty on revisit, which
/// is what stops the search; mismatched tiles are neither removed nor
/// expanded.
pub fn discard_connected(grid: &mut TileGrid, x: i32, y: i32) -> usize {
    let Some(color) = grid.color_at(x, y) else {
        return 0;
    };
    let mut pending = vec![(x, y)];
    let mut discarded = 0;
    while let Some((cx, cy)) = pending.pop() {
        if grid.color_at(cx, cy) != Some(color) {
            continue;
        }
        grid.discard(cx, cy);
        discarded += 1;
        for (dx, dy) in NEIGHBOURS_4 {
            pending.push((cx + dx, cy + dy));
        }
    }
    log::debug!("discarded {discarded} tiles from ({x},{y})");
    discarded
}

/// Cells of the cluster that [`discard_connected`] would remove, without mutating.
pub fn connected_cells(grid: &TileGrid, x: i32, y: i32) -> Vec<(usize, usize)> {
    let Some(color) = grid.color_at(x, y) else {
        return Vec::new();
    };
    let mut seen = vec![false; grid.width() * grid.height()];
    let mut pending = vec![(x, y)];
    let mut cells = Vec::new();
    while let Some((cx, cy)) = pending.pop() {
        if grid.color_at(cx, cy) != Some(color) {
            continue;
        }
        let i = cy as usize * grid.width() + cx as usize;
        if std::mem::replace(&mut seen[i], true) {
            continue;
        }
        cells.push((cx as usize, cy as usize));
        for (dx, dy) in NEIGHBOURS_4 {
            pending.push((cx + dx, cy + dy));
        }
    }
    cells
}
