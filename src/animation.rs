//! Per-tile position tweens driven from a fixed [`SlotPool`].
//!
//! An [`Animator`] walks one tile toward a target in a fixed number of
//! steps, one per tick, and snaps exactly onto the target on the last one.
//! [`Animations`] owns the pool, re-arms an animator when its tile is moved
//! again mid-flight, and drops the tween (not the move) when the pool is dry, placing the tile
//! straight on its target.

use std::collections::HashMap;

use crate::grid::TileGrid;
use crate::pool::{SlotIndex, SlotPool};
use crate::tile::{Point, Tile, TileId};

/// Frames a displaced tile takes to reach its new cell.
pub const DEFAULT_STEPS: u32 = 10;

/// Result of one [`Animator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Still travelling.
    Moving,
    /// Reached the target on this tick.
    Arrived,
    /// Ticked without being armed; nothing moved.
    Idle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Animator {
    tile: Option<TileId>,
    target: Point,
    steps: u32,
}

impl Animator {
    /// Arm this animator: move `tile` to `target` over `steps` ticks.
    pub fn set(&mut self, tile: TileId, target: Point, steps: u32) {
        self.tile = Some(tile);
        self.target = target;
        self.steps = steps;
    }

    pub fn tile(&self) -> Option<TileId> {
        self.tile
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn steps_remaining(&self) -> u32 {
        self.steps
    }

    pub fn is_armed(&self) -> bool {
        self.tile.is_some() && self.steps > 0
    }

    /// Move `tile` one step. The step covers `1 / steps_remaining` of the
    /// remaining distance, so the last step lands exactly on the target.
    pub fn tick(&mut self, tile: &mut Tile) -> Progress {
        match self.steps {
            0 => {
                log::warn!(
                    "animator ticked after reaching its target (tile {})",
                    tile.id
                );
                Progress::Idle
            }
            1 => {
                tile.pos = self.target;
                self.steps = 0;
                self.tile = None;
                Progress::Arrived
            }
            n => {
                let n = n as f32;
                tile.pos.x += (self.target.x - tile.pos.x) / n;
                tile.pos.y += (self.target.y - tile.pos.y) / n;
                self.steps -= 1;
                Progress::Moving
            }
        }
    }
}

/// A bounded set of in-flight animators.
#[derive(Debug, Clone)]
pub struct Animations {
    pool: SlotPool<Animator>,
    slots: HashMap<TileId, SlotIndex>,
    steps: u32,
    dropped: u64,
}

impl Animations {
    pub fn new(capacity: usize, steps: u32) -> Self {
        Self {
            pool: SlotPool::new(capacity),
            slots: HashMap::with_capacity(capacity),
            steps: steps.max(1),
            dropped: 0,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Animators currently armed.
    pub fn in_flight(&self) -> usize {
        self.pool.used_count()
    }

    /// Animations skipped because the pool was exhausted.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Animator> + '_ {
        self.pool.iter().map(|(_, a)| a)
    }

    pub fn is_animating(&self, tile: TileId) -> bool {
        self.slots.contains_key(&tile)
    }

    /// Tween `tile` to `target` with the default step count.
    pub fn schedule(
        &mut self,
        grid: &mut TileGrid,
        tile: TileId,
        target: Point,
    ) -> Option<SlotIndex> {
        self.schedule_with_steps(grid, tile, target, self.steps)
    }

    /// Tween `tile` to `target`. A tile already in flight is re-aimed in
    /// place. Returns `None` when no slot is free; the tile is then placed
    /// on `target` at once so its drawn position never lags its cell.
    pub fn schedule_with_steps(
        &mut self,
        grid: &mut TileGrid,
        tile: TileId,
        target: Point,
        steps: u32,
    ) -> Option<SlotIndex> {
        let index = match self.slots.get(&tile) {
            Some(&i) => i,
            None => match self.pool.acquire() {
                Some(i) => {
                    self.slots.insert(tile, i);
                    i
                }
                None => {
                    self.dropped += 1;
                    log::debug!("animation pool exhausted, tile {tile} jumps to its cell");
                    if let Some(t) = grid.tile_mut(tile) {
                        t.pos = target;
                    }
                    return None;
                }
            },
        };
        if let Some(animator) = self.pool.get_mut(index) {
            animator.set(tile, target, steps.max(1));
        }
        Some(index)
    }

    /// Advance every animator by one step and release the finished ones.
    /// Animators whose tile no longer exists are released without moving.
    /// Returns how many animators finished.
    pub fn tick(&mut self, grid: &mut TileGrid) -> usize {
        let mut finished = 0;
        let mut cursor = self.pool.cursor();
        while let Some(index) = cursor.advance(&self.pool) {
            let (owner, done) = match self.pool.get_mut(index) {
                Some(animator) => {
                    let owner = animator.tile();
                    let done = match owner.and_then(|id| grid.tile_mut(id)) {
                        Some(tile) => animator.tick(tile) != Progress::Moving,
                        None => true,
                    };
                    (owner, done)
                }
                None => (None, true),
            };
            if done {
                if let Some(id) = owner {
                    self.slots.remove(&id);
                }
                self.pool.release(index);
                finished += 1;
            }
        }
        finished
    }

    /// Snap every in-flight tile onto its target and free all slots.
    pub fn finish_all(&mut self, grid: &mut TileGrid) {
        for (_, animator) in self.pool.iter() {
            if let Some(tile) = animator.tile().and_then(|id| grid.tile_mut(id)) {
                tile.pos = animator.target();
            }
        }
        self.pool.clear();
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileFactory;

    fn one_tile_grid() -> (TileGrid, TileId) {
        let mut factory = TileFactory::default();
        let mut grid = TileGrid::new(1, 1);
        let id = grid.put(0, 0, factory.create(0).unwrap()).unwrap();
        (grid, id)
    }

    #[test]
    fn animator_snaps_on_last_step() {
        let (mut grid, id) = one_tile_grid();
        let mut animator = Animator::default();
        animator.set(id, Point::new(30.0, 0.0), 3);
        let tile = grid.tile_mut(id).unwrap();
        assert_eq!(animator.tick(tile), Progress::Moving);
        assert!((tile.pos.x - 10.0).abs() < 1e-4);
        assert_eq!(animator.tick(tile), Progress::Moving);
        assert_eq!(animator.tick(tile), Progress::Arrived);
        assert_eq!(tile.pos, Point::new(30.0, 0.0));
        assert_eq!(animator.tick(tile), Progress::Idle);
        assert!(!animator.is_armed());
    }

    #[test]
    fn tick_releases_finished_slots() {
        let (mut grid, id) = one_tile_grid();
        let mut anims = Animations::new(4, 2);
        anims.schedule(&mut grid, id, Point::new(8.0, 8.0)).unwrap();
        assert_eq!(anims.tick(&mut grid), 0);
        assert_eq!(anims.in_flight(), 1);
        assert_eq!(anims.tick(&mut grid), 1);
        assert_eq!(anims.in_flight(), 0);
        assert!(!anims.is_animating(id));
        assert_eq!(grid.tile(id).unwrap().pos, Point::new(8.0, 8.0));
    }

    #[test]
    fn rescheduling_a_tile_reuses_its_slot() {
        let (mut grid, id) = one_tile_grid();
        let mut anims = Animations::new(4, 5);
        let first = anims.schedule(&mut grid, id, Point::new(1.0, 0.0)).unwrap();
        let second = anims.schedule(&mut grid, id, Point::new(2.0, 0.0)).unwrap();
        assert_eq!(first, second);
        assert_eq!(anims.in_flight(), 1);
        assert_eq!(anims.iter().next().unwrap().target(), Point::new(2.0, 0.0));
    }

    #[test]
    fn exhausted_pool_drops_the_tween() {
        let mut factory = TileFactory::default();
        let mut grid = TileGrid::new(2, 1);
        let a = grid.put(0, 0, factory.create(0).unwrap()).unwrap();
        let b = grid.put(1, 0, factory.create(0).unwrap()).unwrap();
        let mut anims = Animations::new(1, 4);
        assert!(anims.schedule(&mut grid, a, Point::new(5.0, 5.0)).is_some());
        assert!(anims.schedule(&mut grid, b, Point::new(9.0, 2.0)).is_none());
        assert_eq!(anims.dropped(), 1);
        assert!(!anims.is_animating(b));
        assert_eq!(grid.tile(b).unwrap().pos, Point::new(9.0, 2.0));
        assert_eq!(grid.tile(a).unwrap().pos, Point::default());
    }

    #[test]
    fn released_slot_is_reacquired_for_another_tile() {
        let mut factory = TileFactory::default();
        let mut grid = TileGrid::new(2, 1);
        let a = grid.put(0, 0, factory.create(0).unwrap()).unwrap();
        let b = grid.put(1, 0, factory.create(1).unwrap()).unwrap();
        let mut anims = Animations::new(1, 1);
        let slot = anims.schedule(&mut grid, a, Point::new(4.0, 0.0)).unwrap();
        assert_eq!(anims.tick(&mut grid), 1);
        assert!(!anims.is_animating(a));

        assert_eq!(anims.schedule(&mut grid, b, Point::new(6.0, 0.0)), Some(slot));
        assert!(anims.is_animating(b));
        assert!(!anims.is_animating(a));
        anims.finish_all(&mut grid);
        assert!(!anims.is_animating(b));
        assert_eq!(anims.schedule(&mut grid, a, Point::new(0.0, 0.0)), Some(slot));
    }

    #[test]
    fn vanished_tile_frees_its_animator() {
        let (mut grid, id) = one_tile_grid();
        let mut anims = Animations::new(2, 6);
        anims.schedule(&mut grid, id, Point::new(3.0, 3.0));
        grid.discard(0, 0);
        assert_eq!(anims.tick(&mut grid), 1);
        assert_eq!(anims.in_flight(), 0);
    }

    #[test]
    fn finish_all_places_tiles_on_target() {
        let (mut grid, id) = one_tile_grid();
        let mut anims = Animations::new(2, 50);
        anims.schedule(&mut grid, id, Point::new(64.0, 0.0));
        anims.finish_all(&mut grid);
        assert_eq!(anims.in_flight(), 0);
        assert!(!anims.is_animating(id));
        assert_eq!(grid.tile(id).unwrap().pos, Point::new(64.0, 0.0));
    }
}
