//! Board-level behaviour through the public API: discards, settling, feeding, game over.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tumbletiles::animation::Animations;
use tumbletiles::condense::{self, is_condensed};
use tumbletiles::gravity::{self, is_settled};
use tumbletiles::matching::{connected_cells, discard_connected};
use tumbletiles::{
    Board, BoardConfig, BoardLayout, GameStatus, SettleStrategy, SpawnOutcome, SpawnTrigger,
    TickInput, TileColor, TileFactory, TileGrid,
};

fn seeded(width: usize, height: usize, seed: u64) -> Board {
    Board::new(BoardConfig {
        width,
        height,
        seed: Some(seed),
        ..BoardConfig::default()
    })
}

fn activate(x: i32, y: i32) -> TickInput {
    TickInput {
        activate: Some((x, y)),
        spawn: None,
    }
}

#[test]
fn test_discards_shrink_board_by_group_size_only() {
    for seed in 0..16 {
        let mut board = seeded(8, 6, seed);
        board.populate(8).unwrap();
        let mut rng = StdRng::seed_from_u64(seed + 100);
        for _ in 0..40 {
            let x = rng.random_range(0..8);
            let y = rng.random_range(0..6);
            let group = connected_cells(board.grid(), x, y).len();
            let before = board.grid().occupied();

            let report = board.tick(activate(x, y)).unwrap();

            assert_eq!(report.discarded, group);
            assert_eq!(board.grid().occupied(), before - group);
            assert!(is_settled(board.grid()), "seed {seed}: gap left under a tile");
            assert!(is_condensed(board.grid()), "seed {seed}: empty column left of tiles");
        }
    }
}

#[test]
fn test_red_red_blue_row() {
    let mut factory = TileFactory::default();
    let mut grid = TileGrid::new(3, 1);
    for (x, color) in [TileColor::Red, TileColor::Red, TileColor::Blue]
        .into_iter()
        .enumerate()
    {
        grid.put(x, 0, factory.create(color.id()).unwrap()).unwrap();
    }
    assert_eq!(discard_connected(&mut grid, 0, 0), 2);
    assert!(grid.at(0, 0).is_none());
    assert!(grid.at(1, 0).is_none());
    assert_eq!(grid.color_at(2, 0), Some(TileColor::Blue));
}

#[test]
fn test_gravity_fixed_point_and_condense_conserve_tiles() {
    let mut factory = TileFactory::default();
    let mut rng = StdRng::seed_from_u64(3);
    let mut grid = TileGrid::new(10, 7);
    for x in 0..10 {
        for y in 0..7 {
            if rng.random_bool(0.4) {
                grid.put(x, y, factory.random(&mut rng)).unwrap();
            }
        }
    }
    let count = grid.occupied();
    let mut anims = Animations::new(256, 10);
    let layout = BoardLayout::default();

    let mut passes = 0;
    while gravity::apply(&mut grid, &mut anims, &layout) > 0 {
        passes += 1;
        assert!(passes < 8);
    }
    assert!(is_settled(&grid));
    assert_eq!(grid.occupied(), count);

    condense::apply(&mut grid, &mut anims, &layout).unwrap();
    assert!(is_condensed(&grid));
    assert!(is_settled(&grid));
    assert_eq!(grid.occupied(), count);
}

#[test]
fn test_until_stable_settles_tall_stacks() {
    let mut board = Board::new(BoardConfig {
        width: 1,
        height: 12,
        seed: Some(5),
        settle: SettleStrategy::UntilStable { max_passes: 16 },
        ..BoardConfig::default()
    });
    for y in [0, 2, 5, 7] {
        board.place(0, y, 0).unwrap();
    }
    let (fallen, condensed) = board.settle().unwrap();
    assert_eq!(fallen, 4);
    assert_eq!(condensed, 0);
    assert!((8..12).all(|y| board.grid().is_occupied(0, y)));
}

#[test]
fn test_feeding_until_the_board_is_full() {
    let mut board = seeded(3, 2, 11);
    for _ in 0..3 {
        assert_eq!(
            board.spawn_column(SpawnTrigger::Timer),
            Ok(SpawnOutcome::Spawned(2))
        );
    }
    assert_eq!(board.grid().occupied(), 6);
    assert_eq!(
        board.spawn_column(SpawnTrigger::Timer),
        Ok(SpawnOutcome::BoardFull)
    );
    assert_eq!(board.grid().occupied(), 6);

    let report = board.tick(TickInput::default()).unwrap();
    assert_eq!(report.status, GameStatus::BoardFull);
    assert_eq!(
        board.spawn_column(SpawnTrigger::Timer),
        Ok(SpawnOutcome::Ignored)
    );
}

#[test]
fn test_fed_tiles_slide_onto_their_cells() {
    let mut board = seeded(5, 3, 2);
    let feed = TickInput {
        activate: None,
        spawn: Some(SpawnTrigger::Timer),
    };
    let report = board.tick(feed).unwrap();
    assert_eq!(report.spawned, 3);
    assert_eq!(report.animations_in_flight, 3);

    let steps = board.animations().steps();
    for _ in 1..steps {
        board.tick(TickInput::default()).unwrap();
    }
    assert_eq!(board.animations().in_flight(), 0);
    let layout = *board.layout();
    for (x, y, tile) in board.grid().render_iter() {
        assert_eq!(tile.pos, layout.pos_at(x as i32, y as i32));
    }
    assert_eq!(board.sprites().count(), board.grid().occupied());
}

#[test]
fn test_same_seed_same_board() {
    let colours = |seed| {
        let mut board = seeded(6, 4, seed);
        board.populate(3).unwrap();
        board.spawn_column(SpawnTrigger::Timer).unwrap();
        board.sprites().map(|(c, _)| c).collect::<Vec<_>>()
    };
    assert_eq!(colours(77), colours(77));
}

#[test]
fn test_manual_feed_waits_for_cooldown() {
    let mut board = Board::new(BoardConfig {
        width: 10,
        height: 2,
        seed: Some(1),
        spawn_cooldown_ticks: 5,
        ..BoardConfig::default()
    });
    let manual = TickInput {
        activate: None,
        spawn: Some(SpawnTrigger::Manual),
    };
    let spawned: Vec<bool> = (0..12)
        .map(|_| board.tick(manual).unwrap().spawned > 0)
        .collect();
    let expected: Vec<bool> = (0..12).map(|i| i % 5 == 0).collect();
    assert_eq!(spawned, expected);
}
