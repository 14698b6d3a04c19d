//! Property-based tests for level generation and visibility.
//!
//! Run with: cargo test --release prop_level

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use darkdeck::level::{LevelParams, Tile, generate_level, is_fully_connected};
use darkdeck::visibility::{ConeParams, compute_visibility};
use darkdeck::{Level, TileCoord};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every generated floor is fully connected and has the minimum rooms.
    #[test]
    fn prop_generated_levels_connected(seed in any::<u64>(), floor in 1u32..10) {
        let params = LevelParams::new(floor, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let level = generate_level(&params, &mut rng).unwrap();

        prop_assert!(is_fully_connected(&level));
        prop_assert!(level.rooms.len() >= params.required_rooms());
        prop_assert_eq!(level.floor_index, floor);
        prop_assert!(!level.tile(Level::world_to_tile(level.player_spawn)).blocks_movement());
    }

    /// The same seed and parameters always produce the same floor.
    #[test]
    fn prop_generation_deterministic(seed in any::<u64>(), floor in 1u32..6) {
        let params = LevelParams::new(floor, 8);
        let a = generate_level(&params, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        let b = generate_level(&params, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Nothing behind a solid wall column is ever visible, whatever the
    /// observer's position, facing, or range.
    #[test]
    fn prop_wall_column_blocks_sight(
        ox in 1i32..9,
        oy in 1i32..11,
        tx in 12i32..22,
        ty in 1i32..11,
        facing in 0.0f64..360.0,
        range_tiles in 1.0f64..30.0,
    ) {
        let mut level = Level::open_room(24, 12, 1);
        for y in 0..12 {
            level.set_tile(TileCoord::new(10, y), Tile::Wall);
        }
        let origin = Level::tile_center(TileCoord::new(ox, oy));
        let target = Level::tile_center(TileCoord::new(tx, ty));
        let params = ConeParams::all_round(range_tiles * 32.0);

        let field = compute_visibility(&level, origin, facing, &params, &[(7, target)]);
        prop_assert!(!field.sees_entity(7));
        prop_assert!(field.tiles.iter().all(|t| t.x <= 10));
    }
}
