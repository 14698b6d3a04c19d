//! Configuration constants and runtime settings for the deck simulation.

use serde::{Deserialize, Serialize};

// World scale
pub const TILE_SIZE: f64 = 32.0; // World units per tile edge
pub const DEFAULT_TICK_SECONDS: f64 = 1.0 / 60.0;
pub const MAX_DELTA_TIME: f64 = 0.1; // Clamp for frame hitches

// Level generation
pub const LEVEL_WIDTH_TILES: i32 = 96;
pub const LEVEL_HEIGHT_TILES: i32 = 72;
pub const DEFAULT_ROOM_TARGET: usize = 10;
pub const MIN_ROOM_COUNT: usize = 4;
pub const ROOM_MIN_SIZE: i32 = 5;
pub const ROOM_MAX_SIZE: i32 = 11;
pub const ROOM_GAP_MIN: i32 = 2; // Wall tiles between neighbouring rooms
pub const ROOM_GAP_MAX: i32 = 6;
pub const ROOM_PLACEMENT_ATTEMPTS: u32 = 100;
pub const MAX_GENERATION_ATTEMPTS: u32 = 12;
pub const LOOP_CORRIDOR_RATIO: f64 = 0.25; // Extra corridors per placed room
pub const LOOP_CORRIDOR_MAX_DISTANCE: f64 = 24.0; // Tiles between room centres
pub const DOOR_LOCK_CHANCE: f64 = 0.35;
pub const BOSS_FLOOR_INTERVAL: u32 = 3; // Every third floor ends in a boss room
pub const TREASURE_ROOM_FRACTIONS: [f64; 2] = [1.0 / 3.0, 2.0 / 3.0];

// Visibility
pub const RAY_COUNT: usize = 48;
pub const RAY_STEP: f64 = TILE_SIZE / 4.0; // Fixed march increment
pub const AMBIENT_RADIUS: f64 = TILE_SIZE * 1.5;
pub const LIT_ROOM_RANGE: f64 = TILE_SIZE * 14.0;
pub const FLASHLIGHT_RANGE: f64 = TILE_SIZE * 10.0;
pub const FLASHLIGHT_CONE_DEG: f64 = 75.0; // Full cone width
pub const AMBIENT_ONLY_RANGE: f64 = TILE_SIZE * 2.5;

// Player
pub const PLAYER_MAX_HEALTH: f64 = 100.0;
pub const PLAYER_SPEED: f64 = 110.0; // World units per second
pub const PLAYER_SIZE: f64 = 10.0; // Collision radius
pub const SPRINT_MULTIPLIER: f64 = 1.6;
pub const MAX_OXYGEN: f64 = 100.0;
pub const MAX_BATTERY: f64 = 100.0;
pub const MAX_STAMINA: f64 = 100.0;
pub const MOVE_DEADZONE: f64 = 0.05;
pub const PICKUP_RADIUS: f64 = 20.0;
pub const INTERACT_RANGE: f64 = TILE_SIZE * 1.5;
pub const HACK_DURATION: f64 = 3.0; // Seconds of held interact to open a lock
pub const HIT_IFRAMES: f64 = 0.5; // Post-hit invulnerability
pub const DODGE_DURATION: f64 = 0.35;
pub const DODGE_SPEED_MULTIPLIER: f64 = 2.5;
pub const DODGE_STAMINA_COST: f64 = 25.0;
pub const COMBAT_TIER_WINDOW: f64 = 3.0; // Seconds after fighting that count as combat

// Resource economy (per second)
pub const OXYGEN_RATE_IDLE: f64 = 0.5;
pub const OXYGEN_RATE_WALK: f64 = 0.8;
pub const OXYGEN_RATE_RUN: f64 = 1.33;
pub const OXYGEN_RATE_COMBAT: f64 = 1.75;
pub const BATTERY_DRAIN_RATE: f64 = 2.0;
pub const BATTERY_REGEN_RATE: f64 = 1.0; // Half the drain rate
pub const STAMINA_DRAIN_RATE: f64 = 20.0;
pub const STAMINA_REGEN_RATE: f64 = 15.0;
pub const DEGRADED_LIFE_SUPPORT: f64 = 1.25; // Oxygen modifier on damaged decks
pub const EFFICIENT_LIFE_SUPPORT: f64 = 0.7;

// Hostile AI
pub const ALERT_DURATION: f64 = 3.0; // Memory of the last known player position
pub const PATROL_SPEED_FACTOR: f64 = 0.5;
pub const PATROL_WAYPOINT_RADIUS: f64 = TILE_SIZE * 4.0;
pub const WAYPOINT_ARRIVAL_DISTANCE: f64 = 6.0;
pub const WAYPOINT_ATTEMPTS: u32 = 8;
pub const BOSS_ENRAGE_FRACTION: f64 = 0.5;
pub const BOSS_REINFORCEMENTS: usize = 2;

// Combat
pub const PROJECTILE_RADIUS: f64 = 2.0;
pub const MAX_PROJECTILE_SUB_STEP: f64 = TILE_SIZE / 4.0; // No tunnelling through walls
pub const MUZZLE_OFFSET: f64 = 0.8; // Fraction of shooter size projectiles spawn ahead of
pub const LOOT_DROP_CHANCE: f64 = 0.35;
pub const CRATE_LOOT_CHANCE: f64 = 0.6;
pub const BARREL_EXPLOSION_RADIUS: f64 = 80.0;
pub const BARREL_EXPLOSION_DAMAGE: f64 = 45.0;
pub const KNOCKBACK_DISTANCE: f64 = 6.0;

/// Runtime settings for a run. Everything not listed here is a compile-time
/// constant above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimSettings {
    pub seed: u64,
    pub start_floor: u32,
    pub room_target: usize,
    pub level_width: i32,
    pub level_height: i32,
    pub max_delta_time: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        SimSettings {
            seed: 0x5eed,
            start_floor: 1,
            room_target: DEFAULT_ROOM_TARGET,
            level_width: LEVEL_WIDTH_TILES,
            level_height: LEVEL_HEIGHT_TILES,
            max_delta_time: MAX_DELTA_TIME,
        }
    }
}
