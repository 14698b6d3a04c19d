// Spawn placement for a carved level: player, exit, hostiles, pickups, props.

use super::room::{Room, RoomKind};
use super::{EnemySpawn, Level, PickupSpawn, PropSpawn};
use crate::agent::enemy::EnemyType;
use crate::config::*;
use crate::pickup::{PickupKind, PropKind};
use crate::types::{Point, TileCoord};
use rand::Rng;

const MAX_ENEMIES_PER_ROOM: u32 = 6;

pub fn populate<R: Rng>(level: &mut Level, rng: &mut R) {
    let floor = level.floor_index;
    level.enemy_spawns.clear();
    level.pickup_spawns.clear();
    level.prop_spawns.clear();

    if let Some(start) = level.rooms.get(level.start_room) {
        level.player_spawn = Level::tile_center(start.bounds.center());
    }
    if let Some(exit) = level.rooms.get(level.exit_room) {
        level.exit = Level::tile_center(exit.bounds.center());
    }
    level.life_support_modifier = roll_life_support(floor, rng);

    let rooms: Vec<Room> = level.rooms.clone();
    let mut taken: Vec<TileCoord> = vec![
        Level::world_to_tile(level.player_spawn),
        Level::world_to_tile(level.exit),
    ];

    for room in &rooms {
        match room.kind {
            RoomKind::Start | RoomKind::Exit => {}
            RoomKind::Combat => {
                let count = (1 + floor / 2 + rng.gen_range(0..=1)).min(MAX_ENEMIES_PER_ROOM);
                for _ in 0..count {
                    if let Some(position) = free_spot(room, &mut taken, rng) {
                        level.enemy_spawns.push(EnemySpawn {
                            enemy_type: EnemyType::roll(floor, rng),
                            position,
                        });
                    }
                }
                let kind = PickupKind::random_loot(rng);
                push_pickup(level, room, kind, &mut taken, rng);
                for _ in 0..rng.gen_range(0..=2) {
                    let kind = if rng.gen_bool(0.5) {
                        PropKind::Crate
                    } else {
                        PropKind::ExplosiveBarrel
                    };
                    if let Some(position) = free_spot(room, &mut taken, rng) {
                        level.prop_spawns.push(PropSpawn { kind, position });
                    }
                }
            }
            RoomKind::Treasure => {
                for _ in 0..rng.gen_range(2..=3) {
                    let kind = PickupKind::random_treasure(rng);
                    push_pickup(level, room, kind, &mut taken, rng);
                }
                if floor >= 2 {
                    if let Some(position) = free_spot(room, &mut taken, rng) {
                        level.enemy_spawns.push(EnemySpawn {
                            enemy_type: EnemyType::roll(floor, rng),
                            position,
                        });
                    }
                }
            }
            RoomKind::Boss => {
                // Boss waits between the entrance and the exit marker
                let center = room.bounds.center();
                let offset = TileCoord::new(center.x, room.bounds.y1 + 1);
                level.enemy_spawns.push(EnemySpawn {
                    enemy_type: EnemyType::Boss,
                    position: Level::tile_center(offset),
                });
                taken.push(offset);
                push_pickup(level, room, PickupKind::Health, &mut taken, rng);
            }
        }
    }

    crate::debug_level!(
        "Populated floor {}: {} enemies, {} pickups, {} props, life support x{:.2}",
        floor,
        level.enemy_spawns.len(),
        level.pickup_spawns.len(),
        level.prop_spawns.len(),
        level.life_support_modifier
    );
}

fn roll_life_support<R: Rng>(floor: u32, rng: &mut R) -> f64 {
    if floor > 0 && floor % 4 == 0 {
        DEGRADED_LIFE_SUPPORT
    } else if rng.gen_bool(0.25) {
        EFFICIENT_LIFE_SUPPORT
    } else {
        1.0
    }
}

fn push_pickup<R: Rng>(
    level: &mut Level,
    room: &Room,
    kind: PickupKind,
    taken: &mut Vec<TileCoord>,
    rng: &mut R,
) {
    if let Some(position) = free_spot(room, taken, rng) {
        level.pickup_spawns.push(PickupSpawn {
            kind,
            amount: kind.default_amount(),
            position,
        });
    }
}

/// A random interior tile of `room` (one tile in from the walls) that no
/// other spawn uses yet.
fn free_spot<R: Rng>(room: &Room, taken: &mut Vec<TileCoord>, rng: &mut R) -> Option<Point> {
    let b = room.bounds;
    if b.width() < 3 || b.height() < 3 {
        return None;
    }
    for _ in 0..16 {
        let coord = TileCoord::new(
            rng.gen_range(b.x1 + 1..b.x2 - 1),
            rng.gen_range(b.y1 + 1..b.y2 - 1),
        );
        if !taken.contains(&coord) {
            taken.push(coord);
            return Some(Level::tile_center(coord));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::generator::{LevelParams, generate_level};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_spawns_stay_on_floor_tiles() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let level = generate_level(&LevelParams::new(2, 10), &mut rng).expect("generation failed");
        for spawn in &level.enemy_spawns {
            assert!(!level.blocks_movement_at(spawn.position));
        }
        for spawn in &level.pickup_spawns {
            assert!(!level.blocks_movement_at(spawn.position));
        }
        for spawn in &level.prop_spawns {
            assert!(!level.blocks_movement_at(spawn.position));
        }
    }

    #[test]
    fn test_start_room_is_safe() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let level = generate_level(&LevelParams::new(3, 10), &mut rng).expect("generation failed");
        let start = &level.rooms[level.start_room];
        for spawn in &level.enemy_spawns {
            assert!(!start.bounds.contains(Level::world_to_tile(spawn.position)));
        }
    }

    #[test]
    fn test_boss_floor_spawns_boss() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let level = generate_level(&LevelParams::new(BOSS_FLOOR_INTERVAL, 8), &mut rng)
            .expect("generation failed");
        let bosses = level
            .enemy_spawns
            .iter()
            .filter(|s| s.enemy_type == EnemyType::Boss)
            .count();
        assert_eq!(bosses, 1);
    }

    #[test]
    fn test_degraded_life_support_every_fourth_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(roll_life_support(4, &mut rng), DEGRADED_LIFE_SUPPORT);
        assert_eq!(roll_life_support(8, &mut rng), DEGRADED_LIFE_SUPPORT);
        let m = roll_life_support(1, &mut rng);
        assert!(m == 1.0 || m == EFFICIENT_LIFE_SUPPORT);
    }
}
