use super::connectivity::{is_fully_connected, unreachable_rooms};
use super::error::GenerationError;
use super::population::populate;
use super::room::{Corridor, Rect, Room, RoomKind};
use super::tile::{Door, Tile};
use super::Level;
use crate::config::*;
use crate::types::TileCoord;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    pub floor_index: u32,
    pub room_target: usize,
    pub width: i32,
    pub height: i32,
}

impl LevelParams {
    pub fn new(floor_index: u32, room_target: usize) -> Self {
        LevelParams {
            floor_index,
            room_target,
            width: LEVEL_WIDTH_TILES,
            height: LEVEL_HEIGHT_TILES,
        }
    }

    fn validate(&self) -> Result<(), GenerationError> {
        let min_side = ROOM_MAX_SIZE + 2;
        if self.width < min_side || self.height < min_side {
            return Err(GenerationError::InvalidParams(format!(
                "level must be at least {}x{} tiles, got {}x{}",
                min_side, min_side, self.width, self.height
            )));
        }
        // Start and exit must be different rooms
        if self.room_target < 2 {
            return Err(GenerationError::InvalidParams(format!(
                "room target must be at least 2, got {}",
                self.room_target
            )));
        }
        Ok(())
    }

    /// Fewest rooms an attempt may end with before it is thrown away.
    pub fn required_rooms(&self) -> usize {
        MIN_ROOM_COUNT.min(self.room_target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    North,
    South,
    East,
    West,
}

const DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// Generates a connected, populated level, retrying from scratch when an
/// attempt ends with too few rooms or fails the reachability check.
pub fn generate_level<R: Rng>(params: &LevelParams, rng: &mut R) -> Result<Level, GenerationError> {
    params.validate()?;

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        match generate_attempt(params, rng) {
            Ok(level) => {
                log::info!(
                    target: "level",
                    "Floor {} generated: {} rooms, {} doors ({} locked), {} enemies, {} pickups (attempt {})",
                    level.floor_index,
                    level.rooms.len(),
                    level.doors.len(),
                    level.locked_door_count(),
                    level.enemy_spawns.len(),
                    level.pickup_spawns.len(),
                    attempt
                );
                return Ok(level);
            }
            Err(e) => {
                log::warn!(target: "level", "Generation attempt {} failed: {}", attempt, e);
            }
        }
    }

    Err(GenerationError::Exhausted {
        attempts: MAX_GENERATION_ATTEMPTS,
    })
}

fn generate_attempt<R: Rng>(params: &LevelParams, rng: &mut R) -> Result<Level, GenerationError> {
    let mut level = Level::new(params.width, params.height, params.floor_index);

    let (rects, mut corridors) = place_rooms(params, rng);
    if rects.len() < params.required_rooms() {
        return Err(GenerationError::TooFewRooms {
            placed: rects.len(),
            required: params.required_rooms(),
        });
    }

    corridors.extend(loop_corridors(&rects, &corridors, rng));

    for rect in &rects {
        for coord in rect.tiles() {
            level.set_tile(coord, Tile::Floor);
        }
    }
    for corridor in &corridors {
        for coord in &corridor.tiles {
            level.set_tile(*coord, Tile::Floor);
        }
    }

    level.rooms = assign_room_kinds(&rects, params.floor_index);
    level.start_room = 0;
    level.exit_room = rects.len() - 1;
    level.corridors = corridors;

    place_doors(&mut level);
    lock_doors(&mut level, rng);

    let unreachable = unreachable_rooms(&level);
    if !unreachable.is_empty() {
        return Err(GenerationError::Disconnected {
            unreachable: unreachable.len(),
        });
    }

    populate(&mut level, rng);
    Ok(level)
}

fn random_room_size<R: Rng>(rng: &mut R) -> (i32, i32) {
    (
        rng.gen_range(ROOM_MIN_SIZE..=ROOM_MAX_SIZE),
        rng.gen_range(ROOM_MIN_SIZE..=ROOM_MAX_SIZE),
    )
}

fn place_rooms<R: Rng>(params: &LevelParams, rng: &mut R) -> (Vec<Rect>, Vec<Corridor>) {
    let mut rects: Vec<Rect> = Vec::new();
    let mut corridors = Vec::new();

    let (w, h) = random_room_size(rng);
    rects.push(Rect::new(
        params.width / 2 - w / 2,
        params.height / 2 - h / 2,
        w,
        h,
    ));

    let mut attempts = 0;
    while rects.len() < params.room_target && attempts < ROOM_PLACEMENT_ATTEMPTS {
        attempts += 1;

        let origin_index = rng.gen_range(0..rects.len());
        let origin = rects[origin_index];
        let direction = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];
        let (w, h) = random_room_size(rng);
        let gap = rng.gen_range(ROOM_GAP_MIN..=ROOM_GAP_MAX);
        let jitter = rng.gen_range(-(ROOM_MAX_SIZE / 2)..=ROOM_MAX_SIZE / 2);
        let center = origin.center();

        let candidate = match direction {
            Direction::East => Rect::new(origin.x2 + gap, center.y - h / 2 + jitter, w, h),
            Direction::West => Rect::new(origin.x1 - gap - w, center.y - h / 2 + jitter, w, h),
            Direction::South => Rect::new(center.x - w / 2 + jitter, origin.y2 + gap, w, h),
            Direction::North => Rect::new(center.x - w / 2 + jitter, origin.y1 - gap - h, w, h),
        };

        // Keep a solid wall ring around the level edge
        if candidate.x1 < 1
            || candidate.y1 < 1
            || candidate.x2 > params.width - 1
            || candidate.y2 > params.height - 1
        {
            continue;
        }
        if rects.iter().any(|other| candidate.intersects(other, 1)) {
            continue;
        }

        let new_index = rects.len();
        rects.push(candidate);
        corridors.push(Corridor::l_shaped(
            origin_index,
            new_index,
            origin.center(),
            candidate.center(),
        ));
        crate::debug_level!(
            "Placed room {} {:?} off room {} after {} attempts",
            new_index,
            direction,
            origin_index,
            attempts
        );
    }

    if rects.len() < params.room_target {
        crate::debug_level!(
            "Room placement stopped at {} of {} rooms",
            rects.len(),
            params.room_target
        );
    }

    (rects, corridors)
}

// Loops between nearby rooms not already joined
fn loop_corridors<R: Rng>(rects: &[Rect], existing: &[Corridor], rng: &mut R) -> Vec<Corridor> {
    let wanted = (rects.len() as f64 * LOOP_CORRIDOR_RATIO).round() as usize;
    let mut joined: BTreeSet<(usize, usize)> = existing
        .iter()
        .map(|c| (c.from_room.min(c.to_room), c.from_room.max(c.to_room)))
        .collect();
    let mut extra = Vec::new();

    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.shuffle(rng);

    for &a in &order {
        if extra.len() >= wanted {
            break;
        }
        let center_a = rects[a].center();
        let nearest = (0..rects.len())
            .filter(|&b| b != a && !joined.contains(&(a.min(b), a.max(b))))
            .map(|b| {
                let center_b = rects[b].center();
                let dx = (center_a.x - center_b.x) as f64;
                let dy = (center_a.y - center_b.y) as f64;
                (b, (dx * dx + dy * dy).sqrt())
            })
            .filter(|(_, dist)| *dist <= LOOP_CORRIDOR_MAX_DISTANCE)
            .min_by(|x, y| x.1.total_cmp(&y.1).then(x.0.cmp(&y.0)));

        if let Some((b, _)) = nearest {
            joined.insert((a.min(b), a.max(b)));
            extra.push(Corridor::l_shaped(a, b, center_a, rects[b].center()));
        }
    }
    extra
}

/// Kinds by placement index: first is the start, last is the exit (or the
/// boss room on boss floors), fixed fractions are treasure, the rest combat.
fn assign_room_kinds(rects: &[Rect], floor_index: u32) -> Vec<Room> {
    let count = rects.len();
    let treasure: Vec<usize> = TREASURE_ROOM_FRACTIONS
        .iter()
        .map(|f| (f * count as f64).floor() as usize)
        .collect();
    let boss_floor = floor_index > 0 && floor_index % BOSS_FLOOR_INTERVAL == 0;

    rects
        .iter()
        .enumerate()
        .map(|(index, bounds)| {
            let kind = if index == 0 {
                RoomKind::Start
            } else if index == count - 1 {
                if boss_floor {
                    RoomKind::Boss
                } else {
                    RoomKind::Exit
                }
            } else if treasure.contains(&index) {
                RoomKind::Treasure
            } else {
                RoomKind::Combat
            };
            Room {
                index,
                bounds: *bounds,
                kind,
                lit: kind.is_lit(),
            }
        })
        .collect()
}

fn is_room_tile(level: &Level, coord: TileCoord) -> bool {
    level.rooms.iter().any(|room| room.bounds.contains(coord))
}

fn is_narrow_transition(level: &Level, coord: TileCoord) -> bool {
    if is_room_tile(level, coord) || level.tile(coord) != Tile::Floor {
        return false;
    }
    let touches_room = coord.neighbors().iter().any(|n| is_room_tile(level, *n));
    if !touches_room {
        return false;
    }
    let wall = |x: i32, y: i32| level.tile(TileCoord::new(x, y)) == Tile::Wall;
    let horizontal_pinch = wall(coord.x - 1, coord.y) && wall(coord.x + 1, coord.y);
    let vertical_pinch = wall(coord.x, coord.y - 1) && wall(coord.x, coord.y + 1);
    horizontal_pinch || vertical_pinch
}

fn place_doors(level: &mut Level) {
    let mut doors = BTreeSet::new();
    for corridor in &level.corridors {
        for coord in &corridor.tiles {
            if is_narrow_transition(level, *coord) {
                doors.insert(*coord);
            }
        }
    }
    for coord in &doors {
        level.set_tile(
            *coord,
            Tile::Door(Door {
                locked: false,
                open: false,
            }),
        );
    }
    level.doors = doors.into_iter().collect();
}

/// Rolls each door locked independently, then keeps the lock only if every
/// room is still reachable without passing through a locked door.
fn lock_doors<R: Rng>(level: &mut Level, rng: &mut R) {
    for i in 0..level.doors.len() {
        let coord = level.doors[i];
        if !rng.gen_bool(DOOR_LOCK_CHANCE) {
            continue;
        }
        level.set_tile(
            coord,
            Tile::Door(Door {
                locked: true,
                open: false,
            }),
        );
        if !is_fully_connected(level) {
            level.set_tile(
                coord,
                Tile::Door(Door {
                    locked: false,
                    open: false,
                }),
            );
            crate::debug_level!("Door at ({}, {}) left unlocked to keep rooms reachable", coord.x, coord.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generate(seed: u64, floor: u32, rooms: usize) -> Level {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_level(&LevelParams::new(floor, rooms), &mut rng).expect("generation failed")
    }

    #[test]
    fn test_generated_level_is_connected() {
        for seed in 0..20 {
            let level = generate(seed, 1, 10);
            assert!(
                is_fully_connected(&level),
                "seed {} produced unreachable rooms {:?}",
                seed,
                unreachable_rooms(&level)
            );
            assert!(level.rooms.len() >= MIN_ROOM_COUNT);
        }
    }

    #[test]
    fn test_room_kinds_by_index() {
        let level = generate(7, 1, 9);
        let last = level.rooms.len() - 1;
        assert_eq!(level.rooms[0].kind, RoomKind::Start);
        assert_eq!(level.rooms[last].kind, RoomKind::Exit);
        assert!(level.rooms.iter().any(|r| r.kind == RoomKind::Treasure));

        let boss = generate(7, BOSS_FLOOR_INTERVAL, 9);
        let last = boss.rooms.len() - 1;
        assert_eq!(boss.rooms[last].kind, RoomKind::Boss);
    }

    #[test]
    fn test_rooms_do_not_overlap() {
        let level = generate(3, 2, 12);
        for (i, a) in level.rooms.iter().enumerate() {
            for b in level.rooms.iter().skip(i + 1) {
                assert!(!a.bounds.intersects(&b.bounds, 0));
            }
        }
    }

    #[test]
    fn test_doors_sit_outside_rooms() {
        let level = generate(11, 1, 10);
        for coord in &level.doors {
            assert!(level.tile(*coord).is_door());
            assert!(level.room_at(*coord).is_none());
        }
    }

    #[test]
    fn test_same_seed_same_level() {
        let a = generate(42, 2, 10);
        let b = generate(42, 2, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_exit_in_terminal_room() {
        let level = generate(5, 1, 8);
        let exit_room = &level.rooms[level.exit_room];
        assert!(exit_room.bounds.contains(Level::world_to_tile(level.exit)));
        let start_room = &level.rooms[level.start_room];
        assert!(start_room.bounds.contains(Level::world_to_tile(level.player_spawn)));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let params = LevelParams {
            floor_index: 1,
            room_target: 5,
            width: 8,
            height: 8,
        };
        assert!(matches!(
            generate_level(&params, &mut rng),
            Err(GenerationError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_single_room_target_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for room_target in [0, 1] {
            assert!(matches!(
                generate_level(&LevelParams::new(1, room_target), &mut rng),
                Err(GenerationError::InvalidParams(_))
            ));
        }
        let level = generate(3, 1, 2);
        assert_ne!(level.start_room, level.exit_room);
        assert!(!level.is_at_exit(level.player_spawn));
    }

    #[test]
    fn test_cramped_level_exhausts_retries() {
        // Barely fits one room, so four can never be placed
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let params = LevelParams {
            floor_index: 1,
            room_target: 6,
            width: ROOM_MAX_SIZE + 2,
            height: ROOM_MAX_SIZE + 2,
        };
        assert_eq!(
            generate_level(&params, &mut rng),
            Err(GenerationError::Exhausted {
                attempts: MAX_GENERATION_ATTEMPTS
            })
        );
    }
}
