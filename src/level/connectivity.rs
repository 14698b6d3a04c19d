// Reachability checks over walkable tiles (floor and unlocked doors).

use super::Level;
use crate::types::TileCoord;
use std::collections::{HashSet, VecDeque};

/// Flood fill over tiles that do not block movement, starting at `from`.
pub fn reachable_tiles(level: &Level, from: TileCoord) -> HashSet<TileCoord> {
    let mut seen = HashSet::new();
    if level.tile(from).blocks_movement() {
        return seen;
    }
    let mut queue = VecDeque::new();
    seen.insert(from);
    queue.push_back(from);

    while let Some(coord) = queue.pop_front() {
        for next in coord.neighbors() {
            if !level.in_bounds(next) || seen.contains(&next) {
                continue;
            }
            if level.tile(next).blocks_movement() {
                continue;
            }
            seen.insert(next);
            queue.push_back(next);
        }
    }
    seen
}

/// Indices of rooms that cannot be reached from the start room.
pub fn unreachable_rooms(level: &Level) -> Vec<usize> {
    let Some(start) = level.rooms.get(level.start_room) else {
        return (0..level.rooms.len()).collect();
    };
    let reachable = reachable_tiles(level, start.bounds.center());
    level
        .rooms
        .iter()
        .filter(|room| !reachable.contains(&room.bounds.center()))
        .map(|room| room.index)
        .collect()
}

pub fn is_fully_connected(level: &Level) -> bool {
    unreachable_rooms(level).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::test_support::open_level;
    use crate::level::{Door, Rect, Room, RoomKind, Tile};

    fn split_level(door: Option<Door>) -> Level {
        let mut level = open_level(14, 8);
        for y in 0..8 {
            level.set_tile(TileCoord::new(7, y), Tile::Wall);
        }
        level.rooms = vec![
            Room {
                index: 0,
                bounds: Rect::new(1, 1, 6, 6),
                kind: RoomKind::Start,
                lit: true,
            },
            Room {
                index: 1,
                bounds: Rect::new(8, 1, 5, 6),
                kind: RoomKind::Exit,
                lit: false,
            },
        ];
        if let Some(door) = door {
            level.set_tile(TileCoord::new(7, 3), Tile::Door(door));
            level.doors.push(TileCoord::new(7, 3));
        }
        level
    }

    #[test]
    fn test_wall_splits_rooms() {
        let level = split_level(None);
        assert_eq!(unreachable_rooms(&level), vec![1]);
        assert!(!is_fully_connected(&level));
    }

    #[test]
    fn test_unlocked_door_connects() {
        let level = split_level(Some(Door {
            locked: false,
            open: false,
        }));
        assert!(is_fully_connected(&level));
    }

    #[test]
    fn test_locked_door_disconnects() {
        let level = split_level(Some(Door {
            locked: true,
            open: false,
        }));
        assert_eq!(unreachable_rooms(&level), vec![1]);
    }

    #[test]
    fn test_flood_fill_from_wall_is_empty() {
        let level = split_level(None);
        assert!(reachable_tiles(&level, TileCoord::new(0, 0)).is_empty());
    }
}
