pub mod connectivity;
pub mod error;
pub mod generator;
pub mod population;
pub mod room;
pub mod tile;

pub use connectivity::{is_fully_connected, reachable_tiles, unreachable_rooms};
pub use error::GenerationError;
pub use generator::{LevelParams, generate_level};
pub use room::{Corridor, Rect, Room, RoomKind};
pub use tile::{Door, Tile};

use crate::agent::enemy::EnemyType;
use crate::config::{RAY_STEP, TILE_SIZE};
use crate::pickup::{PickupKind, PropKind};
use crate::types::{Point, TileCoord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub enemy_type: EnemyType,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub kind: PickupKind,
    pub amount: u32,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropSpawn {
    pub kind: PropKind,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub floor_index: u32,
    pub width: i32,  // Tiles
    pub height: i32, // Tiles
    pub tiles: Vec<Tile>,
    pub rooms: Vec<Room>,
    pub corridors: Vec<Corridor>,
    pub doors: Vec<TileCoord>,
    pub start_room: usize,
    pub exit_room: usize,
    pub exit: Point,
    pub player_spawn: Point,
    /// Oxygen consumption multiplier from the deck's life support.
    pub life_support_modifier: f64,
    pub enemy_spawns: Vec<EnemySpawn>,
    pub pickup_spawns: Vec<PickupSpawn>,
    pub prop_spawns: Vec<PropSpawn>,
}

impl Level {
    /// A solid block of wall, ready to be carved.
    pub fn new(width: i32, height: i32, floor_index: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Level {
            floor_index,
            width,
            height,
            tiles: vec![Tile::Wall; (width * height) as usize],
            rooms: Vec::new(),
            corridors: Vec::new(),
            doors: Vec::new(),
            start_room: 0,
            exit_room: 0,
            exit: Point::ZERO,
            player_spawn: Point::ZERO,
            life_support_modifier: 1.0,
            enemy_spawns: Vec::new(),
            pickup_spawns: Vec::new(),
            prop_spawns: Vec::new(),
        }
    }

    pub fn world_width(&self) -> f64 {
        self.width as f64 * TILE_SIZE
    }

    pub fn world_height(&self) -> f64 {
        self.height as f64 * TILE_SIZE
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some((coord.y * self.width + coord.x) as usize)
        } else {
            None
        }
    }

    /// Tile at `coord`; everything outside the grid reads as wall.
    pub fn tile(&self, coord: TileCoord) -> Tile {
        self.index(coord)
            .and_then(|i| self.tiles.get(i).copied())
            .unwrap_or(Tile::Wall)
    }

    pub fn set_tile(&mut self, coord: TileCoord, tile: Tile) {
        if let Some(i) = self.index(coord) {
            self.tiles[i] = tile;
        }
    }

    pub fn world_to_tile(point: Point) -> TileCoord {
        TileCoord::new(
            (point.x / TILE_SIZE).floor() as i32,
            (point.y / TILE_SIZE).floor() as i32,
        )
    }

    pub fn tile_center(coord: TileCoord) -> Point {
        Point {
            x: (coord.x as f64 + 0.5) * TILE_SIZE,
            y: (coord.y as f64 + 0.5) * TILE_SIZE,
        }
    }

    pub fn blocks_movement_at(&self, point: Point) -> bool {
        self.tile(Self::world_to_tile(point)).blocks_movement()
    }

    /// True if a circle of `radius` centred on `center` overlaps no blocking tile.
    pub fn can_occupy(&self, center: Point, radius: f64) -> bool {
        // Shrink slightly so an agent flush against a wall is not inside it
        let r = (radius - 1e-6).max(0.0);
        let min = Self::world_to_tile(Point::new(center.x - r, center.y - r));
        let max = Self::world_to_tile(Point::new(center.x + r, center.y + r));
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                if self.tile(TileCoord::new(x, y)).blocks_movement() {
                    return false;
                }
            }
        }
        true
    }

    /// Clamps a point so a circle of `radius` stays inside the level bounds.
    pub fn clamp_to_bounds(&self, point: Point, radius: f64) -> Point {
        Point {
            x: point.x.clamp(radius, (self.world_width() - radius).max(radius)),
            y: point.y.clamp(radius, (self.world_height() - radius).max(radius)),
        }
    }

    /// Moves a circle by `delta`, resolving each axis separately so agents
    /// slide along walls instead of sticking to them.
    pub fn move_with_collision(&self, from: Point, delta: Point, radius: f64) -> Point {
        let mut position = from;

        let target_x = self.clamp_to_bounds(Point::new(from.x + delta.x, position.y), radius);
        if self.can_occupy(target_x, radius) {
            position.x = target_x.x;
        }

        let target_y = self.clamp_to_bounds(Point::new(position.x, from.y + delta.y), radius);
        if self.can_occupy(target_y, radius) {
            position.y = target_y.y;
        }

        position
    }

    /// Distance to the first sight-blocking tile, capped at `max_range`.
    /// Every tile crossed, the blocking one included, goes to `visit`.
    pub fn march_ray<F>(&self, start: Point, angle_deg: f64, max_range: f64, mut visit: F) -> f64
    where
        F: FnMut(TileCoord),
    {
        let rad = angle_deg.to_radians();
        let (dx, dy) = (rad.cos(), rad.sin());
        let steps = (max_range / RAY_STEP).ceil() as usize;
        let mut last_tile = Self::world_to_tile(start);
        visit(last_tile);

        for i in 1..=steps {
            let dist = (i as f64 * RAY_STEP).min(max_range);
            let sample = Point::new(start.x + dx * dist, start.y + dy * dist);
            let coord = Self::world_to_tile(sample);
            if coord != last_tile {
                visit(coord);
                last_tile = coord;
            }
            if self.tile(coord).blocks_sight() {
                return dist;
            }
        }
        max_range
    }

    /// Fixed-step line-of-sight test between two points. The endpoint's own
    /// tile is not sampled, so a target standing in an open doorway is seen.
    pub fn line_of_sight(&self, from: Point, to: Point) -> bool {
        let distance = from.distance(&to);
        if distance <= RAY_STEP {
            return true;
        }
        let target_tile = Self::world_to_tile(to);
        let (dx, dy) = ((to.x - from.x) / distance, (to.y - from.y) / distance);
        let steps = (distance / RAY_STEP).floor() as usize;
        for i in 1..=steps {
            let d = i as f64 * RAY_STEP;
            let sample = Point::new(from.x + dx * d, from.y + dy * d);
            let coord = Self::world_to_tile(sample);
            if coord == target_tile {
                break;
            }
            if self.tile(coord).blocks_sight() {
                return false;
            }
        }
        true
    }

    pub fn room_at(&self, coord: TileCoord) -> Option<&Room> {
        self.rooms.iter().find(|room| room.bounds.contains(coord))
    }

    pub fn room_containing(&self, point: Point) -> Option<&Room> {
        self.room_at(Self::world_to_tile(point))
    }

    pub fn door_at(&self, coord: TileCoord) -> Option<Door> {
        match self.tile(coord) {
            Tile::Door(door) => Some(door),
            _ => None,
        }
    }

    /// Unlocks the door at `coord`. Returns false if there is no locked door there.
    pub fn unlock_door(&mut self, coord: TileCoord) -> bool {
        match self.door_at(coord) {
            Some(door) if door.locked => {
                self.set_tile(
                    coord,
                    Tile::Door(Door {
                        locked: false,
                        open: true,
                    }),
                );
                true
            }
            _ => false,
        }
    }

    /// Nearest locked door whose centre lies within `range` of `point`.
    pub fn nearest_locked_door(&self, point: Point, range: f64) -> Option<TileCoord> {
        self.doors
            .iter()
            .copied()
            .filter(|coord| self.door_at(*coord).is_some_and(|door| door.locked))
            .map(|coord| (coord, Self::tile_center(coord).distance(&point)))
            .filter(|(_, dist)| *dist <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(coord, _)| coord)
    }

    /// Unlocked doors slide open while something stands within a tile of them.
    pub fn update_door_states(&mut self, occupants: &[Point]) {
        for i in 0..self.doors.len() {
            let coord = self.doors[i];
            if let Some(door) = self.door_at(coord) {
                if door.locked {
                    continue;
                }
                let center = Self::tile_center(coord);
                let open = occupants
                    .iter()
                    .any(|p| p.distance(&center) <= TILE_SIZE * 1.5);
                if open != door.open {
                    self.set_tile(coord, Tile::Door(Door { locked: false, open }));
                }
            }
        }
    }

    pub fn locked_door_count(&self) -> usize {
        self.doors
            .iter()
            .filter(|coord| self.door_at(**coord).is_some_and(|door| door.locked))
            .count()
    }

    /// Empty lit room inside a wall ring, exit in the far corner.
    pub fn open_room(width: i32, height: i32, floor_index: u32) -> Level {
        let mut level = Level::new(width.max(3), height.max(3), floor_index);
        let bounds = Rect::new(1, 1, level.width - 2, level.height - 2);
        for coord in bounds.tiles() {
            level.set_tile(coord, Tile::Floor);
        }
        level.rooms.push(Room {
            index: 0,
            bounds,
            kind: RoomKind::Start,
            lit: true,
        });
        level.player_spawn = Self::tile_center(bounds.center());
        level.exit = Self::tile_center(TileCoord::new(level.width - 2, level.height - 2));
        level
    }

    /// True if the player standing at `point` is on the exit marker.
    pub fn is_at_exit(&self, point: Point) -> bool {
        Self::world_to_tile(point) == Self::world_to_tile(self.exit)
    }
}
