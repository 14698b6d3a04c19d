// Shared value types: world points, tile coordinates, factions and ids.

use serde::{Deserialize, Serialize};

/// Identifier for agents, projectiles, pickups and props. Allocated from a
/// single counter so ids are never reused within a run.
pub type EntityId = u32;

/// Agent identifier (alias kept for readability at call sites).
pub type AgentId = EntityId;

/// A point in world coordinates (1 tile = `config::TILE_SIZE` units).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Angle in degrees (0-360) from this point towards `other`.
    pub fn angle_to(&self, other: &Point) -> f64 {
        let dy = other.y - self.y;
        let dx = other.x - self.x;
        dy.atan2(dx).to_degrees().rem_euclid(360.0)
    }

    /// Point reached by travelling `distance` along `angle_deg`.
    pub fn offset(&self, angle_deg: f64, distance: f64) -> Point {
        let rad = angle_deg.to_radians();
        Point {
            x: self.x + rad.cos() * distance,
            y: self.y + rad.sin() * distance,
        }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the vector scaled down to length `max` if it is longer.
    pub fn clamp_length(&self, max: f64) -> Point {
        let len = self.length();
        if len > max && len > 0.0 {
            Point {
                x: self.x / len * max,
                y: self.y / len * max,
            }
        } else {
            *self
        }
    }

    pub fn add(&self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn scale(&self, factor: f64) -> Point {
        Point {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Integer tile coordinate. Ordered so tile sets iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        TileCoord { x, y }
    }

    /// The four cardinal neighbours.
    pub fn neighbors(&self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x + 1, self.y),
            TileCoord::new(self.x - 1, self.y),
            TileCoord::new(self.x, self.y + 1),
            TileCoord::new(self.x, self.y - 1),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Hostile,
}

impl Faction {
    pub fn is_opposed(&self, other: Faction) -> bool {
        *self != other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_angle_to_cardinals() {
        let origin = Point::new(0.0, 0.0);
        assert_approx_eq!(origin.angle_to(&Point::new(1.0, 0.0)), 0.0);
        assert_approx_eq!(origin.angle_to(&Point::new(0.0, 1.0)), 90.0);
        assert_approx_eq!(origin.angle_to(&Point::new(-1.0, 0.0)), 180.0);
        assert_approx_eq!(origin.angle_to(&Point::new(0.0, -1.0)), 270.0);
    }

    #[test]
    fn test_offset_and_distance() {
        let p = Point::new(10.0, 10.0).offset(90.0, 5.0);
        assert_approx_eq!(p.x, 10.0);
        assert_approx_eq!(p.y, 15.0);
        assert_approx_eq!(Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_clamp_length() {
        let v = Point::new(3.0, 4.0).clamp_length(1.0);
        assert_approx_eq!(v.length(), 1.0);
        let small = Point::new(0.3, 0.0).clamp_length(1.0);
        assert_approx_eq!(small.x, 0.3);
        assert_eq!(Point::ZERO.clamp_length(1.0), Point::ZERO);
    }
}
