use crate::config::*;
use crate::level::Level;
use crate::types::{EntityId, Point, TileCoord};
use crate::utils::within_arc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingMode {
    /// Standing in a lit room: long range all round.
    Lit,
    /// Flashlight on in the dark: narrow, long cone.
    Flashlight,
    /// Dark with no light source: a short circle only.
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeParams {
    pub range: f64,
    pub cone_deg: f64, // Full width; 360 or more is unrestricted
    pub ray_count: usize,
    pub ambient_radius: f64,
}

impl ConeParams {
    pub fn all_round(range: f64) -> Self {
        ConeParams {
            range,
            cone_deg: 360.0,
            ray_count: RAY_COUNT,
            ambient_radius: AMBIENT_RADIUS,
        }
    }

    pub fn cone(range: f64, cone_deg: f64) -> Self {
        ConeParams {
            range,
            cone_deg,
            ray_count: RAY_COUNT,
            ambient_radius: AMBIENT_RADIUS,
        }
    }

    pub fn is_all_round(&self) -> bool {
        self.cone_deg >= 360.0
    }

    /// Farthest distance at which anything can be visible.
    pub fn reach(&self) -> f64 {
        self.range.max(self.ambient_radius)
    }

    /// Visibility test for a single point, shared by entity membership and
    /// hostile perception.
    pub fn covers(&self, level: &Level, origin: Point, facing: f64, target: Point) -> bool {
        let distance = origin.distance(&target);
        let in_ambient = distance <= self.ambient_radius;
        let in_cone = distance <= self.range
            && (self.is_all_round() || within_arc(facing, self.cone_deg / 2.0, origin.angle_to(&target)));
        (in_ambient || in_cone) && level.line_of_sight(origin, target)
    }
}

impl LightingMode {
    pub fn cone(self) -> ConeParams {
        match self {
            LightingMode::Lit => ConeParams::all_round(LIT_ROOM_RANGE),
            LightingMode::Flashlight => ConeParams::cone(FLASHLIGHT_RANGE, FLASHLIGHT_CONE_DEG),
            LightingMode::Ambient => ConeParams::all_round(AMBIENT_ONLY_RANGE),
        }
    }

    /// Lit rooms override everything; otherwise the flashlight if it is on.
    pub fn select(level: &Level, position: Point, flashlight_on: bool) -> LightingMode {
        if level.room_containing(position).is_some_and(|room| room.lit) {
            LightingMode::Lit
        } else if flashlight_on {
            LightingMode::Flashlight
        } else {
            LightingMode::Ambient
        }
    }
}

/// One tick's view from a single observer. Rebuilt from scratch every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityField {
    pub origin: Point,
    pub facing: f64,
    pub tiles: BTreeSet<TileCoord>,
    pub polygon: Vec<Point>,
    pub entities: BTreeSet<EntityId>,
}

impl VisibilityField {
    pub fn sees_tile(&self, coord: TileCoord) -> bool {
        self.tiles.contains(&coord)
    }

    pub fn sees_entity(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }
}

/// Casts the ray fan for `params` from `origin` and collects visible tiles,
/// the polygon, and whichever `candidates` pass the membership test.
pub fn compute_visibility(
    level: &Level,
    origin: Point,
    facing: f64,
    params: &ConeParams,
    candidates: &[(EntityId, Point)],
) -> VisibilityField {
    let mut field = VisibilityField {
        origin,
        facing,
        ..Default::default()
    };

    let rays = params.ray_count.max(2);
    let (start_angle, step) = if params.is_all_round() {
        (facing, 360.0 / rays as f64)
    } else {
        (facing - params.cone_deg / 2.0, params.cone_deg / (rays - 1) as f64)
    };

    if !params.is_all_round() {
        field.polygon.push(origin);
    }
    for i in 0..rays {
        let angle = start_angle + step * i as f64;
        let tiles = &mut field.tiles;
        let dist = level.march_ray(origin, angle, params.range, |coord| {
            tiles.insert(coord);
        });
        field.polygon.push(origin.offset(angle, dist));
    }

    // Rays fan apart with distance, so fill in every tile whose centre
    // passes the same test entities use
    let r = (params.reach() / TILE_SIZE).ceil() as i32;
    let center = Level::world_to_tile(origin);
    for y in center.y - r..=center.y + r {
        for x in center.x - r..=center.x + r {
            let coord = TileCoord::new(x, y);
            if level.in_bounds(coord)
                && !field.tiles.contains(&coord)
                && params.covers(level, origin, facing, Level::tile_center(coord))
            {
                field.tiles.insert(coord);
            }
        }
    }

    field.entities = candidates
        .iter()
        .filter(|(_, position)| params.covers(level, origin, facing, *position))
        .map(|(id, _)| *id)
        .collect();

    field
}
