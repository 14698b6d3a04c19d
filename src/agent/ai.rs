use crate::config::{
    ALERT_DURATION, PATROL_WAYPOINT_RADIUS, WAYPOINT_ARRIVAL_DISTANCE, WAYPOINT_ATTEMPTS,
};
use crate::level::Level;
use crate::types::Point;
use crate::utils::tick_down;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AiState {
    Patrol { waypoint: Option<Point> },
    Alert { last_known: Point, timer: f64 },
    Chase,
    Attack,
}

impl Default for AiState {
    fn default() -> Self {
        AiState::Patrol { waypoint: None }
    }
}

/// What a hostile knows about the player this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub sees_player: bool,
    pub player_position: Point,
    pub distance: f64,
    /// Where the player was last seen, if ever.
    pub last_seen: Option<Point>,
}

impl AiState {
    pub fn name(&self) -> &'static str {
        match self {
            AiState::Patrol { .. } => "patrol",
            AiState::Alert { .. } => "alert",
            AiState::Chase => "chase",
            AiState::Attack => "attack",
        }
    }

    pub fn is_engaged(&self) -> bool {
        matches!(self, AiState::Chase | AiState::Attack)
    }

    /// At most one transition per call; sighting the player wins.
    pub fn next(&self, perception: &Perception, attack_range: f64, dt: f64) -> AiState {
        match *self {
            AiState::Patrol { waypoint } => {
                if perception.sees_player {
                    AiState::Chase
                } else {
                    AiState::Patrol { waypoint }
                }
            }
            AiState::Alert { last_known, timer } => {
                if perception.sees_player {
                    return AiState::Chase;
                }
                let mut timer = timer;
                tick_down(&mut timer, dt);
                if timer <= 0.0 {
                    AiState::Patrol { waypoint: None }
                } else {
                    AiState::Alert { last_known, timer }
                }
            }
            AiState::Chase | AiState::Attack => {
                if !perception.sees_player {
                    return AiState::Alert {
                        last_known: perception.last_seen.unwrap_or(perception.player_position),
                        timer: ALERT_DURATION,
                    };
                }
                if perception.distance <= attack_range {
                    AiState::Attack
                } else {
                    AiState::Chase
                }
            }
        }
    }
}

/// Picks a reachable patrol waypoint near `home`: somewhere the agent fits
/// and can walk to in a straight line from `position`. Falls back to `home`.
pub fn pick_waypoint<R: Rng>(
    level: &Level,
    home: Point,
    position: Point,
    size: f64,
    rng: &mut R,
) -> Point {
    for _ in 0..WAYPOINT_ATTEMPTS {
        let angle = rng.gen_range(0.0..360.0);
        let dist = rng.gen_range(0.0..PATROL_WAYPOINT_RADIUS);
        let candidate = home.offset(angle, dist);
        if level.can_occupy(candidate, size) && level.line_of_sight(position, candidate) {
            return candidate;
        }
    }
    home
}

pub fn has_arrived(position: Point, target: Point) -> bool {
    position.distance(&target) <= WAYPOINT_ARRIVAL_DISTANCE
}
