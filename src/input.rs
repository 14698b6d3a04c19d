// Normalized per-tick input fed to the simulation by an external front end.

use crate::config::MOVE_DEADZONE;
use crate::types::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFlags {
    pub fire: bool,     // Held: fires whenever the cooldown allows
    pub melee: bool,
    pub interact: bool, // Held: hacks keep going only while this stays down
    pub reload: bool,
    pub dodge: bool,
    pub toggle_flashlight: bool,
    pub sprint: bool,
    pub cycle_weapon: bool,
}

impl ActionFlags {
    /// Flags that went down this tick but were up on the previous one.
    pub fn pressed_since(&self, previous: &ActionFlags) -> ActionFlags {
        ActionFlags {
            fire: self.fire && !previous.fire,
            melee: self.melee && !previous.melee,
            interact: self.interact && !previous.interact,
            reload: self.reload && !previous.reload,
            dodge: self.dodge && !previous.dodge,
            toggle_flashlight: self.toggle_flashlight && !previous.toggle_flashlight,
            sprint: self.sprint && !previous.sprint,
            cycle_weapon: self.cycle_weapon && !previous.cycle_weapon,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Desired movement direction; longer than 1 is scaled down.
    pub move_vector: Point,
    /// World point the player is aiming at.
    pub aim_point: Point,
    pub actions: ActionFlags,
}

impl InputState {
    /// Movement with the length capped at 1 and small stick noise zeroed.
    pub fn movement(&self) -> Point {
        let v = self.move_vector.clamp_length(1.0);
        if v.length() < MOVE_DEADZONE || !v.x.is_finite() || !v.y.is_finite() {
            Point::ZERO
        } else {
            v
        }
    }

    pub fn is_moving(&self) -> bool {
        self.movement() != Point::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_rising_edges() {
        let previous = ActionFlags {
            melee: true,
            ..Default::default()
        };
        let current = ActionFlags {
            melee: true,
            dodge: true,
            ..Default::default()
        };
        let pressed = current.pressed_since(&previous);
        assert!(!pressed.melee);
        assert!(pressed.dodge);
    }

    #[test]
    fn test_movement_normalized() {
        let input = InputState {
            move_vector: Point::new(3.0, 4.0),
            ..Default::default()
        };
        assert_approx_eq!(input.movement().length(), 1.0);
        let noise = InputState {
            move_vector: Point::new(0.01, 0.0),
            ..Default::default()
        };
        assert!(!noise.is_moving());
    }
}
