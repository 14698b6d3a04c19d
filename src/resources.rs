// Survival resource economy: activity tiers, oxygen, battery and stamina.

use crate::agent::PlayerState;
use crate::config::*;
use serde::{Deserialize, Serialize};

/// Discrete movement intensity used to pick the oxygen rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivityTier {
    Idle,
    Walking,
    Running,
    Combat,
}

impl ActivityTier {
    /// Oxygen consumed per second in this tier before environmental modifiers.
    pub fn oxygen_rate(self) -> f64 {
        match self {
            ActivityTier::Idle => OXYGEN_RATE_IDLE,
            ActivityTier::Walking => OXYGEN_RATE_WALK,
            ActivityTier::Running => OXYGEN_RATE_RUN,
            ActivityTier::Combat => OXYGEN_RATE_COMBAT,
        }
    }

    /// Fighting recently outranks everything, then sprinting, then moving.
    /// Sprinting only counts while there is stamina left to spend.
    pub fn classify(moving: bool, sprinting: bool, player: &PlayerState) -> ActivityTier {
        if player.combat_timer > 0.0 {
            ActivityTier::Combat
        } else if moving && sprinting && player.stamina > 0.0 {
            ActivityTier::Running
        } else if moving {
            ActivityTier::Walking
        } else {
            ActivityTier::Idle
        }
    }
}

/// Threshold crossings produced by one resource tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceReport {
    pub suffocated: bool,
    pub flashlight_depleted: bool,
}

/// Applies one tick of decay and regeneration. `life_support` scales the
/// oxygen rate and is floored at zero. Health is never touched here.
pub fn apply_resource_tick(
    player: &mut PlayerState,
    tier: ActivityTier,
    life_support: f64,
    dt: f64,
) -> ResourceReport {
    let mut report = ResourceReport::default();
    player.activity = tier;

    let oxygen_rate = tier.oxygen_rate() * life_support.max(0.0);
    player.oxygen = (player.oxygen - oxygen_rate * dt).clamp(0.0, player.max_oxygen);
    if player.oxygen <= 0.0 {
        report.suffocated = true;
    }

    if player.flashlight_on {
        player.battery = (player.battery - BATTERY_DRAIN_RATE * dt).max(0.0);
        if player.battery <= 0.0 {
            player.flashlight_on = false;
            report.flashlight_depleted = true;
        }
    } else {
        player.battery = (player.battery + BATTERY_REGEN_RATE * dt).min(player.max_battery);
    }

    if tier == ActivityTier::Running {
        player.stamina = (player.stamina - STAMINA_DRAIN_RATE * dt).max(0.0);
    } else if !player.is_dodging() {
        player.stamina = (player.stamina + STAMINA_REGEN_RATE * dt).min(player.max_stamina);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn run_for(tier: ActivityTier, seconds: f64) -> PlayerState {
        let mut player = PlayerState::new();
        let dt = 1.0 / 60.0;
        let ticks = (seconds / dt).round() as usize;
        for _ in 0..ticks {
            apply_resource_tick(&mut player, tier, 1.0, dt);
        }
        player
    }

    #[test]
    fn test_tier_rates_are_ordered() {
        assert!(ActivityTier::Idle.oxygen_rate() < ActivityTier::Walking.oxygen_rate());
        assert!(ActivityTier::Walking.oxygen_rate() < ActivityTier::Running.oxygen_rate());
        assert!(ActivityTier::Running.oxygen_rate() < ActivityTier::Combat.oxygen_rate());
    }

    #[test]
    fn test_running_burns_more_oxygen_than_idling() {
        let idle = run_for(ActivityTier::Idle, 10.0);
        let running = run_for(ActivityTier::Running, 10.0);
        assert_approx_eq!(idle.oxygen, MAX_OXYGEN - OXYGEN_RATE_IDLE * 10.0, 1e-6);
        assert_approx_eq!(running.oxygen, MAX_OXYGEN - OXYGEN_RATE_RUN * 10.0, 1e-6);
        assert!(running.oxygen <= idle.oxygen);
    }

    #[test]
    fn test_life_support_modifier_never_negative() {
        let mut player = PlayerState::new();
        apply_resource_tick(&mut player, ActivityTier::Idle, -3.0, 1.0);
        assert_approx_eq!(player.oxygen, MAX_OXYGEN);
        apply_resource_tick(&mut player, ActivityTier::Idle, EFFICIENT_LIFE_SUPPORT, 1.0);
        assert_approx_eq!(player.oxygen, MAX_OXYGEN - OXYGEN_RATE_IDLE * EFFICIENT_LIFE_SUPPORT);
    }

    #[test]
    fn test_suffocation_at_zero() {
        let mut player = PlayerState::new();
        player.oxygen = 0.01;
        let report = apply_resource_tick(&mut player, ActivityTier::Idle, 1.0, 1.0);
        assert!(report.suffocated);
        assert_approx_eq!(player.oxygen, 0.0);
    }

    #[test]
    fn test_flashlight_drains_then_shuts_off() {
        let mut player = PlayerState::new();
        player.flashlight_on = true;
        player.battery = 1.0;
        let report = apply_resource_tick(&mut player, ActivityTier::Idle, 1.0, 1.0);
        assert!(report.flashlight_depleted);
        assert!(!player.flashlight_on);
        // Regenerates at the slower rate once off
        apply_resource_tick(&mut player, ActivityTier::Idle, 1.0, 2.0);
        assert_approx_eq!(player.battery, BATTERY_REGEN_RATE * 2.0);
    }

    #[test]
    fn test_classify_tiers() {
        let mut player = PlayerState::new();
        assert_eq!(ActivityTier::classify(false, false, &player), ActivityTier::Idle);
        assert_eq!(ActivityTier::classify(true, false, &player), ActivityTier::Walking);
        assert_eq!(ActivityTier::classify(true, true, &player), ActivityTier::Running);
        player.stamina = 0.0;
        assert_eq!(ActivityTier::classify(true, true, &player), ActivityTier::Walking);
        player.mark_combat();
        assert_eq!(ActivityTier::classify(false, false, &player), ActivityTier::Combat);
    }
}
