// Player-only state: survival resources, loadout and timed actions.

use crate::config::*;
use crate::resources::ActivityTier;
use crate::types::TileCoord;
use crate::utils::tick_down;
use crate::weapon::{AmmoType, Weapon, WeaponId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reload in progress. Completing it moves rounds from the reserve into
/// the magazine of `weapon`; cancelling it changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reload {
    pub weapon: WeaponId,
    pub remaining: f64,
}

/// A hack in progress on a locked door. Only completes while interact stays held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hack {
    pub door: TileCoord,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub oxygen: f64,
    pub max_oxygen: f64,
    pub battery: f64,
    pub max_battery: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    pub flashlight_on: bool,
    pub ammo: BTreeMap<AmmoType, u32>,       // Reserve rounds by type
    pub magazines: BTreeMap<WeaponId, u32>, // Loaded rounds per carried firearm
    pub weapons: Vec<WeaponId>,
    pub equipped: WeaponId,
    pub keys: u32,
    pub fire_cooldown: f64,
    pub melee_cooldown: f64,
    pub reload: Option<Reload>,
    pub hack: Option<Hack>,
    pub dodge_timer: f64,
    pub combat_timer: f64, // Counts down from COMBAT_TIER_WINDOW after fighting
    pub activity: ActivityTier,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerState {
    pub fn new() -> Self {
        let mut ammo = BTreeMap::new();
        ammo.insert(AmmoType::Pistol, 36);
        let mut magazines = BTreeMap::new();
        magazines.insert(WeaponId::Pistol, WeaponId::Pistol.def().magazine_size);

        PlayerState {
            oxygen: MAX_OXYGEN,
            max_oxygen: MAX_OXYGEN,
            battery: MAX_BATTERY,
            max_battery: MAX_BATTERY,
            stamina: MAX_STAMINA,
            max_stamina: MAX_STAMINA,
            flashlight_on: false,
            ammo,
            magazines,
            weapons: vec![WeaponId::Pistol],
            equipped: WeaponId::Pistol,
            keys: 0,
            fire_cooldown: 0.0,
            melee_cooldown: 0.0,
            reload: None,
            hack: None,
            dodge_timer: 0.0,
            combat_timer: 0.0,
            activity: ActivityTier::Idle,
        }
    }

    pub fn equipped_weapon(&self) -> &'static Weapon {
        self.equipped.def()
    }

    pub fn magazine(&self, weapon: WeaponId) -> u32 {
        self.magazines.get(&weapon).copied().unwrap_or(0)
    }

    pub fn reserve(&self, ammo_type: AmmoType) -> u32 {
        self.ammo.get(&ammo_type).copied().unwrap_or(0)
    }

    pub fn add_ammo(&mut self, ammo_type: AmmoType, amount: u32) {
        *self.ammo.entry(ammo_type).or_insert(0) += amount;
    }

    /// Adds a firearm to the loadout with a full magazine. Picking up a weapon
    /// already carried yields a magazine's worth of reserve ammo instead.
    pub fn give_weapon(&mut self, weapon: WeaponId) {
        let def = weapon.def();
        if self.weapons.contains(&weapon) {
            if let Some(ammo_type) = def.ammo_type {
                self.add_ammo(ammo_type, def.magazine_size);
            }
            return;
        }
        self.weapons.push(weapon);
        self.magazines.insert(weapon, def.magazine_size);
    }

    /// Switches to the next carried firearm. Any reload in progress is dropped.
    pub fn cycle_weapon(&mut self) -> WeaponId {
        if let Some(pos) = self.weapons.iter().position(|w| *w == self.equipped) {
            let next = self.weapons[(pos + 1) % self.weapons.len()];
            if next != self.equipped {
                self.reload = None;
                self.equipped = next;
            }
        }
        self.equipped
    }

    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    pub fn is_dodging(&self) -> bool {
        self.dodge_timer > 0.0
    }

    /// Returns true if a reload is now in progress.
    pub fn start_reload(&mut self) -> bool {
        if self.reload.is_some() {
            return true;
        }
        let weapon = self.equipped_weapon();
        let Some(ammo_type) = weapon.ammo_type else {
            return false;
        };
        if self.magazine(weapon.id) >= weapon.magazine_size || self.reserve(ammo_type) == 0 {
            return false;
        }
        self.reload = Some(Reload {
            weapon: weapon.id,
            remaining: weapon.reload_time,
        });
        true
    }

    pub fn cancel_reload(&mut self) {
        self.reload = None;
    }

    /// Counts the reload down. Returns the number of rounds loaded when it completes.
    pub fn advance_reload(&mut self, dt: f64) -> Option<u32> {
        let reload = self.reload.as_mut()?;
        tick_down(&mut reload.remaining, dt);
        if reload.remaining > 0.0 {
            return None;
        }
        let weapon = reload.weapon.def();
        self.reload = None;
        let ammo_type = weapon.ammo_type?;
        let loaded = self.magazine(weapon.id);
        let moved = weapon
            .magazine_size
            .saturating_sub(loaded)
            .min(self.reserve(ammo_type));
        self.ammo.insert(ammo_type, self.reserve(ammo_type) - moved);
        self.magazines.insert(weapon.id, loaded + moved);
        Some(moved)
    }

    pub fn consume_round(&mut self) -> bool {
        let weapon = self.equipped_weapon();
        if !weapon.uses_ammo() {
            return true;
        }
        match self.magazines.get_mut(&weapon.id) {
            Some(rounds) if *rounds > 0 => {
                *rounds -= 1;
                true
            }
            _ => false,
        }
    }

    /// Reload progress in [0, 1], if reloading.
    pub fn reload_progress(&self) -> Option<f64> {
        self.reload.map(|r| {
            let total = r.weapon.def().reload_time;
            if total > 0.0 { 1.0 - r.remaining / total } else { 1.0 }
        })
    }

    pub fn hack_progress(&self) -> Option<f64> {
        self.hack.map(|h| 1.0 - h.remaining / HACK_DURATION)
    }

    pub fn mark_combat(&mut self) {
        self.combat_timer = COMBAT_TIER_WINDOW;
    }

    /// Counts down cooldowns and windows that run regardless of input.
    pub fn tick_timers(&mut self, dt: f64) {
        tick_down(&mut self.fire_cooldown, dt);
        tick_down(&mut self.melee_cooldown, dt);
        tick_down(&mut self.dodge_timer, dt);
        tick_down(&mut self.combat_timer, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_reload_moves_rounds_from_reserve() {
        let mut player = PlayerState::new();
        player.magazines.insert(WeaponId::Pistol, 2);
        player.ammo.insert(AmmoType::Pistol, 5);
        assert!(player.start_reload());
        assert_eq!(player.advance_reload(0.5), None);
        assert_eq!(player.advance_reload(1.0), Some(5));
        assert_eq!(player.magazine(WeaponId::Pistol), 7);
        assert_eq!(player.reserve(AmmoType::Pistol), 0);
        assert!(!player.is_reloading());
    }

    #[test]
    fn test_reload_refused_when_full_or_dry() {
        let mut player = PlayerState::new();
        assert!(!player.start_reload()); // Full magazine
        player.magazines.insert(WeaponId::Pistol, 0);
        player.ammo.insert(AmmoType::Pistol, 0);
        assert!(!player.start_reload()); // Nothing in reserve
    }

    #[test]
    fn test_cancelled_reload_leaves_no_partial_effect() {
        let mut player = PlayerState::new();
        player.magazines.insert(WeaponId::Pistol, 3);
        assert!(player.start_reload());
        player.advance_reload(1.0);
        player.cancel_reload();
        assert_eq!(player.advance_reload(5.0), None);
        assert_eq!(player.magazine(WeaponId::Pistol), 3);
        assert_eq!(player.reserve(AmmoType::Pistol), 36);
    }

    #[test]
    fn test_weapon_switch_cancels_reload() {
        let mut player = PlayerState::new();
        player.give_weapon(WeaponId::Shotgun);
        player.magazines.insert(WeaponId::Pistol, 0);
        assert!(player.start_reload());
        assert_eq!(player.cycle_weapon(), WeaponId::Shotgun);
        assert!(!player.is_reloading());
        assert_eq!(player.cycle_weapon(), WeaponId::Pistol);
    }

    #[test]
    fn test_consume_round_stops_at_empty() {
        let mut player = PlayerState::new();
        player.magazines.insert(WeaponId::Pistol, 1);
        assert!(player.consume_round());
        assert!(!player.consume_round());
        assert_eq!(player.magazine(WeaponId::Pistol), 0);
    }

    #[test]
    fn test_duplicate_weapon_becomes_ammo() {
        let mut player = PlayerState::new();
        player.give_weapon(WeaponId::Pistol);
        assert_eq!(player.weapons.len(), 1);
        assert_eq!(player.reserve(AmmoType::Pistol), 36 + 12);
    }

    #[test]
    fn test_reload_progress() {
        let mut player = PlayerState::new();
        player.magazines.insert(WeaponId::Pistol, 0);
        assert!(player.start_reload());
        player.advance_reload(0.6);
        assert_approx_eq!(player.reload_progress().unwrap_or(0.0), 0.5);
    }
}
