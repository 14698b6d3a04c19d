// Pickups lying on the floor and destructible props.

use crate::agent::Agent;
use crate::types::{EntityId, Point};
use crate::weapon::{AmmoType, WeaponId};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Oxygen,
    Battery,
    Ammo(AmmoType),
    Key,
    Weapon(WeaponId),
}

impl PickupKind {
    pub fn default_amount(&self) -> u32 {
        match self {
            PickupKind::Health => 25,
            PickupKind::Oxygen => 30,
            PickupKind::Battery => 40,
            PickupKind::Ammo(AmmoType::Pistol) => 12,
            PickupKind::Ammo(AmmoType::Shells) => 6,
            PickupKind::Ammo(AmmoType::Rifle) => 30,
            PickupKind::Ammo(AmmoType::Grenade) => 2,
            PickupKind::Key => 1,
            PickupKind::Weapon(_) => 1,
        }
    }

    /// Common consumables dropped by hostiles and crates.
    pub fn random_loot<R: Rng>(rng: &mut R) -> PickupKind {
        match rng.gen_range(0..10) {
            0..=2 => PickupKind::Ammo(AmmoType::Pistol),
            3 => PickupKind::Ammo(AmmoType::Shells),
            4 => PickupKind::Ammo(AmmoType::Rifle),
            5 | 6 => PickupKind::Health,
            7 | 8 => PickupKind::Oxygen,
            _ => PickupKind::Battery,
        }
    }

    /// Rarer finds placed in treasure rooms.
    pub fn random_treasure<R: Rng>(rng: &mut R) -> PickupKind {
        match rng.gen_range(0..8) {
            0 | 1 => PickupKind::Key,
            // Skips the pistol the player starts with
            n @ 2..=4 => PickupKind::Weapon(WeaponId::PLAYER_FIREARMS[n - 1]),
            5 => PickupKind::Ammo(AmmoType::Grenade),
            6 => PickupKind::Health,
            _ => PickupKind::Oxygen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub position: Point,
    pub kind: PickupKind,
    pub amount: u32,
}

impl Pickup {
    /// Applies the pickup to the player. Returns false if `agent` is not the
    /// player, in which case nothing is consumed.
    pub fn apply_to(&self, agent: &mut Agent) -> bool {
        let amount = self.amount as f64;
        if !agent.is_player() {
            return false;
        }
        if self.kind == PickupKind::Health {
            agent.heal(amount);
            return true;
        }
        let Some(player) = agent.as_player_mut() else {
            return false;
        };
        match self.kind {
            PickupKind::Health => {}
            PickupKind::Oxygen => player.oxygen = (player.oxygen + amount).min(player.max_oxygen),
            PickupKind::Battery => player.battery = (player.battery + amount).min(player.max_battery),
            PickupKind::Ammo(ammo_type) => player.add_ammo(ammo_type, self.amount),
            PickupKind::Key => player.keys += self.amount,
            PickupKind::Weapon(weapon) => player.give_weapon(weapon),
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropKind {
    Crate,
    ExplosiveBarrel,
}

impl PropKind {
    pub fn max_health(&self) -> f64 {
        match self {
            PropKind::Crate => 20.0,
            PropKind::ExplosiveBarrel => 15.0,
        }
    }

    pub fn size(&self) -> f64 {
        match self {
            PropKind::Crate => 12.0,
            PropKind::ExplosiveBarrel => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub id: EntityId,
    pub kind: PropKind,
    pub position: Point,
    pub health: f64,
}

impl Prop {
    pub fn new(id: EntityId, kind: PropKind, position: Point) -> Self {
        Prop {
            id,
            kind,
            position,
            health: kind.max_health(),
        }
    }

    pub fn size(&self) -> f64 {
        self.kind.size()
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    /// Returns true if this hit destroyed the prop.
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.is_destroyed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::enemy::EnemyType;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pickup(kind: PickupKind, amount: u32) -> Pickup {
        Pickup {
            id: 1,
            position: Point::ZERO,
            kind,
            amount,
        }
    }

    #[test]
    fn test_health_pickup_caps_at_max() {
        let mut player = Agent::new_player(1, Point::ZERO);
        player.health = 90.0;
        assert!(pickup(PickupKind::Health, 25).apply_to(&mut player));
        assert_approx_eq!(player.health, player.max_health);
    }

    #[test]
    fn test_hostiles_cannot_collect() {
        let mut hostile = Agent::new_hostile(2, EnemyType::Crawler, Point::ZERO);
        hostile.health = 10.0;
        assert!(!pickup(PickupKind::Health, 25).apply_to(&mut hostile));
        assert_approx_eq!(hostile.health, 10.0);
        assert!(!pickup(PickupKind::Key, 1).apply_to(&mut hostile));
    }

    #[test]
    fn test_ammo_and_keys() {
        let mut player = Agent::new_player(1, Point::ZERO);
        let before = player.as_player().map(|p| p.reserve(AmmoType::Shells)).unwrap_or(0);
        assert!(pickup(PickupKind::Ammo(AmmoType::Shells), 6).apply_to(&mut player));
        assert!(pickup(PickupKind::Key, 1).apply_to(&mut player));
        let state = player.as_player().expect("player state");
        assert_eq!(state.reserve(AmmoType::Shells), before + 6);
        assert_eq!(state.keys, 1);
    }

    #[test]
    fn test_treasure_weapons_exclude_starting_pistol() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut weapons = Vec::new();
        for _ in 0..400 {
            if let PickupKind::Weapon(w) = PickupKind::random_treasure(&mut rng) {
                weapons.push(w);
            }
        }
        assert!(!weapons.contains(&WeaponId::Pistol));
        for weapon in &WeaponId::PLAYER_FIREARMS[1..] {
            assert!(weapons.contains(weapon), "{:?} never rolled", weapon);
        }
    }

    #[test]
    fn test_prop_destroyed_once() {
        let mut barrel = Prop::new(5, PropKind::ExplosiveBarrel, Point::ZERO);
        assert!(!barrel.apply_damage(5.0));
        assert!(barrel.apply_damage(50.0));
        assert!(!barrel.apply_damage(50.0));
        assert_approx_eq!(barrel.health, 0.0);
    }
}
