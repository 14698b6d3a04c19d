use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AmmoType {
    Pistol,
    Shells,
    Rifle,
    Grenade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Melee,
    Projectile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponId {
    // Player arsenal
    Knife,
    Pistol,
    Shotgun,
    Rifle,
    GrenadeLauncher,
    // Hostile natural weapons
    Claws,
    SpitGland,
    BruteFist,
    BossCannon,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub id: WeaponId,
    pub name: &'static str,
    pub kind: WeaponKind,
    pub damage: f64,                 // Per hit, or per pellet
    pub range: f64,                  // Melee reach, or effective range for projectiles
    pub muzzle_speed: f64,           // World units per second (projectiles only)
    pub cooldown: f64,               // Seconds between actions
    pub spread_deg: f64,             // Full width of the random aim offset
    pub pellet_count: u32,
    pub ammo_type: Option<AmmoType>, // None: never runs dry
    pub magazine_size: u32,
    pub reload_time: f64,
    pub projectile_life: f64, // Seconds before a projectile expires
    pub explosion_radius: f64, // Zero for plain projectiles
    pub facing_tolerance_deg: f64, // Melee half-arc around the facing direction
}

impl Weapon {
    pub fn is_melee(&self) -> bool {
        self.kind == WeaponKind::Melee
    }

    pub fn is_explosive(&self) -> bool {
        self.explosion_radius > 0.0
    }

    pub fn uses_ammo(&self) -> bool {
        self.ammo_type.is_some()
    }
}

static KNIFE: Weapon = Weapon {
    id: WeaponId::Knife,
    name: "Knife",
    kind: WeaponKind::Melee,
    damage: 25.0,
    range: 50.0,
    muzzle_speed: 0.0,
    cooldown: 0.4,
    spread_deg: 0.0,
    pellet_count: 1,
    ammo_type: None,
    magazine_size: 0,
    reload_time: 0.0,
    projectile_life: 0.0,
    explosion_radius: 0.0,
    facing_tolerance_deg: 90.0,
};

static PISTOL: Weapon = Weapon {
    id: WeaponId::Pistol,
    name: "Pistol",
    kind: WeaponKind::Projectile,
    damage: 18.0,
    range: 460.0,
    muzzle_speed: 520.0,
    cooldown: 0.3,
    spread_deg: 4.0,
    pellet_count: 1,
    ammo_type: Some(AmmoType::Pistol),
    magazine_size: 12,
    reload_time: 1.2,
    projectile_life: 0.9,
    explosion_radius: 0.0,
    facing_tolerance_deg: 0.0,
};

static SHOTGUN: Weapon = Weapon {
    id: WeaponId::Shotgun,
    name: "Shotgun",
    kind: WeaponKind::Projectile,
    damage: 10.0,
    range: 200.0,
    muzzle_speed: 460.0,
    cooldown: 0.8,
    spread_deg: 24.0,
    pellet_count: 6,
    ammo_type: Some(AmmoType::Shells),
    magazine_size: 6,
    reload_time: 2.0,
    projectile_life: 0.45,
    explosion_radius: 0.0,
    facing_tolerance_deg: 0.0,
};

static RIFLE: Weapon = Weapon {
    id: WeaponId::Rifle,
    name: "Rifle",
    kind: WeaponKind::Projectile,
    damage: 28.0,
    range: 600.0,
    muzzle_speed: 760.0,
    cooldown: 0.12,
    spread_deg: 2.5,
    pellet_count: 1,
    ammo_type: Some(AmmoType::Rifle),
    magazine_size: 30,
    reload_time: 2.2,
    projectile_life: 0.8,
    explosion_radius: 0.0,
    facing_tolerance_deg: 0.0,
};

static GRENADE_LAUNCHER: Weapon = Weapon {
    id: WeaponId::GrenadeLauncher,
    name: "Grenade Launcher",
    kind: WeaponKind::Projectile,
    damage: 60.0,
    range: 360.0,
    muzzle_speed: 300.0,
    cooldown: 1.0,
    spread_deg: 0.0,
    pellet_count: 1,
    ammo_type: Some(AmmoType::Grenade),
    magazine_size: 4,
    reload_time: 2.5,
    projectile_life: 1.2,
    explosion_radius: 90.0,
    facing_tolerance_deg: 0.0,
};

static CLAWS: Weapon = Weapon {
    id: WeaponId::Claws,
    name: "Claws",
    kind: WeaponKind::Melee,
    damage: 8.0,
    range: 22.0,
    muzzle_speed: 0.0,
    cooldown: 0.8,
    spread_deg: 0.0,
    pellet_count: 1,
    ammo_type: None,
    magazine_size: 0,
    reload_time: 0.0,
    projectile_life: 0.0,
    explosion_radius: 0.0,
    facing_tolerance_deg: 60.0,
};

static SPIT_GLAND: Weapon = Weapon {
    id: WeaponId::SpitGland,
    name: "Spit Gland",
    kind: WeaponKind::Projectile,
    damage: 10.0,
    range: 192.0,
    muzzle_speed: 240.0,
    cooldown: 1.6,
    spread_deg: 6.0,
    pellet_count: 1,
    ammo_type: None,
    magazine_size: 0,
    reload_time: 0.0,
    projectile_life: 1.2,
    explosion_radius: 0.0,
    facing_tolerance_deg: 0.0,
};

static BRUTE_FIST: Weapon = Weapon {
    id: WeaponId::BruteFist,
    name: "Brute Fist",
    kind: WeaponKind::Melee,
    damage: 22.0,
    range: 26.0,
    muzzle_speed: 0.0,
    cooldown: 1.4,
    spread_deg: 0.0,
    pellet_count: 1,
    ammo_type: None,
    magazine_size: 0,
    reload_time: 0.0,
    projectile_life: 0.0,
    explosion_radius: 0.0,
    facing_tolerance_deg: 70.0,
};

static BOSS_CANNON: Weapon = Weapon {
    id: WeaponId::BossCannon,
    name: "Boss Cannon",
    kind: WeaponKind::Projectile,
    damage: 14.0,
    range: 256.0,
    muzzle_speed: 300.0,
    cooldown: 1.2,
    spread_deg: 30.0,
    pellet_count: 3,
    ammo_type: None,
    magazine_size: 0,
    reload_time: 0.0,
    projectile_life: 1.1,
    explosion_radius: 0.0,
    facing_tolerance_deg: 0.0,
};

impl WeaponId {
    pub fn def(self) -> &'static Weapon {
        match self {
            WeaponId::Knife => &KNIFE,
            WeaponId::Pistol => &PISTOL,
            WeaponId::Shotgun => &SHOTGUN,
            WeaponId::Rifle => &RIFLE,
            WeaponId::GrenadeLauncher => &GRENADE_LAUNCHER,
            WeaponId::Claws => &CLAWS,
            WeaponId::SpitGland => &SPIT_GLAND,
            WeaponId::BruteFist => &BRUTE_FIST,
            WeaponId::BossCannon => &BOSS_CANNON,
        }
    }

    /// Weapons that can be found as pickups and carried by the player.
    pub const PLAYER_FIREARMS: [WeaponId; 4] = [
        WeaponId::Pistol,
        WeaponId::Shotgun,
        WeaponId::Rifle,
        WeaponId::GrenadeLauncher,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids_match() {
        for id in [
            WeaponId::Knife,
            WeaponId::Pistol,
            WeaponId::Shotgun,
            WeaponId::Rifle,
            WeaponId::GrenadeLauncher,
            WeaponId::Claws,
            WeaponId::SpitGland,
            WeaponId::BruteFist,
            WeaponId::BossCannon,
        ] {
            assert_eq!(id.def().id, id);
            assert!(id.def().pellet_count >= 1);
        }
    }

    #[test]
    fn test_player_firearms_use_ammo() {
        for id in WeaponId::PLAYER_FIREARMS {
            let weapon = id.def();
            assert_eq!(weapon.kind, WeaponKind::Projectile);
            assert!(weapon.uses_ammo());
            assert!(weapon.magazine_size > 0);
        }
        assert!(!WeaponId::Knife.def().uses_ammo());
        assert!(WeaponId::GrenadeLauncher.def().is_explosive());
    }
}
