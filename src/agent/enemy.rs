// Hostile roster: per-type stats and spawn weights.

use crate::config::TILE_SIZE;
use crate::weapon::WeaponId;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyType {
    Crawler,
    Spitter,
    Brute,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub max_health: f64,
    pub speed: f64, // World units per second at full pace
    pub size: f64,  // Collision radius
    pub detection_range: f64,
    pub view_cone_deg: f64, // Full cone width; 360 sees all round
    pub attack_range: f64,  // Chase switches to attack inside this distance
    pub melee: Option<WeaponId>,
    pub ranged: Option<WeaponId>,
}

static CRAWLER: EnemyStats = EnemyStats {
    max_health: 30.0,
    speed: 95.0,
    size: 9.0,
    detection_range: TILE_SIZE * 7.0,
    view_cone_deg: 360.0,
    attack_range: 30.0,
    melee: Some(WeaponId::Claws),
    ranged: None,
};

static SPITTER: EnemyStats = EnemyStats {
    max_health: 24.0,
    speed: 60.0,
    size: 10.0,
    detection_range: TILE_SIZE * 9.0,
    view_cone_deg: 140.0,
    attack_range: TILE_SIZE * 6.0,
    melee: None,
    ranged: Some(WeaponId::SpitGland),
};

static BRUTE: EnemyStats = EnemyStats {
    max_health: 90.0,
    speed: 50.0,
    size: 14.0,
    detection_range: TILE_SIZE * 6.0,
    view_cone_deg: 360.0,
    attack_range: 36.0,
    melee: Some(WeaponId::BruteFist),
    ranged: None,
};

static BOSS: EnemyStats = EnemyStats {
    max_health: 400.0,
    speed: 55.0,
    size: 20.0,
    detection_range: TILE_SIZE * 12.0,
    view_cone_deg: 360.0,
    attack_range: TILE_SIZE * 8.0,
    melee: Some(WeaponId::BruteFist),
    ranged: Some(WeaponId::BossCannon),
};

impl EnemyType {
    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyType::Crawler => &CRAWLER,
            EnemyType::Spitter => &SPITTER,
            EnemyType::Brute => &BRUTE,
            EnemyType::Boss => &BOSS,
        }
    }

    /// Spawn weight on a given floor. Deeper floors shift the mix towards
    /// ranged and heavy types; bosses are never rolled from the table.
    pub fn spawn_weight(self, floor_index: u32) -> u32 {
        match self {
            EnemyType::Crawler => 6,
            EnemyType::Spitter => 1 + floor_index,
            EnemyType::Brute => floor_index.saturating_sub(1) * 2,
            EnemyType::Boss => 0,
        }
    }

    /// Weighted roll from the spawn table for `floor_index`.
    pub fn roll<R: Rng>(floor_index: u32, rng: &mut R) -> EnemyType {
        let table = [EnemyType::Crawler, EnemyType::Spitter, EnemyType::Brute];
        let total: u32 = table.iter().map(|t| t.spawn_weight(floor_index)).sum();
        let mut pick = rng.gen_range(0..total.max(1));
        for enemy_type in table {
            let weight = enemy_type.spawn_weight(floor_index);
            if pick < weight {
                return enemy_type;
            }
            pick -= weight;
        }
        EnemyType::Crawler
    }
}
