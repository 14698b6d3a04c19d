pub mod ai;
pub mod enemy;
pub mod player;

pub use ai::{AiState, Perception};
pub use enemy::{EnemyStats, EnemyType};
pub use player::{Hack, PlayerState, Reload};

use crate::config::{HIT_IFRAMES, PLAYER_MAX_HEALTH, PLAYER_SIZE, PLAYER_SPEED};
use crate::types::{AgentId, Faction, Point};
use crate::utils::tick_down;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Active,
    Dead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostileState {
    pub enemy_type: EnemyType,
    pub ai: AiState,
    pub home: Point, // Patrol waypoints are picked around this point
    pub last_seen: Option<Point>,
    pub attack_cooldown: f64,
    pub reinforcements_called: bool, // Boss only; set once the threshold fires
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentKind {
    Player(PlayerState),
    Hostile(HostileState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageResult {
    Ignored,
    Hurt,
    Killed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: Point,
    pub facing: f64, // Degrees
    pub health: f64,
    pub max_health: f64,
    pub speed: f64,
    pub size: f64, // Collision radius
    pub faction: Faction,
    pub lifecycle: Lifecycle,
    pub invulnerable: f64, // Seconds of i-frames left
    pub kind: AgentKind,
}

impl Agent {
    pub fn new_player(id: AgentId, position: Point) -> Self {
        Agent {
            id,
            position,
            facing: 0.0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            speed: PLAYER_SPEED,
            size: PLAYER_SIZE,
            faction: Faction::Player,
            lifecycle: Lifecycle::Active,
            invulnerable: 0.0,
            kind: AgentKind::Player(PlayerState::new()),
        }
    }

    pub fn new_hostile(id: AgentId, enemy_type: EnemyType, position: Point) -> Self {
        let stats = enemy_type.stats();
        Agent {
            id,
            position,
            facing: 0.0,
            health: stats.max_health,
            max_health: stats.max_health,
            speed: stats.speed,
            size: stats.size,
            faction: Faction::Hostile,
            lifecycle: Lifecycle::Active,
            invulnerable: 0.0,
            kind: AgentKind::Hostile(HostileState {
                enemy_type,
                ai: AiState::default(),
                home: position,
                last_seen: None,
                attack_cooldown: 0.0,
                reinforcements_called: false,
            }),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, AgentKind::Player(_))
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.kind {
            AgentKind::Player(p) => Some(p),
            AgentKind::Hostile(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            AgentKind::Player(p) => Some(p),
            AgentKind::Hostile(_) => None,
        }
    }

    pub fn as_hostile(&self) -> Option<&HostileState> {
        match &self.kind {
            AgentKind::Hostile(h) => Some(h),
            AgentKind::Player(_) => None,
        }
    }

    pub fn as_hostile_mut(&mut self) -> Option<&mut HostileState> {
        match &mut self.kind {
            AgentKind::Hostile(h) => Some(h),
            AgentKind::Player(_) => None,
        }
    }

    pub fn ai_state(&self) -> Option<&AiState> {
        self.as_hostile().map(|h| &h.ai)
    }

    pub fn enemy_type(&self) -> Option<EnemyType> {
        self.as_hostile().map(|h| h.enemy_type)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Hits during i-frames are ignored entirely.
    pub fn apply_damage(&mut self, amount: f64) -> DamageResult {
        if !self.is_alive() || self.is_invulnerable() || amount <= 0.0 {
            return DamageResult::Ignored;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        if self.health <= 0.0 {
            self.lifecycle = Lifecycle::Dead;
            return DamageResult::Killed;
        }
        if let Some(player) = self.as_player_mut() {
            player.mark_combat();
            self.invulnerable = HIT_IFRAMES;
        }
        DamageResult::Hurt
    }

    pub fn heal(&mut self, amount: f64) {
        if self.is_alive() {
            self.health = (self.health + amount).clamp(0.0, self.max_health);
        }
    }

    /// Forces death regardless of i-frames (suffocation, debug kills).
    pub fn kill(&mut self) {
        self.health = 0.0;
        self.lifecycle = Lifecycle::Dead;
    }

    pub fn tick_invulnerability(&mut self, dt: f64) {
        tick_down(&mut self.invulnerable, dt);
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_damage_kills_at_zero() {
        let mut crawler = Agent::new_hostile(3, EnemyType::Crawler, Point::ZERO);
        assert_eq!(crawler.apply_damage(25.0), DamageResult::Hurt);
        assert_approx_eq!(crawler.health, 5.0);
        assert!(crawler.is_alive());
        assert_eq!(crawler.apply_damage(25.0), DamageResult::Killed);
        assert_approx_eq!(crawler.health, 0.0);
        assert_eq!(crawler.lifecycle, Lifecycle::Dead);
        assert_eq!(crawler.apply_damage(25.0), DamageResult::Ignored);
    }

    #[test]
    fn test_player_iframes_ignore_damage() {
        let mut player = Agent::new_player(1, Point::ZERO);
        assert_eq!(player.apply_damage(10.0), DamageResult::Hurt);
        assert!(player.is_invulnerable());
        assert_eq!(player.apply_damage(50.0), DamageResult::Ignored);
        assert_approx_eq!(player.health, 90.0);
        player.tick_invulnerability(HIT_IFRAMES);
        assert_eq!(player.apply_damage(5.0), DamageResult::Hurt);
        assert_approx_eq!(player.health, 85.0);
    }

    #[test]
    fn test_heal_capped() {
        let mut player = Agent::new_player(1, Point::ZERO);
        player.health = 50.0;
        player.heal(500.0);
        assert_approx_eq!(player.health, PLAYER_MAX_HEALTH);
    }
}
