use crate::agent::{Agent, AiState, EnemyType};
use crate::error::SimError;
use crate::level::Level;
use crate::pickup::{Pickup, PickupKind, Prop, PropKind};
use crate::simulation::{Simulation, SimulationState};
use crate::types::{AgentId, EntityId, Point};
use crate::weapon::{AmmoType, WeaponId};
use log::info;
use serde::{Deserialize, Serialize};

/// Values to force onto the player. `None` leaves a value untouched;
/// everything set is clamped to its valid range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceOverrides {
    pub health: Option<f64>,
    pub oxygen: Option<f64>,
    pub battery: Option<f64>,
    pub stamina: Option<f64>,
    pub flashlight_on: Option<bool>,
    pub keys: Option<u32>,
    pub magazine: Option<u32>, // Rounds in the equipped weapon
    pub ammo: Vec<(AmmoType, u32)>,
    pub weapons: Vec<WeaponId>,
}

impl Simulation {
    pub fn debug_force_resources(&mut self, overrides: &ResourceOverrides) -> Result<(), SimError> {
        let player = self.state.player_mut().ok_or(SimError::PlayerMissing)?;
        if let Some(health) = overrides.health {
            player.health = health.clamp(0.0, player.max_health);
        }
        let state = player.as_player_mut().ok_or(SimError::PlayerMissing)?;
        if let Some(oxygen) = overrides.oxygen {
            state.oxygen = oxygen.clamp(0.0, state.max_oxygen);
        }
        if let Some(battery) = overrides.battery {
            state.battery = battery.clamp(0.0, state.max_battery);
        }
        if let Some(stamina) = overrides.stamina {
            state.stamina = stamina.clamp(0.0, state.max_stamina);
        }
        if let Some(on) = overrides.flashlight_on {
            state.flashlight_on = on && state.battery > 0.0;
        }
        if let Some(keys) = overrides.keys {
            state.keys = keys;
        }
        for weapon in &overrides.weapons {
            state.give_weapon(*weapon);
        }
        for (ammo_type, amount) in &overrides.ammo {
            state.ammo.insert(*ammo_type, *amount);
        }
        if let Some(rounds) = overrides.magazine {
            let weapon = state.equipped_weapon();
            if weapon.uses_ammo() {
                state.magazines.insert(weapon.id, rounds.min(weapon.magazine_size));
            }
        }
        self.state.refresh_visibility();
        Ok(())
    }

    /// Moves an agent, pushed back inside the level bounds. Walls are not
    /// checked: teleporting into one is allowed for testing collision.
    pub fn debug_teleport(&mut self, id: AgentId, position: Point) -> Result<(), SimError> {
        let level = &self.state.level;
        let agent = self
            .state
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SimError::UnknownAgent(id))?;
        agent.position = level.clamp_to_bounds(position, agent.size);
        self.state.refresh_visibility();
        Ok(())
    }

    pub fn debug_set_facing(&mut self, id: AgentId, facing_deg: f64) -> Result<(), SimError> {
        let agent = self.state.agent_mut(id).ok_or(SimError::UnknownAgent(id))?;
        agent.facing = facing_deg.rem_euclid(360.0);
        self.state.refresh_visibility();
        Ok(())
    }

    /// Sets health directly. Zero kills the agent, bypassing i-frames.
    pub fn debug_set_health(&mut self, id: AgentId, health: f64) -> Result<(), SimError> {
        let agent = self.state.agent_mut(id).ok_or(SimError::UnknownAgent(id))?;
        if health <= 0.0 {
            agent.kill();
        } else {
            agent.health = health.min(agent.max_health);
        }
        Ok(())
    }

    pub fn debug_spawn_hostile(&mut self, enemy_type: EnemyType, position: Point) -> AgentId {
        let id = self.state.allocate_id();
        self.state.agents.push(Agent::new_hostile(id, enemy_type, position));
        self.state.refresh_visibility();
        crate::debug_ai!(id, self.state.tick; "Spawned {:?} at ({:.0}, {:.0})", enemy_type, position.x, position.y);
        id
    }

    pub fn debug_remove_hostile(&mut self, id: AgentId) -> Result<(), SimError> {
        let index = self
            .state
            .agents
            .iter()
            .position(|a| a.id == id && !a.is_player())
            .ok_or(SimError::UnknownAgent(id))?;
        self.state.agents.remove(index);
        self.state.refresh_visibility();
        Ok(())
    }

    /// Removes every hostile; returns how many were removed.
    pub fn debug_clear_hostiles(&mut self) -> usize {
        let before = self.state.agents.len();
        self.state.agents.retain(|a| a.is_player());
        self.state.refresh_visibility();
        before - self.state.agents.len()
    }

    pub fn debug_spawn_pickup(&mut self, kind: PickupKind, amount: u32, position: Point) -> EntityId {
        let id = self.state.allocate_id();
        self.state.pickups.push(Pickup {
            id,
            position,
            kind,
            amount,
        });
        self.state.refresh_visibility();
        id
    }

    pub fn debug_spawn_prop(&mut self, kind: PropKind, position: Point) -> EntityId {
        let id = self.state.allocate_id();
        self.state.props.push(Prop::new(id, kind, position));
        self.state.refresh_visibility();
        id
    }

    /// Overrides a hostile's AI state; it transitions normally from there.
    pub fn debug_set_ai_state(&mut self, id: AgentId, ai: AiState) -> Result<(), SimError> {
        let hostile = self
            .state
            .agent_mut(id)
            .and_then(|a| a.as_hostile_mut())
            .ok_or(SimError::UnknownAgent(id))?;
        hostile.ai = ai;
        Ok(())
    }

    /// Jumps straight to `floor`, generating it from the run's RNG.
    pub fn debug_skip_to_floor(&mut self, floor: u32) -> Result<(), SimError> {
        info!(target: "sim", "Debug skip to floor {}", floor);
        self.state.enter_floor(floor)
    }

    /// Replaces the current level with a hand-built one, keeping the player.
    pub fn debug_load_level(&mut self, level: Level) {
        self.state.load_level(level);
    }

    pub fn export_state(&self) -> SimulationState {
        self.state.clone()
    }

    pub fn export_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    pub fn import_json(json: &str) -> Result<Simulation, SimError> {
        let state: SimulationState = serde_json::from_str(json)?;
        Simulation::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimSettings;
    use crate::input::InputState;
    use assert_approx_eq::assert_approx_eq;

    fn sandbox() -> Simulation {
        let mut sim = Simulation::new(SimSettings::default()).expect("simulation");
        sim.debug_load_level(Level::open_room(24, 16, 1));
        sim
    }

    #[test]
    fn test_force_resources_clamped() {
        let mut sim = sandbox();
        sim.debug_force_resources(&ResourceOverrides {
            oxygen: Some(500.0),
            battery: Some(-3.0),
            magazine: Some(99),
            ..Default::default()
        })
        .expect("force");
        let resources = sim.snapshot().resources;
        assert_approx_eq!(resources.oxygen, resources.max_oxygen);
        assert_approx_eq!(resources.battery, 0.0);
        assert_eq!(resources.magazine, WeaponId::Pistol.def().magazine_size);
    }

    #[test]
    fn test_spawn_and_remove_hostiles() {
        let mut sim = sandbox();
        let spawn = sim.level().player_spawn;
        let a = sim.debug_spawn_hostile(EnemyType::Crawler, spawn.add(Point::new(64.0, 0.0)));
        sim.debug_spawn_hostile(EnemyType::Brute, spawn.add(Point::new(-64.0, 0.0)));
        assert_eq!(sim.snapshot().hostiles().count(), 2);

        sim.debug_remove_hostile(a).expect("remove");
        assert_eq!(sim.snapshot().hostiles().count(), 1);
        assert!(matches!(sim.debug_remove_hostile(a), Err(SimError::UnknownAgent(_))));
        let player_id = sim.state().player_id;
        assert!(sim.debug_remove_hostile(player_id).is_err());
        assert_eq!(sim.debug_clear_hostiles(), 1);
    }

    #[test]
    fn test_set_ai_state() {
        let mut sim = sandbox();
        let spawn = sim.level().player_spawn;
        let id = sim.debug_spawn_hostile(EnemyType::Spitter, spawn.add(Point::new(0.0, 96.0)));
        sim.debug_set_ai_state(id, AiState::Chase).expect("set");
        assert_eq!(sim.state().agent(id).and_then(|a| a.ai_state()), Some(&AiState::Chase));
    }

    #[test]
    fn test_json_round_trip_continues_identically() {
        let mut sim = Simulation::new(SimSettings::default()).expect("simulation");
        let input = InputState {
            move_vector: Point::new(1.0, 0.3),
            ..Default::default()
        };
        for _ in 0..30 {
            sim.step(1.0 / 60.0, &input).expect("step");
        }
        let json = sim.export_json().expect("export");
        let mut restored = Simulation::import_json(&json).expect("import");

        for _ in 0..120 {
            sim.step(1.0 / 60.0, &input).expect("step");
            restored.step(1.0 / 60.0, &input).expect("step");
        }
        assert_eq!(sim.snapshot(), restored.snapshot());
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            Simulation::import_json("{\"tick\": 3}"),
            Err(SimError::Serialization(_))
        ));
    }

    #[test]
    fn test_skip_to_floor() {
        let mut sim = sandbox();
        sim.debug_skip_to_floor(3).expect("skip");
        assert_eq!(sim.level().floor_index, 3);
        assert!(sim.debug_skip_to_floor(0).is_err());
    }
}
