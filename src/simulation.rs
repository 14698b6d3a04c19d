use crate::agent::ai::{Perception, has_arrived, pick_waypoint};
use crate::agent::{Agent, AiState, EnemyType, Hack};
use crate::combat::Projectile;
use crate::config::*;
use crate::error::SimError;
use crate::input::{ActionFlags, InputState};
use crate::level::{Level, LevelParams, generate_level};
use crate::pickup::{Pickup, Prop};
use crate::resources::{ActivityTier, apply_resource_tick};
use crate::snapshot::*;
use crate::types::{AgentId, EntityId, Faction, Point};
use crate::visibility::{ConeParams, LightingMode, VisibilityField, compute_visibility};
use crate::weapon::WeaponId;
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub settings: SimSettings,
    pub tick: u64,
    pub time: f64,
    pub level: Level,
    pub agents: Vec<Agent>,
    pub player_id: AgentId,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub props: Vec<Prop>,
    pub next_id: EntityId,
    pub rng: ChaCha8Rng,
    pub outcome: Outcome,
    pub previous_actions: ActionFlags,
    pub lighting: LightingMode,
    pub visibility: VisibilityField,
    pub events: Vec<SimEvent>,
}

impl SimulationState {
    /// Generates the starting floor and places a fresh player on it.
    pub fn new(settings: SimSettings) -> Result<Self, SimError> {
        if settings.start_floor == 0 {
            return Err(SimError::InvalidFloor(0));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let level = generate_level(&level_params(&settings, settings.start_floor), &mut rng)?;

        let player_id = 1;
        let mut state = SimulationState {
            settings,
            tick: 0,
            time: 0.0,
            agents: vec![Agent::new_player(player_id, level.player_spawn)],
            level,
            player_id,
            projectiles: Vec::new(),
            pickups: Vec::new(),
            props: Vec::new(),
            next_id: player_id + 1,
            rng,
            outcome: Outcome::InProgress,
            previous_actions: ActionFlags::default(),
            lighting: LightingMode::Ambient,
            visibility: VisibilityField::default(),
            events: Vec::new(),
        };
        let level = state.level.clone();
        state.load_level(level);
        Ok(state)
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    pub fn player_index(&self) -> Option<usize> {
        self.agents.iter().position(|a| a.id == self.player_id)
    }

    pub fn player(&self) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == self.player_id)
    }

    pub fn player_mut(&mut self) -> Option<&mut Agent> {
        let id = self.player_id;
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// A boss is alive on this floor; the exit stays sealed until it dies.
    pub fn boss_alive(&self) -> bool {
        self.agents
            .iter()
            .any(|a| a.is_alive() && a.enemy_type() == Some(EnemyType::Boss))
    }

    pub(crate) fn defeat(&mut self, cause: DeathCause) {
        if self.is_over() {
            return;
        }
        self.outcome = Outcome::Defeated { cause };
        self.events.push(SimEvent::PlayerDefeated { cause });
        info!(target: "sim", "Player defeated on floor {} at tick {} ({:?})", self.level.floor_index, self.tick, cause);
    }

    /// Swaps in a new level, carrying the player over to its spawn.
    pub(crate) fn load_level(&mut self, level: Level) {
        let player_id = self.player_id;
        self.agents.retain(|a| a.id == player_id);
        self.projectiles.clear();
        self.pickups.clear();
        self.props.clear();

        if let Some(player) = self.player_mut() {
            player.position = level.player_spawn;
            if let Some(state) = player.as_player_mut() {
                state.hack = None;
                state.reload = None;
            }
        }

        for spawn in &level.enemy_spawns {
            let id = self.allocate_id();
            self.agents
                .push(Agent::new_hostile(id, spawn.enemy_type, spawn.position));
        }
        for spawn in &level.pickup_spawns {
            let id = self.allocate_id();
            self.pickups.push(Pickup {
                id,
                position: spawn.position,
                kind: spawn.kind,
                amount: spawn.amount,
            });
        }
        for spawn in &level.prop_spawns {
            let id = self.allocate_id();
            self.props.push(Prop::new(id, spawn.kind, spawn.position));
        }

        self.level = level;
        self.refresh_visibility();
    }

    /// Generates and enters `floor`, carrying the player over.
    pub(crate) fn enter_floor(&mut self, floor: u32) -> Result<(), SimError> {
        if floor == 0 {
            return Err(SimError::InvalidFloor(floor));
        }
        let level = generate_level(&level_params(&self.settings, floor), &mut self.rng)?;
        self.load_level(level);
        self.events.push(SimEvent::FloorChanged { floor });
        info!(target: "sim", "Entered floor {} at tick {}", floor, self.tick);
        Ok(())
    }

    // Phase 1: facing, dodge, movement and pickup collection
    fn update_player_movement(&mut self, dt: f64, input: &InputState, pressed: &ActionFlags) {
        let Some(index) = self.player_index() else {
            return;
        };
        let movement = input.movement();
        let player = &mut self.agents[index];
        if player.position.distance(&input.aim_point) > f64::EPSILON {
            player.facing = player.position.angle_to(&input.aim_point);
        }
        let facing = player.facing;

        let mut dodged = false;
        if let Some(state) = player.as_player_mut() {
            if pressed.dodge && !state.is_dodging() && state.stamina >= DODGE_STAMINA_COST {
                state.stamina -= DODGE_STAMINA_COST;
                state.dodge_timer = DODGE_DURATION;
                state.cancel_reload();
                dodged = true;
            }
        }
        if dodged {
            player.invulnerable = player.invulnerable.max(DODGE_DURATION);
            self.events.push(SimEvent::Dodged);
        }

        let player = &mut self.agents[index];
        let Some(state) = player.as_player() else {
            return;
        };
        let (direction, multiplier) = if state.is_dodging() {
            let direction = if movement == Point::ZERO {
                Point::ZERO.offset(facing, 1.0)
            } else {
                movement
            };
            (direction, DODGE_SPEED_MULTIPLIER)
        } else if input.actions.sprint && movement != Point::ZERO && state.stamina > 0.0 {
            (movement, SPRINT_MULTIPLIER)
        } else {
            (movement, 1.0)
        };

        if direction != Point::ZERO {
            let delta = direction.scale(player.speed * multiplier * dt);
            player.position = self.level.move_with_collision(player.position, delta, player.size);
        }

        self.collect_pickups(index);
    }

    fn collect_pickups(&mut self, index: usize) {
        let position = self.agents[index].position;
        let mut i = 0;
        while i < self.pickups.len() {
            let pickup = self.pickups[i];
            if pickup.position.distance(&position) <= PICKUP_RADIUS
                && pickup.apply_to(&mut self.agents[index])
            {
                self.pickups.swap_remove(i);
                self.events.push(SimEvent::PickupCollected {
                    kind: pickup.kind,
                    amount: pickup.amount,
                });
                crate::debug_resource!(self.player_id, self.tick; "Collected {:?} x{}", pickup.kind, pickup.amount);
            } else {
                i += 1;
            }
        }
    }

    // Phase 2: flashlight, weapon switch, reload, melee, fire, interact
    fn update_player_actions(&mut self, dt: f64, input: &InputState, pressed: &ActionFlags) {
        let Some(index) = self.player_index() else {
            return;
        };
        let held = input.actions;
        let Some(state) = self.agents[index].as_player_mut() else {
            return;
        };
        let mut events = Vec::new();

        if pressed.toggle_flashlight {
            if state.flashlight_on {
                state.flashlight_on = false;
                events.push(SimEvent::FlashlightToggled { on: false });
            } else if state.battery > 0.0 {
                state.flashlight_on = true;
                events.push(SimEvent::FlashlightToggled { on: true });
            }
        }

        if pressed.cycle_weapon {
            let before = state.equipped;
            let weapon = state.cycle_weapon();
            if weapon != before {
                events.push(SimEvent::WeaponSwitched { weapon });
            }
        }

        if pressed.reload && !state.is_reloading() && state.start_reload() {
            events.push(SimEvent::ReloadStarted {
                weapon: state.equipped,
            });
        }
        if let Some(reload) = state.reload {
            if let Some(rounds) = state.advance_reload(dt) {
                events.push(SimEvent::ReloadComplete {
                    weapon: reload.weapon,
                    rounds,
                });
            }
        }

        let knife = WeaponId::Knife.def();
        let swing = pressed.melee && state.melee_cooldown <= 0.0;
        if swing {
            state.melee_cooldown = knife.cooldown;
            state.mark_combat();
        }

        // Held fire repeats on the cooldown; an empty magazine never fires
        let mut shot = None;
        if held.fire && state.fire_cooldown <= 0.0 && !state.is_reloading() {
            let weapon = state.equipped_weapon();
            if state.consume_round() {
                state.fire_cooldown = weapon.cooldown;
                state.mark_combat();
                shot = Some(weapon);
            } else if state.start_reload() {
                events.push(SimEvent::ReloadStarted { weapon: weapon.id });
            } else if pressed.fire {
                events.push(SimEvent::DryFire { weapon: weapon.id });
            }
        }

        self.events.extend(events);
        if swing {
            self.resolve_melee(index, knife);
        }
        if let Some(weapon) = shot {
            let facing = self.agents[index].facing;
            self.fire_weapon(index, weapon, facing);
        }
        self.update_interaction(index, dt, held.interact, pressed.interact);
    }

    /// Keys open a locked door instantly; without one, holding interact runs
    /// a timed hack that is cancelled by letting go or walking away.
    fn update_interaction(&mut self, index: usize, dt: f64, held: bool, pressed: bool) {
        let position = self.agents[index].position;
        let Some(state) = self.agents[index].as_player_mut() else {
            return;
        };

        if let Some(mut hack) = state.hack {
            let door_center = Level::tile_center(hack.door);
            let still_locked = self.level.door_at(hack.door).is_some_and(|d| d.locked);
            if !held || !still_locked || position.distance(&door_center) > INTERACT_RANGE {
                state.hack = None;
                self.events.push(SimEvent::HackCancelled { coord: hack.door });
                crate::debug_resource!(self.player_id, self.tick; "Hack on {:?} cancelled", hack.door);
                return;
            }
            hack.remaining -= dt;
            if hack.remaining <= 0.0 {
                state.hack = None;
                self.level.unlock_door(hack.door);
                self.events.push(SimEvent::DoorUnlocked {
                    coord: hack.door,
                    method: UnlockMethod::Hack,
                });
                info!(target: "sim", "Door at ({}, {}) hacked open", hack.door.x, hack.door.y);
            } else {
                state.hack = Some(hack);
            }
            return;
        }

        if !pressed {
            return;
        }
        // Nothing to interact with is a silent no-op
        let Some(door) = self.level.nearest_locked_door(position, INTERACT_RANGE) else {
            return;
        };
        if state.keys > 0 {
            state.keys -= 1;
            self.level.unlock_door(door);
            self.events.push(SimEvent::DoorUnlocked {
                coord: door,
                method: UnlockMethod::Key,
            });
        } else {
            state.hack = Some(Hack {
                door,
                remaining: HACK_DURATION,
            });
            self.events.push(SimEvent::HackStarted { coord: door });
        }
    }

    // Phase 3: every hostile perceives, transitions, moves and attacks
    fn update_hostiles(&mut self, dt: f64) {
        let Some(player_index) = self.player_index() else {
            return;
        };

        for i in 0..self.agents.len() {
            if self.is_over() {
                return;
            }
            let agent = &self.agents[i];
            let Some(hostile) = agent.as_hostile() else {
                continue;
            };
            if !agent.is_alive() {
                continue;
            }
            let player = &self.agents[player_index];
            let (player_id, player_position, player_size) = (player.id, player.position, player.size);
            let stats = hostile.enemy_type.stats();
            let (id, position, facing, size, speed) =
                (agent.id, agent.position, agent.facing, agent.size, agent.speed);

            let cone = ConeParams::cone(stats.detection_range, stats.view_cone_deg);
            let distance = position.distance(&player_position);
            let sees_player = distance <= cone.reach()
                && compute_visibility(&self.level, position, facing, &cone, &[(player_id, player_position)])
                    .sees_entity(player_id);
            let last_seen = if sees_player {
                Some(player_position)
            } else {
                hostile.last_seen
            };
            let perception = Perception {
                sees_player,
                player_position,
                distance,
                last_seen,
            };

            let previous = hostile.ai;
            let mut next = previous.next(&perception, stats.attack_range, dt);
            if next.name() != previous.name() {
                crate::debug_ai!(id, self.tick; "{} -> {} (distance {:.0})", previous.name(), next.name(), distance);
            }

            // Movement target and pace for the new state
            let mut target = None;
            let mut pace = speed;
            match &mut next {
                AiState::Patrol { waypoint } => {
                    let wp = match *waypoint {
                        Some(wp) if !has_arrived(position, wp) => wp,
                        _ => pick_waypoint(&self.level, hostile.home, position, size, &mut self.rng),
                    };
                    *waypoint = Some(wp);
                    target = Some(wp);
                    pace = speed * PATROL_SPEED_FACTOR;
                }
                AiState::Alert { last_known, .. } => {
                    if !has_arrived(position, *last_known) {
                        target = Some(*last_known);
                    }
                }
                AiState::Chase => {
                    if distance > size + player_size {
                        target = Some(player_position);
                    }
                }
                AiState::Attack => {}
            }

            let mut new_position = position;
            let mut new_facing = facing;
            if let Some(target) = target {
                let travel = (pace * dt).min(position.distance(&target));
                if travel > 0.0 {
                    let angle = position.angle_to(&target);
                    new_position = self
                        .level
                        .move_with_collision(position, Point::ZERO.offset(angle, travel), size);
                    new_facing = angle;
                }
                // Blocked patrols pick a fresh waypoint next tick
                if let AiState::Patrol { waypoint } = &mut next {
                    if new_position.distance(&position) < 1e-6 {
                        *waypoint = None;
                    }
                }
            }
            if next.is_engaged() {
                new_facing = new_position.angle_to(&player_position);
            }

            let agent = &mut self.agents[i];
            agent.position = new_position;
            agent.facing = new_facing;
            let mut attack = None;
            if let Some(hostile) = agent.as_hostile_mut() {
                hostile.ai = next;
                hostile.last_seen = last_seen;
                crate::utils::tick_down(&mut hostile.attack_cooldown, dt);
                if next == AiState::Attack && hostile.attack_cooldown <= 0.0 {
                    let in_melee = stats
                        .melee
                        .map(|w| new_position.distance(&player_position) <= w.def().range + player_size)
                        .unwrap_or(false);
                    attack = if in_melee { stats.melee } else { stats.ranged };
                    if let Some(weapon) = attack {
                        hostile.attack_cooldown = weapon.def().cooldown;
                    }
                }
            }

            if let Some(weapon) = attack {
                let weapon = weapon.def();
                if weapon.is_melee() {
                    self.resolve_melee(i, weapon);
                } else {
                    self.fire_weapon(i, weapon, new_facing);
                }
            }

            self.check_reinforcements(i);
        }
    }

    /// Fires the boss's one-time reinforcement call once its health drops to
    /// the enrage threshold. The flag on the agent keeps it to once per life.
    fn check_reinforcements(&mut self, index: usize) {
        let agent = &self.agents[index];
        let Some(hostile) = agent.as_hostile() else {
            return;
        };
        if hostile.enemy_type != EnemyType::Boss
            || hostile.reinforcements_called
            || !agent.is_alive()
            || agent.health_fraction() > BOSS_ENRAGE_FRACTION
        {
            return;
        }
        let (boss_id, position, size) = (agent.id, agent.position, agent.size);
        if let Some(hostile) = self.agents[index].as_hostile_mut() {
            hostile.reinforcements_called = true;
        }

        let crawler_size = EnemyType::Crawler.stats().size;
        let mut spawned = 0;
        for k in 0..8 {
            if spawned >= BOSS_REINFORCEMENTS {
                break;
            }
            let spot = position.offset(k as f64 * 45.0, size + crawler_size + TILE_SIZE * 0.5);
            if !self.level.can_occupy(spot, crawler_size) || !self.level.line_of_sight(position, spot) {
                continue;
            }
            let id = self.allocate_id();
            self.agents.push(Agent::new_hostile(id, EnemyType::Crawler, spot));
            spawned += 1;
        }
        self.events.push(SimEvent::Reinforcements {
            boss: boss_id,
            count: spawned,
        });
        info!(target: "sim", "Boss {} called {} reinforcements", boss_id, spawned);
    }

    // Phase 5: oxygen, battery, stamina and the timers behind them
    fn update_resources(&mut self, dt: f64, input: &InputState) {
        let modifier = self.level.life_support_modifier;
        let Some(player) = self.player_mut() else {
            return;
        };
        let Some(state) = player.as_player_mut() else {
            return;
        };
        let tier = ActivityTier::classify(input.is_moving(), input.actions.sprint, state);
        let report = apply_resource_tick(state, tier, modifier, dt);
        state.tick_timers(dt);
        player.tick_invulnerability(dt);

        if report.flashlight_depleted {
            self.events.push(SimEvent::FlashlightDepleted);
            crate::debug_resource!(self.player_id, self.tick; "Battery flat, flashlight off");
        }
        if report.suffocated {
            if let Some(player) = self.player_mut() {
                player.kill();
            }
            self.defeat(DeathCause::Suffocation);
        }
    }

    // Phase 6: lighting mode, the player's visibility field, door animation
    pub(crate) fn refresh_visibility(&mut self) {
        let Some(player) = self.player() else {
            return;
        };
        let flashlight_on = player.as_player().is_some_and(|p| p.flashlight_on);
        let (origin, facing) = (player.position, player.facing);
        let lighting = LightingMode::select(&self.level, origin, flashlight_on);

        let mut candidates: Vec<(EntityId, Point)> = self
            .agents
            .iter()
            .filter(|a| a.is_alive() && a.faction == Faction::Hostile)
            .map(|a| (a.id, a.position))
            .collect();
        candidates.extend(self.pickups.iter().map(|p| (p.id, p.position)));
        candidates.extend(self.props.iter().map(|p| (p.id, p.position)));

        self.visibility = compute_visibility(&self.level, origin, facing, &lighting.cone(), &candidates);
        if lighting != self.lighting {
            crate::debug_vision!(self.player_id, self.tick; "Lighting {:?} -> {:?}", self.lighting, lighting);
        }
        self.lighting = lighting;

        let occupants: Vec<Point> = self
            .agents
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| a.position)
            .collect();
        self.level.update_door_states(&occupants);
    }

    /// Reaching the exit marker moves the run to the next floor, unless a
    /// boss is still guarding it.
    fn check_exit(&mut self) -> Result<(), SimError> {
        let Some(player) = self.player() else {
            return Err(SimError::PlayerMissing);
        };
        if !self.level.is_at_exit(player.position) || self.boss_alive() {
            return Ok(());
        }
        let next = self.level.floor_index + 1;
        self.enter_floor(next)
    }

    pub fn snapshot(&self) -> Snapshot {
        let fallback;
        let player = match self.player() {
            Some(player) => player,
            None => {
                fallback = Agent::new_player(self.player_id, Point::ZERO);
                &fallback
            }
        };
        let player_state = player.as_player();

        let agents = self
            .agents
            .iter()
            .filter(|a| a.is_alive() || a.is_player())
            .map(|a| AgentView {
                id: a.id,
                position: a.position,
                facing: a.facing,
                health: a.health,
                max_health: a.max_health,
                size: a.size,
                faction: a.faction,
                enemy_type: a.enemy_type(),
                ai_state: a.ai_state().copied(),
                visible: a.is_player() || self.visibility.sees_entity(a.id),
            })
            .collect();

        let resources = match player_state {
            Some(p) => ResourceValues {
                health: player.health,
                max_health: player.max_health,
                oxygen: p.oxygen,
                max_oxygen: p.max_oxygen,
                battery: p.battery,
                max_battery: p.max_battery,
                stamina: p.stamina,
                max_stamina: p.max_stamina,
                flashlight_on: p.flashlight_on,
                equipped: p.equipped,
                magazine: p.magazine(p.equipped),
                ammo: p.ammo.clone(),
                keys: p.keys,
                activity: p.activity,
                reload_progress: p.reload_progress(),
                hack_progress: p.hack_progress(),
                invulnerable: player.is_invulnerable(),
            },
            None => ResourceValues {
                health: player.health,
                max_health: player.max_health,
                oxygen: 0.0,
                max_oxygen: MAX_OXYGEN,
                battery: 0.0,
                max_battery: MAX_BATTERY,
                stamina: 0.0,
                max_stamina: MAX_STAMINA,
                flashlight_on: false,
                equipped: WeaponId::Pistol,
                magazine: 0,
                ammo: Default::default(),
                keys: 0,
                activity: ActivityTier::Idle,
                reload_progress: None,
                hack_progress: None,
                invulnerable: false,
            },
        };

        let doors = self
            .level
            .doors
            .iter()
            .filter_map(|coord| {
                self.level.door_at(*coord).map(|door| DoorView {
                    coord: *coord,
                    locked: door.locked,
                    open: door.open,
                })
            })
            .collect();

        Snapshot {
            tick: self.tick,
            time: self.time,
            outcome: self.outcome,
            player_id: self.player_id,
            agents,
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    position: p.position,
                    velocity: p.velocity,
                    faction: p.faction,
                    explosive: p.is_explosive(),
                })
                .collect(),
            pickups: self
                .pickups
                .iter()
                .map(|p| PickupView {
                    id: p.id,
                    position: p.position,
                    kind: p.kind,
                    amount: p.amount,
                    visible: self.visibility.sees_entity(p.id),
                })
                .collect(),
            props: self
                .props
                .iter()
                .map(|p| PropView {
                    id: p.id,
                    position: p.position,
                    kind: p.kind,
                    health: p.health,
                    visible: self.visibility.sees_entity(p.id),
                })
                .collect(),
            visible_tiles: self.visibility.tiles.iter().copied().collect(),
            visibility_polygon: self.visibility.polygon.clone(),
            resources,
            level: LevelState {
                floor: self.level.floor_index,
                width: self.level.width,
                height: self.level.height,
                tiles: self.level.tiles.clone(),
                rooms: self.level.rooms.clone(),
                exit: self.level.exit,
                exit_sealed: self.boss_alive(),
                doors,
                lighting: self.lighting,
                life_support_modifier: self.level.life_support_modifier,
            },
            events: self.events.clone(),
        }
    }
}

pub(crate) fn level_params(settings: &SimSettings, floor: u32) -> LevelParams {
    LevelParams {
        floor_index: floor,
        room_target: settings.room_target,
        width: settings.level_width,
        height: settings.level_height,
    }
}

/// Owner of a run. All mutation goes through [`Simulation::step`] (and the
/// debug interface); rendering reads [`Simulation::snapshot`].
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) state: SimulationState,
}

impl Simulation {
    pub fn new(settings: SimSettings) -> Result<Self, SimError> {
        let state = SimulationState::new(settings)?;
        info!(
            target: "sim",
            "Simulation started: seed {:#x}, floor {}, {} hostiles",
            settings.seed,
            state.level.floor_index,
            state.agents.len().saturating_sub(1)
        );
        Ok(Simulation { state })
    }

    /// Resumes from a previously exported state.
    pub fn from_state(state: SimulationState) -> Result<Self, SimError> {
        if state.player().is_none() {
            return Err(SimError::PlayerMissing);
        }
        Ok(Simulation { state })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn into_state(self) -> SimulationState {
        self.state
    }

    pub fn level(&self) -> &Level {
        &self.state.level
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome
    }

    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn player(&self) -> Option<&Agent> {
        self.state.player()
    }

    pub fn visibility(&self) -> &VisibilityField {
        &self.state.visibility
    }

    /// Advances the run by one tick. A no-op once the run is over.
    pub fn step(&mut self, dt: f64, input: &InputState) -> Result<(), SimError> {
        let state = &mut self.state;
        if state.is_over() {
            return Ok(());
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, state.settings.max_delta_time)
        } else {
            warn!(target: "sim", "Non-finite delta time {} ignored", dt);
            0.0
        };
        state.tick += 1;
        state.time += dt;
        state.events.clear();

        let pressed = input.actions.pressed_since(&state.previous_actions);
        state.previous_actions = input.actions;

        state.update_player_movement(dt, input, &pressed);
        state.update_player_actions(dt, input, &pressed);
        state.reap_dead();
        if !state.is_over() {
            state.update_hostiles(dt);
            state.reap_dead();
        }
        if !state.is_over() {
            state.update_projectiles(dt);
            state.reap_dead();
        }
        if !state.is_over() {
            state.update_resources(dt, input);
        }
        state.refresh_visibility();

        if !state.is_over() {
            state.check_exit()?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }
}
