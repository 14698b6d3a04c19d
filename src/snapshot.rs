use crate::agent::{AiState, EnemyType};
use crate::level::{Room, Tile};
use crate::pickup::{PickupKind, PropKind};
use crate::resources::ActivityTier;
use crate::types::{AgentId, EntityId, Faction, Point, TileCoord};
use crate::visibility::LightingMode;
use crate::weapon::{AmmoType, WeaponId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Combat,
    Suffocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    InProgress,
    Defeated { cause: DeathCause },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockMethod {
    Key,
    Hack,
}

/// Things that happened during a tick, for audio and UI to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Damaged { target: EntityId, amount: f64 },
    Killed { target: AgentId, enemy_type: Option<EnemyType> },
    PropDestroyed { prop: EntityId, kind: PropKind },
    Explosion { position: Point, radius: f64 },
    PickupCollected { kind: PickupKind, amount: u32 },
    LootDropped { kind: PickupKind, position: Point },
    DoorUnlocked { coord: TileCoord, method: UnlockMethod },
    HackStarted { coord: TileCoord },
    HackCancelled { coord: TileCoord },
    ReloadStarted { weapon: WeaponId },
    ReloadComplete { weapon: WeaponId, rounds: u32 },
    WeaponSwitched { weapon: WeaponId },
    DryFire { weapon: WeaponId },
    FlashlightToggled { on: bool },
    FlashlightDepleted,
    Dodged,
    Reinforcements { boss: AgentId, count: usize },
    FloorChanged { floor: u32 },
    PlayerDefeated { cause: DeathCause },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub position: Point,
    pub facing: f64,
    pub health: f64,
    pub max_health: f64,
    pub size: f64,
    pub faction: Faction,
    pub enemy_type: Option<EnemyType>,
    pub ai_state: Option<AiState>,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub position: Point,
    pub velocity: Point,
    pub faction: Faction,
    pub explosive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupView {
    pub id: EntityId,
    pub position: Point,
    pub kind: PickupKind,
    pub amount: u32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropView {
    pub id: EntityId,
    pub position: Point,
    pub kind: PropKind,
    pub health: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceValues {
    pub health: f64,
    pub max_health: f64,
    pub oxygen: f64,
    pub max_oxygen: f64,
    pub battery: f64,
    pub max_battery: f64,
    pub stamina: f64,
    pub max_stamina: f64,
    pub flashlight_on: bool,
    pub equipped: WeaponId,
    pub magazine: u32,
    pub ammo: BTreeMap<AmmoType, u32>,
    pub keys: u32,
    pub activity: ActivityTier,
    pub reload_progress: Option<f64>,
    pub hack_progress: Option<f64>,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorView {
    pub coord: TileCoord,
    pub locked: bool,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelState {
    pub floor: u32,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>, // Row-major, `width` per row
    pub rooms: Vec<Room>,
    pub exit: Point,
    pub exit_sealed: bool, // A boss is still alive on this floor
    pub doors: Vec<DoorView>,
    pub lighting: LightingMode,
    pub life_support_modifier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub time: f64,
    pub outcome: Outcome,
    pub player_id: AgentId,
    pub agents: Vec<AgentView>,
    pub projectiles: Vec<ProjectileView>,
    pub pickups: Vec<PickupView>,
    pub props: Vec<PropView>,
    pub visible_tiles: Vec<TileCoord>,
    pub visibility_polygon: Vec<Point>,
    pub resources: ResourceValues,
    pub level: LevelState,
    pub events: Vec<SimEvent>,
}

impl LevelState {
    /// Tile at `coord`; anything off the grid reads as wall.
    pub fn tile(&self, coord: TileCoord) -> Tile {
        if coord.x < 0 || coord.y < 0 || coord.x >= self.width || coord.y >= self.height {
            return Tile::Wall;
        }
        self.tiles
            .get((coord.y * self.width + coord.x) as usize)
            .copied()
            .unwrap_or(Tile::Wall)
    }
}

impl Snapshot {
    pub fn agent(&self, id: AgentId) -> Option<&AgentView> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn player(&self) -> Option<&AgentView> {
        self.agent(self.player_id)
    }

    pub fn hostiles(&self) -> impl Iterator<Item = &AgentView> {
        self.agents.iter().filter(|a| a.faction == Faction::Hostile)
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }
}
