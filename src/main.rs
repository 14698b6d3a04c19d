use clap::Parser;
use darkdeck::config::{self, SimSettings};
use darkdeck::level::Level;
use darkdeck::snapshot::{LevelState, SimEvent, Snapshot};
use darkdeck::{ActionFlags, InputState, Point, Simulation, TileCoord, logging};
use log::{LevelFilter, error, info};
use std::collections::{HashMap, VecDeque};
use std::process::ExitCode;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for level generation and every other random roll.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Floor to start on (1-based).
    #[arg(long, default_value_t = 1)]
    floor: u32,

    /// Target number of rooms per floor.
    #[arg(long, default_value_t = config::DEFAULT_ROOM_TARGET)]
    rooms: usize,

    /// Level width in tiles.
    #[arg(long, default_value_t = config::LEVEL_WIDTH_TILES)]
    width: i32,

    /// Level height in tiles.
    #[arg(long, default_value_t = config::LEVEL_HEIGHT_TILES)]
    height: i32,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Seconds per tick.
    #[arg(long, default_value_t = config::DEFAULT_TICK_SECONDS)]
    dt: f64,

    /// Debug filter to specify log topics (e.g., "ai,combat")
    /// Available topics: level, vision, ai, combat, resource, sim
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    if let Err(e) = logging::init_logger(log_level, args.debug_filter.clone()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    let settings = SimSettings {
        seed: args.seed,
        start_floor: args.floor,
        room_target: args.rooms,
        level_width: args.width,
        level_height: args.height,
        ..Default::default()
    };

    match run(&args, settings) {
        Ok(snapshot) => {
            if args.json {
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize snapshot: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs the simulation headless with a simple autopilot: walk the shortest
/// tile path to the exit, shooting whatever hostile is in view.
fn run(args: &Args, settings: SimSettings) -> Result<Snapshot, darkdeck::SimError> {
    info!("Initializing Darkdeck (seed {:#x})...", settings.seed);
    let mut sim = Simulation::new(settings)?;
    let mut pilot = Autopilot::default();

    for _ in 0..args.ticks {
        let snapshot = sim.snapshot();
        if snapshot.is_over() {
            break;
        }
        let input = pilot.next_input(&snapshot);
        sim.step(args.dt, &input)?;

        for event in &sim.snapshot().events {
            match event {
                SimEvent::FloorChanged { floor } => info!("Reached floor {}", floor),
                SimEvent::Killed { target, enemy_type: Some(kind) } => {
                    info!("Killed {:?} #{}", kind, target)
                }
                SimEvent::PlayerDefeated { cause } => info!("Player defeated: {:?}", cause),
                _ => {}
            }
        }
    }

    let snapshot = sim.snapshot();
    let r = &snapshot.resources;
    info!(
        "Finished at tick {} on floor {}: {:?}, health {:.0}, oxygen {:.1}, battery {:.1}",
        snapshot.tick, snapshot.level.floor, snapshot.outcome, r.health, r.oxygen, r.battery
    );
    Ok(snapshot)
}

#[derive(Debug, Default)]
struct Autopilot {
    path: Vec<TileCoord>,
    floor: u32,
    fired_last_tick: bool,
    interacted_last_tick: bool,
}

impl Autopilot {
    fn next_input(&mut self, snapshot: &Snapshot) -> InputState {
        let Some(player) = snapshot.player() else {
            return InputState::default();
        };
        let level = &snapshot.level;
        if self.floor != snapshot.level.floor || self.path.is_empty() {
            self.floor = snapshot.level.floor;
            self.path = shortest_path(
                level,
                Level::world_to_tile(player.position),
                Level::world_to_tile(level.exit),
            );
        }

        let here = Level::world_to_tile(player.position);
        while self.path.first().is_some_and(|t| *t == here) {
            self.path.remove(0);
        }
        let waypoint = self
            .path
            .first()
            .map(|t| Level::tile_center(*t))
            .unwrap_or(level.exit);
        let move_vector = Point::new(waypoint.x - player.position.x, waypoint.y - player.position.y)
            .clamp_length(1.0);

        let target = snapshot
            .hostiles()
            .filter(|h| h.visible)
            .min_by(|a, b| {
                a.position
                    .distance(&player.position)
                    .total_cmp(&b.position.distance(&player.position))
            });

        // Release the trigger every other tick so an empty magazine reloads
        let fire = target.is_some() && !self.fired_last_tick;
        self.fired_last_tick = fire;
        // Pulse interact until a hack is underway, then hold it
        let interact = snapshot.resources.hack_progress.is_some() || !self.interacted_last_tick;
        self.interacted_last_tick = interact;
        InputState {
            move_vector,
            aim_point: target.map(|t| t.position).unwrap_or(waypoint),
            actions: ActionFlags {
                fire,
                interact,
                ..Default::default()
            },
        }
    }
}

/// Breadth-first tile path, treating locked doors as passable so the pilot
/// walks up to them and hacks them open.
fn shortest_path(level: &LevelState, from: TileCoord, to: TileCoord) -> Vec<TileCoord> {
    let mut previous: HashMap<TileCoord, TileCoord> = HashMap::new();
    let mut queue = VecDeque::from([from]);
    previous.insert(from, from);

    while let Some(tile) = queue.pop_front() {
        if tile == to {
            break;
        }
        for next in tile.neighbors() {
            let passable = level.tile(next).is_door() || !level.tile(next).blocks_movement();
            if passable && !previous.contains_key(&next) {
                previous.insert(next, tile);
                queue.push_back(next);
            }
        }
    }

    let mut path = Vec::new();
    let mut current = to;
    while current != from {
        path.push(current);
        match previous.get(&current) {
            Some(prev) => current = *prev,
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_snapshot_reaches_exit() {
        let sim = Simulation::new(SimSettings::default()).expect("simulation");
        let snapshot = sim.snapshot();
        let from = Level::world_to_tile(snapshot.player().expect("player").position);
        let to = Level::world_to_tile(snapshot.level.exit);

        let path = shortest_path(&snapshot.level, from, to);
        assert_eq!(path.last(), Some(&to));
        let mut previous = from;
        for tile in path {
            assert!(previous.neighbors().contains(&tile));
            previous = tile;
        }
    }

    #[test]
    fn test_autopilot_heads_for_exit() {
        let mut sim = Simulation::new(SimSettings::default()).expect("simulation");
        sim.debug_load_level(Level::open_room(20, 10, 1));
        let mut pilot = Autopilot::default();
        let input = pilot.next_input(&sim.snapshot());
        // Exit is in the far bottom-right corner of the room
        assert!(input.move_vector.x > 0.0 || input.move_vector.y > 0.0);
        assert!(!input.actions.fire);
    }
}
