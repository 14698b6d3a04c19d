//! End-to-end scenarios driven through the public step/snapshot API.

use darkdeck::agent::{AiState, EnemyType};
use darkdeck::config::{SimSettings, TILE_SIZE};
use darkdeck::level::Level;
use darkdeck::snapshot::SimEvent;
use darkdeck::weapon::AmmoType;
use darkdeck::{ActionFlags, InputState, Point, ResourceOverrides, Simulation};

const DT: f64 = 1.0 / 60.0;

/// A simulation parked in an empty lit room with no hostiles.
fn sandbox() -> Simulation {
    let mut sim = Simulation::new(SimSettings::default()).unwrap();
    sim.debug_load_level(Level::open_room(30, 20, 1));
    sim
}

fn aim_at(target: Point, melee: bool) -> InputState {
    InputState {
        aim_point: target,
        actions: ActionFlags {
            melee,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn melee_swings_kill_crawler() {
    let mut sim = sandbox();
    let spawn = sim.level().player_spawn;
    let crawler = sim.debug_spawn_hostile(EnemyType::Crawler, spawn.add(Point::new(40.0, 0.0)));

    sim.step(DT, &aim_at(spawn.add(Point::new(40.0, 0.0)), true)).unwrap();
    let snapshot = sim.snapshot();
    let view = snapshot.agent(crawler).unwrap();
    assert!((view.health - 5.0).abs() < 1e-9, "health after one swing: {}", view.health);

    // Let go and wait out the knife cooldown, tracking the crawler
    for _ in 0..30 {
        let target = sim.snapshot().agent(crawler).unwrap().position;
        sim.step(DT, &aim_at(target, false)).unwrap();
    }
    let target = sim.snapshot().agent(crawler).unwrap().position;
    sim.step(DT, &aim_at(target, true)).unwrap();

    let snapshot = sim.snapshot();
    assert!(snapshot.agent(crawler).is_none());
    assert!(snapshot.events.iter().any(|e| matches!(
        e,
        SimEvent::Killed {
            enemy_type: Some(EnemyType::Crawler),
            ..
        }
    )));
}

#[test]
fn melee_misses_target_behind() {
    let mut sim = sandbox();
    let spawn = sim.level().player_spawn;
    let crawler = sim.debug_spawn_hostile(EnemyType::Crawler, spawn.add(Point::new(-40.0, 0.0)));

    sim.step(DT, &aim_at(spawn.add(Point::new(100.0, 0.0)), true)).unwrap();
    let view = sim.snapshot().agent(crawler).cloned().unwrap();
    assert!((view.health - view.max_health).abs() < 1e-9);
}

#[test]
fn crawler_detection_boundary() {
    let range = EnemyType::Crawler.stats().detection_range;
    assert!((range - TILE_SIZE * 7.0).abs() < 1e-9);

    let mut far = sandbox();
    let spawn = far.level().player_spawn;
    let id = far.debug_spawn_hostile(EnemyType::Crawler, spawn.add(Point::new(range + 1.0, 0.0)));
    far.step(DT, &InputState::default()).unwrap();
    let state = far.snapshot().agent(id).and_then(|a| a.ai_state);
    assert!(matches!(state, Some(AiState::Patrol { .. })), "got {:?}", state);

    let mut near = sandbox();
    let id = near.debug_spawn_hostile(EnemyType::Crawler, spawn.add(Point::new(range - 1.0, 0.0)));
    near.step(DT, &InputState::default()).unwrap();
    assert_eq!(near.snapshot().agent(id).and_then(|a| a.ai_state), Some(AiState::Chase));
}

#[test]
fn sprinting_burns_more_oxygen_than_idling() {
    let ticks = (10.0 / DT).round() as usize;

    let mut idle = sandbox();
    for _ in 0..ticks {
        idle.step(DT, &InputState::default()).unwrap();
    }

    let mut sprint = sandbox();
    let run = InputState {
        move_vector: Point::new(1.0, 0.0),
        actions: ActionFlags {
            sprint: true,
            ..Default::default()
        },
        ..Default::default()
    };
    for _ in 0..ticks {
        sprint.step(DT, &run).unwrap();
    }

    let idle_oxygen = idle.snapshot().resources.oxygen;
    let sprint_oxygen = sprint.snapshot().resources.oxygen;
    assert!((idle_oxygen - 95.0).abs() < 0.05, "idle oxygen {}", idle_oxygen);
    assert!(sprint_oxygen < idle_oxygen);
}

#[test]
fn empty_weapon_fire_is_a_noop() {
    let mut sim = sandbox();
    let spawn = sim.level().player_spawn;
    let crawler = sim.debug_spawn_hostile(EnemyType::Crawler, spawn.add(Point::new(200.0, 0.0)));
    sim.debug_force_resources(&ResourceOverrides {
        magazine: Some(0),
        ammo: vec![(AmmoType::Pistol, 0)],
        ..Default::default()
    })
    .unwrap();

    let fire = InputState {
        aim_point: spawn.add(Point::new(200.0, 0.0)),
        actions: ActionFlags {
            fire: true,
            ..Default::default()
        },
        ..Default::default()
    };
    sim.step(DT, &fire).unwrap();
    let snapshot = sim.snapshot();
    assert!(snapshot.projectiles.is_empty());
    assert!(snapshot.events.iter().any(|e| matches!(e, SimEvent::DryFire { .. })));
    assert_eq!(snapshot.player().unwrap().position, spawn);
    let view = snapshot.agent(crawler).unwrap();
    assert!((view.health - view.max_health).abs() < 1e-9);
    assert_eq!(snapshot.resources.magazine, 0);
}

#[test]
fn same_seed_same_run() {
    let input = InputState {
        move_vector: Point::new(0.4, 1.0),
        aim_point: Point::new(0.0, 0.0),
        actions: ActionFlags {
            fire: true,
            ..Default::default()
        },
    };
    let mut a = Simulation::new(SimSettings::default()).unwrap();
    let mut b = Simulation::new(SimSettings::default()).unwrap();
    for _ in 0..300 {
        a.step(DT, &input).unwrap();
        b.step(DT, &input).unwrap();
    }
    assert_eq!(a.snapshot(), b.snapshot());
}
