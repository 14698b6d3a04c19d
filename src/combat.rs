use crate::agent::{Agent, DamageResult};
use crate::config::*;
use crate::pickup::{Pickup, PickupKind, PropKind};
use crate::simulation::SimulationState;
use crate::snapshot::{DeathCause, SimEvent};
use crate::types::{AgentId, EntityId, Faction, Point};
use crate::utils::within_arc;
use crate::weapon::Weapon;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: AgentId,
    pub faction: Faction,
    pub position: Point,
    pub velocity: Point, // World units per second
    pub damage: f64,
    pub remaining_life: f64,
    pub explosion_radius: f64, // Zero for plain rounds
}

impl Projectile {
    pub fn is_explosive(&self) -> bool {
        self.explosion_radius > 0.0
    }
}

// What a projectile ran into during one tick of flight
#[derive(Debug, Clone, Copy, PartialEq)]
enum Impact {
    Wall(Point),
    Agent(usize, Point),
    Prop(usize, Point),
    Expired(Point),
}

/// Linear falloff: full damage at the centre, nothing at the edge.
pub fn falloff_damage(damage: f64, radius: f64, distance: f64) -> f64 {
    if radius <= 0.0 || distance > radius {
        return 0.0;
    }
    (damage * (1.0 - distance / radius)).max(0.0)
}

/// Range plus target size, inside the facing tolerance.
pub fn in_melee_arc(attacker: &Agent, weapon: &Weapon, target: Point, target_size: f64) -> bool {
    let distance = attacker.position.distance(&target);
    if distance > weapon.range + target_size {
        return false;
    }
    // Overlapping targets cannot be behind anyone
    if distance <= f64::EPSILON {
        return true;
    }
    within_arc(
        attacker.facing,
        weapon.facing_tolerance_deg,
        attacker.position.angle_to(&target),
    )
}

/// Indices of opposed agents caught by one swing, each at most once.
pub fn melee_targets(attacker: &Agent, weapon: &Weapon, agents: &[Agent]) -> Vec<usize> {
    agents
        .iter()
        .enumerate()
        .filter(|(_, target)| {
            target.id != attacker.id
                && target.is_alive()
                && attacker.faction.is_opposed(target.faction)
                && in_melee_arc(attacker, weapon, target.position, target.size)
        })
        .map(|(i, _)| i)
        .collect()
}

pub fn pellet_angles<R: Rng>(aim_deg: f64, weapon: &Weapon, rng: &mut R) -> Vec<f64> {
    let half = weapon.spread_deg / 2.0;
    (0..weapon.pellet_count.max(1))
        .map(|_| {
            let offset = if half > 0.0 { rng.gen_range(-half..=half) } else { 0.0 };
            (aim_deg + offset).rem_euclid(360.0)
        })
        .collect()
}

impl SimulationState {
    pub(crate) fn damage_agent(&mut self, index: usize, amount: f64) -> DamageResult {
        let tick = self.tick;
        let Some(agent) = self.agents.get_mut(index) else {
            return DamageResult::Ignored;
        };
        let result = agent.apply_damage(amount);
        let (id, position, enemy_type, is_player) =
            (agent.id, agent.position, agent.enemy_type(), agent.is_player());

        match result {
            DamageResult::Ignored => {}
            DamageResult::Hurt => {
                crate::debug_combat!(id, tick; "Took {:.1} damage", amount);
                self.events.push(SimEvent::Damaged { target: id, amount });
            }
            DamageResult::Killed => {
                self.events.push(SimEvent::Damaged { target: id, amount });
                self.events.push(SimEvent::Killed {
                    target: id,
                    enemy_type,
                });
                if is_player {
                    self.defeat(DeathCause::Combat);
                } else {
                    crate::debug_combat!(id, tick; "{:?} killed", enemy_type);
                    self.drop_loot(position, LOOT_DROP_CHANCE);
                }
            }
        }
        result
    }

    pub(crate) fn damage_prop(&mut self, index: usize, amount: f64) {
        let Some(prop) = self.props.get_mut(index) else {
            return;
        };
        if !prop.apply_damage(amount) {
            return;
        }
        let (id, kind, position) = (prop.id, prop.kind, prop.position);
        self.events.push(SimEvent::PropDestroyed { prop: id, kind });
        match kind {
            PropKind::Crate => self.drop_loot(position, CRATE_LOOT_CHANCE),
            PropKind::ExplosiveBarrel => {
                self.explode(position, BARREL_EXPLOSION_RADIUS, BARREL_EXPLOSION_DAMAGE)
            }
        }
    }

    // Shooter included; chained barrels resolve from a queue
    pub(crate) fn explode(&mut self, center: Point, radius: f64, damage: f64) {
        let mut pending = vec![(center, radius, damage)];
        while let Some((center, radius, damage)) = pending.pop() {
            crate::debug_combat!(
                "Explosion at ({:.1}, {:.1}) radius {:.0} damage {:.0}",
                center.x,
                center.y,
                radius,
                damage
            );
            self.events.push(SimEvent::Explosion {
                position: center,
                radius,
            });

            for i in 0..self.agents.len() {
                if !self.agents[i].is_alive() {
                    continue;
                }
                let distance = self.agents[i].position.distance(&center);
                let amount = falloff_damage(damage, radius, distance);
                if amount > 0.0 {
                    self.damage_agent(i, amount);
                }
            }

            for i in 0..self.props.len() {
                let prop = self.props[i];
                if prop.is_destroyed() {
                    continue;
                }
                let distance = prop.position.distance(&center);
                let amount = falloff_damage(damage, radius, distance);
                if amount <= 0.0 || !self.props[i].apply_damage(amount) {
                    continue;
                }
                self.events.push(SimEvent::PropDestroyed {
                    prop: prop.id,
                    kind: prop.kind,
                });
                match prop.kind {
                    PropKind::Crate => self.drop_loot(prop.position, CRATE_LOOT_CHANCE),
                    PropKind::ExplosiveBarrel => pending.push((
                        prop.position,
                        BARREL_EXPLOSION_RADIUS,
                        BARREL_EXPLOSION_DAMAGE,
                    )),
                }
            }
        }
    }

    pub(crate) fn drop_loot(&mut self, position: Point, chance: f64) {
        if !self.rng.gen_bool(chance.clamp(0.0, 1.0)) {
            return;
        }
        let kind = PickupKind::random_loot(&mut self.rng);
        let id = self.allocate_id();
        self.pickups.push(Pickup {
            id,
            position,
            kind,
            amount: kind.default_amount(),
        });
        self.events.push(SimEvent::LootDropped { kind, position });
    }

    /// One swing; returns the number of agents and props hit.
    pub(crate) fn resolve_melee(&mut self, attacker: usize, weapon: &Weapon) -> usize {
        let Some(actor) = self.agents.get(attacker).cloned() else {
            return 0;
        };
        let targets = melee_targets(&actor, weapon, &self.agents);
        let mut hits = 0;

        for index in targets {
            if self.damage_agent(index, weapon.damage) == DamageResult::Ignored {
                continue;
            }
            hits += 1;
            let target = &self.agents[index];
            if target.is_alive() {
                let angle = actor.position.angle_to(&target.position);
                let push = Point::ZERO.offset(angle, KNOCKBACK_DISTANCE);
                let moved = self
                    .level
                    .move_with_collision(target.position, push, target.size);
                self.agents[index].position = moved;
            }
        }

        if actor.is_player() {
            for i in 0..self.props.len() {
                let prop = self.props[i];
                if !prop.is_destroyed() && in_melee_arc(&actor, weapon, prop.position, prop.size()) {
                    hits += 1;
                    self.damage_prop(i, weapon.damage);
                }
            }
        }

        crate::debug_combat!(actor.id, self.tick; "{} swing hit {}", weapon.name, hits);
        hits
    }

    pub(crate) fn fire_weapon(&mut self, shooter: usize, weapon: &Weapon, aim_deg: f64) {
        let Some(actor) = self.agents.get(shooter) else {
            return;
        };
        let (owner, faction, origin, size) = (actor.id, actor.faction, actor.position, actor.size);
        let angles = pellet_angles(aim_deg, weapon, &mut self.rng);

        for angle in angles {
            let id = self.allocate_id();
            self.projectiles.push(Projectile {
                id,
                owner,
                faction,
                position: origin.offset(angle, size * MUZZLE_OFFSET),
                velocity: Point::ZERO.offset(angle, weapon.muzzle_speed),
                damage: weapon.damage,
                remaining_life: weapon.projectile_life,
                explosion_radius: weapon.explosion_radius,
            });
        }
        crate::debug_combat!(owner, self.tick; "Fired {} ({} pellets) at {:.1} deg", weapon.name, weapon.pellet_count, aim_deg);
    }

    // Sub-stepped so fast rounds cannot skip over walls or small targets
    fn trace_projectile(&self, projectile: &mut Projectile, dt: f64) -> Option<Impact> {
        let travel = projectile.velocity.scale(dt);
        let sub_steps = (travel.length() / MAX_PROJECTILE_SUB_STEP).ceil().max(1.0) as usize;
        let step = travel.scale(1.0 / sub_steps as f64);

        for _ in 0..sub_steps {
            let next = projectile.position.add(step);
            if self.level.blocks_movement_at(next) {
                return Some(Impact::Wall(projectile.position));
            }
            projectile.position = next;

            // Player rounds only connect with what the player can see
            let player_shot = projectile.faction == Faction::Player;
            let hit_agent = self.agents.iter().position(|agent| {
                agent.is_alive()
                    && projectile.faction.is_opposed(agent.faction)
                    && agent.position.distance(&next) <= agent.size + PROJECTILE_RADIUS
                    && (!player_shot || self.visibility.sees_entity(agent.id))
            });
            if let Some(index) = hit_agent {
                return Some(Impact::Agent(index, next));
            }
            let hit_prop = self.props.iter().position(|prop| {
                !prop.is_destroyed()
                    && prop.position.distance(&next) <= prop.size() + PROJECTILE_RADIUS
                    && (!player_shot || self.visibility.sees_entity(prop.id))
            });
            if let Some(index) = hit_prop {
                return Some(Impact::Prop(index, next));
            }
        }

        projectile.remaining_life -= dt;
        if projectile.remaining_life <= 0.0 {
            return Some(Impact::Expired(projectile.position));
        }
        None
    }

    pub(crate) fn update_projectiles(&mut self, dt: f64) {
        let mut i = 0;
        while i < self.projectiles.len() {
            let mut projectile = self.projectiles[i];
            let impact = self.trace_projectile(&mut projectile, dt);
            self.projectiles[i] = projectile;

            let Some(impact) = impact else {
                i += 1;
                continue;
            };
            self.projectiles.swap_remove(i);

            match impact {
                Impact::Wall(point) | Impact::Expired(point) => {
                    if projectile.is_explosive() {
                        self.explode(point, projectile.explosion_radius, projectile.damage);
                    }
                }
                Impact::Agent(index, point) => {
                    if projectile.is_explosive() {
                        self.explode(point, projectile.explosion_radius, projectile.damage);
                    } else {
                        self.damage_agent(index, projectile.damage);
                    }
                }
                Impact::Prop(index, point) => {
                    if projectile.is_explosive() {
                        self.explode(point, projectile.explosion_radius, projectile.damage);
                    } else {
                        self.damage_prop(index, projectile.damage);
                    }
                }
            }

            if self.is_over() {
                return;
            }
        }
    }

    // The dead player stays so the final state can be read
    pub(crate) fn reap_dead(&mut self) {
        self.agents.retain(|agent| agent.is_alive() || agent.is_player());
        self.props.retain(|prop| !prop.is_destroyed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::EnemyType;
    use crate::weapon::WeaponId;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_falloff_is_linear() {
        assert_approx_eq!(falloff_damage(60.0, 90.0, 0.0), 60.0);
        assert_approx_eq!(falloff_damage(60.0, 90.0, 45.0), 30.0);
        assert_approx_eq!(falloff_damage(60.0, 90.0, 90.0), 0.0);
        assert_approx_eq!(falloff_damage(60.0, 90.0, 120.0), 0.0);
    }

    #[test]
    fn test_melee_hits_ahead_not_behind() {
        let knife = WeaponId::Knife.def();
        let mut player = Agent::new_player(1, Point::new(100.0, 100.0));
        player.facing = 0.0;
        let ahead = Agent::new_hostile(2, EnemyType::Crawler, Point::new(140.0, 100.0));
        let behind = Agent::new_hostile(3, EnemyType::Crawler, Point::new(60.0, 100.0));
        let agents = vec![player.clone(), ahead, behind];
        assert_eq!(melee_targets(&player, knife, &agents), vec![1]);
    }

    #[test]
    fn test_melee_ignores_own_faction() {
        let claws = WeaponId::Claws.def();
        let crawler = Agent::new_hostile(2, EnemyType::Crawler, Point::new(100.0, 100.0));
        let friend = Agent::new_hostile(3, EnemyType::Crawler, Point::new(110.0, 100.0));
        let player = Agent::new_player(1, Point::new(90.0, 100.0));
        let mut attacker = crawler.clone();
        attacker.facing = 180.0;
        let agents = vec![crawler, friend, player];
        assert_eq!(melee_targets(&attacker, claws, &agents), vec![2]);
    }

    #[test]
    fn test_pellet_spread_bounds() {
        let shotgun = WeaponId::Shotgun.def();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let angles = pellet_angles(90.0, shotgun, &mut rng);
        assert_eq!(angles.len(), shotgun.pellet_count as usize);
        for angle in angles {
            assert!((angle - 90.0).abs() <= shotgun.spread_deg / 2.0 + 1e-9);
        }
        let single = pellet_angles(10.0, WeaponId::Knife.def(), &mut rng);
        assert_eq!(single, vec![10.0]);
    }
}
