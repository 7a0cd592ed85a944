//! Fixed timestep simulation tick
//!
//! One call to [`Systems::update`] advances the session by one step. Stage
//! order matters and must not change:
//!
//! 1. rebuild the broad phase from every live entity
//! 2. enemies pursue the player
//! 3. projectiles fly and expire
//! 4. the player is pushed out of the arena walls
//! 5. overlapping pairs are resolved through the interaction table
//! 6. dead entities are pruned

use std::collections::HashSet;

use glam::Vec3;

use super::collision::{Aabb, Collider, resolve_world_sphere, sphere_sphere};
use super::spatial::SpatialHash;
use super::state::{Entity, EntityId, EntityKind, EntityTag, GameState};
use crate::consts::DIRECTION_EPSILON;
use crate::events::GameEvent;
use crate::settings::{RuleTuning, SimConfig};

/// Outcome of an overlapping pair, keyed by the sorted pair of tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Player collects a pickup
    Collect,
    /// Projectile destroys an enemy (and itself)
    Kill,
    /// Enemy deals contact damage to the player
    Contact,
}

/// Interaction for an unordered pair of tags, if any
pub fn interaction(a: EntityTag, b: EntityTag) -> Option<Interaction> {
    let pair = if a <= b { (a, b) } else { (b, a) };
    match pair {
        (EntityTag::Player, EntityTag::Pickup) => Some(Interaction::Collect),
        (EntityTag::Enemy, EntityTag::Projectile) => Some(Interaction::Kill),
        (EntityTag::Player, EntityTag::Enemy) => Some(Interaction::Contact),
        _ => None,
    }
}

/// Per-tick systems pipeline
///
/// Owns the broad-phase grid and the static world bounds. The grid is
/// cleared and refilled every tick, so nothing in it outlives a tick.
#[derive(Debug, Clone)]
pub struct Systems {
    hash: SpatialHash,
    world_bounds: Vec<Aabb>,
    rules: RuleTuning,
}

impl Systems {
    pub fn new(world_bounds: Vec<Aabb>) -> Self {
        Self::with_config(world_bounds, &SimConfig::default())
    }

    /// Build the pipeline around `world_bounds`. Every supplied bound is
    /// treated as static world geometry, whatever its flag says.
    pub fn with_config(world_bounds: Vec<Aabb>, config: &SimConfig) -> Self {
        let world_bounds: Vec<Aabb> = world_bounds
            .into_iter()
            .map(|b| Aabb { is_static: true, ..b })
            .collect();
        log::debug!(
            "Systems: {} world bounds, cell size {}",
            world_bounds.len(),
            config.cell_size
        );
        Self {
            hash: SpatialHash::new(config.cell_size),
            world_bounds,
            rules: config.rules.clone(),
        }
    }

    pub fn world_bounds(&self) -> &[Aabb] {
        &self.world_bounds
    }

    /// Advance the session by one fixed step
    ///
    /// # Panics
    /// If no player is registered.
    pub fn update(&mut self, state: &mut GameState, dt: f32) {
        state.advance_tick();

        self.rebuild_hash(state);

        let player_pos = player(state).pos;
        for enemy in state.iter_mut().filter(|e| e.alive) {
            if let EntityKind::Enemy { speed, .. } = enemy.kind {
                pursue(enemy, player_pos, speed, dt);
            }
        }
        for projectile in state.iter_mut().filter(|e| e.alive) {
            fly(projectile, dt);
        }

        self.resolve_player_bounds(state);
        self.resolve_interactions(state);

        let pruned = state.prune_dead();
        if pruned > 0 {
            log::trace!("Tick {}: pruned {} entities", state.tick_count(), pruned);
        }
    }

    fn rebuild_hash(&mut self, state: &GameState) {
        self.hash.clear();
        for entity in state.iter().filter(|e| e.alive) {
            self.hash.insert(Collider::sphere(entity.id, entity.sphere()));
        }
    }

    fn resolve_player_bounds(&self, state: &mut GameState) {
        let player_id = player(state).id;
        if let Some(p) = state.get_mut(player_id) {
            let mut sphere = p.sphere();
            if resolve_world_sphere(&mut sphere, &self.world_bounds) {
                p.pos = sphere.center;
            }
        }
    }

    fn resolve_interactions(&self, state: &mut GameState) {
        // Each unordered pair resolves at most once per tick
        let mut resolved: HashSet<(EntityId, EntityId)> = HashSet::new();

        for a_id in state.ids() {
            let Some(a) = state.get(a_id).filter(|e| e.alive) else {
                continue;
            };
            let query = Collider::sphere(a_id, a.sphere());
            let candidates: Vec<EntityId> = self
                .hash
                .query_near(&query)
                .into_iter()
                .map(|c| c.entity)
                .filter(|&id| id != a_id)
                .collect();

            for b_id in candidates {
                let pair = (a_id.min(b_id), a_id.max(b_id));
                if resolved.contains(&pair) {
                    continue;
                }
                // A may have died against an earlier candidate
                let (Some(a), Some(b)) = (state.get(a_id), state.get(b_id)) else {
                    continue;
                };
                if !a.alive || !b.alive || !sphere_sphere(&a.sphere(), &b.sphere()) {
                    continue;
                }
                let Some(rule) = interaction(a.tag(), b.tag()) else {
                    continue;
                };
                resolved.insert(pair);
                self.apply(state, rule, a_id, b_id);
            }
        }
    }

    fn apply(&self, state: &mut GameState, rule: Interaction, a_id: EntityId, b_id: EntityId) {
        match rule {
            Interaction::Collect => {
                let pickup = pick(state, a_id, b_id, EntityTag::Pickup);
                kill(state, pickup);
                let total = state.add_score(self.rules.pickup_score);
                log::debug!("Pickup #{} collected, score {}", pickup, total);
                state.bus_mut().emit(GameEvent::Pickup { id: pickup });
                state.bus_mut().emit(GameEvent::Score {
                    delta: self.rules.pickup_score,
                    total,
                });
            }
            Interaction::Kill => {
                kill(state, a_id);
                kill(state, b_id);
                let total = state.add_score(self.rules.kill_score);
                log::debug!("Enemy destroyed, score {}", total);
                state.bus_mut().emit(GameEvent::Score {
                    delta: self.rules.kill_score,
                    total,
                });
            }
            Interaction::Contact => {
                let before = state.hp();
                state.set_hp(before - self.rules.contact_damage);
                let hp = state.hp();
                if hp == 0 && before > 0 {
                    log::info!("Player out of hit points at tick {}", state.tick_count());
                }
                state.bus_mut().emit(GameEvent::Hit { hp });
            }
        }
    }
}

/// The registered player
fn player(state: &GameState) -> &Entity {
    match state.player() {
        Some(p) => p,
        None => panic!("simulation tick without a registered player"),
    }
}

/// Whichever of the pair carries `tag`
fn pick(state: &GameState, a: EntityId, b: EntityId, tag: EntityTag) -> EntityId {
    match state.get(a) {
        Some(e) if e.tag() == tag => a,
        _ => b,
    }
}

fn kill(state: &mut GameState, id: EntityId) {
    if let Some(e) = state.get_mut(id) {
        e.alive = false;
    }
}

/// Move an enemy toward the player on the ground plane
fn pursue(enemy: &mut Entity, target: Vec3, speed: f32, dt: f32) {
    let mut to_target = target - enemy.pos;
    to_target.y = 0.0;
    let dist = to_target.length();
    if dist > DIRECTION_EPSILON {
        enemy.pos += to_target / dist * speed * dt;
    }
}

/// Integrate a projectile and count down its lifetime
fn fly(projectile: &mut Entity, dt: f32) {
    if let EntityKind::Projectile { velocity, ttl, .. } = &mut projectile.kind {
        projectile.pos += *velocity * dt;
        *ttl -= dt;
        if *ttl <= 0.0 {
            projectile.alive = false;
        }
    }
}
