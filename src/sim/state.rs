//! Entity registry and session state
//!
//! `GameState` owns every live entity plus score, hit points and the event
//! bus. It is the single simulation context handed to each system.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Sphere;
use crate::consts::MAX_HP;
use crate::events::EventBus;

/// Entity identity, assigned from 1 upward and never reused
pub type EntityId = u32;

/// Opaque handle to whatever the renderer draws for an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

/// Variant tag, ordered so interaction lookups can key on a sorted pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    Player,
    Enemy,
    Pickup,
    Projectile,
}

/// Variant-specific entity data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Player { speed: f32, radius: f32 },
    Enemy { speed: f32, radius: f32 },
    Pickup { radius: f32 },
    Projectile { velocity: Vec3, radius: f32, ttl: f32 },
}

impl EntityKind {
    pub fn tag(&self) -> EntityTag {
        match self {
            EntityKind::Player { .. } => EntityTag::Player,
            EntityKind::Enemy { .. } => EntityTag::Enemy,
            EntityKind::Pickup { .. } => EntityTag::Pickup,
            EntityKind::Projectile { .. } => EntityTag::Projectile,
        }
    }

    /// Collision radius
    pub fn radius(&self) -> f32 {
        match *self {
            EntityKind::Player { radius, .. }
            | EntityKind::Enemy { radius, .. }
            | EntityKind::Pickup { radius }
            | EntityKind::Projectile { radius, .. } => radius,
        }
    }
}

/// Everything a spawner provides; identity and liveness are assigned on add
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDesc {
    pub kind: EntityKind,
    pub pos: Vec3,
    pub render: RenderHandle,
}

/// A simulated actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// World position. Written only by the simulation.
    pub pos: Vec3,
    /// False means pending removal at the end of the tick
    pub alive: bool,
    pub render: RenderHandle,
}

impl Entity {
    #[inline]
    pub fn tag(&self) -> EntityTag {
        self.kind.tag()
    }

    /// Current bounding sphere
    #[inline]
    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.pos, self.kind.radius())
    }
}

/// Session state: entity registry, score, hit points, events
#[derive(Debug)]
pub struct GameState {
    /// Live entities keyed by id (iterated in id order for reproducibility)
    entities: BTreeMap<EntityId, Entity>,
    player_id: Option<EntityId>,
    score: u64,
    hp: i32,
    max_hp: i32,
    time_ticks: u64,
    bus: EventBus,
    next_id: EntityId,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::with_max_hp(MAX_HP)
    }

    /// Create a session whose hit points start at (and are capped by) `max_hp`
    pub fn with_max_hp(max_hp: i32) -> Self {
        Self {
            entities: BTreeMap::new(),
            player_id: None,
            score: 0,
            hp: max_hp,
            max_hp,
            time_ticks: 0,
            bus: EventBus::new(),
            next_id: 1,
        }
    }

    /// Register an entity, assigning it the next identity
    ///
    /// # Panics
    /// If `desc` is a Player while another Player is registered.
    pub fn add(&mut self, desc: EntityDesc) -> &mut Entity {
        let id = self.next_id;
        self.next_id += 1;

        if desc.kind.tag() == EntityTag::Player {
            if let Some(existing) = self.player_id.filter(|p| self.entities.contains_key(p)) {
                panic!("player {} already registered, refusing to add another", existing);
            }
            self.player_id = Some(id);
        }

        log::debug!("Spawned {:?} #{} at {}", desc.kind.tag(), id, desc.pos);
        self.entities.entry(id).or_insert(Entity {
            id,
            kind: desc.kind,
            pos: desc.pos,
            alive: true,
            render: desc.render,
        })
    }

    /// Remove an entity; absent ids are ignored
    pub fn remove(&mut self, id: EntityId) {
        if self.entities.remove(&id).is_some() && self.player_id == Some(id) {
            self.player_id = None;
        }
    }

    /// Visit every stored entity
    pub fn for_each(&self, mut visit: impl FnMut(&Entity)) {
        for entity in self.entities.values() {
            visit(entity);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Snapshot of current ids, for passes that remove while walking
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player_id
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player_id.and_then(|id| self.entities.get(&id))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of live entities with the given tag
    pub fn count(&self, tag: EntityTag) -> usize {
        self.entities
            .values()
            .filter(|e| e.alive && e.tag() == tag)
            .count()
    }

    /// Drop every entity whose liveness flag is false. Returns how many were removed.
    pub fn prune_dead(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| e.alive);
        if let Some(id) = self.player_id {
            if !self.entities.contains_key(&id) {
                self.player_id = None;
            }
        }
        before - self.entities.len()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Add to the score, returning the new total
    pub fn add_score(&mut self, delta: u64) -> u64 {
        self.score += delta;
        self.score
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Set hit points, clamped to [0, max_hp]
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Fixed steps simulated so far
    pub fn tick_count(&self) -> u64 {
        self.time_ticks
    }

    pub(crate) fn advance_tick(&mut self) -> u64 {
        self.time_ticks += 1;
        self.time_ticks
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup_at(pos: Vec3) -> EntityDesc {
        EntityDesc {
            kind: EntityKind::Pickup { radius: 0.45 },
            pos,
            render: RenderHandle::default(),
        }
    }

    fn player() -> EntityDesc {
        EntityDesc {
            kind: EntityKind::Player {
                speed: 6.0,
                radius: 0.45,
            },
            pos: Vec3::ZERO,
            render: RenderHandle(42),
        }
    }

    #[test]
    fn test_add_assigns_monotonic_ids() {
        let mut state = GameState::new();
        let a = state.add(pickup_at(Vec3::ZERO)).id;
        let b = state.add(pickup_at(Vec3::X)).id;
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert!(state.get(a).unwrap().alive);
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut state = GameState::new();
        let a = state.add(pickup_at(Vec3::ZERO)).id;
        state.remove(a);
        let b = state.add(pickup_at(Vec3::ZERO)).id;
        assert_ne!(a, b);
        assert!(state.get(a).is_none());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut state = GameState::new();
        state.add(pickup_at(Vec3::ZERO));
        state.remove(99);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_player_id_recorded() {
        let mut state = GameState::new();
        state.add(pickup_at(Vec3::ZERO));
        let id = state.add(player()).id;
        assert_eq!(state.player_id(), Some(id));
        assert_eq!(state.player().unwrap().render, RenderHandle(42));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_second_player_panics() {
        let mut state = GameState::new();
        state.add(player());
        state.add(player());
    }

    #[test]
    fn test_player_can_be_replaced_after_removal() {
        let mut state = GameState::new();
        let first = state.add(player()).id;
        state.remove(first);
        assert_eq!(state.player_id(), None);
        let second = state.add(player()).id;
        assert_eq!(state.player_id(), Some(second));
    }

    #[test]
    fn test_for_each_visits_all() {
        let mut state = GameState::new();
        for i in 0..5 {
            state.add(pickup_at(Vec3::new(i as f32, 0.0, 0.0)));
        }
        let mut seen = Vec::new();
        state.for_each(|e| seen.push(e.id));
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_prune_dead_removes_only_dead() {
        let mut state = GameState::new();
        let keep = state.add(pickup_at(Vec3::ZERO)).id;
        let kill = state.add(pickup_at(Vec3::X)).id;
        state.get_mut(kill).unwrap().alive = false;

        assert_eq!(state.prune_dead(), 1);
        assert!(state.get(keep).is_some());
        assert!(state.get(kill).is_none());
        assert!(state.iter().all(|e| e.alive));
    }

    #[test]
    fn test_hp_clamped() {
        let mut state = GameState::new();
        assert_eq!(state.hp(), 100);
        state.set_hp(150);
        assert_eq!(state.hp(), 100);
        state.set_hp(-3);
        assert_eq!(state.hp(), 0);
        assert!(state.is_dead());
    }

    #[test]
    fn test_entity_sphere_uses_variant_radius() {
        let mut state = GameState::new();
        let e = state.add(EntityDesc {
            kind: EntityKind::Projectile {
                velocity: Vec3::X,
                radius: 0.15,
                ttl: 2.5,
            },
            pos: Vec3::new(1.0, 2.0, 3.0),
            render: RenderHandle::default(),
        });
        let s = e.sphere();
        assert_eq!(s.center, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(s.radius, 0.15);
        assert_eq!(e.tag(), EntityTag::Projectile);
    }

    #[test]
    fn test_bus_reachable_through_state() {
        use crate::events::{GameEvent, GameEventKind};
        use std::cell::Cell;
        use std::rc::Rc;

        let mut state = GameState::new();
        let hits = Rc::new(Cell::new(0));
        let sink = hits.clone();
        state
            .bus_mut()
            .subscribe(GameEventKind::Hit, move |_: &GameEvent| sink.set(sink.get() + 1));
        assert_eq!(state.bus().subscriber_count(GameEventKind::Hit), 1);

        state.bus_mut().emit(GameEvent::Hit { hp: 50 });
        assert_eq!(hits.get(), 1);
        assert_eq!(state.tick_count(), 0);
    }
}
