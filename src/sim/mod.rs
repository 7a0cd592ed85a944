//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod arena;
pub mod collision;
pub mod spatial;
pub mod spawn;
pub mod state;
pub mod tick;

pub use arena::{arena_walls, default_arena};
pub use collision::{Aabb, Collider, Shape, Sphere, resolve_world_sphere, sphere_aabb, sphere_sphere};
pub use spatial::SpatialHash;
pub use spawn::{spawn_enemy, spawn_pickup, spawn_player, spawn_projectile};
pub use state::{Entity, EntityDesc, EntityId, EntityKind, EntityTag, GameState, RenderHandle};
pub use tick::{Interaction, Systems, interaction};
