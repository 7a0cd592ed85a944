//! Entity factories
//!
//! Default tuning for each actor. Renderers create the drawable first and pass
//! its handle in; the simulation never builds presentation resources.

use glam::Vec3;

use super::state::{Entity, EntityDesc, EntityKind, GameState, RenderHandle};

pub const PLAYER_SPEED: f32 = 6.0;
pub const PLAYER_RADIUS: f32 = 0.45;

pub const ENEMY_SPEED: f32 = 3.5;
pub const ENEMY_RADIUS: f32 = 0.5;

pub const PICKUP_RADIUS: f32 = 0.45;

pub const PROJECTILE_SPEED: f32 = 16.0;
pub const PROJECTILE_RADIUS: f32 = 0.15;
/// Seconds before an unspent projectile expires
pub const PROJECTILE_TTL: f32 = 2.5;

/// Hover height for enemies and pickups
pub const HOVER_Y: f32 = 0.5;

/// Spawn the player at the origin
pub fn spawn_player(state: &mut GameState, render: RenderHandle) -> &mut Entity {
    state.add(EntityDesc {
        kind: EntityKind::Player {
            speed: PLAYER_SPEED,
            radius: PLAYER_RADIUS,
        },
        pos: Vec3::ZERO,
        render,
    })
}

/// Spawn an enemy on the ground plane at (x, z)
pub fn spawn_enemy(state: &mut GameState, x: f32, z: f32, render: RenderHandle) -> &mut Entity {
    state.add(EntityDesc {
        kind: EntityKind::Enemy {
            speed: ENEMY_SPEED,
            radius: ENEMY_RADIUS,
        },
        pos: Vec3::new(x, HOVER_Y, z),
        render,
    })
}

/// Spawn a pickup on the ground plane at (x, z)
pub fn spawn_pickup(state: &mut GameState, x: f32, z: f32, render: RenderHandle) -> &mut Entity {
    state.add(EntityDesc {
        kind: EntityKind::Pickup {
            radius: PICKUP_RADIUS,
        },
        pos: Vec3::new(x, HOVER_Y, z),
        render,
    })
}

/// Fire a projectile from `origin` along `dir`
///
/// `dir` is scaled by the projectile speed as given; pass a unit vector for
/// the standard muzzle velocity.
pub fn spawn_projectile(
    state: &mut GameState,
    origin: Vec3,
    dir: Vec3,
    render: RenderHandle,
) -> &mut Entity {
    state.add(EntityDesc {
        kind: EntityKind::Projectile {
            velocity: dir * PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
            ttl: PROJECTILE_TTL,
        },
        pos: origin,
        render,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityTag;

    #[test]
    fn test_spawn_defaults() {
        let mut state = GameState::new();
        let player = spawn_player(&mut state, RenderHandle(1)).id;
        let enemy = spawn_enemy(&mut state, 3.0, 3.0, RenderHandle(2)).id;
        let pickup = spawn_pickup(&mut state, -2.0, 2.0, RenderHandle(3)).id;

        assert_eq!(state.player_id(), Some(player));
        assert_eq!(state.get(enemy).unwrap().pos, Vec3::new(3.0, 0.5, 3.0));
        assert_eq!(state.get(enemy).unwrap().kind.radius(), ENEMY_RADIUS);
        assert_eq!(state.get(pickup).unwrap().tag(), EntityTag::Pickup);
        assert_eq!(state.count(EntityTag::Enemy), 1);
    }

    #[test]
    fn test_projectile_velocity_and_ttl() {
        let mut state = GameState::new();
        let p = spawn_projectile(&mut state, Vec3::new(0.0, 1.0, 0.0), Vec3::Z, RenderHandle::default());
        match p.kind {
            EntityKind::Projectile { velocity, ttl, .. } => {
                assert_eq!(velocity, Vec3::new(0.0, 0.0, 16.0));
                assert_eq!(ttl, PROJECTILE_TTL);
            }
            _ => panic!("expected projectile"),
        }
    }
}
