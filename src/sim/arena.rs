//! Arena wall geometry
//!
//! The play area is a square on the ground plane centered at the origin,
//! fenced by four static boxes that the player is pushed out of.

use glam::Vec3;

use super::collision::Aabb;

/// Default wall thickness
pub const WALL_THICKNESS: f32 = 1.0;
/// Default wall height
pub const WALL_HEIGHT: f32 = 3.0;

/// Four static walls whose inner faces sit at +-`half_extent` on x and z
///
/// Walls are `thickness` deep and run from y = 0 to `height`. They extend
/// past the corners so the square is closed.
pub fn arena_walls(half_extent: f32, thickness: f32, height: f32) -> Vec<Aabb> {
    let h = half_extent;
    let t = thickness;
    let outer = h + t;

    vec![
        // +x
        Aabb::fixed(Vec3::new(h, 0.0, -outer), Vec3::new(outer, height, outer)),
        // -x
        Aabb::fixed(Vec3::new(-outer, 0.0, -outer), Vec3::new(-h, height, outer)),
        // +z
        Aabb::fixed(Vec3::new(-outer, 0.0, h), Vec3::new(outer, height, outer)),
        // -z
        Aabb::fixed(Vec3::new(-outer, 0.0, -outer), Vec3::new(outer, height, -h)),
    ]
}

/// Arena walls with default thickness and height
pub fn default_arena(half_extent: f32) -> Vec<Aabb> {
    arena_walls(half_extent, WALL_THICKNESS, WALL_HEIGHT)
}
