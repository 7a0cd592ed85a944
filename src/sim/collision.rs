//! Narrow-phase collision primitives
//!
//! Sphere-sphere and sphere-box overlap tests, plus the positional push-out
//! that keeps the player inside the arena walls. No impulses: overlapping
//! shapes are only moved apart, never given velocity.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::EntityId;

/// Extra clearance added by push-out so the resolved sphere no longer touches the face
pub const PUSH_OUT_SKIN: f32 = 1e-3;

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
    /// Static world geometry (walls); only static boxes take part in push-out
    #[serde(default)]
    pub is_static: bool,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            is_static: false,
        }
    }

    /// A static box (world geometry)
    pub fn fixed(min: Vec3, max: Vec3) -> Self {
        Self {
            is_static: true,
            ..Self::new(min, max)
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn clamp_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }
}

/// Shape of a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere(Sphere),
    Aabb(Aabb),
}

/// A per-tick collision volume tagged with the entity that owns it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub entity: EntityId,
    pub shape: Shape,
}

impl Collider {
    pub fn sphere(entity: EntityId, sphere: Sphere) -> Self {
        Self {
            entity,
            shape: Shape::Sphere(sphere),
        }
    }

    pub fn aabb(entity: EntityId, aabb: Aabb) -> Self {
        Self {
            entity,
            shape: Shape::Aabb(aabb),
        }
    }

    /// Point used to file the collider into a spatial cell
    #[inline]
    pub fn point(&self) -> Vec3 {
        match &self.shape {
            Shape::Sphere(s) => s.center,
            Shape::Aabb(b) => b.center(),
        }
    }
}

/// Sphere vs sphere overlap (touching counts)
#[inline]
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) <= reach * reach
}

/// Sphere vs box overlap (touching counts)
#[inline]
pub fn sphere_aabb(s: &Sphere, b: &Aabb) -> bool {
    let closest = b.clamp_point(s.center);
    closest.distance_squared(s.center) <= s.radius * s.radius
}

/// Push a sphere out of every static box it overlaps
///
/// For each overlapping wall the sphere moves along x or z, whichever has the
/// smaller distance from the center to a face of the box, away from the box
/// center, until its surface clears that face. Bounds are visited in order, so
/// two overlapping walls can fight each other; a single wall is always cleared.
///
/// Returns true if the sphere was moved.
pub fn resolve_world_sphere(sphere: &mut Sphere, bounds: &[Aabb]) -> bool {
    let mut moved = false;

    for b in bounds.iter().filter(|b| b.is_static) {
        if !sphere_aabb(sphere, b) {
            continue;
        }

        let c = sphere.center;
        let dx = (c.x - b.min.x).abs().min((b.max.x - c.x).abs());
        let dz = (c.z - b.min.z).abs().min((b.max.z - c.z).abs());
        let box_center = b.center();
        let clearance = sphere.radius + PUSH_OUT_SKIN;

        if dx < dz {
            sphere.center.x = if c.x < box_center.x {
                b.min.x - clearance
            } else {
                b.max.x + clearance
            };
        } else {
            sphere.center.z = if c.z < box_center.z {
                b.min.z - clearance
            } else {
                b.max.z + clearance
            };
        }
        moved = true;
    }

    moved
}
