//! Uniform-grid broad phase
//!
//! Colliders are filed by their representative point into cubic cells of
//! `cell_size`. A query returns everything in the 3x3x3 block of cells around
//! the query point. That is a candidate list, not an overlap list.
//!
//! Known tolerance: a collider is filed by its center only, so a pair whose
//! centers are more than one full cell apart on any axis is never reported,
//! even if their radii make them overlap. Keep `cell_size` comfortably above
//! the largest collider radius (the default 3.0 vs radii of at most 0.5).

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use super::collision::Collider;
use crate::consts::DEFAULT_CELL_SIZE;

/// Broad-phase grid, rebuilt from scratch every tick
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    colliders: Vec<Collider>,
    cells: HashMap<IVec3, Vec<usize>>,
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive, got {}", cell_size);
        Self {
            cell_size,
            colliders: Vec::new(),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell coordinate containing `p`
    #[inline]
    pub fn cell_of(&self, p: Vec3) -> IVec3 {
        (p / self.cell_size).floor().as_ivec3()
    }

    /// File a collider into the cell its representative point falls in
    ///
    /// Cells behave as sets: inserting an identical collider again is a
    /// no-op, so queries never report it twice.
    pub fn insert(&mut self, collider: Collider) {
        let cell = self.cell_of(collider.point());
        let handles = self.cells.entry(cell).or_default();
        if handles.iter().any(|&h| self.colliders[h] == collider) {
            return;
        }
        handles.push(self.colliders.len());
        self.colliders.push(collider);
    }

    /// Every collider in the 27 cells around `query`'s cell (including its own)
    pub fn query_near(&self, query: &Collider) -> Vec<&Collider> {
        let center = self.cell_of(query.point());
        let mut out = Vec::new();

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = center + IVec3::new(dx, dy, dz);
                    if let Some(handles) = self.cells.get(&cell) {
                        out.extend(handles.iter().map(|&h| &self.colliders[h]));
                    }
                }
            }
        }

        out
    }

    /// Discard all cells and colliders
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.cells.clear();
    }

    /// Number of colliders filed
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
