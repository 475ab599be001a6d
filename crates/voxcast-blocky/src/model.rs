//! Baked block models.

use voxcast_math::{Aabb3, Point3, Vec3, Vec3i};

/// Collision data of one block type, ready for queries.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedModel {
    /// Collision layers this model belongs to.
    pub box_collision_mask: u32,
    /// Collision boxes in cell-local space, the unit cell being `[0, 1]³`.
    pub box_collision_aabbs: Vec<Aabb3>,
}

impl BakedModel {
    /// A full unit cube on layer 1.
    pub fn cube() -> Self {
        Self {
            box_collision_mask: 1,
            box_collision_aabbs: vec![Aabb3::unit()],
        }
    }

    /// A model with the given mask and boxes.
    pub fn new(box_collision_mask: u32, box_collision_aabbs: Vec<Aabb3>) -> Self {
        Self {
            box_collision_mask,
            box_collision_aabbs,
        }
    }

    /// Whether any of the model's layers are in `mask`.
    #[inline]
    pub fn matches_mask(&self, mask: u32) -> bool {
        self.box_collision_mask & mask != 0
    }

    /// Whether the segment `from -> to` touches a collision box of this
    /// model placed at `cell`.
    pub fn intersects_segment_at(&self, cell: &Vec3i, from: &Point3, to: &Point3) -> bool {
        let offset = Vec3::new(cell.x as f32, cell.y as f32, cell.z as f32);
        self.box_collision_aabbs
            .iter()
            .any(|aabb| aabb.translated(&offset).intersects_segment(from, to))
    }
}
