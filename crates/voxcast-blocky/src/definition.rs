//! JSON model definitions.

use serde::{Deserialize, Serialize};
use voxcast_math::{Aabb3, Point3, Vec3};

use crate::{BakedModel, LibraryError, Result, AIR_ID};

/// A model as written in a library file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Type id stored in the voxel type channel.
    pub id: u32,

    /// Collision layers.
    #[serde(default = "default_collision_mask")]
    pub collision_mask: u32,

    /// Boxes as `[x, y, z, size_x, size_y, size_z]` in cell-local space.
    #[serde(default = "default_collision_boxes")]
    pub collision_boxes: Vec<[f32; 6]>,
}

fn default_collision_mask() -> u32 {
    1
}

fn default_collision_boxes() -> Vec<[f32; 6]> {
    vec![[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]]
}

impl ModelDefinition {
    /// Validate and convert into a [`BakedModel`].
    pub fn bake(&self) -> Result<BakedModel> {
        if self.id == AIR_ID {
            return Err(LibraryError::ReservedId);
        }

        let boxes = self
            .collision_boxes
            .iter()
            .enumerate()
            .map(|(index, b)| {
                let [x, y, z, sx, sy, sz] = *b;
                let valid = b.iter().all(|v| v.is_finite()) && sx >= 0.0 && sy >= 0.0 && sz >= 0.0;
                if !valid {
                    return Err(LibraryError::InvalidBox { id: self.id, index });
                }
                Ok(Aabb3::from_position_size(
                    Point3::new(x, y, z),
                    Vec3::new(sx, sy, sz),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BakedModel::new(self.collision_mask, boxes))
    }
}

/// A library file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryFile {
    /// Model definitions.
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}
