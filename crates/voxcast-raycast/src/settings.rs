//! Query defaults.

use serde::{Deserialize, Serialize};

use voxcast_math::{Point3, Vec3};

use crate::{Ray, RaycastError, Result};

/// Upper bound on bisection steps; beyond this f32 precision is exhausted.
const MAX_BINARY_SEARCH_ITERATIONS: u8 = 32;

/// Defaults applied by [`VoxelRaycaster::cast`](crate::VoxelRaycaster::cast).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycastSettings {
    /// Collision layers tested against blocky models.
    pub collision_mask: u32,
    /// Bisection steps used to refine SDF hits; 0 keeps the coarse hit.
    pub binary_search_iterations: u8,
    /// Maximum query distance for rays built from these settings.
    pub max_distance: f32,
}

impl Default for RaycastSettings {
    fn default() -> Self {
        Self {
            collision_mask: 1,
            binary_search_iterations: 0,
            max_distance: 10.0,
        }
    }
}

impl RaycastSettings {
    /// Parse settings from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Ray from `origin` along `direction` reaching `max_distance`.
    pub fn ray(&self, origin: Point3, direction: Vec3) -> Result<Ray> {
        Ray::new(origin, direction, self.max_distance)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(RaycastError::InvalidSettings(format!(
                "max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if self.binary_search_iterations > MAX_BINARY_SEARCH_ITERATIONS {
            return Err(RaycastError::InvalidSettings(format!(
                "binary_search_iterations must be at most {}, got {}",
                MAX_BINARY_SEARCH_ITERATIONS, self.binary_search_iterations
            )));
        }
        Ok(())
    }
}
