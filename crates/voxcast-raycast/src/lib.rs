#![warn(missing_docs)]

//! First-hit ray queries against chunked voxel volumes.
//!
//! A coarse grid walk finds the first voxel cell a ray enters that counts
//! as matter for the configured representation. For signed distance fields
//! the coarse hit can then be refined to a sub-voxel surface crossing.
//!
//! # Architecture
//!
//! - [`Ray`] / [`RaycastHit`] - query and result
//! - [`traversal`] - grid walk trait and the default [`Dda`] walker
//! - [`predicate`] - per-representation cell acceptance
//! - [`isosurface`] - bisection refinement of an SDF crossing
//! - [`VoxelRaycaster`] - SDF, blocky and nonzero queries, the mesher
//!   dispatcher and the world-space wrapper
//!
//! # Example
//!
//! ```
//! use voxcast_math::{Point3, Vec3, Vec3i};
//! use voxcast_raycast::{MesherKind, VoxelRaycaster};
//! use voxcast_storage::{Channel, VoxelData};
//!
//! let data = VoxelData::new();
//! data.set_voxel_u64(Vec3i::new(4, 0, 0), Channel::Color, 0xff0000ff);
//!
//! let raycaster = VoxelRaycaster::new();
//! let hit = raycaster
//!     .raycast_generic(
//!         &data,
//!         &MesherKind::Cubes,
//!         &Point3::new(0.5, 0.5, 0.5),
//!         &Vec3::x(),
//!         10.0,
//!         1,
//!         0,
//!     )
//!     .unwrap();
//!
//! assert_eq!(hit.position, Vec3i::new(4, 0, 0));
//! assert_eq!(hit.previous_position, Vec3i::new(3, 0, 0));
//! ```

mod mesher;
mod ray;
mod raycaster;
mod settings;

pub mod isosurface;
pub mod predicate;
pub mod traversal;

pub use mesher::MesherKind;
pub use ray::{Ray, RaycastHit};
pub use raycaster::VoxelRaycaster;
pub use settings::RaycastSettings;
pub use traversal::{CellPredicate, Dda, GridTraversal, TraversalHit};

use thiserror::Error;

/// Errors from building queries and settings.
///
/// Misses are never errors; they are reported as `None`.
#[derive(Debug, Error)]
pub enum RaycastError {
    /// Direction is zero-length or not finite.
    #[error("invalid ray direction: {0:?}")]
    InvalidDirection([f32; 3]),

    /// Maximum distance is not a positive finite number.
    #[error("invalid max distance: {0}")]
    InvalidMaxDistance(f32),

    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings file is not valid TOML for the expected schema.
    #[error("settings parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for raycast operations.
pub type Result<T> = std::result::Result<T, RaycastError>;
