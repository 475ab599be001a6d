#![warn(missing_docs)]

//! Chunked voxel storage for raycast queries.
//!
//! Voxels are stored per channel in cubic chunks. Queries go through the
//! [`VoxelAccess`] trait, which is total: any position without stored data
//! returns the caller's default.
//!
//! # Example
//!
//! ```
//! use voxcast_math::Vec3i;
//! use voxcast_storage::{Channel, VoxelAccess, VoxelData};
//!
//! let data = VoxelData::new();
//! data.set_voxel_u64(Vec3i::new(1, 2, 3), Channel::Type, 7);
//! assert_eq!(data.get_voxel_u64(Vec3i::new(1, 2, 3), Channel::Type, 0), 7);
//! assert_eq!(data.get_voxel_u64(Vec3i::new(100, 0, 0), Channel::Type, 0), 0);
//! ```

mod channel;
mod data;
mod sampling;

pub use channel::Channel;
pub use data::{VoxelData, CHUNK_SIZE};
pub use sampling::{get_sdf_interpolated, SdfSampler};

use std::sync::Arc;
use thiserror::Error;
use voxcast_math::Vec3i;

/// SDF value reported for positions with no stored data.
///
/// Far enough outside any surface that it never counts as matter.
pub const SDF_FAR_OUTSIDE: f32 = 999_999.0;

/// Errors from voxel storage operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// Channel index outside the eight standard channels.
    #[error("invalid channel index: {0}")]
    InvalidChannel(u8),

    /// Box with a minimum corner above its maximum on some axis.
    #[error("invalid box: min {min:?} exceeds max {max:?}")]
    InvalidBox {
        /// Inclusive minimum corner.
        min: [i32; 3],
        /// Exclusive maximum corner.
        max: [i32; 3],
    },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Read access to single voxel values.
///
/// Implementations must be total: a position without stored data yields
/// `default`. Each call is a separate fetch; nothing guarantees that two
/// calls observe the same snapshot if the store is mutated concurrently.
pub trait VoxelAccess {
    /// Raw integer value of `channel` at `pos`.
    fn get_voxel_u64(&self, pos: Vec3i, channel: Channel, default: u64) -> u64;

    /// Floating point value of `channel` at `pos`.
    fn get_voxel_f32(&self, pos: Vec3i, channel: Channel, default: f32) -> f32;
}

impl<T: VoxelAccess + ?Sized> VoxelAccess for &T {
    fn get_voxel_u64(&self, pos: Vec3i, channel: Channel, default: u64) -> u64 {
        (**self).get_voxel_u64(pos, channel, default)
    }

    fn get_voxel_f32(&self, pos: Vec3i, channel: Channel, default: f32) -> f32 {
        (**self).get_voxel_f32(pos, channel, default)
    }
}

impl<T: VoxelAccess + ?Sized> VoxelAccess for Arc<T> {
    fn get_voxel_u64(&self, pos: Vec3i, channel: Channel, default: u64) -> u64 {
        (**self).get_voxel_u64(pos, channel, default)
    }

    fn get_voxel_f32(&self, pos: Vec3i, channel: Channel, default: f32) -> f32 {
        (**self).get_voxel_f32(pos, channel, default)
    }
}
