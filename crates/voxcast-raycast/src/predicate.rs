//! Cell acceptance per voxel representation.

use voxcast_blocky::{BakedModel, BlockyLibrary};
use voxcast_math::{Point3, Vec3i};
use voxcast_storage::{Channel, VoxelAccess, SDF_FAR_OUTSIDE};

use crate::traversal::CellPredicate;

/// Accepts cells whose stored signed distance is strictly negative.
#[derive(Debug)]
pub struct SdfPredicate<'a, A: ?Sized> {
    data: &'a A,
}

impl<'a, A: VoxelAccess + ?Sized> SdfPredicate<'a, A> {
    /// Predicate over the SDF channel of `data`.
    pub fn new(data: &'a A) -> Self {
        Self { data }
    }
}

impl<A: VoxelAccess + ?Sized> CellPredicate for SdfPredicate<'_, A> {
    fn accept(&self, cell: Vec3i) -> bool {
        self.data.get_voxel_f32(cell, Channel::Sdf, SDF_FAR_OUTSIDE) < 0.0
    }
}

/// Accepts cells whose block model has a collision box crossed by the query segment.
#[derive(Debug)]
pub struct BlockyPredicate<'a, A: ?Sized> {
    data: &'a A,
    library: &'a BlockyLibrary,
    collision_mask: u32,
    from: Point3,
    to: Point3,
}

impl<'a, A: VoxelAccess + ?Sized> BlockyPredicate<'a, A> {
    /// Predicate testing boxes of models in `collision_mask` against the
    /// segment `from -> to`.
    pub fn new(
        data: &'a A,
        library: &'a BlockyLibrary,
        collision_mask: u32,
        from: Point3,
        to: Point3,
    ) -> Self {
        Self {
            data,
            library,
            collision_mask,
            from,
            to,
        }
    }

    fn model_at(&self, cell: Vec3i) -> Option<&'a BakedModel> {
        let raw = self.data.get_voxel_u64(cell, Channel::Type, 0);
        let id = u32::try_from(raw).ok()?;
        self.library.get_model(id)
    }
}

impl<A: VoxelAccess + ?Sized> CellPredicate for BlockyPredicate<'_, A> {
    fn accept(&self, cell: Vec3i) -> bool {
        match self.model_at(cell) {
            Some(model) if model.matches_mask(self.collision_mask) => {
                model.intersects_segment_at(&cell, &self.from, &self.to)
            }
            _ => false,
        }
    }
}

/// Accepts cells where an integer channel is nonzero.
#[derive(Debug)]
pub struct NonzeroPredicate<'a, A: ?Sized> {
    data: &'a A,
    channel: Channel,
}

impl<'a, A: VoxelAccess + ?Sized> NonzeroPredicate<'a, A> {
    /// Predicate over `channel` of `data`.
    pub fn new(data: &'a A, channel: Channel) -> Self {
        Self { data, channel }
    }
}

impl<A: VoxelAccess + ?Sized> CellPredicate for NonzeroPredicate<'_, A> {
    fn accept(&self, cell: Vec3i) -> bool {
        self.data.get_voxel_u64(cell, self.channel, 0) != 0
    }
}
