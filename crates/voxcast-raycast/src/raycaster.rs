//! Raycast queries per voxel representation.

use voxcast_blocky::BlockyLibrary;
use voxcast_math::{Point3, Transform, Vec3};
use voxcast_storage::{Channel, SdfSampler, VoxelAccess};

use crate::isosurface::approximate_distance_to_isosurface_binary_search;
use crate::predicate::{BlockyPredicate, NonzeroPredicate, SdfPredicate};
use crate::ray::is_valid_query;
use crate::traversal::{Dda, GridTraversal};
use crate::{MesherKind, Ray, RaycastHit, RaycastSettings};

/// Squared local segment length below which a world-space query is dropped.
const MIN_LOCAL_LENGTH_SQ: f32 = 1e-6;

/// Smooth surfaces show up around the lower corner of a cell, spreading half
/// a cell in every direction. Shifting the ray by this amount makes the
/// cubic grid walk line up with where matter is drawn.
const SDF_CELL_CENTER_OFFSET: f32 = 0.5;

/// Runs first-hit queries against voxel volumes.
///
/// Holds the grid walker and default settings. All queries are
/// synchronous and read-only; one raycaster can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct VoxelRaycaster<T = Dda> {
    traversal: T,
    settings: RaycastSettings,
}

impl VoxelRaycaster<Dda> {
    /// Raycaster using the [`Dda`] walk and default settings.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: GridTraversal> VoxelRaycaster<T> {
    /// Raycaster using a custom grid walk.
    pub fn with_traversal(traversal: T) -> Self {
        Self {
            traversal,
            settings: RaycastSettings::default(),
        }
    }

    /// Replace the settings used by [`cast`](Self::cast).
    pub fn with_settings(mut self, settings: RaycastSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &RaycastSettings {
        &self.settings
    }

    /// First cell with a negative signed distance.
    ///
    /// The walk runs on a ray shifted by half a cell so that cubic cells
    /// line up with interpolated surfaces; returned cells are not shifted
    /// back. With `binary_search_iterations > 0` the distance is refined to
    /// the interpolated zero crossing between the previous and the hit cell.
    pub fn raycast_sdf<A: VoxelAccess + ?Sized>(
        &self,
        data: &A,
        origin: &Point3,
        direction: &Vec3,
        max_distance: f32,
        binary_search_iterations: u8,
    ) -> Option<RaycastHit> {
        if !is_valid_query(direction, max_distance) {
            log::debug!(
                "sdf raycast skipped: direction {:?}, max distance {}",
                direction,
                max_distance
            );
            return None;
        }

        let predicate = SdfPredicate::new(data);
        let shifted = origin + Vec3::repeat(SDF_CELL_CENTER_OFFSET);
        let hit = self
            .traversal
            .traverse(&shifted, direction, &predicate, max_distance)?;

        let mut distance = hit.distance;
        if binary_search_iterations > 0 {
            let sampler = SdfSampler::new(data);
            let field = |p: &Point3| sampler.interpolated(p);
            distance = hit.previous_distance
                + approximate_distance_to_isosurface_binary_search(
                    &field,
                    &(origin + direction * hit.previous_distance),
                    direction,
                    hit.distance - hit.previous_distance,
                    binary_search_iterations,
                );
        }

        let result = RaycastHit::new(hit.position, hit.previous_position, distance);
        log::trace!("sdf raycast hit {:?}", result);
        Some(result)
    }

    /// First cell whose block model has a collision box in `collision_mask`
    /// crossed by the query segment.
    ///
    /// Without a model library nothing can be hit.
    pub fn raycast_blocky<A: VoxelAccess + ?Sized>(
        &self,
        data: &A,
        library: Option<&BlockyLibrary>,
        origin: &Point3,
        direction: &Vec3,
        max_distance: f32,
        collision_mask: u32,
    ) -> Option<RaycastHit> {
        let Some(library) = library else {
            log::debug!("blocky raycast skipped: no model library");
            return None;
        };
        if !is_valid_query(direction, max_distance) {
            log::debug!(
                "blocky raycast skipped: direction {:?}, max distance {}",
                direction,
                max_distance
            );
            return None;
        }

        let predicate = BlockyPredicate::new(
            data,
            library,
            collision_mask,
            *origin,
            origin + direction * max_distance,
        );
        let hit = self
            .traversal
            .traverse(origin, direction, &predicate, max_distance)?;

        let result = RaycastHit::new(hit.position, hit.previous_position, hit.distance);
        log::trace!("blocky raycast hit {:?}", result);
        Some(result)
    }

    /// First cell where `channel` is nonzero.
    pub fn raycast_nonzero<A: VoxelAccess + ?Sized>(
        &self,
        data: &A,
        origin: &Point3,
        direction: &Vec3,
        max_distance: f32,
        channel: Channel,
    ) -> Option<RaycastHit> {
        if !is_valid_query(direction, max_distance) {
            log::debug!(
                "nonzero raycast skipped: direction {:?}, max distance {}",
                direction,
                max_distance
            );
            return None;
        }

        let predicate = NonzeroPredicate::new(data, channel);
        let hit = self
            .traversal
            .traverse(origin, direction, &predicate, max_distance)?;

        let result = RaycastHit::new(hit.position, hit.previous_position, hit.distance);
        log::trace!("nonzero raycast on {:?} hit {:?}", channel, result);
        Some(result)
    }

    /// Raycast with the query matching the mesher.
    ///
    /// Blocky meshers test collision boxes in `collision_mask`, cubes
    /// meshers test the color channel, anything else tests the SDF channel
    /// without refinement. `_binary_search_iterations` is accepted for
    /// signature stability; none of these paths refine.
    #[allow(clippy::too_many_arguments)]
    pub fn raycast_generic<A: VoxelAccess + ?Sized>(
        &self,
        data: &A,
        mesher: &MesherKind,
        origin: &Point3,
        direction: &Vec3,
        max_distance: f32,
        collision_mask: u32,
        _binary_search_iterations: u8,
    ) -> Option<RaycastHit> {
        match mesher {
            MesherKind::Blocky { library } => self.raycast_blocky(
                data,
                library.as_deref(),
                origin,
                direction,
                max_distance,
                collision_mask,
            ),
            MesherKind::Cubes => {
                self.raycast_nonzero(data, origin, direction, max_distance, Channel::Color)
            }
            MesherKind::Sdf => self.raycast_sdf(data, origin, direction, max_distance, 0),
        }
    }

    /// Raycast a world-space ray against a volume placed by `to_world`.
    ///
    /// The segment `origin_world -> origin_world + direction_world * max_distance_world`
    /// is moved into volume space, queried there, and the hit distance is
    /// scaled back to world units. Returned cells stay in volume space.
    /// Degenerate segments and singular transforms are misses.
    #[allow(clippy::too_many_arguments)]
    pub fn raycast_generic_world<A: VoxelAccess + ?Sized>(
        &self,
        data: &A,
        mesher: &MesherKind,
        to_world: &Transform,
        origin_world: &Point3,
        direction_world: &Vec3,
        max_distance_world: f32,
        collision_mask: u32,
        _binary_search_iterations: u8,
    ) -> Option<RaycastHit> {
        let end_world = origin_world + direction_world * max_distance_world;

        let Some(to_local) = to_world.inverse() else {
            log::debug!("world raycast skipped: transform is not invertible");
            return None;
        };
        let pos0_local = to_local.apply_point(origin_world);
        let pos1_local = to_local.apply_point(&end_world);

        let max_distance_local_sq = (pos1_local - pos0_local).norm_squared();
        if max_distance_local_sq.is_nan() || max_distance_local_sq < MIN_LOCAL_LENGTH_SQ {
            log::debug!(
                "world raycast skipped: degenerate local segment ({})",
                max_distance_local_sq
            );
            return None;
        }
        let max_distance_local = max_distance_local_sq.sqrt();
        let direction_local = (pos1_local - pos0_local) / max_distance_local;

        let mut hit = self.raycast_generic(
            data,
            mesher,
            &pos0_local,
            &direction_local,
            max_distance_local,
            collision_mask,
            0,
        )?;

        let max_distance_world_sq = (end_world - origin_world).norm_squared();
        let to_world_scale = (max_distance_world_sq / max_distance_local_sq).sqrt();
        hit.distance_along_ray *= to_world_scale;
        Some(hit)
    }

    /// Raycast `ray` with the configured settings.
    ///
    /// SDF volumes are refined with the configured bisection steps; other
    /// meshers go through [`raycast_generic`](Self::raycast_generic).
    pub fn cast<A: VoxelAccess + ?Sized>(
        &self,
        data: &A,
        mesher: &MesherKind,
        ray: &Ray,
    ) -> Option<RaycastHit> {
        match mesher {
            MesherKind::Sdf => self.raycast_sdf(
                data,
                &ray.origin,
                &ray.direction,
                ray.max_distance,
                self.settings.binary_search_iterations,
            ),
            _ => self.raycast_generic(
                data,
                mesher,
                &ray.origin,
                &ray.direction,
                ray.max_distance,
                self.settings.collision_mask,
                self.settings.binary_search_iterations,
            ),
        }
    }

    /// Raycast a world-space `ray` against a volume placed by `to_world`.
    pub fn cast_world<A: VoxelAccess + ?Sized>(
        &self,
        data: &A,
        mesher: &MesherKind,
        to_world: &Transform,
        ray: &Ray,
    ) -> Option<RaycastHit> {
        self.raycast_generic_world(
            data,
            mesher,
            to_world,
            &ray.origin,
            &ray.direction,
            ray.max_distance,
            self.settings.collision_mask,
            self.settings.binary_search_iterations,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;
    use std::sync::Arc;
    use voxcast_blocky::BakedModel;
    use voxcast_math::{Aabb3, Vec3i};
    use voxcast_storage::VoxelData;

    use crate::traversal::{CellPredicate, TraversalHit};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Ground with its surface at y = 0: SDF equals height.
    fn flat_ground() -> VoxelData {
        let data = VoxelData::new();
        data.fill_box_f32_with(Vec3i::new(-8, -8, -8), Vec3i::new(8, 8, 8), Channel::Sdf, |p| {
            p.y as f32
        })
        .unwrap();
        data
    }

    #[test]
    fn test_sdf_coarse_hit_uses_shifted_walk() {
        init_logger();
        let data = flat_ground();
        let hit = VoxelRaycaster::new()
            .raycast_sdf(&data, &Point3::new(0.2, 5.0, 0.2), &-Vec3::y(), 20.0, 0)
            .unwrap();
        // Walk starts at y = 5.5 and enters cell y = -1 at t = 5.5.
        assert_eq!(hit.position, Vec3i::new(0, -1, 0));
        assert_eq!(hit.previous_position, Vec3i::new(0, 0, 0));
        assert_abs_diff_eq!(hit.distance_along_ray, 5.5, epsilon = 1e-5);
    }

    #[test]
    fn test_sdf_refined_hit() {
        let data = flat_ground();
        let hit = VoxelRaycaster::new()
            .raycast_sdf(&data, &Point3::new(0.2, 5.0, 0.2), &-Vec3::y(), 20.0, 16)
            .unwrap();
        assert_eq!(hit.position, Vec3i::new(0, -1, 0));
        assert_abs_diff_eq!(hit.distance_along_ray, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sdf_miss_when_out_of_range() {
        let data = flat_ground();
        let origin = Point3::new(0.2, 5.0, 0.2);
        let hit = VoxelRaycaster::new().raycast_sdf(&data, &origin, &-Vec3::y(), 3.0, 4);
        assert!(hit.is_none());
    }

    #[test]
    fn test_sdf_rejects_invalid_query() {
        let data = flat_ground();
        let raycaster = VoxelRaycaster::new();
        let origin = Point3::new(0.2, 5.0, 0.2);
        assert!(raycaster.raycast_sdf(&data, &origin, &Vec3::zeros(), 10.0, 0).is_none());
        assert!(raycaster.raycast_sdf(&data, &origin, &-Vec3::y(), -1.0, 0).is_none());
        assert!(raycaster
            .raycast_nonzero(&data, &origin, &-Vec3::y(), 0.0, Channel::Color)
            .is_none());
    }

    fn blocky_scene() -> (VoxelData, Arc<BlockyLibrary>) {
        let data = VoxelData::new();
        data.set_voxel_u64(Vec3i::new(3, 0, 0), Channel::Type, 2);
        data.set_voxel_u64(Vec3i::new(6, 0, 0), Channel::Type, 1);
        let mut library = BlockyLibrary::new();
        library.add_model(1, BakedModel::cube()).unwrap();
        let slab = Aabb3::from_position_size(Point3::origin(), Vec3::new(1.0, 0.5, 1.0));
        library.add_model(2, BakedModel::new(1, vec![slab])).unwrap();
        (data, Arc::new(library))
    }

    #[test]
    fn test_blocky_hits_box_on_segment() {
        let (data, library) = blocky_scene();
        let raycaster = VoxelRaycaster::new();

        let cast = |origin: Point3| {
            raycaster.raycast_blocky(&data, Some(&*library), &origin, &Vec3::x(), 10.0, 1)
        };

        let low = cast(Point3::new(0.5, 0.25, 0.5)).unwrap();
        assert_eq!(low.position, Vec3i::new(3, 0, 0));
        assert_eq!(low.previous_position, Vec3i::new(2, 0, 0));
        assert_abs_diff_eq!(low.distance_along_ray, 2.5, epsilon = 1e-5);

        // Passes over the slab, stops at the full cube.
        let high = cast(Point3::new(0.5, 0.75, 0.5)).unwrap();
        assert_eq!(high.position, Vec3i::new(6, 0, 0));
    }

    #[test]
    fn test_blocky_without_library_misses() {
        let (data, _) = blocky_scene();
        let hit = VoxelRaycaster::new().raycast_blocky(
            &data,
            None,
            &Point3::new(0.5, 0.5, 0.5),
            &Vec3::x(),
            10.0,
            1,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_blocky_mask_excludes_all() {
        let (data, library) = blocky_scene();
        let hit = VoxelRaycaster::new().raycast_blocky(
            &data,
            Some(&*library),
            &Point3::new(0.5, 0.5, 0.5),
            &Vec3::x(),
            10.0,
            0b100,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_dispatch_by_mesher() {
        let data = VoxelData::new();
        // Each representation has matter in a different cell along +x.
        data.set_voxel_u64(Vec3i::new(2, 0, 0), Channel::Type, 1);
        data.set_voxel_u64(Vec3i::new(4, 0, 0), Channel::Color, 0xffffffff);
        data.set_voxel_f32(Vec3i::new(6, 0, 0), Channel::Sdf, -1.0);

        let mut library = BlockyLibrary::new();
        library.add_model(1, BakedModel::cube()).unwrap();

        let raycaster = VoxelRaycaster::new();
        let origin = Point3::new(0.5, 0.5, 0.5);
        let cast = |mesher: &MesherKind| {
            raycaster
                .raycast_generic(&data, mesher, &origin, &Vec3::x(), 10.0, 1, 0)
                .map(|h| h.position)
        };

        assert_eq!(cast(&MesherKind::blocky(Arc::new(library))), Some(Vec3i::new(2, 0, 0)));
        assert_eq!(cast(&MesherKind::Blocky { library: None }), None);
        assert_eq!(cast(&MesherKind::Cubes), Some(Vec3i::new(4, 0, 0)));
        // Shifted walk starts in cell (1, 1, 1); the SDF voxel is at y = 0.
        assert_eq!(cast(&MesherKind::Sdf), None);
        let sdf = raycaster.raycast_generic(
            &data,
            &MesherKind::Sdf,
            &Point3::new(0.5, -0.25, -0.25),
            &Vec3::x(),
            10.0,
            1,
            0,
        );
        assert_eq!(sdf.map(|h| h.position), Some(Vec3i::new(6, 0, 0)));
    }

    #[test]
    fn test_world_uniform_scale() {
        let data = VoxelData::new();
        data.set_voxel_u64(Vec3i::new(5, 0, 0), Channel::Color, 1);
        let to_world = Transform::uniform_scale(2.0);
        let hit = VoxelRaycaster::new()
            .raycast_generic_world(
                &data,
                &MesherKind::Cubes,
                &to_world,
                &Point3::new(1.0, 1.0, 1.0),
                &Vec3::x(),
                30.0,
                1,
                0,
            )
            .unwrap();
        // Local origin (0.5, 0.5, 0.5) enters cell 5 after 4.5 local units.
        assert_eq!(hit.position, Vec3i::new(5, 0, 0));
        assert_abs_diff_eq!(hit.distance_along_ray, 9.0, epsilon = 1e-4);
    }

    #[test]
    fn test_world_translation_keeps_local_cells() {
        let data = VoxelData::new();
        data.set_voxel_u64(Vec3i::new(3, 0, 0), Channel::Color, 1);
        let to_world = Transform::translation(100.0, 0.0, 0.0);
        let hit = VoxelRaycaster::new()
            .raycast_generic_world(
                &data,
                &MesherKind::Cubes,
                &to_world,
                &Point3::new(100.5, 0.5, 0.5),
                &Vec3::x(),
                10.0,
                1,
                0,
            )
            .unwrap();
        assert_eq!(hit.position, Vec3i::new(3, 0, 0));
        assert_abs_diff_eq!(hit.distance_along_ray, 2.5, epsilon = 1e-4);
    }

    #[test]
    fn test_world_degenerate_segment() {
        let data = VoxelData::new();
        data.set_voxel_u64(Vec3i::new(0, 0, 0), Channel::Color, 1);
        let raycaster = VoxelRaycaster::new();
        let origin = Point3::new(0.5, 0.5, 0.5);
        let cast = |to_world: &Transform, direction: Vec3, max_distance: f32| {
            raycaster.raycast_generic_world(
                &data,
                &MesherKind::Cubes,
                to_world,
                &origin,
                &direction,
                max_distance,
                1,
                0,
            )
        };
        let identity = Transform::identity();

        assert!(cast(&identity, Vec3::x(), 0.0).is_none());
        assert!(cast(&identity, Vec3::zeros(), 5.0).is_none());
        assert!(cast(&identity, Vec3::new(f32::NAN, 0.0, 0.0), 5.0).is_none());
        assert!(cast(&Transform::scale(1.0, 0.0, 1.0), Vec3::x(), 5.0).is_none());
    }

    #[test]
    fn test_cast_applies_settings() {
        let data = flat_ground();
        let ray = Ray::new(Point3::new(0.2, 5.0, 0.2), -Vec3::y(), 20.0).unwrap();

        let coarse = VoxelRaycaster::new().cast(&data, &MesherKind::Sdf, &ray).unwrap();
        assert_abs_diff_eq!(coarse.distance_along_ray, 5.5, epsilon = 1e-5);

        let settings = RaycastSettings {
            binary_search_iterations: 12,
            ..RaycastSettings::default()
        };
        let refined = VoxelRaycaster::new()
            .with_settings(settings)
            .cast(&data, &MesherKind::Sdf, &ray)
            .unwrap();
        assert_abs_diff_eq!(refined.distance_along_ray, 5.0, epsilon = 1e-2);
    }

    #[test]
    fn test_cast_huge_max_distance_returns() {
        let data = VoxelData::new();
        let raycaster = VoxelRaycaster::new();

        // Empty volume: the walk runs off the lattice and reports a miss.
        let edge = Ray::new(Point3::new(2.147_483e9, 0.5, 0.5), Vec3::x(), 1.0e9).unwrap();
        assert!(raycaster.cast(&data, &MesherKind::Cubes, &edge).is_none());

        // Matter placed just short of the lattice edge is still found.
        data.set_voxel_u64(Vec3i::new(i32::MAX - 10, 0, 0), Channel::Color, 1);
        let hit = raycaster.cast(&data, &MesherKind::Cubes, &edge).unwrap();
        assert_eq!(hit.position, Vec3i::new(i32::MAX - 10, 0, 0));
    }

    #[test]
    fn test_cast_world_uses_collision_mask() {
        let (data, library) = blocky_scene();
        let mesher = MesherKind::blocky(library);
        let ray = Ray::new(Point3::new(0.5, 0.25, 0.5), Vec3::x(), 10.0).unwrap();

        let identity = Transform::identity();
        let default_mask = VoxelRaycaster::new().cast_world(&data, &mesher, &identity, &ray);
        assert_eq!(default_mask.map(|h| h.position), Some(Vec3i::new(3, 0, 0)));

        let settings = RaycastSettings {
            collision_mask: 2,
            ..RaycastSettings::default()
        };
        let other_layer = VoxelRaycaster::new()
            .with_settings(settings)
            .cast_world(&data, &mesher, &Transform::identity(), &ray);
        assert!(other_layer.is_none());
    }

    /// Walk that records how often the predicate ran.
    struct CountingDda<'a> {
        calls: &'a Cell<usize>,
    }

    impl GridTraversal for CountingDda<'_> {
        fn traverse<P: CellPredicate + ?Sized>(
            &self,
            origin: &Point3,
            direction: &Vec3,
            predicate: &P,
            max_distance: f32,
        ) -> Option<TraversalHit> {
            let counted = |cell: Vec3i| {
                self.calls.set(self.calls.get() + 1);
                predicate.accept(cell)
            };
            Dda.traverse(origin, direction, &counted, max_distance)
        }
    }

    #[test]
    fn test_custom_traversal_one_fetch_per_cell() {
        let data = VoxelData::new();
        data.set_voxel_u64(Vec3i::new(4, 0, 0), Channel::Color, 1);
        let calls = Cell::new(0);
        let raycaster = VoxelRaycaster::with_traversal(CountingDda { calls: &calls });
        let hit = raycaster
            .raycast_nonzero(&data, &Point3::new(0.5, 0.5, 0.5), &Vec3::x(), 10.0, Channel::Color)
            .unwrap();
        assert_eq!(hit.position, Vec3i::new(4, 0, 0));
        assert_eq!(calls.get(), 4);
    }
}
