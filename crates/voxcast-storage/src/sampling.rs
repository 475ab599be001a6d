//! Interpolated SDF sampling.

use voxcast_math::{cell_to_point, floor_to_cell, Point3, Vec3i};

use crate::{Channel, VoxelAccess, SDF_FAR_OUTSIDE};

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Trilinearly interpolate a lattice field at a fractional position.
///
/// Lattice values are taken at the 8 integer corners around `floor(pos)`,
/// so a field sampled from a linear function is reproduced exactly.
pub fn get_sdf_interpolated<F>(f: F, pos: &Point3) -> f32
where
    F: Fn(Vec3i) -> f32,
{
    let c = floor_to_cell(pos);
    let t = pos - cell_to_point(&c);

    let s000 = f(c);
    let s100 = f(c + Vec3i::new(1, 0, 0));
    let s010 = f(c + Vec3i::new(0, 1, 0));
    let s110 = f(c + Vec3i::new(1, 1, 0));
    let s001 = f(c + Vec3i::new(0, 0, 1));
    let s101 = f(c + Vec3i::new(1, 0, 1));
    let s011 = f(c + Vec3i::new(0, 1, 1));
    let s111 = f(c + Vec3i::new(1, 1, 1));

    let x00 = lerp(s000, s100, t.x);
    let x10 = lerp(s010, s110, t.x);
    let x01 = lerp(s001, s101, t.x);
    let x11 = lerp(s011, s111, t.x);

    lerp(lerp(x00, x10, t.y), lerp(x01, x11, t.y), t.z)
}

/// Reads the SDF channel of a volume, defaulting to [`SDF_FAR_OUTSIDE`].
#[derive(Debug, Clone, Copy)]
pub struct SdfSampler<'a, A: ?Sized> {
    data: &'a A,
}

impl<'a, A: VoxelAccess + ?Sized> SdfSampler<'a, A> {
    /// Wrap a volume.
    pub fn new(data: &'a A) -> Self {
        Self { data }
    }

    /// SDF value stored at a lattice cell.
    #[inline]
    pub fn cell(&self, pos: Vec3i) -> f32 {
        self.data.get_voxel_f32(pos, Channel::Sdf, SDF_FAR_OUTSIDE)
    }

    /// SDF value interpolated at a fractional position.
    pub fn interpolated(&self, pos: &Point3) -> f32 {
        get_sdf_interpolated(|c| self.cell(c), pos)
    }
}
