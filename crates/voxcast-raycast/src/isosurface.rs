//! Sub-voxel refinement of a signed distance crossing.
//!
//! Bisection is used instead of linear interpolation because the sampled
//! field is only an approximation of true distance to begin with.

use voxcast_math::{Point3, Vec3};

/// Number of bracket adjustment steps tried on each end of the segment.
const BRACKET_RETRIES: usize = 4;

/// Length of one bracket adjustment step, in ray units.
const BRACKET_STEP: f32 = 0.5;

/// A continuous scalar field, negative inside matter.
pub trait ScalarField {
    /// Field value at `pos`.
    fn sample(&self, pos: &Point3) -> f32;
}

impl<F: Fn(&Point3) -> f32> ScalarField for F {
    fn sample(&self, pos: &Point3) -> f32 {
        self(pos)
    }
}

/// Distance from `pos0` along `dir` closest to the zero crossing of `field`.
///
/// `d1` is the initial length of the searched segment. The segment is first
/// widened so that its start lies outside (`>= 0`) and its end inside
/// (`<= 0`), stepping each end by 0.5 at most four times. If the ends then
/// disagree in sign, `iterations` bisection steps narrow the bracket. The
/// end whose sample is closest to zero is returned, even when no sign change
/// was found.
///
/// The returned distance is relative to `pos0` and may be negative when the
/// start had to be moved backwards.
pub fn approximate_distance_to_isosurface_binary_search<F>(
    field: &F,
    pos0: &Point3,
    dir: &Vec3,
    d1: f32,
    iterations: u8,
) -> f32
where
    F: ScalarField + ?Sized,
{
    let mut d0 = 0.0_f32;
    let mut d1 = d1;
    let mut sdf0 = field.sample(pos0);

    // The coarse hit may have undershot into matter; back out of it.
    for _ in 0..BRACKET_RETRIES {
        if sdf0 >= 0.0 {
            break;
        }
        d0 -= BRACKET_STEP;
        sdf0 = field.sample(&(pos0 + dir * d0));
    }

    let mut sdf1 = field.sample(&(pos0 + dir * d1));
    for _ in 0..BRACKET_RETRIES {
        if sdf1 <= 0.0 {
            break;
        }
        d1 += BRACKET_STEP;
        sdf1 = field.sample(&(pos0 + dir * d1));
    }

    if (sdf0 > 0.0) != (sdf1 > 0.0) {
        for _ in 0..iterations {
            let dm = 0.5 * (d0 + d1);
            let sdf_mid = field.sample(&(pos0 + dir * dm));
            if (sdf_mid > 0.0) != (sdf0 > 0.0) {
                sdf1 = sdf_mid;
                d1 = dm;
            } else {
                sdf0 = sdf_mid;
                d0 = dm;
            }
        }
    }

    if sdf0.abs() < sdf1.abs() {
        d0
    } else {
        d1
    }
}
