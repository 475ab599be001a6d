//! Ray representation and query results.

use voxcast_math::{Point3, Vec3, Vec3i};

use crate::{RaycastError, Result};

/// Squared direction length below which a direction is considered zero.
pub(crate) const MIN_DIRECTION_LENGTH_SQ: f32 = 1e-12;

/// Whether `direction` and `max_distance` describe a usable query.
pub(crate) fn is_valid_query(direction: &Vec3, max_distance: f32) -> bool {
    direction.iter().all(|c| c.is_finite())
        && direction.norm_squared() >= MIN_DIRECTION_LENGTH_SQ
        && max_distance.is_finite()
        && max_distance > 0.0
}

/// A bounded ray: origin, unit direction and maximum distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Vec3,
    /// Distance along `direction` beyond which nothing is reported.
    pub max_distance: f32,
}

impl Ray {
    /// Create a ray. The direction is normalized.
    ///
    /// Fails on a zero-length or non-finite direction, and on a max distance
    /// that is not positive and finite.
    pub fn new(origin: Point3, direction: Vec3, max_distance: f32) -> Result<Self> {
        if !direction.iter().all(|c| c.is_finite())
            || direction.norm_squared() < MIN_DIRECTION_LENGTH_SQ
        {
            return Err(RaycastError::InvalidDirection(direction.into()));
        }
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(RaycastError::InvalidMaxDistance(max_distance));
        }
        Ok(Self {
            origin,
            direction: direction.normalize(),
            max_distance,
        })
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }

    /// Point at the maximum distance.
    pub fn end(&self) -> Point3 {
        self.at(self.max_distance)
    }
}

/// First hit of a voxel raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Cell that was hit.
    pub position: Vec3i,
    /// Cell visited immediately before the hit cell.
    pub previous_position: Vec3i,
    /// Distance from the ray origin to the hit, in ray units.
    pub distance_along_ray: f32,
}

impl RaycastHit {
    /// Create a hit.
    pub fn new(position: Vec3i, previous_position: Vec3i, distance_along_ray: f32) -> Self {
        Self {
            position,
            previous_position,
            distance_along_ray,
        }
    }

    /// Offset from the hit cell to the cell the ray came from.
    ///
    /// For a grid walk this is the outward normal of the entered face.
    pub fn normal(&self) -> Vec3i {
        self.previous_position - self.position
    }

    /// Point on `ray` at the hit distance.
    pub fn hit_point(&self, ray: &Ray) -> Point3 {
        ray.at(self.distance_along_ray)
    }
}
