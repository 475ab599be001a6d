//! Axis-aligned bounding boxes.

use crate::{Point3, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from its minimum corner and its size.
    pub fn from_position_size(position: Point3, size: Vec3) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    /// The unit cube `[0, 1]³`.
    pub fn unit() -> Self {
        Self::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    /// The same box moved by `offset`.
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Test if the segment `from -> to` touches the box.
    ///
    /// Clips the segment parameter range `[0, 1]` against each slab in turn.
    /// A segment lying entirely inside the box intersects it.
    pub fn intersects_segment(&self, from: &Point3, to: &Point3) -> bool {
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for i in 0..3 {
            let seg_from = from[i];
            let seg_to = to[i];
            let box_begin = self.min[i];
            let box_end = self.max[i];
            let length = seg_to - seg_from;

            let (c_min, c_max) = if seg_from < seg_to {
                if seg_from > box_end || seg_to < box_begin {
                    return false;
                }
                let c_min = if seg_from < box_begin {
                    (box_begin - seg_from) / length
                } else {
                    0.0
                };
                let c_max = if seg_to > box_end {
                    (box_end - seg_from) / length
                } else {
                    1.0
                };
                (c_min, c_max)
            } else {
                if seg_to > box_end || seg_from < box_begin {
                    return false;
                }
                // `length` is zero only when both ends sit inside this slab,
                // in which case neither branch below divides.
                let c_min = if seg_from > box_end {
                    (box_end - seg_from) / length
                } else {
                    0.0
                };
                let c_max = if seg_to < box_begin {
                    (box_begin - seg_from) / length
                } else {
                    1.0
                };
                (c_min, c_max)
            };

            t_min = t_min.max(c_min);
            t_max = t_max.min(c_max);
            if t_max < t_min {
                return false;
            }
        }

        true
    }
}
