//! Grid traversal: walking the voxel lattice along a ray.
//!
//! The walk visits cells in order of increasing entry distance and asks a
//! [`CellPredicate`] about each one, stopping at the first accepted cell.

use voxcast_math::{floor_to_cell, Point3, Vec3, Vec3i};

use crate::ray::is_valid_query;

/// Decides whether a visited cell stops the walk.
///
/// Predicates only read storage; they never influence the walk beyond
/// their return value.
pub trait CellPredicate {
    /// Whether `cell` counts as a hit.
    fn accept(&self, cell: Vec3i) -> bool;
}

impl<F: Fn(Vec3i) -> bool> CellPredicate for F {
    fn accept(&self, cell: Vec3i) -> bool {
        self(cell)
    }
}

/// First accepted cell of a grid walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalHit {
    /// Accepted cell.
    pub position: Vec3i,
    /// Cell visited immediately before `position`.
    pub previous_position: Vec3i,
    /// Ray distance at which `position` was entered.
    pub distance: f32,
    /// Ray distance at which `previous_position` was entered (0 for the start cell).
    pub previous_distance: f32,
}

/// Walks a unit lattice along a ray.
pub trait GridTraversal {
    /// Visit cells from `origin` along `direction` until `predicate` accepts
    /// one or the next cell lies beyond `max_distance`.
    ///
    /// Each cell is offered to the predicate at most once, in strictly
    /// increasing distance order. Returns `None` on a miss.
    fn traverse<P: CellPredicate + ?Sized>(
        &self,
        origin: &Point3,
        direction: &Vec3,
        predicate: &P,
        max_distance: f32,
    ) -> Option<TraversalHit>;
}

/// Amanatides-Woo voxel walk over cells of size 1.
///
/// The cell containing the origin is never offered to the predicate, so a
/// hit always has a distinct previous cell sharing a face with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dda;

impl GridTraversal for Dda {
    fn traverse<P: CellPredicate + ?Sized>(
        &self,
        origin: &Point3,
        direction: &Vec3,
        predicate: &P,
        max_distance: f32,
    ) -> Option<TraversalHit> {
        if !is_valid_query(direction, max_distance) || !origin.iter().all(|c| c.is_finite()) {
            return None;
        }

        let mut cell = floor_to_cell(origin);
        let mut step = [0i32; 3];
        // Distances are accumulated in f64; an f32 sum stops growing past 2^24.
        // Ray distance to cross one cell along each axis.
        let mut t_delta = [f64::INFINITY; 3];
        // Ray distance of the next boundary crossing on each axis.
        let mut t_cross = [f64::INFINITY; 3];

        for i in 0..3 {
            let o = f64::from(origin[i]);
            let d = f64::from(direction[i]);
            let c = f64::from(cell[i]);
            if d > 0.0 {
                step[i] = 1;
                t_delta[i] = 1.0 / d;
                t_cross[i] = (c + 1.0 - o) / d;
            } else if d < 0.0 {
                step[i] = -1;
                t_delta[i] = -1.0 / d;
                t_cross[i] = (c - o) / d;
            }
        }

        let max_distance = f64::from(max_distance);
        let mut distance = 0.0_f64;
        loop {
            let axis = if t_cross[0] < t_cross[1] {
                if t_cross[0] < t_cross[2] {
                    0
                } else {
                    2
                }
            } else if t_cross[1] < t_cross[2] {
                1
            } else {
                2
            };

            let t = t_cross[axis];
            if t > max_distance {
                return None;
            }

            let previous_position = cell;
            let previous_distance = distance;
            // Walking off the i32 lattice ends the query.
            cell[axis] = cell[axis].checked_add(step[axis])?;
            distance = t;
            t_cross[axis] += t_delta[axis];

            if predicate.accept(cell) {
                return Some(TraversalHit {
                    position: cell,
                    previous_position,
                    distance: distance as f32,
                    previous_distance: previous_distance as f32,
                });
            }
        }
    }
}
