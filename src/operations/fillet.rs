use std::f64::consts::PI;

use tracing::{debug, trace};

use crate::error::{ensure_finite, OperationError, Result};
use crate::geometry::contour::{Contour, Edge};
use crate::geometry::trajectory::{BezierTrajectory, Trajectory};
use crate::math::intersect_2d::line_line_intersect_2d;
use crate::math::polygon_2d::{left_normal, signed_angle};

use super::subdivide::{subdivide_to_vec, SubdivideOptions};

/// Corners turning less than this (radians) are already smooth.
const MIN_TURN: f64 = 1e-6;

/// Trims leaving less than this fraction of an edge consume it entirely.
const MIN_REMAINDER: f64 = 1e-9;

/// Tunables for [`CornerFillet`].
#[derive(Debug, Clone, Copy)]
pub struct FilletOptions {
    /// How edges are flattened for the tangency search.
    pub subdivide: SubdivideOptions,
    /// Slack on the parametric hit point when testing a flattened piece.
    pub hit_tolerance: f64,
    /// Maximum number of rings searched outward from each corner.
    pub max_rings: usize,
}

impl Default for FilletOptions {
    fn default() -> Self {
        Self {
            subdivide: SubdivideOptions::default(),
            hit_tolerance: 0.001,
            max_rings: 32,
        }
    }
}

/// Rounds contour corners with cubic arcs.
///
/// Corners next to an enter edge use `median_radius`; all others use
/// `line_radius`. A zero radius leaves the corner sharp, as does a radius
/// too large for the adjacent edges.
#[derive(Debug)]
pub struct CornerFillet {
    line_radius: f64,
    median_radius: f64,
    options: FilletOptions,
}

/// A found tangency: where to trim both edges and the arc between them.
struct Tangency {
    trim_a: f64,
    trim_b: f64,
}

impl CornerFillet {
    #[must_use]
    pub fn new(line_radius: f64, median_radius: f64) -> Self {
        Self {
            line_radius,
            median_radius,
            options: FilletOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FilletOptions) -> Self {
        self.options = options;
        self
    }

    /// Fillets every feasible corner in place and returns how many corners
    /// were rounded.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite or negative radii, or invalid
    /// subdivision options.
    pub fn apply(&self, contour: &mut Contour) -> Result<usize> {
        for (name, value) in [
            ("line_radius", self.line_radius),
            ("median_radius", self.median_radius),
        ] {
            ensure_finite(name, value)?;
            if value < 0.0 {
                return Err(OperationError::InvalidInput(format!(
                    "{name} must not be negative, got {value}"
                ))
                .into());
            }
        }
        self.options.subdivide.validate()?;

        if contour.len() < 2 || (self.line_radius <= 0.0 && self.median_radius <= 0.0) {
            return Ok(0);
        }

        let corners = contour.len();
        let mut rounded = 0;
        let mut i = 0;
        for _ in 0..corners {
            let j = (i + 1) % contour.len();
            let a = contour.edges()[i].clone();
            let b = contour.edges()[j].clone();
            let radius = if a.is_enter() || b.is_enter() {
                self.median_radius
            } else {
                self.line_radius
            };

            let Some((trimmed_a, arc, trimmed_b)) = self.round_corner(&a, &b, radius) else {
                i += 1;
                continue;
            };

            contour.replace(i, trimmed_a);
            contour.replace(j, trimmed_b);
            if j == 0 {
                contour.push(arc);
            } else {
                contour.insert(i + 1, arc);
            }
            rounded += 1;
            i += 2;
        }

        debug!(corners, rounded, "corner fillet applied");
        Ok(rounded)
    }

    /// Trimmed `a`, the arc, and trimmed `b`, or `None` when the corner stays
    /// sharp.
    fn round_corner(&self, a: &Edge, b: &Edge, radius: f64) -> Option<(Edge, Edge, Edge)> {
        if radius <= 0.0 {
            return None;
        }
        let ta = a.trajectory();
        let tb = b.trajectory();
        let turn = signed_angle(&ta.tangent(1.0), &tb.tangent(0.0));
        if turn.abs() < MIN_TURN || turn.abs() > PI - MIN_TURN {
            return None;
        }

        let Some(hit) = self.find_tangency(ta, tb, radius, turn.signum()) else {
            trace!(radius, "corner infeasible, left sharp");
            return None;
        };
        if hit.trim_a <= MIN_REMAINDER || hit.trim_b >= 1.0 - MIN_REMAINDER {
            return None;
        }

        let cut_a = ta.cut(0.0, hit.trim_a);
        let cut_b = tb.cut(hit.trim_b, 1.0);
        let forward_a = -cut_a.end_direction();
        let forward_b = cut_b.start_direction();
        let theta = signed_angle(&forward_a, &forward_b).abs();
        let handle = 4.0 / 3.0 * (theta / 4.0).tan() * radius;
        let arc = BezierTrajectory::from_directions(
            cut_a.end_position(),
            forward_a,
            cut_b.start_position(),
            -forward_b,
            handle,
        );

        Some((
            a.with_trajectory(cut_a),
            Edge::new(Trajectory::Bezier(arc), a.is_enter() && b.is_enter()),
            b.with_trajectory(cut_b),
        ))
    }

    /// Searches flattened pieces in rings around the corner for a pair whose
    /// radius-offset lines meet within both pieces.
    fn find_tangency(
        &self,
        a: &Trajectory,
        b: &Trajectory,
        radius: f64,
        side: f64,
    ) -> Option<Tangency> {
        // Ring 0 holds the pieces touching the corner.
        let mut pieces_a = subdivide_to_vec(a, &self.options.subdivide);
        pieces_a.reverse();
        let pieces_b = subdivide_to_vec(b, &self.options.subdivide);

        let rings = pieces_a.len().max(pieces_b.len()).min(self.options.max_rings);
        for ring in 0..rings {
            let pairs = (0..=ring)
                .map(|ia| (ia, ring))
                .chain((0..ring).map(|ib| (ring, ib)));
            for (ia, ib) in pairs {
                let (Some(pa), Some(pb)) = (pieces_a.get(ia), pieces_b.get(ib)) else {
                    continue;
                };
                if let Some(hit) = self.tangency(pa, pb, radius, side) {
                    return Some(hit);
                }
            }
        }
        None
    }

    fn tangency(
        &self,
        (piece_a, a0, a1): &(Trajectory, f64, f64),
        (piece_b, b0, b1): &(Trajectory, f64, f64),
        radius: f64,
        side: f64,
    ) -> Option<Tangency> {
        let start_a = piece_a.start_position();
        let dir_a = piece_a.end_position() - start_a;
        let start_b = piece_b.start_position();
        let dir_b = piece_b.end_position() - start_b;
        let offset_a = left_normal(&dir_a.normalize()) * (radius * side);
        let offset_b = left_normal(&dir_b.normalize()) * (radius * side);

        let (ua, ub) = line_line_intersect_2d(
            &(start_a + offset_a),
            &dir_a,
            &(start_b + offset_b),
            &dir_b,
        )?;
        let tol = self.options.hit_tolerance;
        let inside = |u: f64| u >= -tol && u <= 1.0 + tol;
        if !inside(ua) || !inside(ub) {
            return None;
        }
        Some(Tangency {
            trim_a: a0 + ua.clamp(0.0, 1.0) * (a1 - a0),
            trim_b: b0 + ub.clamp(0.0, 1.0) * (b1 - b0),
        })
    }
}

/// Rounds the corners of `contour` in place.
///
/// # Errors
///
/// See [`CornerFillet::apply`].
pub fn set_corner_radius(contour: &mut Contour, line_radius: f64, median_radius: f64) -> Result<usize> {
    CornerFillet::new(line_radius, median_radius).apply(contour)
}
