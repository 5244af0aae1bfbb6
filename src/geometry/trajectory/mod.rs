//! Parametric curves used as contour edges.
//!
//! Every variant shares the parameter domain `[0, 1]`. Straight and bezier
//! variants extrapolate outside that range, which the offset step relies on
//! when it pads edges past their end points.

mod bezier;
mod composite;
mod straight;

pub use bezier::BezierTrajectory;
pub use composite::CompositeTrajectory;
pub use straight::StraightTrajectory;

use crate::geometry::bounds::Aabb2;
use crate::math::polygon_2d::signed_angle;
use crate::math::{Point2, Vector2};

/// Tangent samples used to integrate the turning of a bezier.
const TURN_SAMPLES: u32 = 16;

/// Parameter step used when walking a curve by arc length.
const TRAVEL_STEP: f64 = 1.0 / 256.0;

/// A curve with domain `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Trajectory {
    Straight(StraightTrajectory),
    Bezier(BezierTrajectory),
    Composite(CompositeTrajectory),
}

impl From<StraightTrajectory> for Trajectory {
    fn from(value: StraightTrajectory) -> Self {
        Self::Straight(value)
    }
}

impl From<BezierTrajectory> for Trajectory {
    fn from(value: BezierTrajectory) -> Self {
        Self::Bezier(value)
    }
}

impl From<CompositeTrajectory> for Trajectory {
    fn from(value: CompositeTrajectory) -> Self {
        Self::Composite(value)
    }
}

impl Trajectory {
    /// Shorthand for a straight segment between two points.
    #[must_use]
    pub fn straight(start: Point2, end: Point2) -> Self {
        Self::Straight(StraightTrajectory::new(start, end))
    }

    /// Shorthand for a cubic bezier from its four control points.
    #[must_use]
    pub fn bezier(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self::Bezier(BezierTrajectory::new(p0, p1, p2, p3))
    }

    #[must_use]
    pub fn is_straight(&self) -> bool {
        matches!(self, Self::Straight(_))
    }

    #[must_use]
    pub fn position(&self, t: f64) -> Point2 {
        match self {
            Self::Straight(s) => s.position(t),
            Self::Bezier(b) => b.position(t),
            Self::Composite(c) => {
                let (part, local) = c.part_at(t);
                part.position(local)
            }
        }
    }

    /// Unit forward tangent at `t`.
    #[must_use]
    pub fn tangent(&self, t: f64) -> Vector2 {
        match self {
            Self::Straight(s) => s.direction(),
            Self::Bezier(b) => b.tangent(t),
            Self::Composite(c) => {
                let (part, local) = c.part_at(t);
                part.tangent(local)
            }
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Straight(s) => s.length(),
            Self::Bezier(b) => b.length(),
            Self::Composite(c) => c.parts().iter().map(Self::length).sum(),
        }
    }

    /// Straight-line distance between the end points.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        (self.end_position() - self.start_position()).norm()
    }

    /// Unsigned angle between the start and end tangents, in radians.
    #[must_use]
    pub fn delta_angle(&self) -> f64 {
        signed_angle(&self.tangent(0.0), &self.tangent(1.0)).abs()
    }

    /// Total signed turning of the tangent along the curve, counter-clockwise
    /// positive.
    #[must_use]
    pub fn signed_turn(&self) -> f64 {
        match self {
            Self::Straight(_) => 0.0,
            Self::Bezier(b) => {
                let mut total = 0.0;
                let mut prev = b.tangent(0.0);
                for k in 1..=TURN_SAMPLES {
                    let next = b.tangent(f64::from(k) / f64::from(TURN_SAMPLES));
                    total += signed_angle(&prev, &next);
                    prev = next;
                }
                total
            }
            Self::Composite(c) => {
                let parts = c.parts();
                let inner: f64 = parts.iter().map(Self::signed_turn).sum();
                let joints: f64 = parts
                    .windows(2)
                    .map(|w| signed_angle(&w[0].tangent(1.0), &w[1].tangent(0.0)))
                    .sum();
                inner + joints
            }
        }
    }

    #[must_use]
    pub fn start_position(&self) -> Point2 {
        match self {
            Self::Straight(s) => s.start(),
            Self::Bezier(b) => b.start(),
            Self::Composite(c) => c.first().start_position(),
        }
    }

    #[must_use]
    pub fn end_position(&self) -> Point2 {
        match self {
            Self::Straight(s) => s.end(),
            Self::Bezier(b) => b.end(),
            Self::Composite(c) => c.last().end_position(),
        }
    }

    /// Forward unit tangent at the start.
    #[must_use]
    pub fn start_direction(&self) -> Vector2 {
        self.tangent(0.0)
    }

    /// Unit tangent at the end pointing back into the curve.
    #[must_use]
    pub fn end_direction(&self) -> Vector2 {
        -self.tangent(1.0)
    }

    /// Sub-curve over `[t0, t1]`.
    ///
    /// Bounds may lie outside `[0, 1]`; `t0 > t1` returns the reversed piece.
    #[must_use]
    pub fn cut(&self, t0: f64, t1: f64) -> Self {
        match self {
            Self::Straight(s) => Self::Straight(s.cut(t0, t1)),
            Self::Bezier(b) => Self::Bezier(b.cut(t0, t1)),
            Self::Composite(c) => c.cut(t0, t1),
        }
    }

    /// Parallel offset to the left of travel; each end moves by its own
    /// distance.
    #[must_use]
    pub fn shift(&self, start_offset: f64, end_offset: f64) -> Self {
        match self {
            Self::Straight(s) => Self::Straight(s.shift(start_offset, end_offset)),
            Self::Bezier(b) => Self::Bezier(b.shift(start_offset, end_offset)),
            Self::Composite(c) => Self::Composite(c.shift(start_offset, end_offset)),
        }
    }

    /// Bisects the curve at `t = 0.5`.
    #[must_use]
    pub fn divide(&self) -> (Self, Self) {
        match self {
            Self::Straight(s) => {
                let (a, b) = s.divide();
                (a.into(), b.into())
            }
            Self::Bezier(b) => {
                let (l, r) = b.divide();
                (l.into(), r.into())
            }
            Self::Composite(_) => (self.cut(0.0, 0.5), self.cut(0.5, 1.0)),
        }
    }

    /// Parameter reached after moving `distance` along the curve from `t`.
    ///
    /// Negative distances walk backward. The result is clamped to `[0, 1]`
    /// for curved variants.
    #[must_use]
    pub fn travel(&self, t: f64, distance: f64) -> f64 {
        if let Self::Straight(s) = self {
            let len = s.length();
            return if len > 0.0 { t + distance / len } else { t };
        }
        let step = if distance >= 0.0 { TRAVEL_STEP } else { -TRAVEL_STEP };
        let target = distance.abs();
        let mut walked = 0.0;
        let mut current = t;
        let mut pos = self.position(current);
        while (0.0..=1.0).contains(&current) {
            let next = (current + step).clamp(0.0, 1.0);
            if (next - current).abs() < f64::EPSILON {
                break;
            }
            let next_pos = self.position(next);
            let d = (next_pos - pos).norm();
            if walked + d >= target {
                let fraction = if d > 0.0 { (target - walked) / d } else { 0.0 };
                return current + (next - current) * fraction;
            }
            walked += d;
            current = next;
            pos = next_pos;
        }
        current
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Straight(s) => Self::Straight(s.reversed()),
            Self::Bezier(b) => Self::Bezier(b.reversed()),
            Self::Composite(c) => Self::Composite(c.reversed()),
        }
    }

    /// Conservative bounds from the control polygon.
    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        match self {
            Self::Straight(s) => Aabb2::from_points(&[s.start(), s.end()]),
            Self::Bezier(b) => Aabb2::from_points(b.points()),
            Self::Composite(c) => c
                .parts()
                .iter()
                .fold(Aabb2::empty(), |acc, p| acc.union(&p.bounds())),
        }
    }

    /// Appends the leading control points: one for a straight, three for a
    /// bezier. The end point belongs to the next edge.
    pub fn append_control_points(&self, out: &mut Vec<Point2>) {
        match self {
            Self::Straight(s) => out.push(s.start()),
            Self::Bezier(b) => out.extend_from_slice(&b.points()[..3]),
            Self::Composite(c) => {
                for part in c.parts() {
                    part.append_control_points(out);
                }
            }
        }
    }

    /// Flattens composites into their leaf pieces, dropping pieces shorter
    /// than `min_length`.
    #[must_use]
    pub fn split_pieces(self, min_length: f64) -> Vec<Self> {
        let mut out = Vec::new();
        self.collect_pieces(min_length, &mut out);
        out
    }

    fn collect_pieces(self, min_length: f64, out: &mut Vec<Self>) {
        match self {
            Self::Composite(c) => {
                for part in c.into_parts() {
                    part.collect_pieces(min_length, out);
                }
            }
            leaf => {
                if leaf.length() >= min_length {
                    out.push(leaf);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn quarter() -> Trajectory {
        // Approximate quarter circle of radius 10 turning left.
        let k = 10.0 * 0.552_284_749_8;
        Trajectory::bezier(
            Point2::new(10.0, 0.0),
            Point2::new(10.0, k),
            Point2::new(k, 10.0),
            Point2::new(0.0, 10.0),
        )
    }

    fn padded() -> Trajectory {
        CompositeTrajectory::new(vec![
            Trajectory::straight(Point2::new(10.0, -5.0), Point2::new(10.0, 0.0)),
            quarter(),
            Trajectory::straight(Point2::new(0.0, 10.0), Point2::new(-5.0, 10.0)),
        ])
        .unwrap()
        .into()
    }

    #[test]
    fn quarter_circle_turns_left_by_right_angle() {
        let q = quarter();
        assert_abs_diff_eq!(q.signed_turn(), FRAC_PI_2, epsilon = 1e-6);
        assert_abs_diff_eq!(q.delta_angle(), FRAC_PI_2, epsilon = 1e-6);
        assert_abs_diff_eq!(q.length(), 10.0 * FRAC_PI_2, epsilon = 1e-2);
    }

    #[test]
    fn end_direction_points_back_into_curve() {
        let s = Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(3.0, 0.0));
        assert_abs_diff_eq!(s.start_direction(), Vector2::new(1.0, 0.0));
        assert_abs_diff_eq!(s.end_direction(), Vector2::new(-1.0, 0.0));
    }

    #[test]
    fn composite_middle_third_is_the_curve() {
        let c = padded();
        assert_abs_diff_eq!(c.position(1.0 / 3.0), Point2::new(10.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(c.position(2.0 / 3.0), Point2::new(0.0, 10.0), epsilon = 1e-9);
        let middle = c.cut(1.0 / 3.0, 2.0 / 3.0);
        assert!(matches!(middle, Trajectory::Bezier(_)));
    }

    #[test]
    fn composite_cut_spanning_parts_stays_connected() {
        let c = padded();
        let piece = c.cut(0.2, 0.9);
        assert_abs_diff_eq!(piece.start_position(), c.position(0.2), epsilon = 1e-9);
        assert_abs_diff_eq!(piece.end_position(), c.position(0.9), epsilon = 1e-9);
        let pieces = piece.split_pieces(0.05);
        assert_eq!(pieces.len(), 3);
        for w in pieces.windows(2) {
            assert_abs_diff_eq!(w[0].end_position(), w[1].start_position(), epsilon = 1e-9);
        }
    }

    #[test]
    fn split_pieces_drops_short_fragments() {
        let c = padded().cut(0.0, 1.0 / 3.0 + 1e-6);
        let pieces = c.split_pieces(0.05);
        assert_eq!(pieces.len(), 1);
        assert!(pieces[0].is_straight());
    }

    #[test]
    fn travel_on_straight_is_linear() {
        let s = Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert_abs_diff_eq!(s.travel(0.25, 2.0), 0.75);
        assert_abs_diff_eq!(s.travel(0.5, -2.0), 0.0);
    }

    #[test]
    fn travel_on_curve_matches_length() {
        let q = quarter();
        let t = q.travel(0.0, q.length() * 0.5);
        assert_abs_diff_eq!(t, 0.5, epsilon = 0.02);
    }

    #[test]
    fn control_points_per_variant() {
        let mut pts = Vec::new();
        quarter().append_control_points(&mut pts);
        assert_eq!(pts.len(), 3);
        pts.clear();
        Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0))
            .append_control_points(&mut pts);
        assert_eq!(pts.len(), 1);
    }
}
