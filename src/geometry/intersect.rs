//! Curve-curve intersection and half-plane classification.

use crate::geometry::bounds::Aabb2;
use crate::geometry::intersection::{Intersection, IntersectionOrder};
use crate::geometry::trajectory::{BezierTrajectory, CompositeTrajectory, Trajectory};
use crate::math::intersect_2d::{project_onto_line, segment_segment_intersect_2d};
use crate::math::roots::solve_cubic;
use crate::math::{Point2, Vector2, TOLERANCE};

/// Below this flatness a bezier piece is intersected as its chord.
const FLATNESS: f64 = 1e-5;

const MAX_DEPTH: u32 = 32;

/// Margin admitted around `[0, 1]` when accepting a hit.
const PARAM_EPS: f64 = 1e-9;

/// Hits closer than this in both parameters are the same crossing.
const DUPLICATE_EPS: f64 = 1e-6;

/// Side of a directed line a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Classifies `offset` (a point relative to the line origin) against a line
/// running along `direction`. Points on the line count as [`Side::Right`].
#[must_use]
pub fn get_side(direction: &Vector2, offset: &Vector2) -> Side {
    if direction.perp(offset) > 0.0 {
        Side::Left
    } else {
        Side::Right
    }
}

/// All crossings of `a` and `b`, sorted by the parameter on `a`.
#[must_use]
pub fn calculate(a: &Trajectory, b: &Trajectory) -> Vec<Intersection> {
    let mut hits = Vec::new();
    collect(a, b, &mut hits);
    IntersectionOrder::First.sort(&mut hits);
    hits.dedup_by(|x, y| {
        (x.first_t - y.first_t).abs() < DUPLICATE_EPS
            && (x.second_t - y.second_t).abs() < DUPLICATE_EPS
    });
    hits
}

/// Fast rejection: `false` only when `bounds` certainly misses `line`.
#[must_use]
pub fn can_intersect_bounds(bounds: &Aabb2, line: &Trajectory) -> bool {
    if bounds.is_empty() || !bounds.intersects(&line.bounds()) {
        return false;
    }
    straddles(&bounds.corners(), line)
}

/// Like [`can_intersect_bounds`] but tests every point of a polyline.
#[must_use]
pub fn can_intersect_points(points: &[Point2], line: &Trajectory) -> bool {
    if points.is_empty() || !Aabb2::from_points(points).intersects(&line.bounds()) {
        return false;
    }
    straddles(points, line)
}

/// Whether the points are not all strictly on one side of the line's chord.
/// A curve can bow past its chord, so only straight lines are tested.
fn straddles(points: &[Point2], line: &Trajectory) -> bool {
    if !line.is_straight() {
        return true;
    }
    let origin = line.start_position();
    let dir = line.end_position() - origin;
    let mut left = false;
    let mut right = false;
    for p in points {
        let cross = dir.perp(&(p - origin));
        if cross.abs() <= TOLERANCE {
            return true;
        }
        if cross > 0.0 {
            left = true;
        } else {
            right = true;
        }
        if left && right {
            return true;
        }
    }
    false
}

fn collect(a: &Trajectory, b: &Trajectory, out: &mut Vec<Intersection>) {
    match (a, b) {
        (Trajectory::Composite(c), _) => collect_composite(c, b, out, false),
        (_, Trajectory::Composite(c)) => collect_composite(c, a, out, true),
        (Trajectory::Straight(s1), Trajectory::Straight(s2)) => {
            if let Some((t, u)) =
                segment_segment_intersect_2d(&s1.start(), &s1.end(), &s2.start(), &s2.end(), PARAM_EPS)
            {
                out.push(Intersection::new(t, u));
            }
        }
        (Trajectory::Straight(s), Trajectory::Bezier(bz)) => {
            out.extend(
                bezier_segment(bz, s.start(), s.end())
                    .into_iter()
                    .map(|(tb, ts)| Intersection::new(ts, tb)),
            );
        }
        (Trajectory::Bezier(bz), Trajectory::Straight(s)) => {
            out.extend(
                bezier_segment(bz, s.start(), s.end())
                    .into_iter()
                    .map(|(tb, ts)| Intersection::new(tb, ts)),
            );
        }
        (Trajectory::Bezier(b1), Trajectory::Bezier(b2)) => {
            bezier_bezier(b1, (0.0, 1.0), b2, (0.0, 1.0), 0, out);
        }
    }
}

/// Intersects every part of `composite` with `other`, mapping local
/// parameters back to the composite domain. `swapped` puts the composite on
/// the second side of the result.
fn collect_composite(
    composite: &CompositeTrajectory,
    other: &Trajectory,
    out: &mut Vec<Intersection>,
    swapped: bool,
) {
    for (i, part) in composite.parts().iter().enumerate() {
        let mut local = Vec::new();
        collect(part, other, &mut local);
        for hit in local {
            let t = composite.global(i, hit.first_t);
            out.push(if swapped {
                Intersection::new(hit.second_t, t)
            } else {
                Intersection::new(t, hit.second_t)
            });
        }
    }
}

/// Roots of the bezier against a segment, as `(t_bezier, t_segment)`.
fn bezier_segment(curve: &BezierTrajectory, s0: Point2, s1: Point2) -> Vec<(f64, f64)> {
    let d = s1 - s0;
    if d.norm() < TOLERANCE {
        return Vec::new();
    }
    // Signed distances of the control points from the segment's line.
    let [p0, p1, p2, p3] = *curve.points();
    let dist = |p: Point2| d.perp(&(p - s0));
    let (v0, v1, v2, v3) = (dist(p0), dist(p1), dist(p2), dist(p3));
    let a = -v0 + 3.0 * v1 - 3.0 * v2 + v3;
    let b = 3.0 * v0 - 6.0 * v1 + 3.0 * v2;
    let c = -3.0 * v0 + 3.0 * v1;
    solve_cubic(a, b, c, v0)
        .into_iter()
        .filter(|t| (-PARAM_EPS..=1.0 + PARAM_EPS).contains(t))
        .filter_map(|t| {
            let t = t.clamp(0.0, 1.0);
            let u = project_onto_line(&curve.position(t), &s0, &s1);
            (-PARAM_EPS..=1.0 + PARAM_EPS)
                .contains(&u)
                .then(|| (t, u.clamp(0.0, 1.0)))
        })
        .collect()
}

fn bezier_bezier(
    a: &BezierTrajectory,
    range_a: (f64, f64),
    b: &BezierTrajectory,
    range_b: (f64, f64),
    depth: u32,
    out: &mut Vec<Intersection>,
) {
    if !Aabb2::from_points(a.points()).intersects(&Aabb2::from_points(b.points())) {
        return;
    }
    let flat_a = a.flatness() < FLATNESS;
    let flat_b = b.flatness() < FLATNESS;
    if depth >= MAX_DEPTH || (flat_a && flat_b) {
        if let Some((s, u)) =
            segment_segment_intersect_2d(&a.start(), &a.end(), &b.start(), &b.end(), PARAM_EPS)
        {
            out.push(Intersection::new(
                range_a.0 + s * (range_a.1 - range_a.0),
                range_b.0 + u * (range_b.1 - range_b.0),
            ));
        }
        return;
    }
    let mid = |r: (f64, f64)| (r.0 + r.1) * 0.5;
    match (flat_a, flat_b) {
        (false, true) => {
            let (l, r) = a.divide();
            let m = mid(range_a);
            bezier_bezier(&l, (range_a.0, m), b, range_b, depth + 1, out);
            bezier_bezier(&r, (m, range_a.1), b, range_b, depth + 1, out);
        }
        (true, false) => {
            let (l, r) = b.divide();
            let m = mid(range_b);
            bezier_bezier(a, range_a, &l, (range_b.0, m), depth + 1, out);
            bezier_bezier(a, range_a, &r, (m, range_b.1), depth + 1, out);
        }
        _ => {
            let (al, ar) = a.divide();
            let (bl, br) = b.divide();
            let ma = mid(range_a);
            let mb = mid(range_b);
            bezier_bezier(&al, (range_a.0, ma), &bl, (range_b.0, mb), depth + 1, out);
            bezier_bezier(&al, (range_a.0, ma), &br, (mb, range_b.1), depth + 1, out);
            bezier_bezier(&ar, (ma, range_a.1), &bl, (range_b.0, mb), depth + 1, out);
            bezier_bezier(&ar, (ma, range_a.1), &br, (mb, range_b.1), depth + 1, out);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn arch() -> Trajectory {
        Trajectory::bezier(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 4.0),
            Point2::new(4.0, 4.0),
            Point2::new(4.0, 0.0),
        )
    }

    #[test]
    fn straight_straight_crossing() {
        let a = Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let b = Trajectory::straight(Point2::new(1.0, -1.0), Point2::new(1.0, 3.0));
        let hits = calculate(&a, &b);
        assert_eq!(hits.len(), 1);
        assert_abs_diff_eq!(hits[0].first_t, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(hits[0].second_t, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn line_crosses_arch_twice() {
        let line = Trajectory::straight(Point2::new(-1.0, 1.0), Point2::new(5.0, 1.0));
        let hits = calculate(&line, &arch());
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            let p = line.position(hit.first_t);
            let q = arch().position(hit.second_t);
            assert_abs_diff_eq!(p, q, epsilon = 1e-6);
        }
        assert!(hits[0].first_t < hits[1].first_t);
    }

    #[test]
    fn bezier_bezier_crossing() {
        let other = Trajectory::bezier(
            Point2::new(-1.0, 2.0),
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 1.0),
            Point2::new(5.0, 2.0),
        );
        let hits = calculate(&arch(), &other);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_abs_diff_eq!(
                arch().position(hit.first_t),
                other.position(hit.second_t),
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn composite_parameters_are_global() {
        let composite: Trajectory = CompositeTrajectory::new(vec![
            Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            Trajectory::straight(Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)),
        ])
        .unwrap()
        .into();
        let cutter = Trajectory::straight(Point2::new(1.5, -1.0), Point2::new(1.5, 1.0));
        let hits = calculate(&cutter, &composite);
        assert_eq!(hits.len(), 1);
        assert_abs_diff_eq!(hits[0].second_t, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn side_of_line() {
        let dir = Vector2::new(1.0, 0.0);
        assert_eq!(get_side(&dir, &Vector2::new(0.0, 1.0)), Side::Left);
        assert_eq!(get_side(&dir, &Vector2::new(0.0, -1.0)), Side::Right);
    }

    #[test]
    fn rejection_tests() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
        ];
        let crossing = Trajectory::straight(Point2::new(-1.0, 1.0), Point2::new(3.0, 1.0));
        let missing = Trajectory::straight(Point2::new(-1.0, 3.0), Point2::new(3.0, 3.0));
        assert!(can_intersect_points(&pts, &crossing));
        assert!(!can_intersect_points(&pts, &missing));
        assert!(can_intersect_bounds(&Aabb2::from_points(&pts), &crossing));
        assert!(!can_intersect_bounds(&Aabb2::from_points(&pts), &missing));
    }
}
