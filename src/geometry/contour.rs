use std::cell::OnceCell;
use std::f64::consts::PI;

use crate::geometry::bounds::Aabb2;
use crate::geometry::intersect::{can_intersect_bounds, can_intersect_points};
use crate::geometry::trajectory::Trajectory;
use crate::math::polygon_2d::signed_angle;
use crate::math::Point2;

/// One curve of a contour.
///
/// `is_enter` marks an edge bordering a median (inner) region; it selects
/// which of the two offset distances applies to the edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    trajectory: Trajectory,
    is_enter: bool,
}

impl Edge {
    #[must_use]
    pub fn new(trajectory: Trajectory, is_enter: bool) -> Self {
        Self {
            trajectory,
            is_enter,
        }
    }

    /// An outer-boundary edge.
    #[must_use]
    pub fn line(trajectory: Trajectory) -> Self {
        Self::new(trajectory, false)
    }

    #[must_use]
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.is_enter
    }

    /// Same classification, different curve.
    #[must_use]
    pub fn with_trajectory(&self, trajectory: Trajectory) -> Self {
        Self::new(trajectory, self.is_enter)
    }
}

/// Orientation of a closed contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindingDirection {
    Clockwise,
    CounterClockwise,
}

impl WindingDirection {
    /// `+1` for counter-clockwise, `-1` for clockwise.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::CounterClockwise => 1.0,
            Self::Clockwise => -1.0,
        }
    }
}

/// Derived geometry cached until the next mutation.
#[derive(Debug, Clone, Default)]
struct Derived {
    limits: OnceCell<Aabb2>,
    points: OnceCell<Vec<Point2>>,
}

/// A closed loop of edges; edge `i` ends where edge `i + 1` starts.
///
/// Bounds and the control-point sample are computed lazily and dropped by
/// every mutating method.
#[derive(Debug, Clone, Default)]
pub struct Contour {
    edges: Vec<Edge>,
    derived: Derived,
}

impl PartialEq for Contour {
    fn eq(&self, other: &Self) -> bool {
        self.edges == other.edges
    }
}

impl Contour {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        Self {
            edges,
            derived: Derived::default(),
        }
    }

    /// Builds a straight-edged contour through `points`, closing back to the
    /// first one. All edges are outer-boundary edges.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Self {
        let n = points.len();
        (0..n)
            .map(|i| Edge::line(Trajectory::straight(points[i], points[(i + 1) % n])))
            .collect()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
        self.invalidate();
    }

    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, edge: Edge) {
        self.edges.insert(index, edge);
        self.invalidate();
    }

    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Edge {
        let edge = self.edges.remove(index);
        self.invalidate();
        edge
    }

    /// Replaces the edge at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn replace(&mut self, index: usize, edge: Edge) -> Edge {
        let old = std::mem::replace(&mut self.edges[index], edge);
        self.invalidate();
        old
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = Edge>) {
        self.edges.extend(edges);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.derived = Derived::default();
    }

    /// Axis-aligned bounds of all edge control polygons.
    pub fn limits(&self) -> Aabb2 {
        *self.derived.limits.get_or_init(|| {
            self.edges
                .iter()
                .fold(Aabb2::empty(), |acc, e| acc.union(&e.trajectory.bounds()))
        })
    }

    /// One point per straight edge and three per bezier edge, in order.
    pub fn points(&self) -> &[Point2] {
        self.derived.points.get_or_init(|| {
            let mut out = Vec::with_capacity(self.edges.len() * 3);
            for edge in &self.edges {
                edge.trajectory.append_control_points(&mut out);
            }
            out
        })
    }

    /// Fast rejection: `false` only when `line` certainly misses the contour.
    ///
    /// With `precise` the point sample is tested instead of the bounds.
    pub fn can_intersect(&self, line: &Trajectory, precise: bool) -> bool {
        if precise {
            can_intersect_points(self.points(), line)
        } else {
            can_intersect_bounds(&self.limits(), line)
        }
    }

    /// Total turning of the tangent around the loop: inside each edge plus at
    /// every corner. Close to `±2π` for a simple contour.
    pub fn total_turn(&self) -> f64 {
        let n = self.edges.len();
        (0..n)
            .map(|i| {
                let edge = &self.edges[i].trajectory;
                let next = &self.edges[(i + 1) % n].trajectory;
                edge.signed_turn() + signed_angle(&edge.tangent(1.0), &next.tangent(0.0))
            })
            .sum()
    }

    /// Winding derived from the aggregate turning of all edge tangents.
    pub fn direction(&self) -> WindingDirection {
        if self.total_turn() >= 0.0 {
            WindingDirection::CounterClockwise
        } else {
            WindingDirection::Clockwise
        }
    }

    /// Sum of edge lengths.
    pub fn length(&self) -> f64 {
        self.edges.iter().map(|e| e.trajectory.length()).sum()
    }

    /// Position at a global parameter `edge_index + local_t`, wrapping
    /// around the loop.
    pub fn position(&self, global_t: f64) -> Point2 {
        let (index, local) = self.locate(global_t);
        self.edges[index].trajectory.position(local)
    }

    /// Splits a global parameter into `(edge index, local t)`.
    ///
    /// # Panics
    ///
    /// Panics on an empty contour.
    pub fn locate(&self, global_t: f64) -> (usize, f64) {
        #[allow(clippy::cast_precision_loss)]
        let n = self.edges.len() as f64;
        let wrapped = global_t.rem_euclid(n);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (wrapped.floor() as usize).min(self.edges.len() - 1);
        #[allow(clippy::cast_precision_loss)]
        let local = wrapped - index as f64;
        (index, local)
    }

    /// The same loop traversed the other way.
    #[must_use]
    pub fn reversed(&self) -> Self {
        self.edges
            .iter()
            .rev()
            .map(|e| e.with_trajectory(e.trajectory.reversed()))
            .collect()
    }

    /// Largest gap between an edge end and the next edge start.
    pub fn max_gap(&self) -> f64 {
        let n = self.edges.len();
        (0..n)
            .map(|i| {
                let end = self.edges[i].trajectory.end_position();
                let start = self.edges[(i + 1) % n].trajectory.start_position();
                (start - end).norm()
            })
            .fold(0.0, f64::max)
    }
}

impl FromIterator<Edge> for Contour {
    fn from_iter<T: IntoIterator<Item = Edge>>(iter: T) -> Self {
        Self::from_edges(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Contour {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// An ordered set of contours, the result of a cut or an offset.
#[derive(Debug, Clone, Default)]
pub struct ContourGroup {
    contours: Vec<Contour>,
    derived: Derived,
}

impl PartialEq for ContourGroup {
    fn eq(&self, other: &Self) -> bool {
        self.contours == other.contours
    }
}

impl ContourGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    pub fn push(&mut self, contour: Contour) {
        self.contours.push(contour);
        self.invalidate();
    }

    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, contour: Contour) {
        self.contours.insert(index, contour);
        self.invalidate();
    }

    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Contour {
        let contour = self.contours.remove(index);
        self.invalidate();
        contour
    }

    pub fn extend(&mut self, contours: impl IntoIterator<Item = Contour>) {
        self.contours.extend(contours);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.derived = Derived::default();
    }

    pub fn limits(&self) -> Aabb2 {
        *self.derived.limits.get_or_init(|| {
            self.contours
                .iter()
                .fold(Aabb2::empty(), |acc, c| acc.union(&c.limits()))
        })
    }

    pub fn points(&self) -> &[Point2] {
        self.derived.points.get_or_init(|| {
            self.contours
                .iter()
                .flat_map(|c| c.points().iter().copied())
                .collect()
        })
    }

    pub fn can_intersect(&self, line: &Trajectory, precise: bool) -> bool {
        if precise {
            can_intersect_points(self.points(), line)
        } else {
            can_intersect_bounds(&self.limits(), line)
        }
    }

    pub fn length(&self) -> f64 {
        self.contours.iter().map(Contour::length).sum()
    }

    #[must_use]
    pub fn into_contours(self) -> Vec<Contour> {
        self.contours
    }
}

impl FromIterator<Contour> for ContourGroup {
    fn from_iter<T: IntoIterator<Item = Contour>>(iter: T) -> Self {
        Self {
            contours: iter.into_iter().collect(),
            derived: Derived::default(),
        }
    }
}

impl<'a> IntoIterator for &'a ContourGroup {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}

/// Whether `turn` is a whole loop (`±2π`) rather than a figure eight or
/// a degenerate sliver.
#[must_use]
pub fn is_full_turn(turn: f64) -> bool {
    (turn.abs() - 2.0 * PI).abs() < PI
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> Contour {
        Contour::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ])
    }

    #[test]
    fn winding_from_turning() {
        let sq = square();
        assert_eq!(sq.direction(), WindingDirection::CounterClockwise);
        assert_abs_diff_eq!(sq.total_turn(), 2.0 * PI, epsilon = 1e-9);
        assert_eq!(sq.reversed().direction(), WindingDirection::Clockwise);
    }

    #[test]
    fn mutation_drops_cached_bounds() {
        let mut sq = square();
        assert_abs_diff_eq!(sq.limits().max.x, 10.0);
        assert_eq!(sq.points().len(), 4);
        sq.push(Edge::line(Trajectory::straight(
            Point2::new(0.0, 0.0),
            Point2::new(20.0, 0.0),
        )));
        assert_abs_diff_eq!(sq.limits().max.x, 20.0);
        assert_eq!(sq.points().len(), 5);
        sq.remove(4);
        assert_abs_diff_eq!(sq.limits().max.x, 10.0);
    }

    #[test]
    fn bezier_edges_contribute_three_points() {
        let mut c = square();
        c.replace(
            0,
            Edge::line(Trajectory::bezier(
                Point2::new(0.0, 0.0),
                Point2::new(3.0, -2.0),
                Point2::new(7.0, -2.0),
                Point2::new(10.0, 0.0),
            )),
        );
        assert_eq!(c.points().len(), 6);
        assert!(c.limits().min.y < -1.0);
    }

    #[test]
    fn global_parameter_wraps() {
        let sq = square();
        assert_abs_diff_eq!(sq.position(1.5), Point2::new(10.0, 5.0));
        assert_abs_diff_eq!(sq.position(4.5), Point2::new(5.0, 0.0));
        assert_eq!(sq.locate(-0.25), (3, 0.75));
    }

    #[test]
    fn can_intersect_uses_bounds_or_points() {
        let sq = square();
        let through = Trajectory::straight(Point2::new(-5.0, 5.0), Point2::new(15.0, 5.0));
        let above = Trajectory::straight(Point2::new(-5.0, 12.0), Point2::new(15.0, 12.0));
        assert!(sq.can_intersect(&through, false));
        assert!(sq.can_intersect(&through, true));
        assert!(!sq.can_intersect(&above, false));
        assert!(!sq.can_intersect(&above, true));

        // The chord of this arch misses the square but the curve does not.
        let arch = Trajectory::bezier(
            Point2::new(-5.0, -5.0),
            Point2::new(-5.0, 13.0),
            Point2::new(15.0, 13.0),
            Point2::new(15.0, -5.0),
        );
        assert!(sq.can_intersect(&arch, false));
        assert!(sq.can_intersect(&arch, true));
    }

    #[test]
    fn group_aggregates_members() {
        let mut group = ContourGroup::new();
        group.push(square());
        let limits = group.limits();
        assert_abs_diff_eq!(limits.max.y, 10.0);
        let mut far = square();
        far.push(Edge::line(Trajectory::straight(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 30.0),
        )));
        group.push(far);
        assert_abs_diff_eq!(group.limits().max.y, 30.0);
        assert_eq!(group.points().len(), 9);
        assert_abs_diff_eq!(group.length(), 40.0 + 40.0 + 30.0);
    }

    #[test]
    fn full_turn_detection() {
        assert!(is_full_turn(2.0 * PI));
        assert!(is_full_turn(-2.0 * PI));
        assert!(!is_full_turn(0.0));
    }
}
