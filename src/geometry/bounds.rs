use crate::math::Point2;

/// An axis-aligned bounding box in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb2 {
    /// An inverted box that any union replaces.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point; empty for no points.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |acc, p| acc.including(p))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Returns this box grown to contain `p`.
    #[must_use]
    pub fn including(&self, p: &Point2) -> Self {
        Self {
            min: Point2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    /// Returns the smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Whether the two boxes overlap, touching edges included.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// The four corners, counter-clockwise from `min`.
    #[must_use]
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_spans_all() {
        let pts = [Point2::new(1.0, -2.0), Point2::new(-3.0, 4.0)];
        let b = Aabb2::from_points(&pts);
        assert_eq!(b.min, Point2::new(-3.0, -2.0));
        assert_eq!(b.max, Point2::new(1.0, 4.0));
    }

    #[test]
    fn empty_box_is_identity_for_union() {
        let b = Aabb2::from_points(&[Point2::new(1.0, 1.0)]);
        assert!(Aabb2::empty().is_empty());
        assert_eq!(Aabb2::empty().union(&b), b);
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb2::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        let b = Aabb2::from_points(&[Point2::new(1.0, 0.5), Point2::new(2.0, 2.0)]);
        let c = Aabb2::from_points(&[Point2::new(1.5, 1.5), Point2::new(2.0, 2.0)]);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
