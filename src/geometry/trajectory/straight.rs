use crate::math::polygon_2d::{left_normal, normalize_or_zero};
use crate::math::{Point2, Vector2};

/// A straight segment `P(t) = start + t * (end - start)`.
///
/// Evaluation is defined for any `t`, so a cut outside `[0, 1]` extends the
/// segment along its own line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightTrajectory {
    start: Point2,
    end: Point2,
}

impl StraightTrajectory {
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn start(&self) -> Point2 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        self.end
    }

    #[must_use]
    pub fn position(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }

    /// Unit direction from start to end (zero for a degenerate segment).
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        normalize_or_zero(&(self.end - self.start))
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    #[must_use]
    pub fn cut(&self, t0: f64, t1: f64) -> Self {
        Self::new(self.position(t0), self.position(t1))
    }

    /// Moves the start by `start_offset` and the end by `end_offset` along the
    /// left normal.
    #[must_use]
    pub fn shift(&self, start_offset: f64, end_offset: f64) -> Self {
        let normal = left_normal(&self.direction());
        Self::new(
            self.start + normal * start_offset,
            self.end + normal * end_offset,
        )
    }

    /// Lengthens the segment by `before` behind the start and `after` past
    /// the end.
    #[must_use]
    pub fn extended(&self, before: f64, after: f64) -> Self {
        let dir = self.direction();
        Self::new(self.start - dir * before, self.end + dir * after)
    }

    #[must_use]
    pub fn divide(&self) -> (Self, Self) {
        let mid = self.position(0.5);
        (Self::new(self.start, mid), Self::new(mid, self.end))
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }
}
