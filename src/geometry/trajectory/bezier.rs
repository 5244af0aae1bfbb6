use crate::math::polygon_2d::{left_normal, normalize_or_zero};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Flatness below which a bezier piece is measured by its chord.
const LENGTH_FLATNESS: f64 = 1e-4;

const MAX_LENGTH_DEPTH: u32 = 16;

/// A cubic bezier curve `p0 → p3` with handles `p1`, `p2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierTrajectory {
    points: [Point2; 4],
}

impl BezierTrajectory {
    #[must_use]
    pub fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self {
            points: [p0, p1, p2, p3],
        }
    }

    /// Builds a curve from its end points and the handle directions.
    ///
    /// `start_dir` points forward out of `start`; `end_dir` points backward
    /// out of `end`, so both handles point into the curve.
    #[must_use]
    pub fn from_directions(
        start: Point2,
        start_dir: Vector2,
        end: Point2,
        end_dir: Vector2,
        handle: f64,
    ) -> Self {
        Self::new(
            start,
            start + normalize_or_zero(&start_dir) * handle,
            end + normalize_or_zero(&end_dir) * handle,
            end,
        )
    }

    #[must_use]
    pub fn points(&self) -> &[Point2; 4] {
        &self.points
    }

    #[must_use]
    pub fn start(&self) -> Point2 {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        self.points[3]
    }

    /// Evaluates the curve; `t` outside `[0, 1]` extrapolates the polynomial.
    #[must_use]
    pub fn position(&self, t: f64) -> Point2 {
        self.blossom(t, t, t)
    }

    /// First derivative at `t`.
    #[must_use]
    pub fn derivative(&self, t: f64) -> Vector2 {
        let [p0, p1, p2, p3] = self.points;
        let mt = 1.0 - t;
        (p1 - p0) * (3.0 * mt * mt) + (p2 - p1) * (6.0 * mt * t) + (p3 - p2) * (3.0 * t * t)
    }

    /// Unit tangent at `t`, falling back to the chord when the derivative
    /// vanishes (coincident handles).
    #[must_use]
    pub fn tangent(&self, t: f64) -> Vector2 {
        let d = self.derivative(t);
        if d.norm() > TOLERANCE {
            return d.normalize();
        }
        let [p0, p1, p2, p3] = self.points;
        let fallback = if t < 0.5 {
            [p1 - p0, p2 - p0, p3 - p0]
        } else {
            [p3 - p2, p3 - p1, p3 - p0]
        };
        fallback
            .iter()
            .find(|v| v.norm() > TOLERANCE)
            .map_or_else(Vector2::zeros, |v| v.normalize())
    }

    /// Arc length by adaptive subdivision.
    #[must_use]
    pub fn length(&self) -> f64 {
        fn measure(curve: &BezierTrajectory, depth: u32) -> f64 {
            let [p0, p1, p2, p3] = curve.points;
            let chord = (p3 - p0).norm();
            let polygon = (p1 - p0).norm() + (p2 - p1).norm() + (p3 - p2).norm();
            if polygon - chord < LENGTH_FLATNESS || depth >= MAX_LENGTH_DEPTH {
                return (chord + polygon) * 0.5;
            }
            let (a, b) = curve.divide();
            measure(&a, depth + 1) + measure(&b, depth + 1)
        }
        measure(self, 0)
    }

    /// Sub-curve over `[t0, t1]`; either bound may lie outside `[0, 1]` and
    /// `t0 > t1` yields a reversed curve.
    #[must_use]
    pub fn cut(&self, t0: f64, t1: f64) -> Self {
        Self::new(
            self.blossom(t0, t0, t0),
            self.blossom(t0, t0, t1),
            self.blossom(t0, t1, t1),
            self.blossom(t1, t1, t1),
        )
    }

    #[must_use]
    pub fn divide(&self) -> (Self, Self) {
        (self.cut(0.0, 0.5), self.cut(0.5, 1.0))
    }

    /// Approximate parallel offset along the left normal.
    ///
    /// End points move along their own normals; handles keep their
    /// direction and scale with the chord.
    #[must_use]
    pub fn shift(&self, start_offset: f64, end_offset: f64) -> Self {
        let [p0, p1, p2, p3] = self.points;
        let n0 = left_normal(&self.tangent(0.0));
        let n3 = left_normal(&self.tangent(1.0));
        let q0 = p0 + n0 * start_offset;
        let q3 = p3 + n3 * end_offset;
        let chord = (p3 - p0).norm();
        let scale = if chord > TOLERANCE {
            (q3 - q0).norm() / chord
        } else {
            1.0
        };
        Self::new(q0, q0 + (p1 - p0) * scale, q3 + (p2 - p3) * scale, q3)
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let [p0, p1, p2, p3] = self.points;
        Self::new(p3, p2, p1, p0)
    }

    /// Maximum distance of the handles from the chord.
    #[must_use]
    pub fn flatness(&self) -> f64 {
        let [p0, p1, p2, p3] = self.points;
        let chord = p3 - p0;
        let len = chord.norm();
        if len < TOLERANCE {
            return (p1 - p0).norm().max((p2 - p0).norm());
        }
        let dist = |p: Point2| (p - p0).perp(&chord).abs() / len;
        dist(p1).max(dist(p2))
    }

    /// Polar form of the cubic; `blossom(t, t, t)` is the point at `t`.
    fn blossom(&self, u1: f64, u2: f64, u3: f64) -> Point2 {
        let lerp = |a: Point2, b: Point2, t: f64| a + (b - a) * t;
        let [p0, p1, p2, p3] = self.points;
        let a = lerp(p0, p1, u1);
        let b = lerp(p1, p2, u1);
        let c = lerp(p2, p3, u1);
        let d = lerp(a, b, u2);
        let e = lerp(b, c, u2);
        lerp(d, e, u3)
    }
}
