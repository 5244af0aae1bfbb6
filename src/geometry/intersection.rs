use std::cmp::Ordering;

/// Default relative tolerance for approximate parameter equality.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 0.001;

/// A crossing between two curves, as a parameter on each.
///
/// For a contour, the parameter is global: `edge_index + local_t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub first_t: f64,
    pub second_t: f64,
}

impl Intersection {
    #[must_use]
    pub fn new(first_t: f64, second_t: f64) -> Self {
        Self { first_t, second_t }
    }

    /// The same crossing seen from the second curve.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.second_t, self.first_t)
    }
}

/// Which coordinate of an [`Intersection`] a comparison looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionOrder {
    First,
    Second,
}

impl IntersectionOrder {
    fn key(self, value: &Intersection) -> f64 {
        match self {
            Self::First => value.first_t,
            Self::Second => value.second_t,
        }
    }

    /// Total order on the selected coordinate.
    #[must_use]
    pub fn compare(self, a: &Intersection, b: &Intersection) -> Ordering {
        self.key(a).total_cmp(&self.key(b))
    }

    /// Like [`compare`](Self::compare), but values within `tolerance` of
    /// each other (relative to the larger magnitude) compare equal.
    #[must_use]
    pub fn compare_approx(self, a: &Intersection, b: &Intersection, tolerance: f64) -> Ordering {
        compare_approx(self.key(a), self.key(b), tolerance)
    }

    /// Sorts in place by the selected coordinate.
    pub fn sort(self, values: &mut [Intersection]) {
        values.sort_by(|a, b| self.compare(a, b));
    }
}

/// Whether `a` and `b` differ by at most `tolerance × max(|a|, |b|)`.
#[must_use]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs())
}

/// Orders two values, treating near-equal ones as equal.
#[must_use]
pub fn compare_approx(a: f64, b: f64, tolerance: f64) -> Ordering {
    if approx_eq(a, b, tolerance) {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_swaps_coordinates() {
        let i = Intersection::new(0.25, 3.5);
        assert_eq!(i.reversed(), Intersection::new(3.5, 0.25));
        assert_eq!(i.reversed().reversed(), i);
    }

    #[test]
    fn sort_by_either_coordinate() {
        let mut v = vec![
            Intersection::new(0.7, 1.2),
            Intersection::new(0.1, 3.4),
            Intersection::new(0.4, 0.5),
        ];
        IntersectionOrder::First.sort(&mut v);
        assert_eq!(v[0].first_t, 0.1);
        IntersectionOrder::Second.sort(&mut v);
        assert_eq!(v[0].second_t, 0.5);
        assert_eq!(v[2].second_t, 3.4);
    }

    #[test]
    fn approximate_comparison_is_relative() {
        let a = Intersection::new(100.0, 0.0);
        let b = Intersection::new(100.05, 0.0);
        let c = Intersection::new(100.5, 0.0);
        let tol = DEFAULT_RELATIVE_TOLERANCE;
        assert_eq!(IntersectionOrder::First.compare_approx(&a, &b, tol), Ordering::Equal);
        assert_eq!(IntersectionOrder::First.compare_approx(&a, &c, tol), Ordering::Less);
        assert!(!approx_eq(0.001, 0.002, tol));
    }
}
