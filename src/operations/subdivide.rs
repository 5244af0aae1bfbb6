use crate::error::{OperationError, Result};
use crate::geometry::trajectory::Trajectory;

/// Limits for adaptive bisection.
#[derive(Debug, Clone, Copy)]
pub struct SubdivideOptions {
    /// Pieces turning less than this (radians) are flat enough.
    pub max_angle: f64,
    /// Pieces shorter than this are never split further.
    pub min_length: f64,
    /// Pieces longer than this are split even when flat.
    pub max_length: f64,
    pub max_depth: u32,
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self {
            max_angle: 5f64.to_radians(),
            min_length: 1.0,
            max_length: 10.0,
            max_depth: 5,
        }
    }
}

impl SubdivideOptions {
    /// # Errors
    ///
    /// Returns `OperationError::InvalidOption` when a limit is negative,
    /// non-finite, or the length window is inverted.
    pub fn validate(&self) -> Result<()> {
        let finite_non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !finite_non_negative(self.max_angle) {
            return Err(invalid("max_angle", "must be finite and non-negative"));
        }
        if !finite_non_negative(self.min_length) || !finite_non_negative(self.max_length) {
            return Err(invalid("min_length", "lengths must be finite and non-negative"));
        }
        if self.min_length > self.max_length {
            return Err(invalid("min_length", "must not exceed max_length"));
        }
        Ok(())
    }
}

fn invalid(option: &'static str, reason: &'static str) -> crate::error::MarkgeomError {
    OperationError::InvalidOption { option, reason }.into()
}

/// Splits `trajectory` into flat, short pieces and hands each leaf to `sink`
/// together with its parameter range on the original curve.
pub fn subdivide<F>(trajectory: &Trajectory, options: &SubdivideOptions, sink: &mut F)
where
    F: FnMut(&Trajectory, f64, f64),
{
    split(trajectory, 0.0, 1.0, 0, options, sink);
}

/// Collects the leaves of [`subdivide`] as `(piece, t_start, t_end)`.
#[must_use]
pub fn subdivide_to_vec(
    trajectory: &Trajectory,
    options: &SubdivideOptions,
) -> Vec<(Trajectory, f64, f64)> {
    let mut out = Vec::new();
    subdivide(trajectory, options, &mut |piece, t0, t1| {
        out.push((piece.clone(), t0, t1));
    });
    out
}

fn split<F>(
    piece: &Trajectory,
    t0: f64,
    t1: f64,
    depth: u32,
    options: &SubdivideOptions,
    sink: &mut F,
) where
    F: FnMut(&Trajectory, f64, f64),
{
    let length = piece.length();
    let flat = piece.delta_angle() < options.max_angle && length <= options.max_length;
    if flat || length < options.min_length || depth >= options.max_depth {
        sink(piece, t0, t1);
        return;
    }
    let mid = (t0 + t1) * 0.5;
    let (left, right) = piece.divide();
    split(&left, t0, mid, depth + 1, options, sink);
    split(&right, mid, t1, depth + 1, options, sink);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;

    #[test]
    fn short_straight_is_a_single_leaf() {
        let s = Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(8.0, 0.0));
        let leaves = subdivide_to_vec(&s, &SubdivideOptions::default());
        assert_eq!(leaves.len(), 1);
        assert_abs_diff_eq!(leaves[0].1, 0.0);
        assert_abs_diff_eq!(leaves[0].2, 1.0);
    }

    #[test]
    fn long_straight_splits_to_max_length() {
        let s = Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(35.0, 0.0));
        let leaves = subdivide_to_vec(&s, &SubdivideOptions::default());
        assert_eq!(leaves.len(), 4);
        assert!(leaves.iter().all(|(p, _, _)| p.length() <= 10.0));
    }

    #[test]
    fn leaves_cover_the_domain_in_order() {
        let k = 20.0 * 0.552_284_749_8;
        let arc = Trajectory::bezier(
            Point2::new(20.0, 0.0),
            Point2::new(20.0, k),
            Point2::new(k, 20.0),
            Point2::new(0.0, 20.0),
        );
        let leaves = subdivide_to_vec(&arc, &SubdivideOptions::default());
        assert!(leaves.len() > 4);
        assert_abs_diff_eq!(leaves[0].1, 0.0);
        assert_abs_diff_eq!(leaves[leaves.len() - 1].2, 1.0);
        for w in leaves.windows(2) {
            assert_abs_diff_eq!(w[0].2, w[1].1);
            assert_abs_diff_eq!(w[0].0.end_position(), w[1].0.start_position(), epsilon = 1e-9);
        }
    }

    #[test]
    fn depth_limit_caps_leaf_count() {
        let s = Trajectory::straight(Point2::new(0.0, 0.0), Point2::new(1000.0, 0.0));
        let options = SubdivideOptions {
            max_depth: 3,
            ..SubdivideOptions::default()
        };
        assert_eq!(subdivide_to_vec(&s, &options).len(), 8);
    }

    #[test]
    fn inverted_length_window_is_invalid() {
        let options = SubdivideOptions {
            min_length: 20.0,
            max_length: 10.0,
            ..SubdivideOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(SubdivideOptions::default().validate().is_ok());
    }
}
