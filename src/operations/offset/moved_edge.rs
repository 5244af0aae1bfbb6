use crate::geometry::contour::Edge;
use crate::geometry::trajectory::{CompositeTrajectory, Trajectory};

/// Main range of a curved edge wrapped between two extension rays.
const CURVE_MAIN_RANGE: (f64, f64) = (1.0 / 3.0, 2.0 / 3.0);

/// An edge after shifting, padded past both ends so that neighbours whose
/// offsets no longer meet can still be intersected.
///
/// `[min_t, max_t]` is the part of the padded trajectory that came from the
/// original edge.
#[derive(Debug, Clone)]
pub struct MovedEdge {
    pub edge: Edge,
    pub min_t: f64,
    pub max_t: f64,
    pub moved: bool,
}

impl MovedEdge {
    /// Shifts `edge` by `shift` to the left of travel and pads it by
    /// `padding` at each end.
    #[must_use]
    pub fn build(edge: &Edge, shift: f64, padding: f64) -> Self {
        let moved = shift != 0.0;
        let shifted = edge.trajectory().shift(shift, shift);

        let (trajectory, min_t, max_t) = match shifted {
            Trajectory::Straight(s) => {
                let length = s.length();
                let padded = s.extended(padding, padding);
                let total = length + 2.0 * padding;
                if total > 0.0 {
                    (
                        Trajectory::Straight(padded),
                        padding / total,
                        (padding + length) / total,
                    )
                } else {
                    (Trajectory::Straight(padded), 0.0, 1.0)
                }
            }
            curve => {
                let start = curve.start_position();
                let end = curve.end_position();
                let before = Trajectory::straight(start - curve.start_direction() * padding, start);
                let after = Trajectory::straight(end, end - curve.end_direction() * padding);
                match CompositeTrajectory::new(vec![before, curve, after]) {
                    Some(c) => (Trajectory::Composite(c), CURVE_MAIN_RANGE.0, CURVE_MAIN_RANGE.1),
                    None => (edge.trajectory().clone(), 0.0, 1.0),
                }
            }
        };

        Self {
            edge: edge.with_trajectory(trajectory),
            min_t,
            max_t,
            moved,
        }
    }

    /// The full padded trajectory.
    #[must_use]
    pub fn trajectory(&self) -> &Trajectory {
        self.edge.trajectory()
    }

    /// Only the part that came from the original edge.
    #[must_use]
    pub fn main(&self) -> Trajectory {
        self.trajectory().cut(self.min_t, self.max_t)
    }

    /// Maps a parameter on [`main`](Self::main) back onto the full trajectory.
    #[must_use]
    pub fn main_to_full(&self, t: f64) -> f64 {
        self.min_t + t * (self.max_t - self.min_t)
    }

    /// Whether a full-trajectory parameter lies in the main range, with
    /// `slack` allowed on either side.
    #[must_use]
    pub fn in_main(&self, t: f64, slack: f64) -> bool {
        t >= self.min_t - slack && t <= self.max_t + slack
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;

    #[test]
    fn straight_edge_is_shifted_and_padded() {
        let edge = Edge::line(Trajectory::straight(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        ));
        let moved = MovedEdge::build(&edge, 1.0, 100.0);
        assert!(moved.moved);
        assert_abs_diff_eq!(moved.min_t, 100.0 / 210.0);
        assert_abs_diff_eq!(moved.max_t, 110.0 / 210.0);
        let main = moved.main();
        assert_abs_diff_eq!(main.start_position(), Point2::new(0.0, 1.0), epsilon = 1e-9);
        assert_abs_diff_eq!(main.end_position(), Point2::new(10.0, 1.0), epsilon = 1e-9);
        assert_abs_diff_eq!(moved.trajectory().length(), 210.0, epsilon = 1e-9);
    }

    #[test]
    fn curved_edge_gets_extension_rays() {
        let edge = Edge::new(
            Trajectory::bezier(
                Point2::new(0.0, 0.0),
                Point2::new(3.0, 2.0),
                Point2::new(7.0, 2.0),
                Point2::new(10.0, 0.0),
            ),
            true,
        );
        let moved = MovedEdge::build(&edge, -0.5, 50.0);
        assert!(moved.edge.is_enter());
        let Trajectory::Composite(c) = moved.trajectory() else {
            panic!("expected a composite");
        };
        assert_eq!(c.parts().len(), 3);
        assert_abs_diff_eq!(c.parts()[0].length(), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.parts()[2].length(), 50.0, epsilon = 1e-9);
        assert!(!moved.main().is_straight());
        assert!(moved.in_main(0.5, 0.0));
        assert!(!moved.in_main(0.1, 0.0));
    }

    #[test]
    fn zero_shift_is_not_moved() {
        let edge = Edge::line(Trajectory::straight(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 4.0),
        ));
        let moved = MovedEdge::build(&edge, 0.0, 100.0);
        assert!(!moved.moved);
        assert_abs_diff_eq!(moved.main_to_full(0.0), moved.min_t);
        assert_abs_diff_eq!(moved.main_to_full(1.0), moved.max_t);
    }
}
