pub mod bounds;
pub mod contour;
pub mod intersect;
pub mod intersection;
pub mod trajectory;

pub use bounds::Aabb2;
pub use contour::{Contour, ContourGroup, Edge, WindingDirection};
pub use intersect::Side;
pub use intersection::{Intersection, IntersectionOrder};
pub use trajectory::{BezierTrajectory, CompositeTrajectory, StraightTrajectory, Trajectory};
