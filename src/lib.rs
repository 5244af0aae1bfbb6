pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;

pub use error::{MarkgeomError, Result};
pub use geometry::{Contour, ContourGroup, Edge, Side, Trajectory, WindingDirection};
pub use operations::{ContourCut, ContourOffset, CornerFillet};
