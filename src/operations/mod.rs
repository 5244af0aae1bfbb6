pub mod cut;
pub mod fillet;
pub mod offset;
pub mod stitch;
pub mod subdivide;

pub use cut::{ContourCut, CutOptions};
pub use fillet::{set_corner_radius, CornerFillet, FilletOptions};
pub use offset::{offset, ContourOffset, OffsetOptions};
pub use stitch::{IntersectionPairEdge, StitchMode};
pub use subdivide::{subdivide, subdivide_to_vec, SubdivideOptions};
