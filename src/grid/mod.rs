pub mod region;
pub mod stroke;

pub use region::{Rect, Region, RegionGrid};
pub use stroke::{Segment, StrokeRenderer};
