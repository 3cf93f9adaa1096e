//! Planar area estimation and bounding boxes for parcel geometry.

mod area;
mod bounds;

pub use area::{estimate_area_hectares, HECTARES_PER_SQUARE_DEGREE};
pub use bounds::{compute_bounds, ParcelBounds};
