//! Parcelkit - lot/plan lookups against the QLD and NSW cadastre
//!
//! Resolves parcel identifiers to polygons and attributes, estimates their
//! area, and exports them as KML or a zipped GeoJSON bundle.

pub mod cadastre;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod models;

pub use cadastre::{Jurisdiction, ParcelFetcher};
pub use config::Config;
pub use error::{ConfigError, ExportError, FetchError};
pub use geometry::{compute_bounds, estimate_area_hectares, ParcelBounds};
pub use models::{FetchResult, ParcelRecord, ParcelSet, StyleConfig};
