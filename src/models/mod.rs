//! Core data models for parcel lookups and exports.

pub mod attributes;
pub mod parcel;
pub mod style;

pub use parcel::{parse_identifiers, Attributes, FetchResult, ParcelRecord, ParcelSet, ParcelSummary};
pub use style::StyleConfig;
