//! Cadastre lookups.
//!
//! Classifies lot/plan identifiers by jurisdiction and resolves them against
//! the QLD and NSW ArcGIS map services in bounded concurrent groups.

mod endpoints;
mod fetcher;
mod jurisdiction;
mod response;

pub use endpoints::{Endpoints, NSW_QUERY_URL, QLD_QUERY_URL};
pub use fetcher::{ParcelFetcher, GROUP_SIZE};
pub use jurisdiction::Jurisdiction;
