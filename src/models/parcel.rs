//! Parcel records and the identifier-keyed parcel set produced by a fetch.

use geo_types::Polygon;
use hashbrown::HashMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::attributes::lot_type_or_purpose;
use crate::geometry::estimate_area_hectares;

/// Upstream feature properties. The schema differs per jurisdiction.
pub type Attributes = Map<String, Value>;

/// A resolved parcel: geometry, raw attributes and estimated area.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelRecord {
    pub geometry: Polygon<f64>,
    pub attributes: Attributes,
    /// Planar area estimate of the exterior ring, never negative
    pub area_hectares: f64,
}

impl ParcelRecord {
    /// Build a record, estimating the area from the exterior ring
    pub fn new(geometry: Polygon<f64>, attributes: Attributes) -> Self {
        let area_hectares = estimate_area_hectares(geometry.exterior());
        Self {
            geometry,
            attributes,
            area_hectares,
        }
    }

    /// Build a record with an area already estimated from the ring as received.
    /// Negative inputs are clamped to zero.
    pub fn with_area(geometry: Polygon<f64>, attributes: Attributes, area_hectares: f64) -> Self {
        Self {
            geometry,
            attributes,
            area_hectares: area_hectares.max(0.0),
        }
    }

    /// Lot type (QLD) or purpose (NSW), `"n/a"` when neither is set
    pub fn lot_type(&self) -> &str {
        lot_type_or_purpose(&self.attributes)
    }
}

/// One row of the parcel table shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelSummary {
    pub identifier: String,
    pub lot_type: String,
    pub area_hectares: f64,
}

/// Identifier → record map that remembers insertion order.
///
/// Exports and summaries list parcels in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelSet {
    records: HashMap<String, ParcelRecord>,
    order: Vec<String>,
}

impl ParcelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert a record. Replacing an existing identifier keeps its position.
    pub fn insert(&mut self, identifier: String, record: ParcelRecord) -> Option<ParcelRecord> {
        if let Some(existing) = self.records.get_mut(&identifier) {
            return Some(std::mem::replace(existing, record));
        }
        self.order.push(identifier.clone());
        self.records.insert(identifier, record);
        None
    }

    pub fn get(&self, identifier: &str) -> Option<&ParcelRecord> {
        self.records.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    /// Identifiers in insertion order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (identifier, record) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParcelRecord)> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| (id.as_str(), r)))
    }

    pub fn records(&self) -> impl Iterator<Item = &ParcelRecord> {
        self.iter().map(|(_, r)| r)
    }

    /// Copy of the parcels named in `identifiers`. Unknown identifiers are skipped.
    pub fn subset<S: AsRef<str>>(&self, identifiers: &[S]) -> ParcelSet {
        let mut selected = ParcelSet::new();
        for id in identifiers {
            let id = id.as_ref();
            if let Some(record) = self.records.get(id) {
                selected.insert(id.to_string(), record.clone());
            }
        }
        selected
    }

    /// Drop the named parcels, returning how many were removed
    pub fn remove<S: AsRef<str>>(&mut self, identifiers: &[S]) -> usize {
        let mut removed = 0;
        for id in identifiers {
            if self.records.remove(id.as_ref()).is_some() {
                removed += 1;
            }
        }
        let records = &self.records;
        self.order.retain(|id| records.contains_key(id));
        removed
    }

    /// Table rows in insertion order
    pub fn summaries(&self) -> Vec<ParcelSummary> {
        self.iter()
            .map(|(id, record)| ParcelSummary {
                identifier: id.to_string(),
                lot_type: record.lot_type().to_string(),
                area_hectares: record.area_hectares,
            })
            .collect()
    }
}

impl FromIterator<(String, ParcelRecord)> for ParcelSet {
    fn from_iter<I: IntoIterator<Item = (String, ParcelRecord)>>(iter: I) -> Self {
        let mut set = ParcelSet::new();
        for (id, record) in iter {
            set.insert(id, record);
        }
        set
    }
}

/// Outcome of a fetch: resolved parcels plus identifiers that could not be resolved.
///
/// `present` and `missing` are disjoint and together cover every distinct
/// input identifier.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub present: ParcelSet,
    pub missing: Vec<String>,
}

/// Split free-form input into identifiers: one per line, trimmed, blanks dropped.
pub fn parse_identifiers(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
