use geo::BoundingRect;
use serde::Serialize;

use crate::models::ParcelRecord;

/// Bounding box over parcel exterior rings, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParcelBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl ParcelBounds {
    /// South-west and north-east corners as `[[lat, lng], [lat, lng]]`
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lat, self.min_lng], [self.max_lat, self.max_lng]]
    }
}

/// Bounds over every exterior-ring coordinate of `records`.
///
/// `None` when no coordinates are supplied. Antimeridian crossings are not
/// special-cased.
pub fn compute_bounds<'a, I>(records: I) -> Option<ParcelBounds>
where
    I: IntoIterator<Item = &'a ParcelRecord>,
{
    records
        .into_iter()
        .filter_map(|record| record.geometry.exterior().bounding_rect())
        .map(|rect| ParcelBounds {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
        .reduce(|acc, b| ParcelBounds {
            min_lat: acc.min_lat.min(b.min_lat),
            max_lat: acc.max_lat.max(b.max_lat),
            min_lng: acc.min_lng.min(b.min_lng),
            max_lng: acc.max_lng.max(b.max_lng),
        })
}
