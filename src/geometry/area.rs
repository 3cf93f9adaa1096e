use geo_types::LineString;

/// Earth radius in metres used for the square-degree conversion.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Hectares per unit of shoelace sum: `R² · π / (180² · 10000)`.
pub const HECTARES_PER_SQUARE_DEGREE: f64 =
    EARTH_RADIUS_M * EARTH_RADIUS_M * std::f64::consts::PI / 180.0 / 180.0 / 10_000.0;

/// Approximate parcel area in hectares from a closed exterior ring of (lng, lat).
///
/// Planar shoelace sum over consecutive points, without halving and without a
/// wrap-around term, scaled by [`HECTARES_PER_SQUARE_DEGREE`]. This is a rough
/// equirectangular estimate that grows less accurate with parcel size and
/// latitude. Exported `AREA_HA` values must keep matching it exactly.
pub fn estimate_area_hectares(ring: &LineString<f64>) -> f64 {
    if ring.0.len() < 2 {
        return 0.0;
    }

    let sum: f64 = ring
        .0
        .windows(2)
        .map(|pair| pair[0].x * pair[1].y - pair[1].x * pair[0].y)
        .sum();

    sum.abs() * HECTARES_PER_SQUARE_DEGREE
}
