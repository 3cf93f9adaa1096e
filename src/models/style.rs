//! Export styling and KML colour encoding.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Styling applied to every parcel in a KML export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Polygon fill, `#rrggbb`
    pub fill_color: String,
    /// Outline colour, `#rrggbb`, always fully opaque
    pub line_color: String,
    /// Fill opacity, 0-100
    pub opacity_percent: u8,
    pub line_weight: f64,
    /// Name of the KML document and folder
    pub folder_name: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fill_color: "#ff6600".to_string(),
            line_color: "#2e2e2e".to_string(),
            opacity_percent: 70,
            line_weight: 1.2,
            folder_name: "Parcels".to_string(),
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.opacity_percent > 100 {
            return Err(ExportError::InvalidOpacity(self.opacity_percent));
        }
        if !(self.line_weight.is_finite() && self.line_weight > 0.0) {
            return Err(ExportError::InvalidLineWeight(self.line_weight));
        }
        parse_hex_rgb(&self.fill_color)?;
        parse_hex_rgb(&self.line_color)?;
        Ok(())
    }

    /// Fill colour with the configured opacity, KML encoded
    pub fn kml_fill_color(&self) -> Result<String, ExportError> {
        kml_color(&self.fill_color, self.opacity_percent)
    }

    pub fn kml_line_color(&self) -> Result<String, ExportError> {
        kml_color(&self.line_color, 100)
    }
}

/// Encode `#rrggbb` plus an opacity percentage as KML `aabbggrr`.
pub fn kml_color(hex: &str, opacity_percent: u8) -> Result<String, ExportError> {
    if opacity_percent > 100 {
        return Err(ExportError::InvalidOpacity(opacity_percent));
    }
    let (r, g, b) = parse_hex_rgb(hex)?;
    let a = (255.0 * f64::from(opacity_percent) / 100.0).round() as u8;
    Ok(format!("{:02x}{:02x}{:02x}{:02x}", a, b, g, r))
}

fn parse_hex_rgb(hex: &str) -> Result<(u8, u8, u8), ExportError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ExportError::InvalidColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| ExportError::InvalidColor(hex.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}
