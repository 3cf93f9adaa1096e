//! KML document generation.

use crate::error::ExportError;
use crate::models::{ParcelSet, StyleConfig};

pub const KML_CONTENT_TYPE: &str = "application/vnd.google-earth.kml+xml";

const STYLE_ID: &str = "parcelStyle";

/// Render parcels as a KML document with one shared style and one folder.
///
/// Only exterior rings are written; holes are dropped. An empty set still
/// produces a complete document with an empty folder.
pub fn render_kml(parcels: &ParcelSet, style: &StyleConfig) -> Result<String, ExportError> {
    style.validate()?;
    let fill_color = style.kml_fill_color()?;
    let line_color = style.kml_line_color()?;
    let folder = xml_escape(&style.folder_name);

    let mut kml = format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>{folder}</name>
    <Style id="{STYLE_ID}">
      <LineStyle>
        <color>{line_color}</color>
        <width>{width}</width>
      </LineStyle>
      <PolyStyle>
        <color>{fill_color}</color>
        <fill>1</fill>
        <outline>1</outline>
      </PolyStyle>
    </Style>
    <Folder>
      <name>{folder}</name>"##,
        width = style.line_weight,
    );

    for (identifier, parcel) in parcels.iter() {
        let coordinates = parcel
            .geometry
            .exterior()
            .coords()
            .map(|c| format!("{},{},0", c.x, c.y))
            .collect::<Vec<_>>()
            .join(" ");

        kml.push_str(&format!(
            r##"
      <Placemark>
        <name>{name}</name>
        <styleUrl>#{STYLE_ID}</styleUrl>
        <Polygon>
          <extrude>0</extrude>
          <altitudeMode>clampToGround</altitudeMode>
          <outerBoundaryIs>
            <LinearRing>
              <coordinates>{coordinates}</coordinates>
            </LinearRing>
          </outerBoundaryIs>
        </Polygon>
      </Placemark>"##,
            name = xml_escape(identifier),
        ));
    }

    kml.push_str(
        r#"
    </Folder>
  </Document>
</kml>
"#,
    );

    Ok(kml)
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
