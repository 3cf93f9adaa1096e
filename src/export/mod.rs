//! Export of parcel sets as KML documents and zipped GeoJSON bundles.

pub mod archive;
pub mod kml;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::models::{ParcelSet, StyleConfig};

pub use archive::{build_archive, feature_collection, ARCHIVE_CONTENT_TYPE};
pub use kml::{render_kml, KML_CONTENT_TYPE};

/// A finished export, ready to be saved or handed to a download.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPayload {
    /// Styled KML markup
    Document { filename: String, content: String },
    /// Zip archive bytes
    Archive { filename: String, bytes: Vec<u8> },
}

impl ExportPayload {
    pub fn filename(&self) -> &str {
        match self {
            ExportPayload::Document { filename, .. } | ExportPayload::Archive { filename, .. } => {
                filename
            }
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportPayload::Document { .. } => KML_CONTENT_TYPE,
            ExportPayload::Archive { .. } => ARCHIVE_CONTENT_TYPE,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ExportPayload::Document { content, .. } => content.as_bytes(),
            ExportPayload::Archive { bytes, .. } => bytes.as_slice(),
        }
    }

    /// Write the payload to `path`, replacing any existing file
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let path = path.as_ref();
        fs::write(path, self.as_bytes())?;
        info!(
            "Wrote {} ({} bytes) to {}",
            self.filename(),
            self.as_bytes().len(),
            path.display()
        );
        Ok(())
    }
}

/// Default download name: `parcels.*` for everything, `selection.*` for a subset.
pub fn default_filename(extension: &str, selection: bool) -> String {
    let stem = if selection { "selection" } else { "parcels" };
    format!("{}.{}", stem, extension)
}

pub fn export_kml(
    parcels: &ParcelSet,
    style: &StyleConfig,
    filename: impl Into<String>,
) -> Result<ExportPayload, ExportError> {
    let content = render_kml(parcels, style)?;
    Ok(ExportPayload::Document {
        filename: filename.into(),
        content,
    })
}

pub fn export_archive(
    parcels: &ParcelSet,
    filename: impl Into<String>,
) -> Result<ExportPayload, ExportError> {
    let bytes = build_archive(parcels)?;
    Ok(ExportPayload::Archive {
        filename: filename.into(),
        bytes,
    })
}
