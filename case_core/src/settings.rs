//! # Export Settings
//!
//! Knobs that shape an export. Every field has a default, so a job file may
//! carry any subset of them (or none at all).
//!
//! ```rust
//! use case_core::settings::ExportSettings;
//!
//! let settings: ExportSettings = serde_json::from_str(r#"{ "crop_marks": false }"#).unwrap();
//! assert_eq!(settings.supersample, 3);
//! assert!(!settings.crop_marks);
//! assert!(settings.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::dimensions::SUPERSAMPLE_RATIO;
use crate::errors::{CaseError, CaseResult};
use crate::export::PaperSize;
use crate::scene::Color;

/// Largest accepted supersample ratio; a tray raster at 8x is already
/// about 16 megapixels.
pub const MAX_SUPERSAMPLE: u32 = 8;

/// Settings for one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Pixel ratio each stage is rasterized at
    pub supersample: u32,

    /// Backdrop each stage raster is flattened onto before it is embedded,
    /// showing through wherever the stage leaves pixels transparent
    pub background: Color,

    /// Paper key used when the request does not name one
    pub default_paper: String,

    /// Draw the dashed fold guides on the tray
    pub fold_guides: bool,

    /// Draw crop marks around both boxes
    pub crop_marks: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            supersample: SUPERSAMPLE_RATIO,
            background: Color::WHITE,
            default_paper: "a4".to_string(),
            fold_guides: true,
            crop_marks: true,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> CaseResult<()> {
        if self.supersample == 0 || self.supersample > MAX_SUPERSAMPLE {
            return Err(CaseError::invalid_input(
                "supersample",
                self.supersample.to_string(),
                format!("Must be between 1 and {}", MAX_SUPERSAMPLE),
            ));
        }
        PaperSize::from_key(&self.default_paper)?;
        Ok(())
    }
}
