//! Supported paper sizes.

use serde::{Deserialize, Serialize};

use crate::errors::{CaseError, CaseResult};
use crate::units::Inches;

/// Output paper, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A4,
    F4,
    Letter,
}

impl PaperSize {
    pub const ALL: [PaperSize; 3] = [PaperSize::A4, PaperSize::F4, PaperSize::Letter];

    /// Look a paper size up by key: `a4`, `f4` (or `folio`), `letter`.
    /// Case and surrounding whitespace are ignored.
    ///
    /// ```rust
    /// use case_core::export::PaperSize;
    ///
    /// assert_eq!(PaperSize::from_key("Folio").unwrap(), PaperSize::F4);
    /// assert!(PaperSize::from_key("legal").is_err());
    /// ```
    pub fn from_key(key: &str) -> CaseResult<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "f4" | "folio" => Ok(PaperSize::F4),
            "letter" => Ok(PaperSize::Letter),
            _ => Err(CaseError::invalid_paper_size(key)),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            PaperSize::A4 => "a4",
            PaperSize::F4 => "f4",
            PaperSize::Letter => "letter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::F4 => "F4 (Folio)",
            PaperSize::Letter => "US Letter",
        }
    }

    pub fn width(&self) -> Inches {
        match self {
            PaperSize::A4 => Inches(8.27),
            PaperSize::F4 | PaperSize::Letter => Inches(8.5),
        }
    }

    pub fn height(&self) -> Inches {
        match self {
            PaperSize::A4 => Inches(11.69),
            PaperSize::F4 => Inches(13.0),
            PaperSize::Letter => Inches(11.0),
        }
    }
}

impl std::fmt::Display for PaperSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
