//! # Unit Types
//!
//! Type-safe wrappers for the physical lengths used by the layout engine,
//! plus the single length conversion between physical and screen space.
//!
//! Physical sizes are authored in inches (the jewel case and paper tables are
//! both specified that way). Pixels only exist at the display DPI, and
//! millimeters only exist for display to the user.
//!
//! ## Example
//!
//! ```rust
//! use case_core::units::{to_millimeters, to_pixels, Inches, DISPLAY_DPI};
//!
//! assert_eq!(to_pixels(Inches(4.75), DISPLAY_DPI), 456.0);
//! assert_eq!(to_millimeters(Inches(5.4)).0, 137.2);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Display resolution the panel pixel model is built on (CSS pixels per inch)
pub const DISPLAY_DPI: f64 = 96.0;

/// Millimeters per inch
const MM_PER_INCH: f64 = 25.4;

/// PostScript points per inch
const POINTS_PER_INCH: f64 = 72.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in PostScript points (stroke widths)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(pub f64);

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 * MM_PER_INCH)
    }
}

impl From<Millimeters> for Inches {
    fn from(mm: Millimeters) -> Self {
        Inches(mm.0 / MM_PER_INCH)
    }
}

impl From<Points> for Inches {
    fn from(pt: Points) -> Self {
        Inches(pt.0 / POINTS_PER_INCH)
    }
}

impl From<Inches> for Points {
    fn from(inches: Inches) -> Self {
        Points(inches.0 * POINTS_PER_INCH)
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a physical length to whole pixels at `dpi`.
///
/// `round(inches * dpi)`. Panel pixel sizes are produced once from this
/// (see [`crate::dimensions`]) and never recomputed per frame.
pub fn to_pixels(inches: Inches, dpi: f64) -> f64 {
    (inches.0 * dpi).round()
}

/// Convert inches to millimeters rounded to one decimal place, for display.
pub fn to_millimeters(inches: Inches) -> Millimeters {
    Millimeters((inches.0 * MM_PER_INCH * 10.0).round() / 10.0)
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }
    };
}

impl_arithmetic!(Inches);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Points);
