//! # Physical Dimensions
//!
//! Fixed physical constants of a CD jewel case insert and of the printed
//! sheet annotations. None of these values are ever derived from user input.
//!
//! ```text
//!  Front stage                Tray stage (one composite)
//! ┌──────────────┐          ┌──┬────────────────────┬──┐
//! │              │          │L │                    │R │
//! │  front cover │ 4.75     │S │    back center     │S │ 4.625
//! │              │          │  │                    │  │
//! └──────────────┘          └──┴────────────────────┴──┘
//!       4.75                0.25        5.4          0.25
//! ```
//!
//! Pixel sizes at [`DISPLAY_DPI`] are computed once into [`PIXEL_METRICS`].

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::units::{to_pixels, Inches, Points, DISPLAY_DPI};

// ============================================================================
// Panel Sizes
// ============================================================================

/// Front cover width (square insert)
pub const FRONT_COVER_WIDTH: Inches = Inches(4.75);
/// Front cover height
pub const FRONT_COVER_HEIGHT: Inches = Inches(4.75);

/// Back center (tray card face) width
pub const BACK_CENTER_WIDTH: Inches = Inches(5.4);
/// Back center height
pub const BACK_CENTER_HEIGHT: Inches = Inches(4.625);

/// Width of each spine strip
pub const SPINE_WIDTH: Inches = Inches(0.25);
/// Height of each spine strip
pub const SPINE_HEIGHT: Inches = Inches(4.625);

/// Combined tray card width (left spine + back center + right spine)
pub const TRAY_WIDTH: Inches = Inches(5.9);
/// Tray card height
pub const TRAY_HEIGHT: Inches = Inches(4.625);

// ============================================================================
// Sheet Annotations
// ============================================================================

/// Vertical gap between the front cover and the tray card on the sheet
pub const INTER_PANEL_MARGIN: Inches = Inches(0.5);

/// Safety-zone inset on every panel edge
pub const BLEED_INSET: Inches = Inches(0.125);

/// Length of each crop mark segment
pub const CROP_MARK_LENGTH: Inches = Inches(0.15);

/// Gap between a box edge and the start of its crop marks
pub const CROP_MARK_OFFSET: Inches = Inches(0.1);

/// Crop mark stroke width
pub const CROP_MARK_STROKE: Points = Points(0.5);

/// Fold guide stroke width
pub const FOLD_GUIDE_STROKE: Points = Points(0.5);

/// Rasterization supersampling ratio relative to the display pixel model.
///
/// Independent of paper size: 3 x 96 gives roughly 288 effective DPI.
pub const SUPERSAMPLE_RATIO: u32 = 3;

// ============================================================================
// Precomputed Pixel Metrics
// ============================================================================

/// Pixel sizes of every panel and stage at [`DISPLAY_DPI`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelMetrics {
    pub front_width: f64,
    pub front_height: f64,
    pub spine_width: f64,
    pub spine_height: f64,
    pub back_width: f64,
    pub back_height: f64,
    pub tray_width: f64,
    pub tray_height: f64,
    pub bleed: f64,
}

impl PixelMetrics {
    fn at_dpi(dpi: f64) -> Self {
        PixelMetrics {
            front_width: to_pixels(FRONT_COVER_WIDTH, dpi),
            front_height: to_pixels(FRONT_COVER_HEIGHT, dpi),
            spine_width: to_pixels(SPINE_WIDTH, dpi),
            spine_height: to_pixels(SPINE_HEIGHT, dpi),
            back_width: to_pixels(BACK_CENTER_WIDTH, dpi),
            back_height: to_pixels(BACK_CENTER_HEIGHT, dpi),
            tray_width: to_pixels(TRAY_WIDTH, dpi),
            tray_height: to_pixels(TRAY_HEIGHT, dpi),
            bleed: to_pixels(BLEED_INSET, dpi),
        }
    }

    /// Horizontal origin of the back center strip inside the tray composite
    pub fn back_origin_x(&self) -> f64 {
        self.spine_width
    }

    /// Horizontal origin of the right spine strip inside the tray composite
    pub fn right_spine_origin_x(&self) -> f64 {
        self.spine_width + self.back_width
    }
}

/// Panel pixel sizes at the display DPI, computed on first use.
pub static PIXEL_METRICS: Lazy<PixelMetrics> = Lazy::new(|| PixelMetrics::at_dpi(DISPLAY_DPI));
