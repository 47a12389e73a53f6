//! # Panel Transform
//!
//! Fits a source image of arbitrary natural size into a fixed panel under one
//! of the two [`ScalePolicy`] variants. The same function serves every panel;
//! the policy comes from the panel table in [`crate::panel`].
//!
//! ## Example
//!
//! ```rust
//! use case_core::panel::ScalePolicy;
//! use case_core::transform::{fit, NaturalSize};
//!
//! // 1000x500 landscape into the 456px square front cover
//! let f = fit(ScalePolicy::Cover, 456.0, 456.0, NaturalSize::new(1000.0, 500.0));
//! assert_eq!(f.scale, 0.912);
//! assert!((f.rendered_height - 456.0).abs() < 1e-9);
//! assert!(f.rendered_width > 456.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::panel::ScalePolicy;

/// Natural (decoded) pixel size of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NaturalSize {
    pub width: f64,
    pub height: f64,
}

impl NaturalSize {
    pub fn new(width: f64, height: f64) -> Self {
        NaturalSize { width, height }
    }

    /// Natural size as seen after rotating the image by `rotation` degrees.
    ///
    /// Only quarter turns are supported; odd quarter turns swap the axes.
    pub fn rotated(self, rotation: f64) -> Self {
        if quarter_turns(rotation) % 2 == 1 {
            NaturalSize::new(self.height, self.width)
        } else {
            self
        }
    }
}

/// Result of fitting an image into a panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelFit {
    /// Uniform factor applied to the natural size
    pub scale: f64,
    pub rendered_width: f64,
    pub rendered_height: f64,
}

impl PanelFit {
    /// Identity fit used while an asset has no usable natural size yet
    pub fn identity(natural: NaturalSize) -> Self {
        PanelFit {
            scale: 1.0,
            rendered_width: natural.width,
            rendered_height: natural.height,
        }
    }
}

/// Fill-height scale: `panel_height / natural_height`.
///
/// Returns 1.0 when the natural height is not known yet (zero); the caller
/// must not render until the decode settles.
pub fn fill_height_scale(panel_height: f64, natural_height: f64) -> f64 {
    if natural_height <= 0.0 {
        return 1.0;
    }
    panel_height / natural_height
}

/// Cover scale: the larger of the two exact-fit scales, so neither axis
/// leaves a gap.
pub fn cover_scale(panel_width: f64, panel_height: f64, natural: NaturalSize) -> f64 {
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return 1.0;
    }
    (panel_width / natural.width).max(panel_height / natural.height)
}

/// Fit `natural` into a `panel_width` x `panel_height` panel under `policy`.
pub fn fit(policy: ScalePolicy, panel_width: f64, panel_height: f64, natural: NaturalSize) -> PanelFit {
    let scale = match policy {
        ScalePolicy::FillHeight => fill_height_scale(panel_height, natural.height),
        ScalePolicy::Cover => cover_scale(panel_width, panel_height, natural),
    };
    PanelFit {
        scale,
        rendered_width: natural.width * scale,
        rendered_height: natural.height * scale,
    }
}

/// Number of clockwise quarter turns (0..=3) closest to `degrees`.
pub fn quarter_turns(degrees: f64) -> u8 {
    if !degrees.is_finite() {
        return 0;
    }
    ((degrees / 90.0).round() as i64).rem_euclid(4) as u8
}

/// Snap an arbitrary angle to the nearest supported quarter turn, in degrees.
pub fn snap_rotation(degrees: f64) -> f64 {
    f64::from(quarter_turns(degrees)) * 90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_height_matches_panel_height() {
        let f = fit(ScalePolicy::FillHeight, 24.0, 444.0, NaturalSize::new(3000.0, 1500.0));
        assert!((f.rendered_height - 444.0).abs() < 1e-9);
        assert!((f.scale - 444.0 / 1500.0).abs() < 1e-12);
    }

    #[test]
    fn test_fill_height_ignores_width() {
        let a = fit(ScalePolicy::FillHeight, 518.0, 444.0, NaturalSize::new(100.0, 888.0));
        let b = fit(ScalePolicy::FillHeight, 518.0, 444.0, NaturalSize::new(9000.0, 888.0));
        assert_eq!(a.scale, b.scale);
        assert_eq!(a.scale, 0.5);
    }

    #[test]
    fn test_fill_height_unloaded_defaults_to_one() {
        assert_eq!(fill_height_scale(444.0, 0.0), 1.0);
    }

    #[test]
    fn test_cover_portrait_image() {
        // Portrait: width ratio governs
        let f = fit(ScalePolicy::Cover, 456.0, 456.0, NaturalSize::new(228.0, 912.0));
        assert_eq!(f.scale, 2.0);
        assert_eq!(f.rendered_width, 456.0);
        assert_eq!(f.rendered_height, 1824.0);
    }

    #[test]
    fn test_cover_zero_size_defaults_to_one() {
        assert_eq!(cover_scale(456.0, 456.0, NaturalSize::new(0.0, 100.0)), 1.0);
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(quarter_turns(0.0), 0);
        assert_eq!(quarter_turns(90.0), 1);
        assert_eq!(quarter_turns(-90.0), 3);
        assert_eq!(quarter_turns(450.0), 1);
        assert_eq!(quarter_turns(100.0), 1);
        assert_eq!(quarter_turns(f64::NAN), 0);
        assert_eq!(snap_rotation(260.0), 270.0);
    }

    #[test]
    fn test_rotated_swaps_axes() {
        let n = NaturalSize::new(100.0, 20.0);
        assert_eq!(n.rotated(90.0), NaturalSize::new(20.0, 100.0));
        assert_eq!(n.rotated(180.0), n);
    }
}
