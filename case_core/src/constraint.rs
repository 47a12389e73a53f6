//! # Drag Constraint
//!
//! Clamps a candidate image position so the scaled image never exposes the
//! panel background. Positions are the top-left corner of the rendered image
//! in stage coordinates; the panel's own origin inside the stage is part of
//! the rectangle (zero for a standalone panel).
//!
//! - [`AxisLock::Free`]: `x ∈ [min(ox, ox + W − Rw), ox]`, same for `y`.
//! - [`AxisLock::Horizontal`]: `y` is pinned to `oy`; `x` as above.
//!
//! Fill-height scaling makes `Rh == H` for strips, so the pinned `y` is the
//! only value the free rule would allow anyway.

use serde::{Deserialize, Serialize};

use crate::panel::{AxisLock, PanelRect};

/// A 2D position in stage pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub fn new(x: f64, y: f64) -> Self {
        Offset { x, y }
    }
}

/// Allowed range of one axis. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Range for an image of length `rendered` over a panel span starting at
    /// `origin` with length `span`.
    pub fn covering(origin: f64, span: f64, rendered: f64) -> Self {
        AxisRange {
            min: origin.min(origin + span - rendered),
            max: origin,
        }
    }

    pub fn pinned(value: f64) -> Self {
        AxisRange { min: value, max: value }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.max;
        }
        value.clamp(self.min, self.max)
    }
}

/// Both axis ranges for a panel/image pair.
pub fn allowed_ranges(lock: AxisLock, rect: PanelRect, rendered_width: f64, rendered_height: f64) -> (AxisRange, AxisRange) {
    let x = AxisRange::covering(rect.x, rect.width, rendered_width);
    let y = match lock {
        AxisLock::Free => AxisRange::covering(rect.y, rect.height, rendered_height),
        AxisLock::Horizontal => AxisRange::pinned(rect.y),
    };
    (x, y)
}

/// Clamp `candidate` for an image of the given rendered size.
///
/// Idempotent: clamping an already clamped offset returns it unchanged.
pub fn clamp_offset(
    lock: AxisLock,
    rect: PanelRect,
    rendered_width: f64,
    rendered_height: f64,
    candidate: Offset,
) -> Offset {
    let (xr, yr) = allowed_ranges(lock, rect, rendered_width, rendered_height);
    Offset {
        x: xr.clamp(candidate.x),
        y: yr.clamp(candidate.y),
    }
}

/// Position that centers the rendered image over the panel, then clamped.
pub fn centered_offset(lock: AxisLock, rect: PanelRect, rendered_width: f64, rendered_height: f64) -> Offset {
    let candidate = Offset {
        x: rect.x + (rect.width - rendered_width) / 2.0,
        y: rect.y + (rect.height - rendered_height) / 2.0,
    };
    clamp_offset(lock, rect, rendered_width, rendered_height, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> PanelRect {
        PanelRect::new(0.0, 0.0, 456.0, 456.0)
    }

    #[test]
    fn test_free_clamps_each_axis() {
        let o = clamp_offset(AxisLock::Free, square(), 912.0, 600.0, Offset::new(50.0, -1000.0));
        assert_eq!(o, Offset::new(0.0, -144.0));
    }

    #[test]
    fn test_free_inside_range_untouched() {
        let o = clamp_offset(AxisLock::Free, square(), 912.0, 600.0, Offset::new(-100.0, -20.0));
        assert_eq!(o, Offset::new(-100.0, -20.0));
    }

    #[test]
    fn test_strip_pins_vertical() {
        let rect = PanelRect::new(24.0, 0.0, 518.0, 444.0);
        let o = clamp_offset(AxisLock::Horizontal, rect, 800.0, 444.0, Offset::new(-500.0, 37.0));
        assert_eq!(o.y, 0.0);
        // min(24, 24 + 518 - 800) = -258
        assert_eq!(o.x, -258.0);
    }

    #[test]
    fn test_strip_cannot_move_right_of_origin() {
        let rect = PanelRect::new(542.0, 0.0, 24.0, 444.0);
        let o = clamp_offset(AxisLock::Horizontal, rect, 300.0, 444.0, Offset::new(600.0, 0.0));
        assert_eq!(o.x, 542.0);
    }

    #[test]
    fn test_smaller_image_pins_to_origin() {
        // Rendered narrower than the panel: range collapses to the origin
        let rect = PanelRect::new(0.0, 0.0, 518.0, 444.0);
        let o = clamp_offset(AxisLock::Horizontal, rect, 300.0, 444.0, Offset::new(-40.0, 0.0));
        assert_eq!(o.x, 0.0);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let once = clamp_offset(AxisLock::Free, square(), 700.0, 500.0, Offset::new(-999.0, 3.0));
        let twice = clamp_offset(AxisLock::Free, square(), 700.0, 500.0, once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nan_candidate_snaps_to_origin() {
        let o = clamp_offset(AxisLock::Free, square(), 700.0, 500.0, Offset::new(f64::NAN, f64::NAN));
        assert_eq!(o, Offset::new(0.0, 0.0));
    }

    #[test]
    fn test_centered_offset() {
        let o = centered_offset(AxisLock::Free, square(), 912.0, 456.0);
        assert_eq!(o, Offset::new(-228.0, 0.0));
    }
}
