//! # Panels
//!
//! The four physical panels of the case and the parameters that drive the
//! generic transform/constraint pair: a scaling policy, an axis lock and a
//! rectangle inside the stage the panel is edited and rasterized on.
//!
//! | Panel        | Stage | Policy      | Axis lock  |
//! |--------------|-------|-------------|------------|
//! | FrontCover   | Front | Cover       | Free       |
//! | LeftSpine    | Tray  | FillHeight  | Horizontal |
//! | BackCenter   | Tray  | FillHeight  | Horizontal |
//! | RightSpine   | Tray  | FillHeight  | Horizontal |

use serde::{Deserialize, Serialize};

use crate::dimensions::{
    BACK_CENTER_HEIGHT, BACK_CENTER_WIDTH, FRONT_COVER_HEIGHT, FRONT_COVER_WIDTH, PIXEL_METRICS,
    SPINE_HEIGHT, SPINE_WIDTH, TRAY_HEIGHT, TRAY_WIDTH,
};
use crate::units::Inches;

/// Identity of one of the four case panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    FrontCover,
    LeftSpine,
    BackCenter,
    RightSpine,
}

impl PanelId {
    /// All panels, front first, then the tray strips left to right
    pub const ALL: [PanelId; 4] = [
        PanelId::FrontCover,
        PanelId::LeftSpine,
        PanelId::BackCenter,
        PanelId::RightSpine,
    ];

    /// Human-readable label, also used as the part's identity label
    pub fn label(&self) -> &'static str {
        match self {
            PanelId::FrontCover => "Front Cover",
            PanelId::LeftSpine => "Left Spine",
            PanelId::BackCenter => "Back Center",
            PanelId::RightSpine => "Right Spine",
        }
    }

    /// Stable key used in job files
    pub fn key(&self) -> &'static str {
        match self {
            PanelId::FrontCover => "front_cover",
            PanelId::LeftSpine => "left_spine",
            PanelId::BackCenter => "back_center",
            PanelId::RightSpine => "right_spine",
        }
    }

    /// Stage this panel is composed on
    pub fn stage(&self) -> Stage {
        match self {
            PanelId::FrontCover => Stage::Front,
            _ => Stage::Tray,
        }
    }

    pub fn policy(&self) -> ScalePolicy {
        match self {
            PanelId::FrontCover => ScalePolicy::Cover,
            _ => ScalePolicy::FillHeight,
        }
    }

    pub fn axis_lock(&self) -> AxisLock {
        match self {
            PanelId::FrontCover => AxisLock::Free,
            _ => AxisLock::Horizontal,
        }
    }

    /// Physical (width, height)
    pub fn size_in(&self) -> (Inches, Inches) {
        match self {
            PanelId::FrontCover => (FRONT_COVER_WIDTH, FRONT_COVER_HEIGHT),
            PanelId::LeftSpine | PanelId::RightSpine => (SPINE_WIDTH, SPINE_HEIGHT),
            PanelId::BackCenter => (BACK_CENTER_WIDTH, BACK_CENTER_HEIGHT),
        }
    }

    /// Pixel rectangle of this panel inside its stage.
    pub fn rect(&self) -> PanelRect {
        let m = &*PIXEL_METRICS;
        match self {
            PanelId::FrontCover => PanelRect::new(0.0, 0.0, m.front_width, m.front_height),
            PanelId::LeftSpine => PanelRect::new(0.0, 0.0, m.spine_width, m.spine_height),
            PanelId::BackCenter => PanelRect::new(m.back_origin_x(), 0.0, m.back_width, m.back_height),
            PanelId::RightSpine => {
                PanelRect::new(m.right_spine_origin_x(), 0.0, m.spine_width, m.spine_height)
            }
        }
    }

    pub fn is_spine(&self) -> bool {
        matches!(self, PanelId::LeftSpine | PanelId::RightSpine)
    }
}

impl std::fmt::Display for PanelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How a source image is scaled into its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalePolicy {
    /// Image height matches panel height exactly; width may overflow and clip
    FillHeight,
    /// Smallest scale that leaves no gap on either axis
    Cover,
}

/// Which axes the user may drag an image along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisLock {
    /// Both axes move freely (square panels)
    Free,
    /// Only horizontal movement; vertical is pinned (strip panels)
    Horizontal,
}

/// One rasterized surface of the export: the front cover alone, or the
/// three tray strips as a single composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Front,
    Tray,
}

impl Stage {
    /// Export order: front first, then tray
    pub const ALL: [Stage; 2] = [Stage::Front, Stage::Tray];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Front => "front",
            Stage::Tray => "tray",
        }
    }

    /// Panels composed on this stage, left to right
    pub fn panels(&self) -> &'static [PanelId] {
        match self {
            Stage::Front => &[PanelId::FrontCover],
            Stage::Tray => &[PanelId::LeftSpine, PanelId::BackCenter, PanelId::RightSpine],
        }
    }

    /// Stage size in display pixels
    pub fn size_px(&self) -> (f64, f64) {
        let m = &*PIXEL_METRICS;
        match self {
            Stage::Front => (m.front_width, m.front_height),
            Stage::Tray => (m.tray_width, m.tray_height),
        }
    }

    /// Physical stage size
    pub fn size_in(&self) -> (Inches, Inches) {
        match self {
            Stage::Front => (FRONT_COVER_WIDTH, FRONT_COVER_HEIGHT),
            Stage::Tray => (TRAY_WIDTH, TRAY_HEIGHT),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis-aligned rectangle in stage pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        PanelRect { x, y, width, height }
    }

    /// Rectangle shrunk by `inset` on every edge
    pub fn inset(&self, inset: f64) -> PanelRect {
        PanelRect {
            x: self.x + inset,
            y: self.y + inset,
            width: (self.width - 2.0 * inset).max(0.0),
            height: (self.height - 2.0 * inset).max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        assert_eq!(PanelId::FrontCover.policy(), ScalePolicy::Cover);
        assert_eq!(PanelId::FrontCover.axis_lock(), AxisLock::Free);
        for id in [PanelId::LeftSpine, PanelId::BackCenter, PanelId::RightSpine] {
            assert_eq!(id.policy(), ScalePolicy::FillHeight);
            assert_eq!(id.axis_lock(), AxisLock::Horizontal);
            assert_eq!(id.stage(), Stage::Tray);
        }
    }

    #[test]
    fn test_tray_rects_are_contiguous() {
        let left = PanelId::LeftSpine.rect();
        let back = PanelId::BackCenter.rect();
        let right = PanelId::RightSpine.rect();
        assert_eq!(left.right(), back.x);
        assert_eq!(back.right(), right.x);
        assert_eq!(right.right(), Stage::Tray.size_px().0);
    }

    #[test]
    fn test_tray_size_is_sum_of_strips() {
        let (tray_w, tray_h) = Stage::Tray.size_in();
        let strips: f64 = Stage::Tray.panels().iter().map(|id| id.size_in().0 .0).sum();
        assert!((strips - tray_w.0).abs() < 1e-9);
        for id in Stage::Tray.panels() {
            assert_eq!(id.size_in().1, tray_h);
        }
        assert_eq!(Stage::Front.size_in(), PanelId::FrontCover.size_in());
    }

    #[test]
    fn test_inset() {
        let r = PanelRect::new(10.0, 0.0, 100.0, 50.0).inset(12.0);
        assert_eq!(r, PanelRect::new(22.0, 12.0, 76.0, 26.0));
    }

    #[test]
    fn test_panel_id_keys_match_serde() {
        for id in PanelId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.key()));
        }
    }
}
