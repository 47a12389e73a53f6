//! Physical placement of the two boxes on the sheet.
//!
//! All values are inches measured from the top-left corner of the page and
//! kept as unrounded `f64` from start to finish.

use serde::{Deserialize, Serialize};

use super::PaperSize;
use crate::dimensions::{CROP_MARK_LENGTH, CROP_MARK_OFFSET, INTER_PANEL_MARGIN};
use crate::panel::{PanelId, Stage};

/// Axis-aligned box on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetBox {
    pub x_in: f64,
    pub y_in: f64,
    pub width_in: f64,
    pub height_in: f64,
}

impl SheetBox {
    pub fn right_in(&self) -> f64 {
        self.x_in + self.width_in
    }

    pub fn bottom_in(&self) -> f64 {
        self.y_in + self.height_in
    }
}

/// Straight segment on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetLine {
    pub x1_in: f64,
    pub y1_in: f64,
    pub x2_in: f64,
    pub y2_in: f64,
}

impl SheetLine {
    pub fn new(x1_in: f64, y1_in: f64, x2_in: f64, y2_in: f64) -> Self {
        SheetLine {
            x1_in,
            y1_in,
            x2_in,
            y2_in,
        }
    }
}

/// Front box above the tray box, the pair centered on the paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub paper: PaperSize,
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub content_width_in: f64,
    pub content_height_in: f64,
    pub start_x_in: f64,
    pub start_y_in: f64,
    pub front: SheetBox,
    pub tray: SheetBox,
    /// Spine folds, left then right, spanning the tray height
    pub fold_guides: [SheetLine; 2],
}

impl SheetLayout {
    /// ```rust
    /// use case_core::export::{PaperSize, SheetLayout};
    ///
    /// let layout = SheetLayout::compute(PaperSize::A4);
    /// assert!((layout.start_y_in - 0.9075).abs() < 1e-9);
    /// assert!((layout.front.x_in - 1.76).abs() < 1e-9);
    /// ```
    pub fn compute(paper: PaperSize) -> Self {
        let paper_width_in = paper.width().0;
        let paper_height_in = paper.height().0;

        let (front_w, front_h) = Stage::Front.size_in();
        let (front_w, front_h) = (front_w.0, front_h.0);
        let (tray_w, tray_h) = Stage::Tray.size_in();
        let (tray_w, tray_h) = (tray_w.0, tray_h.0);
        let margin = INTER_PANEL_MARGIN.0;

        let content_width_in = front_w.max(tray_w);
        let content_height_in = front_h + margin + tray_h;
        let start_x_in = (paper_width_in - content_width_in) / 2.0;
        let start_y_in = (paper_height_in - content_height_in) / 2.0;

        let front = SheetBox {
            x_in: start_x_in + (content_width_in - front_w) / 2.0,
            y_in: start_y_in,
            width_in: front_w,
            height_in: front_h,
        };
        let tray = SheetBox {
            x_in: start_x_in + (content_width_in - tray_w) / 2.0,
            y_in: start_y_in + front_h + margin,
            width_in: tray_w,
            height_in: tray_h,
        };

        let (spine_w, _) = PanelId::LeftSpine.size_in();
        let (back_w, _) = PanelId::BackCenter.size_in();
        let left_fold = tray.x_in + spine_w.0;
        let right_fold = left_fold + back_w.0;
        let fold_guides = [
            SheetLine::new(left_fold, tray.y_in, left_fold, tray.bottom_in()),
            SheetLine::new(right_fold, tray.y_in, right_fold, tray.bottom_in()),
        ];

        SheetLayout {
            paper,
            paper_width_in,
            paper_height_in,
            content_width_in,
            content_height_in,
            start_x_in,
            start_y_in,
            front,
            tray,
            fold_guides,
        }
    }

    /// Box a stage's raster is placed into
    pub fn stage_box(&self, stage: Stage) -> SheetBox {
        match stage {
            Stage::Front => self.front,
            Stage::Tray => self.tray,
        }
    }

    /// Crop marks of the front box followed by those of the tray box.
    pub fn crop_marks(&self) -> Vec<SheetLine> {
        let mut marks = crop_marks(&self.front, CROP_MARK_OFFSET.0, CROP_MARK_LENGTH.0).to_vec();
        marks.extend(crop_marks(&self.tray, CROP_MARK_OFFSET.0, CROP_MARK_LENGTH.0));
        marks
    }
}

/// Eight segments (one horizontal and one vertical per corner) that stay
/// `offset` away from the box and run `length` outward.
///
/// Order: top-left, top-right, bottom-left, bottom-right; horizontal first.
pub fn crop_marks(b: &SheetBox, offset: f64, length: f64) -> [SheetLine; 8] {
    let (x, y) = (b.x_in, b.y_in);
    let (r, bottom) = (b.right_in(), b.bottom_in());
    [
        SheetLine::new(x - offset - length, y, x - offset, y),
        SheetLine::new(x, y - offset - length, x, y - offset),
        SheetLine::new(r + offset, y, r + offset + length, y),
        SheetLine::new(r, y - offset - length, r, y - offset),
        SheetLine::new(x - offset - length, bottom, x - offset, bottom),
        SheetLine::new(x, bottom + offset, x, bottom + offset + length),
        SheetLine::new(r + offset, bottom, r + offset + length, bottom),
        SheetLine::new(r, bottom + offset, r, bottom + offset + length),
    ]
}
