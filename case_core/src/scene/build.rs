//! Editor view of each stage.
//!
//! Paint order: panel backgrounds, artwork, then the editor annotations
//! (safety zones, cut lines, section dividers) on top.

use serde::{Deserialize, Serialize};

use super::{Color, Scene, Shape, Stroke};
use crate::dimensions::PIXEL_METRICS;
use crate::panel::{PanelId, Stage};
use crate::project::ProjectState;

/// Colors of the editor view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneStyle {
    /// Fill behind every panel; shows wherever the artwork leaves a gap
    pub background: Color,
    /// Dashed safety-zone outline
    pub safety: Color,
    /// Cut-line borders and section dividers
    pub cut: Color,
}

impl Default for SceneStyle {
    fn default() -> Self {
        SceneStyle {
            background: Color::WHITE,
            safety: Color::rgb(0, 160, 255),
            cut: Color::rgb(255, 0, 80),
        }
    }
}

const SAFETY_DASH: [f64; 2] = [6.0, 4.0];
const OVERLAY_WIDTH: f64 = 1.0;

/// Scene for the front cover stage.
pub fn build_front_scene(state: &ProjectState, style: &SceneStyle) -> Scene {
    build_stage_scene(state, Stage::Front, style)
}

/// Scene for the tray composite: left spine, back center, right spine.
pub fn build_tray_scene(state: &ProjectState, style: &SceneStyle) -> Scene {
    build_stage_scene(state, Stage::Tray, style)
}

pub fn build_stage_scene(state: &ProjectState, stage: Stage, style: &SceneStyle) -> Scene {
    let (width, height) = stage.size_px();
    let mut scene = Scene::new(width, height, style.background);
    let panels = stage.panels();

    for id in panels {
        scene.add(Shape::Rect {
            rect: id.rect(),
            fill: Some(style.background),
            stroke: None,
        });
    }

    for &id in panels {
        let part = state.part(id);
        let (Some(asset), Some((rendered_w, rendered_h))) = (&part.image, part.rendered_size()) else {
            continue;
        };
        let rect = id.rect();
        scene.add(Shape::Image {
            asset: asset.clone(),
            x: rect.x + part.offset_x,
            y: rect.y + part.offset_y,
            width: rendered_w,
            height: rendered_h,
            rotation: part.rotation,
            clip: rect,
        });
    }

    for &id in panels {
        if id.is_spine() {
            continue;
        }
        scene.add(Shape::Rect {
            rect: id.rect().inset(PIXEL_METRICS.bleed),
            fill: None,
            stroke: Some(Stroke::dashed(style.safety, OVERLAY_WIDTH, SAFETY_DASH.to_vec())),
        });
    }

    for id in panels {
        scene.add(Shape::Rect {
            rect: id.rect(),
            fill: None,
            stroke: Some(Stroke::solid(style.cut, OVERLAY_WIDTH)),
        });
    }

    if stage == Stage::Tray {
        for x in [PanelId::BackCenter.rect().x, PanelId::RightSpine.rect().x] {
            scene.add(Shape::Line {
                points: vec![(x, 0.0), (x, height)],
                stroke: Stroke::solid(style.cut, OVERLAY_WIDTH),
            });
        }
    }

    scene
}
