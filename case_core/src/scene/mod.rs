//! # Scene Graph
//!
//! The export compositor talks to whatever renders a stage through the
//! [`SceneRenderer`] trait: enumerate shapes with their paint attributes,
//! toggle their visibility, and rasterize the whole scene at a pixel ratio.
//!
//! [`Scene`] is the in-crate implementation: a flat, ordered list of image,
//! rectangle and line shapes rasterized in software with the `image` crate.
//! [`build_stage_scene`] produces the editor view of a stage from a
//! [`crate::project::ProjectState`], overlays included.
//!
//! ## Overlays
//!
//! Editor-only annotations are recognised purely by how they are painted
//! (see [`ShapeInfo::is_overlay`]), so any renderer can take part in export
//! without tagging its shapes.

mod build;
mod guard;
mod raster;

pub use build::{build_front_scene, build_stage_scene, build_tray_scene, SceneStyle};
pub use guard::OverlayGuard;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::assets::ImageAsset;
use crate::errors::CaseResult;
use crate::panel::PanelRect;

/// Index of a shape inside its scene.
pub type ShapeId = usize;

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// `#rrggbb` form, as used in Typst sources
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub(crate) fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Outline paint of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Color,
    /// Width in stage pixels
    pub width: f64,
    /// Alternating on/off lengths in stage pixels; `None` for a solid line
    pub dash: Option<Vec<f64>>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Stroke { color, width, dash: None }
    }

    pub fn dashed(color: Color, width: f64, pattern: Vec<f64>) -> Self {
        Stroke {
            color,
            width,
            dash: Some(pattern),
        }
    }
}

/// Primitive kinds a renderer exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Image,
    Rect,
    Line,
}

/// Paint attributes of one shape, as reported by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub dash: Option<Vec<f64>>,
    pub visible: bool,
}

impl ShapeInfo {
    /// Editor-only annotation that must not reach the printed page: every
    /// line primitive (section dividers), anything dashed (safety zones),
    /// and anything stroked without a fill (cut-line borders).
    pub fn is_overlay(&self) -> bool {
        self.kind == ShapeKind::Line
            || self.dash.as_ref().is_some_and(|d| !d.is_empty())
            || (self.stroke.is_some() && self.fill.is_none())
    }
}

/// Rendering collaborator for one stage.
pub trait SceneRenderer {
    /// Stage size in display pixels
    fn size_px(&self) -> (u32, u32);

    /// All shapes in paint order
    fn shapes(&self) -> Vec<ShapeInfo>;

    fn set_visible(&mut self, id: ShapeId, visible: bool);

    fn is_visible(&self, id: ShapeId) -> bool;

    /// Rasterize the visible shapes at `pixel_ratio` times the stage size.
    fn rasterize(&self, pixel_ratio: u32) -> CaseResult<RgbaImage>;
}

/// Drawable content of a scene node.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Image with its top-left at `(x, y)`, drawn at `width` x `height`
    /// (after rotation) and clipped to `clip`.
    Image {
        asset: ImageAsset,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
        clip: PanelRect,
    },
    Rect {
        rect: PanelRect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Open polyline
    Line { points: Vec<(f64, f64)>, stroke: Stroke },
}

impl Shape {
    fn kind(&self) -> ShapeKind {
        match self {
            Shape::Image { .. } => ShapeKind::Image,
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::Line { .. } => ShapeKind::Line,
        }
    }

    fn stroke(&self) -> Option<&Stroke> {
        match self {
            Shape::Image { .. } => None,
            Shape::Rect { stroke, .. } => stroke.as_ref(),
            Shape::Line { stroke, .. } => Some(stroke),
        }
    }

    fn fill(&self) -> Option<Color> {
        match self {
            Shape::Rect { fill, .. } => *fill,
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    shape: Shape,
    visible: bool,
}

/// Software scene: an ordered list of shapes over a solid background.
#[derive(Debug, Clone)]
pub struct Scene {
    width: f64,
    height: f64,
    background: Color,
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new(width: f64, height: f64, background: Color) -> Self {
        Scene {
            width,
            height,
            background,
            nodes: Vec::new(),
        }
    }

    /// Append a visible shape on top of the existing ones.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        self.nodes.push(Node { shape, visible: true });
        self.nodes.len() - 1
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.nodes.get(id).map(|n| &n.shape)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn visible_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.nodes.iter().filter(|n| n.visible).map(|n| &n.shape)
    }
}

impl SceneRenderer for Scene {
    fn size_px(&self) -> (u32, u32) {
        (self.width.round().max(0.0) as u32, self.height.round().max(0.0) as u32)
    }

    fn shapes(&self) -> Vec<ShapeInfo> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(id, node)| {
                let stroke = node.shape.stroke();
                ShapeInfo {
                    id,
                    kind: node.shape.kind(),
                    stroke: stroke.map(|s| s.color),
                    fill: node.shape.fill(),
                    dash: stroke.and_then(|s| s.dash.clone()),
                    visible: node.visible,
                }
            })
            .collect()
    }

    fn set_visible(&mut self, id: ShapeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.visible = visible;
        }
    }

    fn is_visible(&self, id: ShapeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    fn rasterize(&self, pixel_ratio: u32) -> CaseResult<RgbaImage> {
        raster::rasterize(self, pixel_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(kind: ShapeKind, stroke: Option<Color>, fill: Option<Color>, dash: Option<Vec<f64>>) -> ShapeInfo {
        ShapeInfo {
            id: 0,
            kind,
            stroke,
            fill,
            dash,
            visible: true,
        }
    }

    #[test]
    fn test_overlay_classification() {
        // Section divider
        assert!(info(ShapeKind::Line, Some(Color::BLACK), None, None).is_overlay());
        // Safety zone
        assert!(info(ShapeKind::Rect, Some(Color::BLACK), Some(Color::WHITE), Some(vec![4.0, 4.0])).is_overlay());
        // Cut line
        assert!(info(ShapeKind::Rect, Some(Color::BLACK), None, None).is_overlay());
        // Artwork and backgrounds stay
        assert!(!info(ShapeKind::Image, None, None, None).is_overlay());
        assert!(!info(ShapeKind::Rect, None, Some(Color::WHITE), None).is_overlay());
        assert!(!info(ShapeKind::Rect, Some(Color::BLACK), Some(Color::WHITE), Some(vec![])).is_overlay());
    }

    #[test]
    fn test_scene_reports_shapes_in_order() {
        let mut scene = Scene::new(100.0, 50.0, Color::WHITE);
        let fill = scene.add(Shape::Rect {
            rect: PanelRect::new(0.0, 0.0, 10.0, 10.0),
            fill: Some(Color::BLACK),
            stroke: None,
        });
        let line = scene.add(Shape::Line {
            points: vec![(0.0, 0.0), (10.0, 0.0)],
            stroke: Stroke::dashed(Color::BLACK, 1.0, vec![2.0, 2.0]),
        });

        let shapes = scene.shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[fill].kind, ShapeKind::Rect);
        assert_eq!(shapes[line].dash, Some(vec![2.0, 2.0]));
        assert_eq!(scene.size_px(), (100, 50));
    }

    #[test]
    fn test_visibility_toggle() {
        let mut scene = Scene::new(10.0, 10.0, Color::WHITE);
        let id = scene.add(Shape::Line {
            points: vec![(0.0, 0.0), (10.0, 10.0)],
            stroke: Stroke::solid(Color::BLACK, 1.0),
        });
        scene.set_visible(id, false);
        assert!(!scene.is_visible(id));
        scene.set_visible(id, true);
        assert!(scene.is_visible(id));
        assert!(!scene.is_visible(99));
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::rgb(255, 0, 128).to_hex(), "#ff0080");
    }
}
