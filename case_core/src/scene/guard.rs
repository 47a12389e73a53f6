//! Scoped "export mode" for a scene.

use image::RgbaImage;
use tracing::trace;

use super::{SceneRenderer, ShapeId};
use crate::errors::CaseResult;

/// Hides every visible overlay shape of a scene for as long as it lives.
///
/// Dropping the guard shows exactly the shapes it hid, on every exit path
/// (early return, `?`, panic unwinding). Shapes that were already hidden
/// when the guard was acquired stay hidden.
///
/// ```rust
/// use case_core::panel::PanelRect;
/// use case_core::scene::{Color, OverlayGuard, Scene, SceneRenderer, Shape, Stroke};
///
/// let mut scene = Scene::new(20.0, 20.0, Color::WHITE);
/// let border = scene.add(Shape::Rect {
///     rect: PanelRect::new(0.0, 0.0, 20.0, 20.0),
///     fill: None,
///     stroke: Some(Stroke::solid(Color::BLACK, 1.0)),
/// });
///
/// {
///     let guard = OverlayGuard::acquire(&mut scene);
///     assert_eq!(guard.hidden(), &[border]);
/// }
/// assert!(scene.is_visible(border));
/// ```
pub struct OverlayGuard<'a, R: SceneRenderer + ?Sized> {
    scene: &'a mut R,
    hidden: Vec<ShapeId>,
}

impl<'a, R: SceneRenderer + ?Sized> OverlayGuard<'a, R> {
    pub fn acquire(scene: &'a mut R) -> Self {
        let hidden: Vec<ShapeId> = scene
            .shapes()
            .into_iter()
            .filter(|s| s.visible && s.is_overlay())
            .map(|s| s.id)
            .collect();

        for &id in &hidden {
            scene.set_visible(id, false);
        }
        trace!(count = hidden.len(), "overlays hidden for export");

        OverlayGuard { scene, hidden }
    }

    /// Shapes hidden by this guard
    pub fn hidden(&self) -> &[ShapeId] {
        &self.hidden
    }

    /// Rasterize the scene with overlays hidden.
    pub fn rasterize(&self, pixel_ratio: u32) -> CaseResult<RgbaImage> {
        self.scene.rasterize(pixel_ratio)
    }
}

impl<R: SceneRenderer + ?Sized> Drop for OverlayGuard<'_, R> {
    fn drop(&mut self) {
        for &id in &self.hidden {
            self.scene.set_visible(id, true);
        }
        trace!(count = self.hidden.len(), "overlays restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CaseError;
    use crate::panel::PanelRect;
    use crate::scene::{Color, Scene, Shape, ShapeInfo, ShapeKind, Stroke};
    use std::cell::Cell;

    fn annotated_scene() -> (Scene, ShapeId, ShapeId, ShapeId) {
        let mut scene = Scene::new(40.0, 40.0, Color::WHITE);
        let art = scene.add(Shape::Rect {
            rect: PanelRect::new(0.0, 0.0, 40.0, 40.0),
            fill: Some(Color::rgb(200, 0, 0)),
            stroke: None,
        });
        let zone = scene.add(Shape::Rect {
            rect: PanelRect::new(4.0, 4.0, 32.0, 32.0),
            fill: None,
            stroke: Some(Stroke::dashed(Color::BLACK, 1.0, vec![3.0, 3.0])),
        });
        let divider = scene.add(Shape::Line {
            points: vec![(20.0, 0.0), (20.0, 40.0)],
            stroke: Stroke::solid(Color::BLACK, 1.0),
        });
        (scene, art, zone, divider)
    }

    #[test]
    fn test_hides_only_overlays() {
        let (mut scene, art, zone, divider) = annotated_scene();
        {
            let guard = OverlayGuard::acquire(&mut scene);
            assert_eq!(guard.hidden(), &[zone, divider]);
        }
        assert!(scene.is_visible(art));
        assert!(scene.is_visible(zone));
        assert!(scene.is_visible(divider));
    }

    #[test]
    fn test_raster_excludes_overlays() {
        let (mut scene, _, _, _) = annotated_scene();
        let img = OverlayGuard::acquire(&mut scene).rasterize(1).unwrap();
        // Divider column would be black if drawn
        assert_eq!(img.get_pixel(20, 10).0, [200, 0, 0, 255]);
    }

    #[test]
    fn test_already_hidden_stay_hidden() {
        let (mut scene, _, zone, divider) = annotated_scene();
        scene.set_visible(zone, false);
        {
            let guard = OverlayGuard::acquire(&mut scene);
            assert_eq!(guard.hidden(), &[divider]);
        }
        assert!(!scene.is_visible(zone));
        assert!(scene.is_visible(divider));
    }

    /// Renderer whose rasterization always fails and records what was
    /// visible at that moment.
    struct FailingRenderer {
        visible: Vec<bool>,
        visible_during_raster: Cell<Option<Vec<bool>>>,
    }

    impl SceneRenderer for FailingRenderer {
        fn size_px(&self) -> (u32, u32) {
            (10, 10)
        }

        fn shapes(&self) -> Vec<ShapeInfo> {
            self.visible
                .iter()
                .enumerate()
                .map(|(id, &visible)| ShapeInfo {
                    id,
                    kind: ShapeKind::Line,
                    stroke: Some(Color::BLACK),
                    fill: None,
                    dash: None,
                    visible,
                })
                .collect()
        }

        fn set_visible(&mut self, id: ShapeId, visible: bool) {
            self.visible[id] = visible;
        }

        fn is_visible(&self, id: ShapeId) -> bool {
            self.visible[id]
        }

        fn rasterize(&self, _pixel_ratio: u32) -> CaseResult<RgbaImage> {
            self.visible_during_raster.set(Some(self.visible.clone()));
            Err(CaseError::Internal {
                message: "canvas lost".to_string(),
            })
        }
    }

    #[test]
    fn test_restores_after_failed_raster() {
        let mut renderer = FailingRenderer {
            visible: vec![true, true],
            visible_during_raster: Cell::new(None),
        };
        let result = OverlayGuard::acquire(&mut renderer).rasterize(3);
        assert!(result.is_err());
        assert_eq!(renderer.visible_during_raster.take(), Some(vec![false, false]));
        assert_eq!(renderer.visible, vec![true, true]);
    }

    #[test]
    fn test_restores_on_panic() {
        let (mut scene, _, zone, _) = annotated_scene();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = OverlayGuard::acquire(&mut scene);
            panic!("renderer crashed");
        }));
        assert!(outcome.is_err());
        assert!(scene.is_visible(zone));
    }
}
