//! Software rasterizer for [`Scene`].
//!
//! Everything is drawn in device pixels, i.e. stage pixels times the pixel
//! ratio. Images are resampled from only the part of the source that lands
//! inside their clip window, so heavily overflowing artwork costs no more
//! than the visible panel.

use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};

use super::{Color, Scene, Shape, Stroke};
use crate::assets::ImageAsset;
use crate::errors::{CaseError, CaseResult};
use crate::panel::PanelRect;
use crate::transform::quarter_turns;

/// Largest canvas we agree to allocate (about 256 MB of RGBA)
const MAX_CANVAS_PIXELS: f64 = 64_000_000.0;

/// Spacing of brush stamps along a stroke, in device pixels
const STAMP_STEP: f64 = 0.5;

pub(super) fn rasterize(scene: &Scene, pixel_ratio: u32) -> CaseResult<RgbaImage> {
    if pixel_ratio == 0 {
        return Err(CaseError::invalid_input("pixel_ratio", "0", "Pixel ratio must be at least 1"));
    }
    let ratio = f64::from(pixel_ratio);
    let (width, height) = scene.size();
    let device_w = (width * ratio).round();
    let device_h = (height * ratio).round();

    if !(device_w >= 1.0 && device_h >= 1.0) {
        return Err(CaseError::invalid_input(
            "scene size",
            format!("{}x{}", width, height),
            "Scene must be at least one pixel in each direction",
        ));
    }
    if device_w * device_h > MAX_CANVAS_PIXELS {
        return Err(CaseError::invalid_input(
            "scene size",
            format!("{}x{} at {}x", width, height, pixel_ratio),
            "Raster would exceed the canvas size limit",
        ));
    }

    let mut canvas = RgbaImage::from_pixel(device_w as u32, device_h as u32, scene.background().to_rgba());

    for shape in scene.visible_shapes() {
        match shape {
            Shape::Image {
                asset,
                x,
                y,
                width,
                height,
                rotation,
                clip,
            } => {
                let target = PanelRect::new(*x, *y, *width, *height);
                draw_image(&mut canvas, asset, target, *rotation, clip, ratio);
            }
            Shape::Rect { rect, fill, stroke } => {
                if let Some(fill) = fill {
                    fill_rect(&mut canvas, rect, *fill, ratio);
                }
                if let Some(stroke) = stroke {
                    let outline = [
                        (rect.x, rect.y),
                        (rect.right(), rect.y),
                        (rect.right(), rect.bottom()),
                        (rect.x, rect.bottom()),
                        (rect.x, rect.y),
                    ];
                    stroke_polyline(&mut canvas, &outline, stroke, ratio);
                }
            }
            Shape::Line { points, stroke } => stroke_polyline(&mut canvas, points, stroke, ratio),
        }
    }

    Ok(canvas)
}

fn rotated(source: &RgbaImage, rotation: f64) -> RgbaImage {
    match quarter_turns(rotation) {
        1 => imageops::rotate90(source),
        2 => imageops::rotate180(source),
        3 => imageops::rotate270(source),
        _ => source.clone(),
    }
}

/// Draw `asset` into `target` (stage pixels), showing only what falls
/// inside `clip` and the canvas.
fn draw_image(canvas: &mut RgbaImage, asset: &ImageAsset, target: PanelRect, rotation: f64, clip: &PanelRect, ratio: f64) {
    let ix = (target.x * ratio).round();
    let iy = (target.y * ratio).round();
    let tw = (target.width * ratio).round();
    let th = (target.height * ratio).round();
    if tw < 1.0 || th < 1.0 {
        return;
    }

    let x0 = (clip.x * ratio).round().max(0.0).max(ix);
    let y0 = (clip.y * ratio).round().max(0.0).max(iy);
    let x1 = (clip.right() * ratio).round().min(f64::from(canvas.width())).min(ix + tw);
    let y1 = (clip.bottom() * ratio).round().min(f64::from(canvas.height())).min(iy + th);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let source = rotated(asset.pixels(), rotation);
    let sw = f64::from(source.width());
    let sh = f64::from(source.height());

    // Source window that maps onto the visible device window
    let sx0 = ((x0 - ix) / tw * sw).floor().clamp(0.0, sw - 1.0);
    let sy0 = ((y0 - iy) / th * sh).floor().clamp(0.0, sh - 1.0);
    let sx1 = ((x1 - ix) / tw * sw).ceil().clamp(sx0 + 1.0, sw);
    let sy1 = ((y1 - iy) / th * sh).ceil().clamp(sy0 + 1.0, sh);

    let window = imageops::crop_imm(
        &source,
        sx0 as u32,
        sy0 as u32,
        (sx1 - sx0) as u32,
        (sy1 - sy0) as u32,
    )
    .to_image();
    let scaled = imageops::resize(&window, (x1 - x0) as u32, (y1 - y0) as u32, FilterType::Triangle);
    imageops::overlay(canvas, &scaled, x0 as i64, y0 as i64);
}

fn paint(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    if color.0[3] == 255 {
        canvas.put_pixel(x, y, color);
    } else {
        canvas.get_pixel_mut(x, y).blend(&color);
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: &PanelRect, color: Color, ratio: f64) {
    let x0 = (rect.x * ratio).round().max(0.0) as u32;
    let y0 = (rect.y * ratio).round().max(0.0) as u32;
    let x1 = ((rect.right() * ratio).round().max(0.0) as u32).min(canvas.width());
    let y1 = ((rect.bottom() * ratio).round().max(0.0) as u32).min(canvas.height());
    let color = color.to_rgba();
    for y in y0..y1 {
        for x in x0..x1 {
            paint(canvas, x, y, color);
        }
    }
}

/// Whether distance `d` along a dashed stroke falls in an "on" interval.
fn dash_on(d: f64, pattern: &[f64]) -> bool {
    let period: f64 = pattern.iter().sum();
    if period <= 0.0 {
        return true;
    }
    let mut phase = d % period;
    for (i, len) in pattern.iter().enumerate() {
        if phase < *len {
            return i % 2 == 0;
        }
        phase -= len;
    }
    true
}

/// Square brush centered on `(cx, cy)` covering pixel centers within
/// `[c - half, c + half)` on each axis.
fn stamp(canvas: &mut RgbaImage, cx: f64, cy: f64, half: f64, color: Rgba<u8>) {
    let x_start = (cx - half - 0.5).ceil().max(0.0);
    let x_end = (cx + half - 0.5).ceil().min(f64::from(canvas.width()));
    let y_start = (cy - half - 0.5).ceil().max(0.0);
    let y_end = (cy + half - 0.5).ceil().min(f64::from(canvas.height()));
    if x_end <= x_start || y_end <= y_start {
        return;
    }
    for y in y_start as u32..y_end as u32 {
        for x in x_start as u32..x_end as u32 {
            paint(canvas, x, y, color);
        }
    }
}

fn stroke_polyline(canvas: &mut RgbaImage, points: &[(f64, f64)], stroke: &Stroke, ratio: f64) {
    let half = (stroke.width * ratio / 2.0).max(0.5);
    let color = stroke.color.to_rgba();
    let pattern: Option<Vec<f64>> = stroke
        .dash
        .as_ref()
        .filter(|d| !d.is_empty() && d.iter().all(|len| *len > 0.0))
        .map(|d| d.iter().map(|len| len * ratio).collect());

    let mut walked = 0.0;
    for pair in points.windows(2) {
        let (ax, ay) = (pair[0].0 * ratio, pair[0].1 * ratio);
        let (bx, by) = (pair[1].0 * ratio, pair[1].1 * ratio);
        let len = (bx - ax).hypot(by - ay);
        let steps = (len / STAMP_STEP).ceil().max(1.0) as u32;

        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            let on = match &pattern {
                Some(p) => dash_on(walked + t * len, p),
                None => true,
            };
            if on {
                stamp(canvas, ax + t * (bx - ax), ay + t * (by - ay), half, color);
            }
        }
        walked += len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneRenderer;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn asset(width: u32, height: u32, color: [u8; 4]) -> ImageAsset {
        ImageAsset::from_rgba(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn test_supersampled_size() {
        let scene = Scene::new(456.0, 456.0, Color::WHITE);
        let img = scene.rasterize(3).unwrap();
        assert_eq!(img.dimensions(), (1368, 1368));
        assert_eq!(img.get_pixel(0, 0).0, WHITE);
    }

    #[test]
    fn test_zero_ratio_rejected() {
        let scene = Scene::new(10.0, 10.0, Color::WHITE);
        assert!(scene.rasterize(0).is_err());
    }

    #[test]
    fn test_empty_scene_rejected() {
        let scene = Scene::new(0.0, 10.0, Color::WHITE);
        assert!(scene.rasterize(1).is_err());
    }

    #[test]
    fn test_image_is_clipped() {
        let mut scene = Scene::new(30.0, 10.0, Color::WHITE);
        // Image overflows its 10px-wide clip window on both sides
        scene.add(Shape::Image {
            asset: asset(4, 4, RED),
            x: 5.0,
            y: 0.0,
            width: 20.0,
            height: 10.0,
            rotation: 0.0,
            clip: PanelRect::new(10.0, 0.0, 10.0, 10.0),
        });
        let img = scene.rasterize(2).unwrap();
        assert_eq!(img.get_pixel(18, 5).0, WHITE);
        assert_eq!(img.get_pixel(20, 5).0, RED);
        assert_eq!(img.get_pixel(39, 5).0, RED);
        assert_eq!(img.get_pixel(40, 5).0, WHITE);
    }

    #[test]
    fn test_image_outside_clip_draws_nothing() {
        let mut scene = Scene::new(20.0, 20.0, Color::WHITE);
        scene.add(Shape::Image {
            asset: asset(2, 2, RED),
            x: -50.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            rotation: 90.0,
            clip: PanelRect::new(0.0, 0.0, 20.0, 20.0),
        });
        let img = scene.rasterize(1).unwrap();
        assert!(img.pixels().all(|p| p.0 == WHITE));
    }

    #[test]
    fn test_line_is_drawn_and_dash_leaves_gaps() {
        let mut scene = Scene::new(40.0, 10.0, Color::WHITE);
        scene.add(Shape::Line {
            points: vec![(0.0, 5.0), (40.0, 5.0)],
            stroke: Stroke::dashed(Color::BLACK, 1.0, vec![10.0, 10.0]),
        });
        let img = scene.rasterize(1).unwrap();
        let row: Vec<bool> = (0..40).map(|x| img.get_pixel(x, 4).0 != WHITE).collect();
        assert!(row[2] && row[7]);
        assert!(!row[13] && !row[17]);
        assert!(row[23]);
    }

    #[test]
    fn test_dash_on() {
        assert!(dash_on(0.0, &[4.0, 2.0]));
        assert!(!dash_on(4.5, &[4.0, 2.0]));
        assert!(dash_on(6.1, &[4.0, 2.0]));
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut scene = Scene::new(4.0, 4.0, Color::WHITE);
        scene.add(Shape::Rect {
            rect: PanelRect::new(0.0, 0.0, 4.0, 4.0),
            fill: Some(Color::rgba(0, 0, 0, 128)),
            stroke: None,
        });
        let px = scene.rasterize(1).unwrap().get_pixel(1, 1).0;
        assert!(px[0] > 100 && px[0] < 160);
    }
}
