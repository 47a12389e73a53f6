//! # Export Compositor
//!
//! Lays the two stages out on a sheet of paper and writes the print PDF:
//!
//! 1. Resolve the paper key (an unknown key rejects the export outright)
//! 2. Compute the [`SheetLayout`]
//! 3. For each stage, front then tray: hide the overlays, rasterize at the
//!    supersample ratio, restore the overlays, flatten onto the settings
//!    background, PNG-encode
//! 4. Render the sheet: fold guides, stage images, crop marks
//! 5. Derive the download filename from the title
//!
//! A stage that fails in step 3 or 4 is left off the sheet and reported in
//! [`ExportOutput::warnings`]; the document is still produced.
//!
//! ## Example
//!
//! ```rust
//! use case_core::export::{export_case, ExportRequest, StageScenes};
//! use case_core::project::ProjectState;
//! use case_core::scene::{build_front_scene, build_tray_scene, SceneStyle};
//! use case_core::settings::ExportSettings;
//!
//! let state = ProjectState::new();
//! let style = SceneStyle::default();
//! let mut front = build_front_scene(&state, &style);
//! let mut tray = build_tray_scene(&state, &style);
//!
//! let request = ExportRequest::new("letter", "Blank Case");
//! let scenes = StageScenes {
//!     front: Some(&mut front),
//!     tray: Some(&mut tray),
//! };
//! let output = export_case(&request, scenes, &ExportSettings::default()).unwrap();
//! assert_eq!(output.filename, "blank_case_jewel_case.pdf");
//! assert!(output.warnings.is_empty());
//! ```

mod layout;
mod paper;

pub use layout::{crop_marks, SheetBox, SheetLayout, SheetLine};
pub use paper::PaperSize;

use std::io::Cursor;

use image::{imageops, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{CaseError, CaseResult};
use crate::panel::Stage;
use crate::pdf::{render_sheet, EmbeddedStage};
use crate::scene::{Color, OverlayGuard, SceneRenderer};
use crate::settings::ExportSettings;

/// Appended to the sanitized title
pub const FILENAME_SUFFIX: &str = "_jewel_case.pdf";

/// What to export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Paper key; falls back to the settings' default paper
    #[serde(default)]
    pub paper_size: Option<String>,
    #[serde(default)]
    pub title: String,
}

impl ExportRequest {
    pub fn new(paper_size: impl Into<String>, title: impl Into<String>) -> Self {
        ExportRequest {
            paper_size: Some(paper_size.into()),
            title: title.into(),
        }
    }
}

/// Renderers for the two stages. A `None` stage is skipped without a warning.
#[derive(Default)]
pub struct StageScenes<'a> {
    pub front: Option<&'a mut dyn SceneRenderer>,
    pub tray: Option<&'a mut dyn SceneRenderer>,
}

impl<'a> StageScenes<'a> {
    fn get_mut(&mut self, stage: Stage) -> Option<&mut (dyn SceneRenderer + 'a)> {
        match stage {
            Stage::Front => self.front.as_deref_mut(),
            Stage::Tray => self.tray.as_deref_mut(),
        }
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// Suggested download name, `<sanitized title>_jewel_case.pdf`
    pub filename: String,
    pub pdf: Vec<u8>,
    pub layout: SheetLayout,
    /// Stage failures the document was produced without
    pub warnings: Vec<CaseError>,
}

/// Download filename for a title.
///
/// ```rust
/// use case_core::export::export_filename;
///
/// assert_eq!(export_filename("My Album #1!"), "my_album__1__jewel_case.pdf");
/// assert_eq!(export_filename("   "), "____jewel_case.pdf");
/// ```
pub fn export_filename(title: &str) -> String {
    let stem: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", stem, FILENAME_SUFFIX)
}

fn encode_png(raster: &RgbaImage) -> CaseResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    raster.write_to(&mut out, ImageFormat::Png).map_err(|e| CaseError::Internal {
        message: format!("PNG encoding failed: {}", e),
    })?;
    Ok(out.into_inner())
}

/// Rasterize one stage with its overlays hidden and encode it.
/// Composite `raster` over a solid `background`.
fn flatten_onto(raster: &RgbaImage, background: Color) -> RgbaImage {
    let mut base = RgbaImage::from_pixel(raster.width(), raster.height(), background.to_rgba());
    imageops::overlay(&mut base, raster, 0, 0);
    base
}

fn capture_stage(
    stage: Stage,
    scene: &mut dyn SceneRenderer,
    settings: &ExportSettings,
) -> CaseResult<EmbeddedStage> {
    let raster = {
        let guard = OverlayGuard::acquire(scene);
        guard.rasterize(settings.supersample)
    }
    .map_err(|e| CaseError::stage_rasterization(stage.name(), e.to_string()))?;
    let raster = flatten_onto(&raster, settings.background);

    let png = encode_png(&raster).map_err(|e| CaseError::stage_embed(stage.name(), e.to_string()))?;
    debug!(%stage, width = raster.width(), height = raster.height(), bytes = png.len(), "stage captured");
    Ok(EmbeddedStage { stage, png })
}

/// Render the sheet, leaving out any stage the PDF backend cannot embed.
fn compose(
    layout: &SheetLayout,
    embedded: Vec<EmbeddedStage>,
    title: &str,
    settings: &ExportSettings,
    warnings: &mut Vec<CaseError>,
) -> CaseResult<Vec<u8>> {
    let err = match render_sheet(layout, &embedded, title, settings) {
        Ok(pdf) => return Ok(pdf),
        Err(err) if embedded.is_empty() => return Err(err),
        Err(err) => err,
    };
    warn!(error = %err, "sheet failed with stage images, checking each stage");

    let mut survivors = Vec::with_capacity(embedded.len());
    for stage in embedded {
        match render_sheet(layout, std::slice::from_ref(&stage), title, settings) {
            Ok(_) => survivors.push(stage),
            Err(stage_err) => {
                let warning = CaseError::stage_embed(stage.stage.name(), stage_err.to_string());
                warn!(stage = %stage.stage, error = %warning, "stage left off the sheet");
                warnings.push(warning);
            }
        }
    }
    render_sheet(layout, &survivors, title, settings)
}

/// Export the case to a one-page PDF.
///
/// # Returns
///
/// * `Ok(ExportOutput)` - The document, possibly with stage warnings
/// * `Err(CaseError::InvalidPaperSize)` - Unknown paper key; nothing was rasterized
/// * `Err(CaseError::InvalidInput)` - Settings failed validation
/// * `Err(CaseError::Internal)` - The sheet itself could not be rendered
pub fn export_case(
    request: &ExportRequest,
    mut scenes: StageScenes<'_>,
    settings: &ExportSettings,
) -> CaseResult<ExportOutput> {
    let key = request.paper_size.as_deref().unwrap_or(&settings.default_paper);
    let paper = PaperSize::from_key(key)?;
    settings.validate()?;

    let layout = SheetLayout::compute(paper);
    let mut warnings = Vec::new();
    let mut embedded = Vec::new();

    for stage in Stage::ALL {
        let Some(scene) = scenes.get_mut(stage) else {
            debug!(%stage, "no scene for stage, skipped");
            continue;
        };
        match capture_stage(stage, scene, settings) {
            Ok(captured) => embedded.push(captured),
            Err(err) => {
                warn!(%stage, error = %err, "stage left off the sheet");
                warnings.push(err);
            }
        }
    }

    let pdf = compose(&layout, embedded, &request.title, settings, &mut warnings)?;
    let filename = export_filename(&request.title);

    info!(
        paper = paper.key(),
        warnings = warnings.len(),
        bytes = pdf.len(),
        filename = %filename,
        "export finished"
    );

    Ok(ExportOutput {
        filename,
        pdf,
        layout,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::png_bytes;
    use crate::scene::{ShapeId, ShapeInfo, ShapeKind};
    use image::Rgba;
    use std::cell::Cell;

    /// Renderer with one overlay line that counts rasterize calls.
    struct CountingRenderer {
        calls: Cell<usize>,
        fail: bool,
        overlay_visible: bool,
        overlay_seen_during_raster: Cell<Option<bool>>,
        pixel: Rgba<u8>,
    }

    impl CountingRenderer {
        fn new(fail: bool) -> Self {
            CountingRenderer {
                calls: Cell::new(0),
                fail,
                overlay_visible: true,
                overlay_seen_during_raster: Cell::new(None),
                pixel: Rgba([0, 128, 0, 255]),
            }
        }
    }

    impl SceneRenderer for CountingRenderer {
        fn size_px(&self) -> (u32, u32) {
            (8, 8)
        }

        fn shapes(&self) -> Vec<ShapeInfo> {
            vec![ShapeInfo {
                id: 0,
                kind: ShapeKind::Line,
                stroke: Some(crate::scene::Color::BLACK),
                fill: None,
                dash: None,
                visible: self.overlay_visible,
            }]
        }

        fn set_visible(&mut self, _id: ShapeId, visible: bool) {
            self.overlay_visible = visible;
        }

        fn is_visible(&self, _id: ShapeId) -> bool {
            self.overlay_visible
        }

        fn rasterize(&self, pixel_ratio: u32) -> CaseResult<RgbaImage> {
            self.calls.set(self.calls.get() + 1);
            self.overlay_seen_during_raster.set(Some(self.overlay_visible));
            if self.fail {
                return Err(CaseError::Internal {
                    message: "decoder exploded".to_string(),
                });
            }
            Ok(RgbaImage::from_pixel(8 * pixel_ratio, 8 * pixel_ratio, self.pixel))
        }
    }

    fn first_pixel(stage: &EmbeddedStage) -> Rgba<u8> {
        let decoded = image::load_from_memory(&stage.png).unwrap().to_rgba8();
        *decoded.get_pixel(0, 0)
    }

    #[test]
    fn test_capture_flattens_onto_settings_background() {
        let settings = ExportSettings {
            background: Color::rgb(200, 10, 10),
            ..ExportSettings::default()
        };

        let mut clear = CountingRenderer::new(false);
        clear.pixel = Rgba([0, 0, 0, 0]);
        let captured = capture_stage(Stage::Front, &mut clear, &settings).unwrap();
        assert_eq!(first_pixel(&captured), Rgba([200, 10, 10, 255]));

        let mut opaque = CountingRenderer::new(false);
        let captured = capture_stage(Stage::Tray, &mut opaque, &settings).unwrap();
        assert_eq!(first_pixel(&captured), Rgba([0, 128, 0, 255]));
    }

    #[test]
    fn test_filename_sanitizer() {
        assert_eq!(export_filename("My Album #1!"), "my_album__1__jewel_case.pdf");
        assert_eq!(export_filename("Best-Of_2024"), "best-of_2024_jewel_case.pdf");
        assert_eq!(export_filename("Café"), "caf__jewel_case.pdf");
        assert_eq!(export_filename(""), "_jewel_case.pdf");
        assert_eq!(export_filename("   "), "____jewel_case.pdf");
    }

    #[test]
    fn test_invalid_paper_rejected_before_rasterizing() {
        let mut front = CountingRenderer::new(false);
        let mut tray = CountingRenderer::new(false);
        let request = ExportRequest::new("legal", "Nope");
        let result = export_case(
            &request,
            StageScenes {
                front: Some(&mut front),
                tray: Some(&mut tray),
            },
            &ExportSettings::default(),
        );
        assert!(matches!(result, Err(CaseError::InvalidPaperSize { .. })));
        assert_eq!(front.calls.get(), 0);
        assert_eq!(tray.calls.get(), 0);
        assert!(front.overlay_visible && tray.overlay_visible);
    }

    #[test]
    fn test_stages_rasterized_once_at_supersample() {
        let mut front = CountingRenderer::new(false);
        let mut tray = CountingRenderer::new(false);
        let output = export_case(
            &ExportRequest::new("a4", "Counted"),
            StageScenes {
                front: Some(&mut front),
                tray: Some(&mut tray),
            },
            &ExportSettings::default(),
        )
        .unwrap();
        assert!(output.warnings.is_empty());
        assert!(output.pdf.starts_with(b"%PDF"));
        assert_eq!((front.calls.get(), tray.calls.get()), (1, 1));
        // overlays hidden during the raster, restored afterwards
        assert_eq!(front.overlay_seen_during_raster.get(), Some(false));
        assert!(front.overlay_visible);
    }

    #[test]
    fn test_failing_stage_becomes_warning() {
        let mut front = CountingRenderer::new(true);
        let mut tray = CountingRenderer::new(false);
        let output = export_case(
            &ExportRequest::new("letter", "Half Broken"),
            StageScenes {
                front: Some(&mut front),
                tray: Some(&mut tray),
            },
            &ExportSettings::default(),
        )
        .unwrap();
        assert!(output.pdf.starts_with(b"%PDF"));
        assert_eq!(output.warnings.len(), 1);
        match &output.warnings[0] {
            CaseError::StageRasterization { stage, reason } => {
                assert_eq!(stage, "front");
                assert!(reason.contains("decoder exploded"));
            }
            other => panic!("unexpected warning {:?}", other),
        }
        assert!(front.overlay_visible);
    }

    #[test]
    fn test_all_stages_failing_still_emits() {
        let mut front = CountingRenderer::new(true);
        let mut tray = CountingRenderer::new(true);
        let output = export_case(
            &ExportRequest::new("f4", "Nothing Works"),
            StageScenes {
                front: Some(&mut front),
                tray: Some(&mut tray),
            },
            &ExportSettings::default(),
        )
        .unwrap();
        assert!(output.pdf.starts_with(b"%PDF"));
        assert_eq!(output.warnings.len(), 2);
        assert!(output.warnings.iter().all(|w| !w.is_fatal_for_export()));
    }

    #[test]
    fn test_missing_stage_is_silent() {
        let mut tray = CountingRenderer::new(false);
        let output = export_case(
            &ExportRequest::new("a4", "Tray Only"),
            StageScenes {
                front: None,
                tray: Some(&mut tray),
            },
            &ExportSettings::default(),
        )
        .unwrap();
        assert!(output.warnings.is_empty());
        assert_eq!(tray.calls.get(), 1);
    }

    #[test]
    fn test_default_paper_from_settings() {
        let request = ExportRequest {
            paper_size: None,
            title: "Defaulted".to_string(),
        };
        let settings = ExportSettings {
            default_paper: "letter".to_string(),
            ..Default::default()
        };
        let output = export_case(&request, StageScenes::default(), &settings).unwrap();
        assert_eq!(output.layout.paper, PaperSize::Letter);
    }

    #[test]
    fn test_unembeddable_stage_dropped_others_kept() {
        let layout = SheetLayout::compute(PaperSize::A4);
        let embedded = vec![
            EmbeddedStage {
                stage: Stage::Front,
                png: png_bytes(4, 4, [1, 2, 3, 255]),
            },
            EmbeddedStage {
                stage: Stage::Tray,
                png: b"garbage".to_vec(),
            },
        ];
        let mut warnings = Vec::new();
        let pdf = compose(&layout, embedded, "Mixed", &ExportSettings::default(), &mut warnings).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], CaseError::StageEmbed { stage, .. } if stage == "tray"));
    }
}
