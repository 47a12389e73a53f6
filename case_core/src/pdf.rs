//! # PDF Sheet Writer
//!
//! Authors the printable sheet with Typst: a page the size of the paper,
//! zero margin, and everything positioned absolutely in inches.
//!
//! ## Architecture
//!
//! - The Typst source is generated from a [`SheetLayout`]
//! - Stage rasters are served to the compiler as virtual files
//!   (`/front.png`, `/tray.png`) by [`PdfWorld`]
//! - Fonts come from `typst-assets` and are loaded once per process
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use case_core::export::{PaperSize, SheetLayout};
//! use case_core::pdf::render_sheet;
//! use case_core::settings::ExportSettings;
//!
//! let layout = SheetLayout::compute(PaperSize::Letter);
//! let pdf = render_sheet(&layout, &[], "Blank Sheet", &ExportSettings::default()).unwrap();
//! std::fs::write("blank_jewel_case.pdf", pdf).unwrap();
//! ```

use std::fmt::Write as _;

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use tracing::debug;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::dimensions::{CROP_MARK_STROKE, FOLD_GUIDE_STROKE};
use crate::errors::{CaseError, CaseResult};
use crate::export::{SheetLayout, SheetLine};
use crate::panel::Stage;
use crate::settings::ExportSettings;

/// Fold guide paint
const FOLD_GUIDE_COLOR: &str = "#999999";

/// Crop mark paint
const CROP_MARK_COLOR: &str = "#000000";

/// A rasterized stage, PNG-encoded and ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedStage {
    pub stage: Stage,
    pub png: Vec<u8>,
}

impl EmbeddedStage {
    /// Virtual path the Typst source refers to
    fn file_name(&self) -> String {
        format!("{}.png", self.stage.name())
    }
}

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Bundled fonts, parsed on first use and shared by every compilation.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    let fonts: Vec<Font> = typst_assets::fonts()
        .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
        .collect();
    debug!(count = fonts.len(), "loaded bundled fonts");
    fonts
});

/// A Typst world holding one generated source plus in-memory image files.
struct PdfWorld {
    main: Source,
    files: Vec<(String, Bytes)>,
    book: LazyHash<FontBook>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String, stages: &[EmbeddedStage]) -> Self {
        let main_id = FileId::new(None, VirtualPath::new("/main.typ"));
        let files = stages
            .iter()
            .map(|s| (s.file_name(), Bytes::new(s.png.clone())))
            .collect();

        PdfWorld {
            main: Source::new(main_id, source),
            files,
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        let path = id.vpath().as_rootless_path();
        self.files
            .iter()
            .find(|(name, _)| path.to_str() == Some(name.as_str()))
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| FileError::NotFound(path.into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(now.year(), u8::try_from(now.month()).ok()?, u8::try_from(now.day()).ok()?)
    }
}

// ============================================================================
// Source Generation
// ============================================================================

/// Escape text for use inside a Typst string literal
fn escape_typst_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn push_line(source: &mut String, line: &SheetLine, paint: &str, thickness_pt: f64, dashed: bool) {
    let dash = if dashed { ", dash: \"dashed\"" } else { "" };
    let _ = writeln!(
        source,
        "#place(top + left, line(start: ({}in, {}in), end: ({}in, {}in), stroke: (paint: rgb(\"{}\"), thickness: {}pt{})))",
        line.x1_in, line.y1_in, line.x2_in, line.y2_in, paint, thickness_pt, dash
    );
}

/// Typst source for the sheet.
///
/// Paint order: fold guides, stage images, crop marks.
fn sheet_source(layout: &SheetLayout, stages: &[EmbeddedStage], title: &str, settings: &ExportSettings) -> String {
    let mut source = String::new();

    let title = title.trim();
    if title.is_empty() {
        source.push_str("#set document(title: none)\n");
    } else {
        let _ = writeln!(source, "#set document(title: \"{}\")", escape_typst_string(title));
    }
    let _ = writeln!(
        source,
        "#set page(width: {}in, height: {}in, margin: 0pt)",
        layout.paper_width_in, layout.paper_height_in
    );

    if settings.fold_guides {
        for guide in &layout.fold_guides {
            push_line(&mut source, guide, FOLD_GUIDE_COLOR, FOLD_GUIDE_STROKE.0, true);
        }
    }

    for stage in stages {
        let b = layout.stage_box(stage.stage);
        let _ = writeln!(
            source,
            "#place(top + left, dx: {}in, dy: {}in, image(\"/{}\", width: {}in, height: {}in, fit: \"stretch\"))",
            b.x_in,
            b.y_in,
            stage.file_name(),
            b.width_in,
            b.height_in
        );
    }

    if settings.crop_marks {
        for mark in layout.crop_marks() {
            push_line(&mut source, &mark, CROP_MARK_COLOR, CROP_MARK_STROKE.0, false);
        }
    }

    source
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the sheet to PDF bytes.
///
/// # Arguments
///
/// * `layout` - Sheet geometry for the chosen paper
/// * `stages` - Stage rasters to place; missing stages are simply absent
/// * `title` - Document metadata title
/// * `settings` - Which guides and marks to draw
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CaseError::Internal)` - Typst compilation or PDF rendering failed
pub fn render_sheet(
    layout: &SheetLayout,
    stages: &[EmbeddedStage],
    title: &str,
    settings: &ExportSettings,
) -> CaseResult<Vec<u8>> {
    let source = sheet_source(layout, stages, title, settings);
    let world = PdfWorld::new(source, stages);

    let warned = typst::compile(&world);
    for warning in &warned.warnings {
        debug!(message = %warning.message, "typst warning");
    }

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CaseError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CaseError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })?;

    Ok(pdf_bytes)
}
