//! # case_core - CD Jewel Case Layout Engine
//!
//! `case_core` positions artwork inside the four fixed panels of a CD jewel
//! case (front cover, left spine, back center, right spine) and exports a
//! print-ready, one-page PDF with crop marks and fold guides.
//!
//! ## Design Philosophy
//!
//! - **Value state**: every edit returns a new [`ProjectState`]; panels are
//!   replaced wholesale, never patched in place
//! - **Physical first**: sizes are authored in inches and converted to
//!   pixels once, at a fixed display DPI
//! - **Degrade, don't abort**: a broken stage is reported as a warning and
//!   the sheet is still produced
//! - **Rich Errors**: structured, serializable error types
//!
//! ## Quick Start
//!
//! ```rust
//! use case_core::export::{export_case, ExportRequest, StageScenes};
//! use case_core::panel::PanelId;
//! use case_core::project::ProjectState;
//! use case_core::scene::{build_front_scene, build_tray_scene, SceneStyle};
//! use case_core::settings::ExportSettings;
//!
//! let state = ProjectState::new().set_sync_enabled(true);
//! assert!(state.spines_in_sync());
//!
//! let style = SceneStyle::default();
//! let mut front = build_front_scene(&state, &style);
//! let mut tray = build_tray_scene(&state, &style);
//! let output = export_case(
//!     &ExportRequest::new("a4", "Quick Start"),
//!     StageScenes { front: Some(&mut front), tray: Some(&mut tray) },
//!     &ExportSettings::default(),
//! )
//! .unwrap();
//! assert!(output.pdf.starts_with(b"%PDF"));
//! ```
//!
//! ## Modules
//!
//! - [`units`] - Type-safe length wrappers and the pixel/millimeter conversions
//! - [`dimensions`] - Physical case constants and precomputed pixel sizes
//! - [`panel`] - Panel identity, scaling policy and axis lock
//! - [`transform`] - Fill-height and cover scaling
//! - [`constraint`] - Offset clamping so artwork never exposes a gap
//! - [`project`] - Editing state, operations and spine sync
//! - [`session`] - Owner of the state; async image loading
//! - [`assets`] - Image sources and decoding
//! - [`scene`] - Scene graph, overlay guard and software rasterizer
//! - [`export`] - Sheet layout and the export compositor
//! - [`pdf`] - Typst-backed PDF writer
//! - [`file_io`] - Atomic file saves
//! - [`settings`] - Export settings
//! - [`errors`] - Structured error types

pub mod assets;
pub mod constraint;
pub mod dimensions;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod panel;
pub mod pdf;
pub mod project;
pub mod scene;
pub mod session;
pub mod settings;
pub mod transform;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{CaseError, CaseResult};
pub use export::{export_case, ExportOutput, ExportRequest, PaperSize, SheetLayout, StageScenes};
pub use file_io::save_pdf;
pub use panel::{PanelId, Stage};
pub use project::{PanelPart, ProjectState};
pub use session::EditSession;
pub use settings::ExportSettings;
