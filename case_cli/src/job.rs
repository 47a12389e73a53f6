//! Job files: a JSON description of one case to export.
//!
//! ```json
//! {
//!   "title": "My Album",
//!   "paper_size": "letter",
//!   "sync_spines": true,
//!   "panels": {
//!     "front_cover": { "image": "art/front.jpg", "offset_x": -40 },
//!     "left_spine": { "image": "art/spine.png", "rotation": 90 },
//!     "back_center": { "image": "art/back.png" }
//!   },
//!   "settings": { "crop_marks": true }
//! }
//! ```
//!
//! Relative image paths are resolved against the job file's directory.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use case_core::assets::ImageSource;
use case_core::errors::CaseResult;
use case_core::panel::PanelId;
use case_core::project::ProjectState;
use case_core::session::EditSession;
use case_core::settings::ExportSettings;

/// Artwork and placement for one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelJob {
    /// File path or `data:` URL
    pub image: String,
    /// Panel-local offsets; omitted axes keep the centered placement
    #[serde(default)]
    pub offset_x: Option<f64>,
    #[serde(default)]
    pub offset_y: Option<f64>,
    /// Clockwise degrees, snapped to quarter turns
    #[serde(default)]
    pub rotation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseJob {
    pub title: String,
    pub paper_size: Option<String>,
    pub sync_spines: bool,
    pub panels: HashMap<PanelId, PanelJob>,
    pub settings: ExportSettings,
}

impl CaseJob {
    pub fn from_json(text: &str) -> CaseResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Image URL for a panel with relative paths made absolute to `base_dir`.
    pub fn image_url(&self, id: PanelId, base_dir: &Path) -> Option<String> {
        let image = &self.panels.get(&id)?.image;
        match ImageSource::parse(image) {
            Ok(ImageSource::File(path)) if path.is_relative() => Some(base_dir.join(path).display().to_string()),
            _ => Some(image.clone()),
        }
    }

    /// Load every panel's image concurrently, then apply rotations and
    /// offsets. Returns the final state and a message for each panel whose
    /// artwork did not make it in.
    pub async fn load(&self, base_dir: &Path) -> (ProjectState, Vec<String>) {
        let session = EditSession::new();
        session.set_sync_enabled(self.sync_spines);

        let url = |id| self.image_url(id, base_dir);
        tokio::join!(
            load_panel(&session, PanelId::FrontCover, url(PanelId::FrontCover)),
            load_panel(&session, PanelId::LeftSpine, url(PanelId::LeftSpine)),
            load_panel(&session, PanelId::BackCenter, url(PanelId::BackCenter)),
            load_panel(&session, PanelId::RightSpine, url(PanelId::RightSpine)),
        );

        let mut problems = Vec::new();
        for id in PanelId::ALL {
            let Some(panel) = self.panels.get(&id) else {
                continue;
            };
            if self.sync_spines && id == PanelId::RightSpine {
                problems.push(format!("{} ignored: spines are synced to the left spine", id.key()));
                continue;
            }
            if !session.state().part(id).is_renderable() {
                problems.push(format!("{}: could not load {}", id.key(), panel.image));
                continue;
            }

            if let Some(degrees) = panel.rotation {
                session.update_rotation(id, degrees);
            }
            if panel.offset_x.is_some() || panel.offset_y.is_some() {
                let state = session.state();
                let part = state.part(id);
                session.update_offset(
                    id,
                    panel.offset_x.unwrap_or(part.offset_x),
                    panel.offset_y.unwrap_or(part.offset_y),
                );
            }
        }

        (session.state(), problems)
    }
}

async fn load_panel(session: &EditSession, id: PanelId, url: Option<String>) {
    if let Some(url) = url {
        debug!(panel = %id, "loading artwork");
        session.load_image(id, Some(&url)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_minimal_job() {
        let job = CaseJob::from_json(r#"{ "title": "Demo" }"#).unwrap();
        assert_eq!(job.title, "Demo");
        assert!(job.panels.is_empty());
        assert_eq!(job.settings, ExportSettings::default());
    }

    #[test]
    fn test_parse_panels() {
        let job = CaseJob::from_json(
            r#"{
                "paper_size": "f4",
                "sync_spines": true,
                "panels": {
                    "front_cover": { "image": "front.png", "offset_x": -5 },
                    "left_spine": { "image": "spine.png", "rotation": 90 }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(job.paper_size.as_deref(), Some("f4"));
        assert!(job.sync_spines);
        assert_eq!(job.panels[&PanelId::FrontCover].offset_x, Some(-5.0));
        assert_eq!(job.panels[&PanelId::LeftSpine].rotation, Some(90.0));
    }

    #[test]
    fn test_unknown_panel_rejected() {
        let err = CaseJob::from_json(r#"{ "panels": { "inlay": { "image": "x.png" } } }"#).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_relative_paths_resolved() {
        let mut job = CaseJob::default();
        for (id, image) in [
            (PanelId::FrontCover, "art/front.png"),
            (PanelId::BackCenter, "/abs/back.png"),
            (PanelId::LeftSpine, "data:image/png;base64,AAAA"),
        ] {
            job.panels.insert(
                id,
                PanelJob {
                    image: image.to_string(),
                    offset_x: None,
                    offset_y: None,
                    rotation: None,
                },
            );
        }
        let base = PathBuf::from("/jobs");
        assert_eq!(
            job.image_url(PanelId::FrontCover, &base),
            Some(base.join("art/front.png").display().to_string())
        );
        assert_eq!(job.image_url(PanelId::BackCenter, &base).as_deref(), Some("/abs/back.png"));
        assert!(job.image_url(PanelId::LeftSpine, &base).unwrap().starts_with("data:"));
        assert_eq!(job.image_url(PanelId::RightSpine, &base), None);
    }

    #[tokio::test]
    async fn test_load_reports_missing_art() {
        let job = CaseJob::from_json(r#"{ "panels": { "back_center": { "image": "missing.png" } } }"#).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (state, problems) = job.load(dir.path()).await;
        assert!(!state.part(PanelId::BackCenter).is_renderable());
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("back_center"));
    }
}
