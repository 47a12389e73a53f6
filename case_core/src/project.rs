//! # Project State
//!
//! The editing model of one jewel case: four panels, each holding a single
//! [`PanelPart`], plus the spine synchronization flag.
//!
//! ## Structure
//!
//! ```text
//! ProjectState
//! ├── front_cover: Panel
//! ├── left_spine:  Panel   ─┐ mirrored onto right_spine
//! ├── back_center: Panel    │ while sync_spines is on
//! ├── right_spine: Panel   ◄┘
//! └── sync_spines: bool
//! ```
//!
//! Every editing operation is a pure function `&ProjectState -> ProjectState`.
//! Parts are replaced wholesale, never patched field by field, so observers
//! can diff the previous and next state directly.
//!
//! ## Example
//!
//! ```rust
//! use case_core::panel::PanelId;
//! use case_core::project::ProjectState;
//!
//! let state = ProjectState::new()
//!     .set_sync_enabled(true)
//!     .update_image(PanelId::LeftSpine, Some("art/spine.png"));
//!
//! assert_eq!(
//!     state.part(PanelId::RightSpine).image_url.as_deref(),
//!     Some("art/spine.png")
//! );
//! ```

use tracing::{debug, warn};

use crate::assets::ImageAsset;
use crate::constraint::{centered_offset, clamp_offset, Offset};
use crate::errors::CaseResult;
use crate::panel::PanelId;
use crate::transform::{fit, snap_rotation, PanelFit};

// ============================================================================
// Panel Part
// ============================================================================

/// One image placement inside a panel.
///
/// Offsets are panel-local: the top-left of the scaled image relative to the
/// panel's own origin. They and `scale` are only meaningful while `image` is
/// present.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelPart {
    /// Identity label of the owning panel (never copied by spine sync)
    pub label: String,
    /// Requested source; set before the decode finishes
    pub image_url: Option<String>,
    /// Decoded asset; `None` while loading or when empty
    pub image: Option<ImageAsset>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    /// Clockwise degrees, always a multiple of 90
    pub rotation: f64,
}

impl PanelPart {
    /// Empty part for a panel
    pub fn empty(label: impl Into<String>) -> Self {
        PanelPart {
            label: label.into(),
            image_url: None,
            image: None,
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// Whether the part has a decoded image that may be rendered
    pub fn is_renderable(&self) -> bool {
        self.image.is_some()
    }

    /// Whether a source was requested but has not been decoded yet
    pub fn is_loading(&self) -> bool {
        self.image_url.is_some() && self.image.is_none()
    }

    /// Rendered size of the image at the stored scale and rotation.
    pub fn rendered_size(&self) -> Option<(f64, f64)> {
        let natural = self.image.as_ref()?.natural_size().rotated(self.rotation);
        Some((natural.width * self.scale, natural.height * self.scale))
    }

    /// Equal up to the identity label.
    pub fn same_content(&self, other: &PanelPart) -> bool {
        self.image_url == other.image_url
            && self.image == other.image
            && self.offset_x == other.offset_x
            && self.offset_y == other.offset_y
            && self.scale == other.scale
            && self.rotation == other.rotation
    }

    /// Copy of this part carrying another panel's identity label.
    fn retagged(&self, label: &str) -> PanelPart {
        PanelPart {
            label: label.to_string(),
            ..self.clone()
        }
    }
}

// ============================================================================
// Panel
// ============================================================================

/// A fixed physical panel and its current part.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: PanelId,
    pub part: PanelPart,
    /// Bumped whenever the source changes; stale decodes compare against it
    load_generation: u64,
    /// Left spine generation whose decode this panel still waits on after
    /// being mirrored mid-load
    mirrored_decode: Option<u64>,
}

impl Panel {
    fn new(id: PanelId) -> Self {
        Panel {
            id,
            part: PanelPart::empty(id.label()),
            load_generation: 0,
            mirrored_decode: None,
        }
    }
}

/// Proof that a decode was requested for a specific panel source.
///
/// Only the ticket issued by the most recent [`ProjectState::update_image`]
/// for a panel can resolve it; older tickets are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTicket {
    pub panel: PanelId,
    pub generation: u64,
    pub url: String,
}

// ============================================================================
// Project State
// ============================================================================

/// Aggregate editing state of one case.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectState {
    front_cover: Panel,
    left_spine: Panel,
    back_center: Panel,
    right_spine: Panel,
    sync_spines: bool,
}

impl Default for ProjectState {
    fn default() -> Self {
        ProjectState::new()
    }
}

impl ProjectState {
    /// All panels empty, spines unsynced.
    pub fn new() -> Self {
        ProjectState {
            front_cover: Panel::new(PanelId::FrontCover),
            left_spine: Panel::new(PanelId::LeftSpine),
            back_center: Panel::new(PanelId::BackCenter),
            right_spine: Panel::new(PanelId::RightSpine),
            sync_spines: false,
        }
    }

    pub fn panel(&self, id: PanelId) -> &Panel {
        match id {
            PanelId::FrontCover => &self.front_cover,
            PanelId::LeftSpine => &self.left_spine,
            PanelId::BackCenter => &self.back_center,
            PanelId::RightSpine => &self.right_spine,
        }
    }

    fn panel_mut(&mut self, id: PanelId) -> &mut Panel {
        match id {
            PanelId::FrontCover => &mut self.front_cover,
            PanelId::LeftSpine => &mut self.left_spine,
            PanelId::BackCenter => &mut self.back_center,
            PanelId::RightSpine => &mut self.right_spine,
        }
    }

    pub fn part(&self, id: PanelId) -> &PanelPart {
        &self.panel(id).part
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync_spines
    }

    /// True when the right spine shows the left spine's content.
    pub fn spines_in_sync(&self) -> bool {
        self.left_spine.part.same_content(&self.right_spine.part)
    }

    /// Ticket for the decode this panel is waiting on, if any.
    ///
    /// The right spine never waits on its own decode while synced; it
    /// receives the left spine's result instead. The same holds after sync
    /// is turned off while that mirrored decode is still running.
    pub fn pending_ticket(&self, id: PanelId) -> Option<DecodeTicket> {
        if self.is_mirror_target(id) || self.panel(id).mirrored_decode.is_some() {
            return None;
        }
        let panel = self.panel(id);
        if !panel.part.is_loading() {
            return None;
        }
        let url = panel.part.image_url.clone()?;
        Some(DecodeTicket {
            panel: id,
            generation: panel.load_generation,
            url,
        })
    }

    // ========================================================================
    // Editing Operations
    // ========================================================================

    /// Request a new source for a panel, or clear it with `None`.
    ///
    /// The decoded asset is dropped immediately and any in-flight decode for
    /// the panel is superseded. Use [`ProjectState::pending_ticket`] to start
    /// the new decode.
    pub fn update_image(&self, id: PanelId, url: Option<&str>) -> ProjectState {
        if self.rejects_edit(id) {
            return self.clone();
        }

        let mut next = self.clone();
        let panel = next.panel_mut(id);
        let rotation = panel.part.rotation;
        panel.part = PanelPart {
            image_url: url.map(str::to_string),
            rotation,
            ..PanelPart::empty(id.label())
        };
        panel.load_generation += 1;
        panel.mirrored_decode = None;
        next.after_edit(id)
    }

    /// Apply a finished decode.
    ///
    /// Results for superseded requests are discarded. A failed decode reverts
    /// the panel to empty; the error goes no further than the panel.
    ///
    /// A left spine result also lands on a right spine that was mirrored
    /// while the decode was running and unsynced before it finished, even
    /// when the left spine itself has moved on to another source.
    pub fn resolve_image(&self, ticket: &DecodeTicket, result: CaseResult<ImageAsset>) -> ProjectState {
        let current = self.panel(ticket.panel);
        let fills_panel = !self.is_mirror_target(ticket.panel)
            && current.load_generation == ticket.generation
            && current.part.image_url.as_deref() == Some(ticket.url.as_str());
        let fills_mirror = self.awaits_mirrored_decode(ticket);
        if !fills_panel && !fills_mirror {
            debug!(panel = %ticket.panel, generation = ticket.generation, "discarding stale decode");
            return self.clone();
        }

        let mut next = self.clone();
        if fills_mirror {
            next.apply_decode(PanelId::RightSpine, &result);
            next.right_spine.mirrored_decode = None;
        }
        if !fills_panel {
            return next;
        }
        next.apply_decode(ticket.panel, &result);
        next.after_edit(ticket.panel)
    }

    /// Move a panel's image to the panel-local offset `(x, y)`, clamped so
    /// no background shows. Ignored while the panel has no decoded image.
    pub fn update_offset(&self, id: PanelId, x: f64, y: f64) -> ProjectState {
        if self.rejects_edit(id) {
            return self.clone();
        }
        let Some((rendered_w, rendered_h)) = self.part(id).rendered_size() else {
            debug!(panel = %id, "offset change ignored; no image loaded");
            return self.clone();
        };

        let rect = id.rect();
        let clamped = clamp_offset(
            id.axis_lock(),
            rect,
            rendered_w,
            rendered_h,
            Offset::new(rect.x + x, rect.y + y),
        );

        let mut next = self.clone();
        let panel = next.panel_mut(id);
        panel.part = PanelPart {
            offset_x: clamped.x - rect.x,
            offset_y: clamped.y - rect.y,
            ..panel.part.clone()
        };
        next.after_edit(id)
    }

    /// Rotate a panel's image (snapped to quarter turns), then refit and
    /// recenter it.
    pub fn update_rotation(&self, id: PanelId, degrees: f64) -> ProjectState {
        if self.rejects_edit(id) {
            return self.clone();
        }

        let mut next = self.clone();
        let panel = next.panel_mut(id);
        let rotated = PanelPart {
            rotation: snap_rotation(degrees),
            ..panel.part.clone()
        };
        panel.part = match rotated.image.clone() {
            Some(asset) => placed_part(id, &rotated, asset),
            None => rotated,
        };
        next.after_edit(id)
    }

    /// Turn spine synchronization on or off.
    ///
    /// Turning it on copies the left spine onto the right spine at once.
    /// Turning it off leaves both spines as they are; the right spine simply
    /// becomes editable again.
    pub fn set_sync_enabled(&self, enabled: bool) -> ProjectState {
        let mut next = self.clone();
        next.sync_spines = enabled;
        if enabled && !self.sync_spines {
            next.mirror_spines();
        }
        next
    }

    // ========================================================================
    // Spine Sync
    // ========================================================================

    fn is_mirror_target(&self, id: PanelId) -> bool {
        self.sync_spines && id == PanelId::RightSpine
    }

    fn rejects_edit(&self, id: PanelId) -> bool {
        if self.is_mirror_target(id) {
            debug!("right spine edit ignored while spines are synced");
            return true;
        }
        false
    }

    fn mirror_spines(&mut self) {
        let label = self.right_spine.part.label.clone();
        self.right_spine.part = self.left_spine.part.retagged(&label);
        // Invalidate anything the right spine was loading on its own
        self.right_spine.load_generation += 1;
        self.right_spine.mirrored_decode = self
            .right_spine
            .part
            .is_loading()
            .then_some(self.left_spine.load_generation);
    }

    /// Whether `ticket` is the left spine decode an unsynced right spine
    /// is still waiting on.
    fn awaits_mirrored_decode(&self, ticket: &DecodeTicket) -> bool {
        let right = &self.right_spine;
        !self.sync_spines
            && ticket.panel == PanelId::LeftSpine
            && right.mirrored_decode == Some(ticket.generation)
            && right.part.image_url.as_deref() == Some(ticket.url.as_str())
    }

    fn apply_decode(&mut self, id: PanelId, result: &CaseResult<ImageAsset>) {
        let panel = self.panel_mut(id);
        panel.part = match result {
            Ok(asset) => placed_part(id, &panel.part, asset.clone()),
            Err(e) => {
                warn!(panel = %id, error = %e, "image failed to load; clearing panel");
                PanelPart {
                    rotation: panel.part.rotation,
                    ..PanelPart::empty(id.label())
                }
            }
        };
    }

    fn after_edit(mut self, id: PanelId) -> ProjectState {
        if self.sync_spines && id == PanelId::LeftSpine {
            self.mirror_spines();
            debug_assert!(self.spines_in_sync());
        }
        self
    }
}

/// Part with `asset` fitted to the panel's policy and centered.
fn placed_part(id: PanelId, part: &PanelPart, asset: ImageAsset) -> PanelPart {
    let rect = id.rect();
    let natural = asset.natural_size().rotated(part.rotation);
    let PanelFit {
        scale,
        rendered_width,
        rendered_height,
    } = fit(id.policy(), rect.width, rect.height, natural);
    let centered = centered_offset(id.axis_lock(), rect, rendered_width, rendered_height);

    PanelPart {
        image: Some(asset),
        offset_x: centered.x - rect.x,
        offset_y: centered.y - rect.y,
        scale,
        ..part.clone()
    }
}
