//! # Edit Session
//!
//! Owns the current [`ProjectState`] and publishes every change on a
//! `tokio::sync::watch` channel. Observers subscribe explicitly instead of
//! relying on implicit dependency tracking.
//!
//! ## Example
//!
//! ```rust
//! use case_core::panel::PanelId;
//! use case_core::session::EditSession;
//!
//! let session = EditSession::new();
//! let mut changes = session.subscribe();
//!
//! session.set_sync_enabled(true);
//! assert!(changes.has_changed().unwrap());
//! assert!(changes.borrow_and_update().sync_enabled());
//! ```

use tokio::sync::watch;
use tracing::debug;

use crate::assets::{load_asset, ImageAsset};
use crate::errors::CaseResult;
use crate::panel::PanelId;
use crate::project::{DecodeTicket, ProjectState};

/// The single owner of a case's editing state.
pub struct EditSession {
    state: watch::Sender<ProjectState>,
}

impl Default for EditSession {
    fn default() -> Self {
        EditSession::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        EditSession::with_state(ProjectState::new())
    }

    pub fn with_state(state: ProjectState) -> Self {
        let (tx, _rx) = watch::channel(state);
        EditSession { state: tx }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ProjectState {
        self.state.borrow().clone()
    }

    /// Receive every state the session publishes from now on.
    pub fn subscribe(&self) -> watch::Receiver<ProjectState> {
        self.state.subscribe()
    }

    /// Replace the state with `edit(current)`, notifying subscribers only
    /// when something actually changed.
    fn apply(&self, edit: impl FnOnce(&ProjectState) -> ProjectState) -> ProjectState {
        self.state.send_if_modified(|current| {
            let next = edit(current);
            if next == *current {
                return false;
            }
            *current = next;
            true
        });
        self.state()
    }

    pub fn update_image(&self, id: PanelId, url: Option<&str>) -> ProjectState {
        self.apply(|s| s.update_image(id, url))
    }

    pub fn resolve_image(&self, ticket: &DecodeTicket, result: CaseResult<ImageAsset>) -> ProjectState {
        self.apply(|s| s.resolve_image(ticket, result))
    }

    pub fn update_offset(&self, id: PanelId, x: f64, y: f64) -> ProjectState {
        self.apply(|s| s.update_offset(id, x, y))
    }

    pub fn update_rotation(&self, id: PanelId, degrees: f64) -> ProjectState {
        self.apply(|s| s.update_rotation(id, degrees))
    }

    pub fn set_sync_enabled(&self, enabled: bool) -> ProjectState {
        self.apply(|s| s.set_sync_enabled(enabled))
    }

    /// Set a panel's source and decode it.
    ///
    /// Several calls may be in flight at once for different panels. When a
    /// newer request for the same panel is issued before this one finishes,
    /// this one's result is dropped.
    pub async fn load_image(&self, id: PanelId, url: Option<&str>) -> ProjectState {
        let requested = self.update_image(id, url);
        let Some(ticket) = requested.pending_ticket(id) else {
            return requested;
        };

        debug!(panel = %id, url = %ticket.url, "decoding image");
        let result = load_asset(&ticket.url).await;
        self.resolve_image(&ticket, result)
    }
}
