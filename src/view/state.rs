//! Session list view state
//!
//! ```text
//! Idle ──► Loading ──┬──► Loaded(rows)
//!                    └──► Failed(message)
//! ```
//!
//! Every load is started with [`SessionsView::begin_load`], which hands out a
//! [`LoadTicket`] stamped with the current generation. Starting another load
//! or changing the fetch target bumps the generation, so a completion that
//! arrives with an older ticket is dropped instead of overwriting newer state.

use crate::core::{SessionRow, detail_route};
use crate::error::PortalError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ViewState {
    Idle,
    Loading,
    Loaded(Vec<SessionRow>),
    Failed(String),
}

/// Proof of which load a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadTicket {
    generation: u64,
}

/// Whether a row action can be triggered
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ActionState {
    Enabled,
    Disabled(&'static str),
}

impl ActionState {
    pub(crate) fn is_enabled(&self) -> bool {
        matches!(self, ActionState::Enabled)
    }

    pub(crate) fn reason(&self) -> Option<&'static str> {
        match self {
            ActionState::Enabled => None,
            ActionState::Disabled(reason) => Some(reason),
        }
    }
}

/// Actions offered for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowActions {
    /// Route of the session detail view
    pub(crate) open: String,
    pub(crate) play: ActionState,
    pub(crate) download: ActionState,
}

#[derive(Debug)]
pub(crate) struct SessionsView {
    state: ViewState,
    generation: u64,
    target: String,
    download_enabled: bool,
}

impl SessionsView {
    pub(crate) fn new(target: impl Into<String>, download_enabled: bool) -> Self {
        Self {
            state: ViewState::Idle,
            generation: 0,
            target: target.into(),
            download_enabled,
        }
    }

    pub(crate) fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start a load; any load still in flight becomes stale
    pub(crate) fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = ViewState::Loading;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Switch to a new fetch target.
    ///
    /// Returns a ticket for the reload when the target actually changed.
    pub(crate) fn retarget(
        &mut self,
        target: impl Into<String>,
        download_enabled: bool,
    ) -> Option<LoadTicket> {
        let target = target.into();
        self.download_enabled = download_enabled;
        if target == self.target {
            return None;
        }
        tracing::debug!(from = %self.target, to = %target, "fetch target changed");
        self.target = target;
        Some(self.begin_load())
    }

    pub(crate) fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Commit a load result. Returns `false` when the ticket is stale and the
    /// result was dropped.
    pub(crate) fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<SessionRow>, PortalError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded load result"
            );
            return false;
        }
        self.state = match result {
            Ok(rows) => ViewState::Loaded(rows),
            Err(e) => ViewState::Failed(e.to_string()),
        };
        true
    }

    /// Run one load to completion on the current thread
    pub(crate) fn load_with<F>(&mut self, fetch: F) -> &ViewState
    where
        F: FnOnce() -> Result<Vec<SessionRow>, PortalError>,
    {
        let ticket = self.begin_load();
        let result = fetch();
        self.complete(ticket, result);
        &self.state
    }

    pub(crate) fn actions(&self, row: &SessionRow) -> RowActions {
        RowActions {
            open: detail_route(&row.session_id),
            play: ActionState::Disabled("playback is not implemented"),
            download: if self.download_enabled {
                ActionState::Enabled
            } else {
                ActionState::Disabled("no download endpoint configured")
            },
        }
    }
}
