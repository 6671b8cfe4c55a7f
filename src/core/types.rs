//! Core data types for the sessions portal

use serde::{Deserialize, Serialize};

use super::parser::parse_session_id;

/// Labels derived from a session identifier
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct SessionLabels {
    pub(crate) date_label: Option<String>,
    pub(crate) time_label: Option<String>,
}

/// One row of the session list. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionRow {
    pub(crate) session_id: String,
    pub(crate) date_label: Option<String>,
    pub(crate) time_label: Option<String>,
}

impl SessionRow {
    pub(crate) fn from_id(session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        let SessionLabels {
            date_label,
            time_label,
        } = parse_session_id(&session_id);
        Self {
            session_id,
            date_label,
            time_label,
        }
    }
}

/// Wire shape of one entry in the list endpoint's `sessions` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionEntry {
    pub(crate) session_id: String,
}

impl From<SessionEntry> for SessionRow {
    fn from(entry: SessionEntry) -> Self {
        SessionRow::from_id(entry.session_id)
    }
}

/// Short-lived direct download URL returned by the download endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadLink {
    pub(crate) url: String,
}
