//! Validation of API response bodies
//!
//! The list endpoint is read permissively: anything that is not a proper
//! `sessions` array becomes an empty list. The download endpoint is strict:
//! without a string `url` there is nothing to navigate to.

use serde_json::Value;

use crate::core::{DownloadLink, SessionEntry};
use crate::error::PortalError;

/// Parse a raw body into JSON, rejecting anything that is not JSON at all
pub(crate) fn parse_body(text: &str) -> Result<Value, PortalError> {
    serde_json::from_str(text)
        .map_err(|e| PortalError::MalformedResponse(format!("body is not valid JSON: {e}")))
}

/// Extract session entries from a list response.
///
/// Items without a string `sessionId` are skipped.
pub(crate) fn parse_session_list(body: &Value) -> Vec<SessionEntry> {
    let Some(items) = body.get("sessions").and_then(Value::as_array) else {
        tracing::debug!("response has no sessions array, treating as empty");
        return Vec::new();
    };

    let entries: Vec<SessionEntry> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();

    let skipped = items.len() - entries.len();
    if skipped > 0 {
        tracing::debug!(skipped, "skipped session entries without a sessionId");
    }
    entries
}

/// Extract the download URL; a missing or non-string `url` is an error
pub(crate) fn parse_download_link(body: &Value) -> Result<DownloadLink, PortalError> {
    body.get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(|url| DownloadLink {
            url: url.to_string(),
        })
        .ok_or(PortalError::MissingDownloadUrl)
}
