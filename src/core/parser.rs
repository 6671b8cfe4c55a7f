//! Session identifier parsing
//!
//! Identifiers look like `Jam-20240115-153045123` by convention, but nothing
//! enforces that. Parsing is a best-effort formatting pass: it never fails,
//! and each label degrades to `None` independently.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::consts::{MISSING_LABEL, SESSION_ROUTE_PREFIX};

use super::types::{SessionLabels, SessionRow};

/// Characters `encodeURIComponent` leaves untouched besides alphanumerics
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Slice by char position, clamped to the string's length
fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let mut indices = s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()));
    let Some(from) = indices.nth(start) else {
        return "";
    };
    let to = indices.nth(end - start - 1).unwrap_or(s.len());
    &s[from..to]
}

fn has_len(s: &str, len: usize) -> bool {
    s.chars().count() == len
}

fn date_label(blob: &str) -> Option<String> {
    let yyyy = char_slice(blob, 0, 4);
    let mm = char_slice(blob, 4, 6);
    let dd = char_slice(blob, 6, 8);
    if has_len(yyyy, 4) && has_len(mm, 2) && has_len(dd, 2) {
        Some(format!("{yyyy}-{mm}-{dd}"))
    } else {
        None
    }
}

fn time_label(blob: &str) -> Option<String> {
    let hh = char_slice(blob, 0, 2);
    let mi = char_slice(blob, 2, 4);
    let ss = char_slice(blob, 4, 6);
    if has_len(hh, 2) && has_len(mi, 2) && has_len(ss, 2) {
        Some(format!("{hh}:{mi}:{ss}"))
    } else {
        None
    }
}

/// Derive display labels from a session identifier.
pub(crate) fn parse_session_id(session_id: &str) -> SessionLabels {
    let mut parts = session_id.split('-').skip(1);
    let date_blob = parts.next().unwrap_or("");
    let time_blob = parts.next().unwrap_or("");

    SessionLabels {
        date_label: date_label(date_blob),
        time_label: time_label(time_blob),
    }
}

/// Route path of the session detail view, with the identifier percent-encoded
pub(crate) fn detail_route(session_id: &str) -> String {
    format!(
        "{SESSION_ROUTE_PREFIX}{}",
        utf8_percent_encode(session_id, URI_COMPONENT)
    )
}

/// Subtitle shown under a session id: `2024-01-15 • 15:30:45`
pub(crate) fn display_label(row: &SessionRow) -> Option<String> {
    if row.date_label.is_none() && row.time_label.is_none() {
        return None;
    }
    let date = row.date_label.as_deref().unwrap_or(MISSING_LABEL);
    Some(match &row.time_label {
        Some(time) => format!("{date} • {time}"),
        None => date.to_string(),
    })
}
