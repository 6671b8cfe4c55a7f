use serde::Serialize;

use crate::core::{SessionRow, parse_session_id};
use crate::view::SessionsView;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionJson<'a> {
    #[serde(flatten)]
    row: &'a SessionRow,
    route: String,
    can_download: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_disabled_reason: Option<&'static str>,
}

fn to_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize JSON output: {}", e);
        "[]".to_string()
    })
}

/// Loaded rows as a JSON array, with each row's route and download availability
pub(crate) fn output_session_json(view: &SessionsView, rows: &[SessionRow]) -> String {
    let output: Vec<SessionJson<'_>> = rows
        .iter()
        .map(|row| {
            let actions = view.actions(row);
            SessionJson {
                row,
                route: actions.open,
                can_download: actions.download.is_enabled(),
                download_disabled_reason: actions.download.reason(),
            }
        })
        .collect();
    to_pretty(&output)
}

/// Labels for ad-hoc identifiers, as printed by `parse`
pub(crate) fn output_labels_json(ids: &[String]) -> String {
    let rows: Vec<SessionRow> = ids.iter().map(|id| SessionRow::from_id(id.as_str())).collect();
    to_pretty(&rows)
}

/// One line per identifier: `<id>\t<date or ->\t<time or ->`
pub(crate) fn output_labels_text(ids: &[String]) -> String {
    ids.iter()
        .map(|id| {
            let labels = parse_session_id(id);
            format!(
                "{id}\t{}\t{}\n",
                labels.date_label.as_deref().unwrap_or("-"),
                labels.time_label.as_deref().unwrap_or("-")
            )
        })
        .collect()
}
