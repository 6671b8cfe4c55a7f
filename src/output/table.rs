use comfy_table::Cell;

use crate::core::{SessionRow, display_label};
use crate::output::format::{action_cell, create_styled_table, header_cell, styled_cell};
use crate::view::{SessionsView, ViewState};

pub(crate) const LOADING_MESSAGE: &str = "Loading…";
pub(crate) const FAILED_TITLE: &str = "Could not load sessions";
pub(crate) const EMPTY_MESSAGE: &str = "No sessions yet.";

#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionTableOptions {
    pub(crate) use_color: bool,
}

fn session_table(view: &SessionsView, rows: &[SessionRow], opts: SessionTableOptions) -> String {
    let c = opts.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Session", c),
        header_cell("Recorded", c),
        header_cell("Open", c),
        header_cell("Play", c),
        header_cell("Download", c),
    ]);

    for row in rows {
        let actions = view.actions(row);
        table.add_row(vec![
            styled_cell(&row.session_id, None, true),
            Cell::new(display_label(row).unwrap_or_default()),
            Cell::new(&actions.open),
            action_cell("Play", &actions.play, c),
            action_cell("Download", &actions.download, c),
        ]);
    }

    let title = if c {
        "\x1b[1;36mSessions\x1b[0m"
    } else {
        "Sessions"
    };
    let noun = if rows.len() == 1 { "session" } else { "sessions" };
    format!("\n  {title}\n\n{table}\n\n  {} {noun}\n", rows.len())
}

/// Render the view state for the terminal.
///
/// Returns `Err` with the rendered text when the view is in `Failed`, so
/// callers can route it to stderr.
pub(crate) fn render_view(view: &SessionsView, opts: SessionTableOptions) -> Result<String, String> {
    match view.state() {
        ViewState::Idle => Ok(String::new()),
        ViewState::Loading => Ok(LOADING_MESSAGE.to_string()),
        ViewState::Failed(message) => Err(format!("{FAILED_TITLE}\n  {message}")),
        ViewState::Loaded(rows) if rows.is_empty() => Ok(EMPTY_MESSAGE.to_string()),
        ViewState::Loaded(rows) => Ok(session_table(view, rows, opts)),
    }
}
