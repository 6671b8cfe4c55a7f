mod format;
mod json;
mod table;

pub(crate) use json::{output_labels_json, output_labels_text, output_session_json};
pub(crate) use table::{LOADING_MESSAGE, SessionTableOptions, render_view};
