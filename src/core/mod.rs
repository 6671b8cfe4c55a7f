//! Core module - session identifiers and the rows derived from them

mod parser;
mod types;

pub(crate) use parser::{detail_route, display_label, parse_session_id};
pub(crate) use types::{DownloadLink, SessionEntry, SessionRow};
