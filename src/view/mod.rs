//! Session list view: load state machine and row actions

mod runner;
mod state;

pub(crate) use runner::WatchLoop;
pub(crate) use state::{ActionState, SessionsView, ViewState};
