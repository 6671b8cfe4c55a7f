//! Background loads delivered back to the view over a channel

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::core::SessionRow;
use crate::error::PortalError;

use super::state::{LoadTicket, SessionsView};

/// Result of one background load, tagged with the ticket it was started under
pub(crate) struct Completion {
    pub(crate) ticket: LoadTicket,
    pub(crate) result: Result<Vec<SessionRow>, PortalError>,
}

/// Run `fetch` on a worker thread and send its result to `tx`.
///
/// The transport is never interrupted; staleness is decided by the view
/// when the completion is committed.
pub(crate) fn spawn_load<F>(ticket: LoadTicket, tx: Sender<Completion>, fetch: F) -> JoinHandle<()>
where
    F: FnOnce() -> Result<Vec<SessionRow>, PortalError> + Send + 'static,
{
    std::thread::spawn(move || {
        let result = fetch();
        // Receiver gone means the view was torn down; nothing to deliver to.
        let _ = tx.send(Completion { ticket, result });
    })
}

impl SessionsView {
    /// Commit every completion already waiting. Returns how many were applied.
    pub(crate) fn drain(&mut self, rx: &Receiver<Completion>) -> usize {
        let mut applied = 0;
        while let Ok(done) = rx.try_recv() {
            if self.complete(done.ticket, done.result) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait up to `timeout` for the current load to land.
    ///
    /// Stale completions arriving meanwhile are dropped. Returns `true` once
    /// the current load has been committed.
    pub(crate) fn wait_current(&mut self, rx: &Receiver<Completion>, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(done) => {
                    if self.complete(done.ticket, done.result) {
                        return true;
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
    }
}

/// Periodic reloads with at most one load in flight.
///
/// A round only supersedes the pending load when the fetch target changed.
/// Otherwise it keeps waiting on the load already running, so a fetch slower
/// than the refresh interval still gets committed.
pub(crate) struct WatchLoop {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    pending: Option<LoadTicket>,
}

impl WatchLoop {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            pending: None,
        }
    }

    /// Run one refresh round, waiting up to `wait` for the current load.
    ///
    /// `fetch` is only spawned when a new load starts. Returns `true` when a
    /// result was committed during this round.
    pub(crate) fn round<F>(
        &mut self,
        view: &mut SessionsView,
        target: String,
        download_enabled: bool,
        wait: Duration,
        fetch: F,
    ) -> bool
    where
        F: FnOnce() -> Result<Vec<SessionRow>, PortalError> + Send + 'static,
    {
        // The pending load may have landed between rounds.
        if self.pending.is_some() && view.drain(&self.rx) > 0 {
            self.pending = None;
            return true;
        }

        let ticket = match view.retarget(target, download_enabled) {
            Some(ticket) => Some(ticket),
            None if self.pending.is_some_and(|t| view.is_current(t)) => {
                tracing::debug!("previous load still running, waiting on it");
                None
            }
            None => Some(view.begin_load()),
        };
        if let Some(ticket) = ticket {
            spawn_load(ticket, self.tx.clone(), fetch);
            self.pending = Some(ticket);
        }

        let committed = view.wait_current(&self.rx, wait);
        if committed {
            self.pending = None;
        }
        committed
    }
}
