//! CLI subcommand definitions

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Commands {
    /// List sessions (default)
    List,
    /// Print the detail route for a session
    Open {
        /// Session identifier
        session_id: String,
    },
    /// Resolve a short-lived download URL and navigate to it
    Download {
        /// Session identifier
        session_id: String,
        /// Open the URL in the system browser instead of printing it
        #[arg(long, conflicts_with = "output")]
        open: bool,
        /// Save the download to FILE
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print date/time labels for session identifiers (no network)
    Parse {
        /// Session identifiers
        #[arg(required = true)]
        session_ids: Vec<String>,
    },
}

/// Where a resolved download link goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DownloadTarget {
    Print,
    Browser,
    File(PathBuf),
}

impl DownloadTarget {
    pub(crate) fn from_flags(open: bool, output: Option<PathBuf>) -> Self {
        match (open, output) {
            (_, Some(path)) => DownloadTarget::File(path),
            (true, None) => DownloadTarget::Browser,
            (false, None) => DownloadTarget::Print,
        }
    }
}
