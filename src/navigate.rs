//! Navigation targets for resolved download links
//!
//! In a browser, navigating to the link starts the download. On the command
//! line the link is printed, opened in the system browser, or saved to disk.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

use crate::api::HttpClient;
use crate::error::PortalError;

pub(crate) trait Navigator {
    fn navigate(&mut self, url: &str) -> Result<(), PortalError>;
}

/// Writes the link to a stream, one per line
pub(crate) struct PrintNavigator<W: Write> {
    out: W,
}

impl<W: Write> PrintNavigator<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Navigator for PrintNavigator<W> {
    fn navigate(&mut self, url: &str) -> Result<(), PortalError> {
        writeln!(self.out, "{url}")?;
        Ok(())
    }
}

/// Hands the link to the platform URL opener
#[derive(Debug, Default)]
pub(crate) struct BrowserNavigator;

impl BrowserNavigator {
    fn opener(url: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        } else if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&mut self, url: &str) -> Result<(), PortalError> {
        let mut cmd = Self::opener(url);
        let program = cmd.get_program().to_string_lossy().into_owned();
        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| PortalError::Navigation(format!("failed to run {program}: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(PortalError::Navigation(format!("{program} exited with {status}")))
        }
    }
}

/// Fetches the link target into a local file.
///
/// The body goes to a temporary file next to the target, which replaces the
/// target only once the transfer has finished. A failed request leaves any
/// existing file untouched.
pub(crate) struct FileNavigator {
    client: HttpClient,
    path: PathBuf,
}

impl FileNavigator {
    pub(crate) fn new(client: HttpClient, path: PathBuf) -> Self {
        Self { client, path }
    }
}

impl Navigator for FileNavigator {
    fn navigate(&mut self, url: &str) -> Result<(), PortalError> {
        let mut body = self.client.open(url)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut staged = NamedTempFile::new_in(dir)?;
        let bytes = {
            let mut out = BufWriter::new(staged.as_file_mut());
            let n = std::io::copy(&mut body.as_reader(), &mut out)?;
            out.flush()?;
            n
        };
        staged.persist(&self.path).map_err(|e| PortalError::Io(e.error))?;

        tracing::info!("Saved {} bytes to {}", bytes, self.path.display());
        Ok(())
    }
}
