//! External editor used by `gott edit`.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Fallback when neither the config nor the environment names an editor.
pub const DEFAULT_EDITOR: &str = "vi";

/// An editor command line such as `vim` or `code --wait`.
///
/// The file path is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Picks the configured editor, then `$VISUAL`, then `$EDITOR`, then `vi`.
    pub fn resolve(configured: Option<&str>) -> Self {
        Self::resolve_with(configured, |key| std::env::var(key).ok())
    }

    fn resolve_with(configured: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let command = configured
            .map(str::to_string)
            .or_else(|| env("VISUAL"))
            .or_else(|| env("EDITOR"))
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        Self { command }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl gott_core::Editor for ExternalEditor {
    fn edit(&self, path: &Path) -> io::Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "editor command is empty")
        })?;

        tracing::debug!(editor = %self.command, path = %path.display(), "launching editor");
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        if !status.success() {
            tracing::warn!(editor = %self.command, %status, "editor exited unsuccessfully");
        }
        Ok(())
    }
}
