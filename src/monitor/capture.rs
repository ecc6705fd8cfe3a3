use std::path::Path;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Boundary for taking a screenshot. The capture mechanism is OS-specific
/// and external to the core pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    async fn capture(&self, target: &Path) -> Result<()>;
}

/// Captures by running a configured OS command with the output path appended
/// as the last argument.
pub struct ShellCapture {
    program: String,
    args: Vec<String>,
}

impl ShellCapture {
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let Some(program) = parts.next() else {
            bail!("Capture command is empty");
        };
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl ScreenCapture for ShellCapture {
    async fn capture(&self, target: &Path) -> Result<()> {
        debug!("Capturing screen into {target:?}");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .status()
            .await?;

        if !status.success() {
            bail!("Capture command {} exited with {status}", self.program);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{ScreenCapture, ShellCapture};

    #[test]
    fn empty_command_is_rejected() {
        assert!(ShellCapture::from_command_line("  ").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_capture_runs_command() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("shot.png");

        let capture = ShellCapture::from_command_line("touch")?;
        capture.capture(&target).await?;

        assert!(target.exists());
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_surfaces_error() -> Result<()> {
        let dir = tempdir()?;
        let capture = ShellCapture::from_command_line("false")?;
        assert!(capture.capture(&dir.path().join("x")).await.is_err());
        Ok(())
    }
}
