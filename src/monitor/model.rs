use std::{path::Path, process::Stdio};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::debug;

/// Raw reply of the analysis capability.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    /// Token count reported by the tool, when it reports one.
    pub tokens: Option<u64>,
}

/// Boundary for the vision/chat model: send prompt text plus an optional
/// image, receive text. Everything behind this trait is a black box to the
/// pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisModel: Send + Sync {
    async fn invoke<'a>(&self, prompt: &str, image: Option<&'a Path>) -> Result<ModelReply>;
}

/// Invokes a configured command, writing the prompt to its stdin and
/// appending the image path as the last argument. The reply is read from
/// stdout; no token count is reported, so callers estimate one.
pub struct ShellModel {
    program: String,
    args: Vec<String>,
}

impl ShellModel {
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let Some(program) = parts.next() else {
            bail!("Model command is empty");
        };
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl AnalysisModel for ShellModel {
    async fn invoke<'a>(&self, prompt: &str, image: Option<&'a Path>) -> Result<ModelReply> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(image) = image {
            command.arg(image);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start model command {}", self.program))?;

        let mut stdin = child.stdin.take().expect("stdin was requested as piped");
        stdin.write_all(prompt.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            bail!(
                "Model command {} exited with {}",
                self.program,
                output.status
            );
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Model replied with {} bytes", text.len());
        Ok(ModelReply { text, tokens: None })
    }
}

/// Length-based token estimate used when a tool reports no count.
pub fn estimate_tokens(prompt: &str, reply: &str) -> u64 {
    ((prompt.len() + reply.len()) as u64).div_ceil(4)
}
