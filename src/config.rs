use std::{io::ErrorKind, path::Path};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::normalize::ResponseFormat;

const CONFIG_FILE: &str = "config.json";

/// User configuration read from `config.json` in the application directory.
/// A missing file means defaults; a corrupt file is reported and replaced by
/// defaults rather than aborting the command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model name used in ledger keys and journal meta.
    pub model: String,
    /// Command invoked to obtain an analysis. Receives the prompt on stdin;
    /// the screenshot path is appended as the last argument.
    pub model_command: Option<String>,
    /// Command invoked to capture the screen. The output path is appended
    /// as the last argument.
    pub capture_command: Option<String>,
    /// Default minutes between analysis cycles.
    pub interval_minutes: u32,
    pub response_format: ResponseFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            model_command: None,
            capture_command: None,
            interval_minutes: 10,
            response_format: ResponseFormat::FencedJson,
        }
    }
}

impl Config {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!("Config {path:?} did not parse ({e}), using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::analysis::normalize::ResponseFormat;

    use super::Config;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = Config::load(dir.path())?;
        assert_eq!(config.interval_minutes, 10);
        assert_eq!(config.response_format, ResponseFormat::FencedJson);
        assert!(config.model_command.is_none());
        Ok(())
    }

    #[test]
    fn partial_file_fills_remaining_defaults() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"model": "vision-1", "response_format": "status-line"}"#,
        )?;

        let config = Config::load(dir.path())?;
        assert_eq!(config.model, "vision-1");
        assert_eq!(config.response_format, ResponseFormat::StatusLine);
        assert_eq!(config.interval_minutes, 10);
        Ok(())
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("config.json"), "{ nope")?;

        let config = Config::load(dir.path())?;
        assert_eq!(config.model, "default");
        Ok(())
    }
}
