use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::Local;
use tracing::{info, warn};

use crate::{
    fs::operations::{backup_aside, write_full},
    utils::time::backup_time_stamp,
};

use super::model::Project;

const PROJECTS_FILE: &str = "projects.json";
const BACKUP_DIR: &str = "backups";

/// Whole-file store for the project collection. Loads heal a missing file
/// into an empty list; saves copy the previous version into a timestamped
/// backup first.
pub struct ProjectStore {
    file: PathBuf,
    backup_dir: PathBuf,
}

impl ProjectStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            file: data_dir.join(PROJECTS_FILE),
            backup_dir: data_dir.join(BACKUP_DIR),
        }
    }

    /// Reads the whole collection. A missing file is a first run, not an
    /// error: it is created with an empty array.
    pub async fn load(&self) -> Result<Vec<Project>> {
        let content = match tokio::fs::read_to_string(&self.file).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No projects file yet, creating {:?}", self.file);
                write_full(&self.file, b"[]").await?;
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!("Projects file {:?} is corrupt ({e}), resetting it", self.file);
                match backup_aside(&self.file, "corrupt") {
                    Ok(backup) => warn!("Corrupt projects copied to {backup:?}"),
                    Err(e) => warn!("Could not back up corrupt projects file: {e:?}"),
                }
                Ok(vec![])
            }
        }
    }

    /// Overwrites the collection. The previous file contents are first
    /// copied into the backup directory; a failed backup is logged and never
    /// blocks the write.
    pub async fn save(&self, projects: &[Project]) -> Result<()> {
        if self.file.exists() {
            if let Err(e) = self.backup_current() {
                warn!("Failed to back up projects before overwrite: {e:?}");
            }
        }

        let pretty = serde_json::to_string_pretty(projects)?;
        write_full(&self.file, pretty.as_bytes()).await?;
        Ok(())
    }

    fn backup_current(&self) -> Result<()> {
        std::fs::create_dir_all(&self.backup_dir)?;
        let backup_name = format!(
            "projects.backup.{}.json",
            backup_time_stamp(Local::now())
        );
        std::fs::copy(&self.file, self.backup_dir.join(backup_name))?;
        Ok(())
    }
}
