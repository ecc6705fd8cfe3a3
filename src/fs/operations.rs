use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::Local;
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

use crate::utils::time::backup_time_stamp;

/// Appends `line + '\n'` to the file at `path`, creating it if needed. The
/// file is held under an exclusive advisory lock for the duration of the
/// write.
pub async fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = File::options()
        .append(true)
        .create(true)
        .open(path)
        .await?;

    // Semi-safe acquire-release for a file
    file.lock_exclusive()?;
    let result = append_with_file(&mut file, line).await;
    file.unlock_async().await?;
    result
}

async fn append_with_file(file: &mut File, line: &str) -> Result<()> {
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;
    Ok(())
}

/// Replaces the contents of the file at `path` under an exclusive advisory
/// lock. Used by the stores that rewrite a whole JSON artifact on every
/// update.
pub async fn write_full(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;

    file.lock_exclusive()?;
    let result = write_with_file(&mut file, bytes).await;
    file.unlock_async().await?;
    result
}

async fn write_with_file(file: &mut File, bytes: &[u8]) -> Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Copies the file at `path` to a sibling qualified with `tag` and the
/// current time. Used to move corrupt state aside before resetting it.
pub fn backup_aside(path: &Path, tag: &str) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Path {path:?} has no file name"))?
        .to_string_lossy();
    let backup_name = format!("{file_name}.{tag}.{}", backup_time_stamp(Local::now()));
    let backup_path = path.with_file_name(backup_name);
    std::fs::copy(path, &backup_path)?;
    debug!("Backed up {path:?} to {backup_path:?}");
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{append_line, backup_aside, write_full};

    #[tokio::test]
    async fn test_append_line_creates_and_appends() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("day.txt");

        append_line(&path, "first").await?;
        append_line(&path, "second").await?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content, "first\nsecond\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_write_full_truncates_previous_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("state.json");

        write_full(&path, b"{\"long\": \"content here\"}").await?;
        write_full(&path, b"{}").await?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content, "{}");
        Ok(())
    }

    #[tokio::test]
    async fn test_backup_aside_copies_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("state.json");
        std::fs::write(&path, "broken")?;

        let backup = backup_aside(&path, "corrupt")?;

        assert!(backup.exists());
        assert_eq!(std::fs::read_to_string(&backup)?, "broken");
        // Original is untouched.
        assert_eq!(std::fs::read_to_string(&path)?, "broken");
        Ok(())
    }
}
