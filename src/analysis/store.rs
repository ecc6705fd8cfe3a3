use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::fs::operations::{backup_aside, write_full};

use super::record::AnalysisRecord;

const FILE_PREFIX: &str = "analysis-";
const FILE_SUFFIX: &str = ".json";

/// Per-day JSON store of analysis records. Each daily file is a single JSON
/// object keyed by ISO timestamp and is fully rewritten on every insert.
#[derive(Clone)]
pub struct AnalysisStore {
    log_dir: PathBuf,
}

impl AnalysisStore {
    pub fn new(data_dir: &Path) -> Result<Self, std::io::Error> {
        let log_dir = data_dir.join("analysis-logs");
        std::fs::create_dir_all(&log_dir)?;

        Ok(Self { log_dir })
    }

    /// Resolves the daily file for a timestamp: the date portion (first 10
    /// characters) with dashes stripped selects `analysis-YYYYMMDD.json`.
    pub fn file_path_for(&self, timestamp: &str) -> PathBuf {
        let compact: String = timestamp
            .chars()
            .take(10)
            .filter(|c| *c != '-')
            .collect();
        self.log_dir
            .join(format!("{FILE_PREFIX}{compact}{FILE_SUFFIX}"))
    }

    /// Inserts a record at `timestamp` into its daily file, merging with
    /// whatever that file already holds. Corrupt existing state is moved
    /// aside before being replaced by an empty object.
    pub async fn log_result(&self, timestamp: &str, record: &AnalysisRecord) -> Result<()> {
        let path = self.file_path_for(timestamp);
        let mut entries = self.read_raw(&path).await?;

        entries.insert(timestamp.to_string(), serde_json::to_value(record)?);

        let pretty = serde_json::to_string_pretty(&entries)?;
        write_full(&path, pretty.as_bytes()).await?;
        debug!("Logged analysis for {timestamp} into {path:?}");
        Ok(())
    }

    async fn read_raw(&self, path: &Path) -> Result<BTreeMap<String, Value>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!("Analysis file {path:?} is corrupt ({e}), resetting it");
                match backup_aside(path, "corrupt") {
                    Ok(backup) => warn!("Corrupt analysis state copied to {backup:?}"),
                    Err(e) => warn!("Could not back up corrupt analysis file: {e:?}"),
                }
                Ok(BTreeMap::new())
            }
        }
    }

    /// Reads a daily file back as (timestamp, record) pairs in timestamp
    /// order. Entries that no longer match the record schema read as their
    /// defaulted form rather than failing the whole file.
    pub async fn read_file(&self, path: &Path) -> Result<Vec<(String, AnalysisRecord)>> {
        let entries = self.read_raw(path).await?;
        Ok(entries
            .into_iter()
            .map(|(timestamp, value)| {
                let record = serde_json::from_value(value).unwrap_or_else(|e| {
                    warn!("Entry {timestamp} in {path:?} did not parse: {e}");
                    AnalysisRecord::default()
                });
                (timestamp, record)
            })
            .collect())
    }

    /// Lists the most recent `n` daily analysis files, newest first, ordered
    /// by the date encoded in the filename. Malformed names sort as earliest
    /// instead of breaking the listing.
    pub fn last_x_paths(&self, n: usize) -> Result<Vec<PathBuf>> {
        let mut dated = vec![];
        for entry in std::fs::read_dir(&self.log_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(FILE_PREFIX) || !name.ends_with(FILE_SUFFIX) {
                continue;
            }
            dated.push((file_date(&name), entry.path()));
        }

        dated.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(dated.into_iter().take(n).map(|(_, path)| path).collect())
    }
}

fn file_date(name: &str) -> NaiveDate {
    name.strip_prefix(FILE_PREFIX)
        .and_then(|v| v.strip_suffix(FILE_SUFFIX))
        .and_then(|v| NaiveDate::parse_from_str(v, "%Y%m%d").ok())
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::analysis::record::{AnalysisRecord, AnalysisStatus};

    use super::AnalysisStore;

    fn record(summary: &str) -> AnalysisRecord {
        AnalysisRecord {
            status: AnalysisStatus::OnTask,
            summary: summary.to_string(),
            ..AnalysisRecord::default()
        }
    }

    #[tokio::test]
    async fn test_two_timestamps_merge_into_one_file() -> Result<()> {
        let dir = tempdir()?;
        let store = AnalysisStore::new(dir.path())?;

        store
            .log_result("2025-01-01T10:00:00Z", &record("morning"))
            .await?;
        store
            .log_result("2025-01-01T14:00:00Z", &record("afternoon"))
            .await?;

        let path = dir.path().join("analysis-logs/analysis-20250101.json");
        assert!(path.exists());

        let entries = store.read_file(&path).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "2025-01-01T10:00:00Z");
        assert_eq!(entries[0].1.summary, "morning");
        assert_eq!(entries[1].1.summary, "afternoon");
        Ok(())
    }

    #[tokio::test]
    async fn test_written_record_reads_back_verbatim() -> Result<()> {
        let dir = tempdir()?;
        let store = AnalysisStore::new(dir.path())?;
        let written = record("check");

        store.log_result("2025-02-03T09:30:00Z", &written).await?;

        let path = store.file_path_for("2025-02-03T09:30:00Z");
        let entries = store.read_file(&path).await?;
        assert_eq!(entries, vec![("2025-02-03T09:30:00Z".to_string(), written)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_is_naively_parseable_and_indented() -> Result<()> {
        let dir = tempdir()?;
        let store = AnalysisStore::new(dir.path())?;

        store.log_result("2025-01-01T10:00:00Z", &record("x")).await?;

        let content =
            std::fs::read_to_string(dir.path().join("analysis-logs/analysis-20250101.json"))?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        assert!(value.is_object());
        assert!(content.contains("\n  \"2025-01-01T10:00:00Z\""));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_file_is_backed_up_then_reset() -> Result<()> {
        let dir = tempdir()?;
        let store = AnalysisStore::new(dir.path())?;
        let path = dir.path().join("analysis-logs/analysis-20250101.json");
        std::fs::write(&path, "{ broken json")?;

        store.log_result("2025-01-01T10:00:00Z", &record("fresh")).await?;

        let entries = store.read_file(&path).await?;
        assert_eq!(entries.len(), 1);

        let backups = std::fs::read_dir(dir.path().join("analysis-logs"))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt."))
            .count();
        assert_eq!(backups, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_last_x_paths_sorts_descending() -> Result<()> {
        let dir = tempdir()?;
        let store = AnalysisStore::new(dir.path())?;
        for day in 1..=10 {
            store
                .log_result(&format!("2025-01-{day:02}T08:00:00Z"), &record("d"))
                .await?;
        }

        let paths = store.last_x_paths(5)?;
        assert_eq!(paths.len(), 5);
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "analysis-20250110.json",
                "analysis-20250109.json",
                "analysis-20250108.json",
                "analysis-20250107.json",
                "analysis-20250106.json"
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_filename_sorts_last_without_panicking() -> Result<()> {
        let dir = tempdir()?;
        let store = AnalysisStore::new(dir.path())?;
        std::fs::write(dir.path().join("analysis-logs/analysis-garbage.json"), "{}")?;
        store.log_result("2025-01-05T08:00:00Z", &record("d")).await?;

        let paths = store.last_x_paths(2)?;
        assert!(paths[0].ends_with("analysis-20250105.json"));
        assert!(paths[1].ends_with("analysis-garbage.json"));
        Ok(())
    }
}
