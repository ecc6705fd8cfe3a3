use std::{
    future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use futures::{stream, Stream, StreamExt};
use rand::seq::SliceRandom;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::{debug, warn};

use crate::{fs::operations::append_line, utils::time::date_to_day_name};

use super::line::LogLine;

pub const QUOTE_KIND: &str = "quote";
const QUOTES_FILE: &str = "quotes.txt";

/// Append-only store of daily journal files. Each calendar day gets its own
/// `dd-mm-yyyy.txt`; lines are never mutated or deleted once written.
#[derive(Clone)]
pub struct JournalStore {
    journal_dir: PathBuf,
}

impl JournalStore {
    pub fn new(data_dir: &Path) -> Result<Self, std::io::Error> {
        let journal_dir = data_dir.join("journal");
        std::fs::create_dir_all(&journal_dir)?;

        Ok(Self { journal_dir })
    }

    pub fn day_file_path(&self, date: NaiveDate) -> PathBuf {
        self.journal_dir
            .join(format!("{}.txt", date_to_day_name(date)))
    }

    fn quotes_path(&self) -> PathBuf {
        self.journal_dir.join(QUOTES_FILE)
    }

    /// Appends a composed line to today's file. Lines of kind `quote` fan
    /// out to the dedicated quotes file as well; a failure on that secondary
    /// write never rolls back or fails the primary one.
    pub async fn write_line(&self, line: &str, kind: &str, today: NaiveDate) -> Result<PathBuf> {
        let path = self.day_file_path(today);
        append_line(&path, line).await?;

        if kind == QUOTE_KIND {
            if let Err(e) = append_line(&self.quotes_path(), line).await {
                warn!("Failed to remember quote separately: {e:?}");
            }
        }

        Ok(path)
    }

    /// Returns the `n` most recent daily file paths counting back from
    /// `today` inclusive. Existence is the reader's concern, so requesting 7
    /// days always yields 7 paths.
    pub fn last_x_file_paths(&self, n: usize, today: NaiveDate) -> Vec<PathBuf> {
        (0..n)
            .map(|i| self.day_file_path(today - Duration::days(i as i64)))
            .collect()
    }

    /// Reads every line of one day's file. A missing file reads as empty.
    pub async fn read_day(&self, date: NaiveDate) -> Result<Vec<LogLine>> {
        let path = self.day_file_path(date);
        debug!("Extracting {path:?}");
        let file = match File::open(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let buffer = BufReader::new(file);
        let mut lines = buffer.lines();
        let mut parsed = vec![];
        while let Ok(Some(v)) = lines.next_line().await {
            if v.trim().is_empty() {
                continue;
            }
            parsed.push(LogLine::parse(&v));
        }
        Ok(parsed)
    }

    /// Streams parsed lines of the last `n` days, oldest day first. Files
    /// are read concurrently but yielded in day order.
    pub fn read_last_days(
        &self,
        n: usize,
        today: NaiveDate,
    ) -> impl Stream<Item = Result<LogLine>> {
        let store = self.clone();
        let days = (0..n as i64)
            .rev()
            .map(move |i| today - Duration::days(i))
            .collect::<Vec<_>>();

        stream::iter(days)
            .map(move |day| {
                let store = store.clone();
                async move { store.read_day(day).await }
            })
            .buffered(4)
            .flat_map(|day_lines| match day_lines {
                Ok(lines) => stream::iter(lines).map(Ok).boxed(),
                Err(e) => stream::once(future::ready(Err(e))).boxed(),
            })
    }

    /// Picks a random remembered quote, if any were logged.
    pub fn random_quote(&self) -> Option<String> {
        let raw = std::fs::read_to_string(self.quotes_path()).ok()?;
        let quotes = raw.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>();
        let picked = quotes.choose(&mut rand::thread_rng())?;
        let quote = picked.rsplit('|').next()?.trim();
        (!quote.is_empty()).then(|| quote.to_string())
    }

    /// Returns the names of daily files whose content contains `keyword`.
    pub fn search(&self, keyword: &str) -> Result<Vec<String>> {
        let mut matches = vec![];
        for entry in std::fs::read_dir(&self.journal_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(".txt") || name == QUOTES_FILE {
                continue;
            }
            let content = match std::fs::read_to_string(entry.path()) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Skipping unreadable journal file {name}: {e}");
                    continue;
                }
            };
            if content.contains(keyword) {
                matches.push(name);
            }
        }
        matches.sort();
        Ok(matches)
    }
}
