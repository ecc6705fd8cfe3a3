use std::{collections::BTreeMap, fmt::Display, path::Path};

use anyhow::Result;
use chrono::Local;
use chrono_english::{parse_date_string, Dialect};
use clap::{Parser, ValueEnum};
use futures::TryStreamExt;

use crate::{
    analysis::{report::render_file, store::AnalysisStore},
    journal::store::JournalStore,
};

use super::journal::append_event_line;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Timespan {
    #[default]
    Day,
    Week,
    Month,
}

impl Timespan {
    fn days(self) -> usize {
        match self {
            Timespan::Day => 1,
            Timespan::Week => 7,
            Timespan::Month => 30,
        }
    }
}

impl Display for Timespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timespan::Day => write!(f, "day"),
            Timespan::Week => write!(f, "week"),
            Timespan::Month => write!(f, "month"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReviewCommand {
    #[arg(default_value_t = Timespan::Day, help = "Timespan to summarize")]
    timespan: Timespan,
}

#[derive(Debug, Parser)]
pub struct LogReviewCommand {
    #[arg(
        short,
        long,
        help = "Day whose analyses to review. Examples are \"yesterday\", \"15/03/2025\". Defaults to the most recent analysis file"
    )]
    date: Option<String>,
    #[arg(short, long, help = "Search journal files for a keyword instead")]
    search: Option<String>,
}

/// Tabulates journal entries over the requested timespan: counts per type,
/// mood frequencies, then the entries themselves.
pub async fn process_review_command(data_dir: &Path, command: ReviewCommand) -> Result<()> {
    let store = JournalStore::new(data_dir)?;
    let today = Local::now().date_naive();

    let lines: Vec<_> = store
        .read_last_days(command.timespan.days(), today)
        .try_collect()
        .await?;

    let mut types = BTreeMap::<String, u32>::new();
    let mut moods = BTreeMap::<String, u32>::new();
    for line in &lines {
        *types.entry(line.kind.clone()).or_default() += 1;
        if line.kind == "mood" {
            *moods.entry(line.message.clone()).or_default() += 1;
        }
    }

    println!("Summary of all logs");
    for (kind, count) in &types {
        println!("{count}\t{kind}");
    }

    if !moods.is_empty() {
        println!("\nMood(s) in timespan");
        for (mood, count) in &moods {
            println!("{count}\t{mood}");
        }
    }

    println!();
    for line in &lines {
        println!("{}\t{}\t{}", line.time, line.kind, line.message);
    }
    Ok(())
}

/// Renders stored screen analyses for review, or searches the journal when
/// a keyword was given.
pub async fn process_logreview_command(data_dir: &Path, command: LogReviewCommand) -> Result<()> {
    if let Some(keyword) = command.search {
        return search_journal(data_dir, &keyword).await;
    }

    let store = AnalysisStore::new(data_dir)?;
    let path = match command.date {
        Some(raw) => {
            let date = parse_date_string(&raw, Local::now(), Dialect::Uk)
                .map_err(|e| anyhow::anyhow!("Failed to parse date {raw:?}: {e}"))?;
            store.file_path_for(&date.format("%Y-%m-%d").to_string())
        }
        None => match store.last_x_paths(1)?.into_iter().next() {
            Some(v) => v,
            None => {
                println!("No analysis logs yet");
                return Ok(());
            }
        },
    };

    let entries = store.read_file(&path).await?;
    if entries.is_empty() {
        println!("No analyses recorded in {}", path.display());
        return Ok(());
    }

    println!("{}", render_file(&entries));
    Ok(())
}

async fn search_journal(data_dir: &Path, keyword: &str) -> Result<()> {
    let store = JournalStore::new(data_dir)?;
    let matches = store.search(keyword)?;

    if matches.is_empty() {
        println!("No journal files mention {keyword:?}");
    } else {
        for name in &matches {
            println!("{name}");
        }
    }

    append_event_line(
        data_dir,
        "log-search",
        &format!("Keyword: {keyword}, Matches: {}", matches.len()),
    )
    .await?;
    Ok(())
}
