use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;

use crate::{
    journal::{line::LogLine, store::JournalStore},
    utils::time::line_time_stamp,
};

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(short, long, help = "Message of the entry")]
    message: String,
    #[arg(short = 't', long = "type", default_value = "log", help = "Category tag of the entry")]
    kind: String,
    #[arg(
        long = "meta",
        value_name = "KEY:VALUE",
        help = "Metadata pair, may be repeated"
    )]
    meta: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct MoodCommand {
    #[arg(short, long, help = "The feeling, e.g. \"Happy/Aliveness\" or \"Stressed/Tense\"")]
    feeling: String,
    #[arg(long, default_value = "", help = "What caused this feeling")]
    what: String,
    #[arg(long, default_value = "", help = "Behaviors or actions this feeling caused")]
    actions: String,
    #[arg(long = "appropriate", default_value = "", help = "Is the feeling appropriate to the situation")]
    is_appropriate: String,
    #[arg(long, default_value = "", help = "What can be done to improve or fix it")]
    fix: String,
}

#[derive(Debug, Parser)]
pub struct DecisionCommand {
    #[arg(short, long, help = "The decision made")]
    decision: String,
    #[arg(long, default_value = "", help = "Mental/physical state")]
    mood: String,
    #[arg(long, default_value = "", help = "Situation or context")]
    context: String,
    #[arg(long, default_value = "", help = "The problem statement or frame")]
    problem: String,
}

pub async fn process_log_command(data_dir: &Path, command: LogCommand) -> Result<()> {
    let meta = command
        .meta
        .iter()
        .map(|pair| {
            pair.split_once(':')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| anyhow!("Metadata {pair:?} is not in KEY:VALUE form"))
        })
        .collect::<Result<Vec<_>>>()?;

    write_entry(data_dir, &command.kind, meta, &command.message).await
}

pub async fn process_mood_command(data_dir: &Path, command: MoodCommand) -> Result<()> {
    let meta = vec![
        ("what".to_string(), command.what),
        ("actions".to_string(), command.actions),
        ("isAppropriate".to_string(), command.is_appropriate),
        ("fix".to_string(), command.fix),
    ];
    write_entry(data_dir, "mood", meta, &command.feeling).await
}

pub async fn process_decision_command(data_dir: &Path, command: DecisionCommand) -> Result<()> {
    let meta = vec![
        ("mood".to_string(), command.mood),
        ("context".to_string(), command.context),
        ("problem".to_string(), command.problem),
    ];
    write_entry(data_dir, "decision", meta, &command.decision).await
}

async fn write_entry(
    data_dir: &Path,
    kind: &str,
    meta: Vec<(String, String)>,
    message: &str,
) -> Result<()> {
    let store = JournalStore::new(data_dir)?;
    let now = Local::now();
    let line = LogLine::new(line_time_stamp(now), kind, meta, message);

    let path = store
        .write_line(&line.compose(), kind, now.date_naive())
        .await?;
    println!("Logged to {}", path.display());

    if let Some(quote) = store.random_quote() {
        println!("Remember: {quote}");
    }
    Ok(())
}

/// Journal lines produced as side effects of other commands, e.g. project
/// mutations.
pub async fn append_event_line(data_dir: &Path, kind: &str, message: &str) -> Result<()> {
    let store = JournalStore::new(data_dir)?;
    let now = Local::now();
    let line = LogLine::new(line_time_stamp(now), kind, vec![], message);
    store
        .write_line(&line.compose(), kind, now.date_naive())
        .await?;
    Ok(())
}
