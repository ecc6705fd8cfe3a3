use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::{
    analysis::store::AnalysisStore,
    config::Config,
    journal::store::JournalStore,
    monitor::{
        capture::ShellCapture, model::ShellModel, Monitor, MonitorConfig, MONITOR_AGENT,
    },
    projects::store::ProjectStore,
    usage::UsageLedger,
    utils::{clock::DefaultClock, time::date_to_day_name},
};

#[derive(Debug, Parser)]
pub struct AnalyzeCommand {
    #[arg(short, long, help = "Analysis interval in minutes. Defaults to the configured value")]
    interval: Option<u32>,
    #[arg(long, help = "Run a single analysis cycle and exit")]
    once: bool,
}

#[derive(Debug, Parser)]
pub struct UsageCommand {
    #[arg(long, help = "Only show usage booked under this agent")]
    agent: Option<String>,
    #[arg(long, help = "Only show usage booked under this model")]
    model: Option<String>,
}

pub async fn process_analyze_command(data_dir: &Path, command: AnalyzeCommand) -> Result<()> {
    let config = Config::load(data_dir)?;
    let capture_command = config
        .capture_command
        .as_deref()
        .context("No capture_command configured in config.json")?;
    let model_command = config
        .model_command
        .as_deref()
        .context("No model_command configured in config.json")?;

    let interval_minutes = command.interval.unwrap_or(config.interval_minutes).max(1);
    let shutdown = CancellationToken::new();

    let mut monitor = Monitor::new(
        Box::new(ShellCapture::from_command_line(capture_command)?),
        Box::new(ShellModel::from_command_line(model_command)?),
        JournalStore::new(data_dir)?,
        AnalysisStore::new(data_dir)?,
        ProjectStore::new(data_dir),
        UsageLedger::load(data_dir).await?,
        Box::new(DefaultClock),
        shutdown.clone(),
        MonitorConfig {
            interval: Duration::from_secs(u64::from(interval_minutes) * 60),
            model_name: config.model.clone(),
            format: config.response_format,
            screenshot_dir: data_dir.join("screenshots"),
        },
    )?;

    if command.once {
        let timestamp = monitor.run_cycle().await?;
        println!("Analysis logged at {timestamp}");
        print_usage_for(data_dir, MONITOR_AGENT, &config.model).await?;
        return Ok(());
    }

    println!("Starting periodic analysis every {interval_minutes} minutes...");
    println!("Press Ctrl+C to stop");

    let (_, run_result) = tokio::join!(detect_shutdown(shutdown.clone()), monitor.run());
    run_result
}

pub async fn process_usage_command(data_dir: &Path, command: UsageCommand) -> Result<()> {
    let ledger = UsageLedger::load(data_dir).await?;

    if let (Some(agent), Some(model)) = (&command.agent, &command.model) {
        return match ledger.get(agent, model) {
            Some(_) => print_usage_for(data_dir, agent, model).await,
            None => {
                println!("No usage recorded yet for {agent}-{model}");
                Ok(())
            }
        };
    }

    if ledger.all().is_empty() {
        println!("No token usage recorded yet");
        return Ok(());
    }

    let today = date_to_day_name(Local::now().date_naive());
    println!("agent-model\ttotal\ttoday\tavg/day");
    for (key, usage) in ledger.all() {
        if let Some(agent) = &command.agent {
            if !key.starts_with(&format!("{agent}-")) {
                continue;
            }
        }
        if let Some(model) = &command.model {
            if !key.ends_with(&format!("-{model}")) {
                continue;
            }
        }
        let today_tokens = usage.days.get(&today).copied().unwrap_or(0);
        let average = usage.total / usage.days.len().max(1) as u64;
        println!("{key}\t{}\t{today_tokens}\t{average}", usage.total);
    }
    Ok(())
}

async fn print_usage_for(data_dir: &Path, agent: &str, model: &str) -> Result<()> {
    let ledger = UsageLedger::load(data_dir).await?;
    let Some(usage) = ledger.get(agent, model) else {
        return Ok(());
    };
    let today = date_to_day_name(Local::now().date_naive());
    println!(
        "Token usage today: {}",
        usage.days.get(&today).copied().unwrap_or(0)
    );
    println!("Total token usage: {}", usage.total);
    Ok(())
}

/// Turns Ctrl+C into loop cancellation. The in-flight cycle is allowed to
/// complete.
async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancellation.cancel();
        },
    };
}
