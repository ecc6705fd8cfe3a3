pub mod analyze;
pub mod journal;
pub mod project;
pub mod review;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::utils::{dir::create_application_default_path, logging::enable_logging};

use self::{
    analyze::{process_analyze_command, process_usage_command, AnalyzeCommand, UsageCommand},
    journal::{
        process_decision_command, process_log_command, process_mood_command, DecisionCommand,
        LogCommand, MoodCommand,
    },
    project::{process_project_command, ProjectCommand},
    review::{
        process_logreview_command, process_review_command, LogReviewCommand, ReviewCommand,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Daybook", version, long_about = None)]
#[command(about = "Personal journal, project tracker and screen activity review", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add a journal entry")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Record a mood journal entry")]
    Mood {
        #[command(flatten)]
        command: MoodCommand,
    },
    #[command(about = "Record a decision journal entry")]
    Decision {
        #[command(flatten)]
        command: DecisionCommand,
    },
    #[command(about = "Summarize journal entries over a timespan")]
    Review {
        #[command(flatten)]
        command: ReviewCommand,
    },
    #[command(about = "Review stored screen analyses, or search the journal")]
    Logreview {
        #[command(flatten)]
        command: LogReviewCommand,
    },
    #[command(about = "Manage projects and tasks")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Periodically capture and analyze screen activity")]
    Analyze {
        #[command(flatten)]
        command: AnalyzeCommand,
    },
    #[command(about = "Show token usage per agent and model")]
    Usage {
        #[command(flatten)]
        command: UsageCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let data_dir = create_application_default_path()?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&data_dir, logging_level, args.log)?;

    match args.commands {
        Commands::Log { command } => process_log_command(&data_dir, command).await,
        Commands::Mood { command } => process_mood_command(&data_dir, command).await,
        Commands::Decision { command } => process_decision_command(&data_dir, command).await,
        Commands::Review { command } => process_review_command(&data_dir, command).await,
        Commands::Logreview { command } => process_logreview_command(&data_dir, command).await,
        Commands::Project { command } => process_project_command(&data_dir, command).await,
        Commands::Analyze { command } => process_analyze_command(&data_dir, command).await,
        Commands::Usage { command } => process_usage_command(&data_dir, command).await,
    }
}
