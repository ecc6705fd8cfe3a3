use std::path::Path;

use anyhow::{bail, Result};
use chrono::Local;
use chrono_english::{parse_date_string, Dialect};
use clap::Subcommand;

use crate::projects::{
    model::{Project, ProjectStatus, Task},
    store::ProjectStore,
    view::{parse_task_label, project_summary, task_label},
};

use super::journal::append_event_line;

const EVENT_KIND: &str = "project-task";

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    #[command(about = "List projects with their tasks and invested time")]
    List,
    #[command(about = "Create a new project")]
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    #[command(about = "Add a task to a project")]
    Task {
        #[arg(long)]
        project: String,
        #[arg(long)]
        text: String,
        #[arg(
            long,
            help = "Optional deadline. Examples are \"next friday\", \"15/03/2025\""
        )]
        deadline: Option<String>,
    },
    #[command(about = "Add focus cycles to a task")]
    Cycles {
        #[arg(long)]
        project: String,
        #[arg(long, help = "Task text, or its label with cycle suffix like \"Write report (4)\"")]
        task: String,
        #[arg(long)]
        add: u32,
    },
    #[command(about = "Mark a task, or a whole project, as complete")]
    Complete {
        #[arg(long)]
        project: String,
        #[arg(long)]
        task: Option<String>,
    },
}

pub async fn process_project_command(data_dir: &Path, command: ProjectCommand) -> Result<()> {
    let store = ProjectStore::new(data_dir);
    let mut projects = store.load().await?;

    match command {
        ProjectCommand::List => {
            print_projects(&projects);
            return Ok(());
        }
        ProjectCommand::Add { title, description } => {
            if title.is_empty() || projects.iter().any(|p| p.title == title) {
                bail!("Invalid title {title:?}: empty or already taken");
            }
            projects.push(Project::new(title.clone(), description));
            println!("Your new project {title:?} has been added");
            append_event_line(
                data_dir,
                EVENT_KIND,
                &format!("A new project '{title}' is created"),
            )
            .await?;
        }
        ProjectCommand::Task {
            project,
            text,
            deadline,
        } => {
            let deadline = deadline
                .map(|raw| {
                    parse_date_string(&raw, Local::now(), Dialect::Uk)
                        .map(|d| d.date_naive())
                        .map_err(|e| anyhow::anyhow!("Failed to parse deadline {raw:?}: {e}"))
                })
                .transpose()?;

            let Some(target) = projects.iter_mut().find(|p| p.title == project) else {
                bail!("No project titled {project:?}");
            };
            target.tasks.push(Task::new(text.clone(), deadline));
            append_event_line(
                data_dir,
                EVENT_KIND,
                &format!("A new task '{text}' is added to project '{project}'"),
            )
            .await?;
        }
        ProjectCommand::Cycles { project, task, add } => {
            let Some(target) = projects.iter_mut().find(|p| p.title == project) else {
                bail!("No project titled {project:?}");
            };
            // Labels may carry the rendered "(N)" suffix; identity is the
            // text (or id), never the suffix.
            let (text, _) = parse_task_label(&task);
            let Some(task) = target.find_task_mut(text) else {
                bail!("Task {text:?} not found in {project:?}");
            };
            task.cycles += add;
            println!("Cycles updated to {}", task.cycles);
            let text = task.text.clone();
            append_event_line(
                data_dir,
                EVENT_KIND,
                &format!("{add} focus cycle added for '{text}' for ['{project}']"),
            )
            .await?;
        }
        ProjectCommand::Complete { project, task } => {
            let Some(target) = projects.iter_mut().find(|p| p.title == project) else {
                bail!("No project titled {project:?}");
            };
            match task {
                Some(label) => {
                    let (text, _) = parse_task_label(&label);
                    let Some(task) = target.find_task_mut(text) else {
                        bail!("Task {text:?} not found in {project:?}");
                    };
                    task.status = ProjectStatus::Complete;
                    let text = task.text.clone();
                    append_event_line(
                        data_dir,
                        EVENT_KIND,
                        &format!("Task '{text}' of '{project}' is complete"),
                    )
                    .await?;
                }
                None => {
                    target.status = ProjectStatus::Complete;
                    append_event_line(
                        data_dir,
                        EVENT_KIND,
                        &format!("Project '{project}' is complete"),
                    )
                    .await?;
                }
            }
        }
    }

    store.save(&projects).await?;
    Ok(())
}

fn print_projects(projects: &[Project]) {
    println!("{}\n", project_summary(projects));
    for project in projects {
        println!("{} [{:?}]", project.title, project.status);
        for task in &project.tasks {
            match task.deadline {
                Some(deadline) => println!("  {} (due {deadline})", task_label(task)),
                None => println!("  {}", task_label(task)),
            }
        }
    }
}
