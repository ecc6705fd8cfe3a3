use super::model::{Project, ProjectStatus, Task, CYCLE_MINUTES};

/// Display label for a task, embedding the cycle count when present:
/// `Write report (4)`. Purely derived; never the source of truth.
pub fn task_label(task: &Task) -> String {
    if task.cycles > 0 {
        format!("{} ({})", task.text, task.cycles)
    } else {
        task.text.clone()
    }
}

/// Splits a display label back into its text and cycle count. Accepts both
/// bare task text and the `text (N)` form, for compatibility with files and
/// flags that carry the rendered label.
pub fn parse_task_label(label: &str) -> (&str, u32) {
    let trimmed = label.trim();
    let Some(rest) = trimmed.strip_suffix(')') else {
        return (trimmed, 0);
    };
    let Some(open) = rest.rfind('(') else {
        return (trimmed, 0);
    };
    match rest[open + 1..].parse::<u32>() {
        Ok(cycles) => (rest[..open].trim_end(), cycles),
        Err(_) => (trimmed, 0),
    }
}

/// Renders a total minute count as "H hours and M minutes".
pub fn format_minutes(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours == 0 {
        return format!("{minutes} minutes");
    }
    let plural = if hours == 1 { "" } else { "s" };
    if minutes > 0 {
        format!("{hours} hour{plural} and {minutes} minutes")
    } else {
        format!("{hours} hour{plural}")
    }
}

fn is_active(status: ProjectStatus) -> bool {
    status == ProjectStatus::Progress
}

/// Minutes invested across all tasks of active projects.
pub fn active_minutes(projects: &[Project]) -> u32 {
    projects
        .iter()
        .filter(|p| is_active(p.status))
        .flat_map(|p| &p.tasks)
        .map(|t| t.cycles * CYCLE_MINUTES)
        .sum()
}

/// One-paragraph overview of active work, used as the header of the model
/// prompt and by the project listing.
pub fn project_summary(projects: &[Project]) -> String {
    let active: Vec<_> = projects.iter().filter(|p| is_active(p.status)).collect();
    let total_tasks: usize = active.iter().map(|p| p.tasks.len()).sum();

    format!(
        "You have {} active projects with {} tasks in progress.\nTotal time invested: {}",
        active.len(),
        total_tasks,
        format_minutes(active_minutes(projects))
    )
}

/// Detailed listing of active projects and their in-progress tasks, rendered
/// as context for the analysis model.
pub fn format_projects_for_context(projects: &[Project]) -> String {
    projects
        .iter()
        .filter(|p| is_active(p.status))
        .map(|project| {
            let tasks = project
                .tasks
                .iter()
                .filter(|t| is_active(t.status))
                .map(|task| {
                    let mut entry = format!(
                        "  * {}\n    - Time spent: {}",
                        task.text,
                        format_minutes(task.cycles * CYCLE_MINUTES)
                    );
                    if let Some(deadline) = task.deadline {
                        entry.push_str(&format!("\n    - Deadline: {deadline}"));
                    }
                    entry
                })
                .collect::<Vec<_>>()
                .join("\n");

            let description = if project.description.is_empty() {
                String::new()
            } else {
                format!("\n  Description: {}", project.description)
            };

            format!("Project: {}{}\n{}", project.title, description, tasks)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::projects::model::{Project, ProjectStatus, Task};

    use super::{
        active_minutes, format_minutes, format_projects_for_context, parse_task_label,
        project_summary, task_label,
    };

    fn sample() -> Vec<Project> {
        let mut thesis = Project::new("Thesis", "Write it up");
        let mut report = Task::new("Write report", None);
        report.cycles = 4;
        thesis.tasks.push(report);

        let mut done = Project::new("Old site", "");
        done.status = ProjectStatus::Complete;
        let mut stale = Task::new("Forgotten", None);
        stale.cycles = 99;
        done.tasks.push(stale);

        vec![thesis, done]
    }

    #[test]
    fn label_round_trips_through_parse() {
        let mut task = Task::new("Write report", None);
        task.cycles = 4;
        let label = task_label(&task);
        assert_eq!(label, "Write report (4)");
        assert_eq!(parse_task_label(&label), ("Write report", 4));
    }

    #[test]
    fn label_without_cycles_is_bare_text() {
        let task = Task::new("Write report", None);
        assert_eq!(task_label(&task), "Write report");
        assert_eq!(parse_task_label("Write report"), ("Write report", 0));
    }

    #[test]
    fn parse_ignores_non_numeric_parentheses() {
        assert_eq!(parse_task_label("Fix bug (urgent)"), ("Fix bug (urgent)", 0));
    }

    #[test]
    fn parse_uses_trailing_group_only() {
        assert_eq!(parse_task_label("Step (1) cleanup (3)"), ("Step (1) cleanup", 3));
    }

    #[test]
    fn minutes_render_like_prose() {
        assert_eq!(format_minutes(25), "25 minutes");
        assert_eq!(format_minutes(60), "1 hour");
        assert_eq!(format_minutes(150), "2 hours and 30 minutes");
    }

    #[test]
    fn active_minutes_skip_complete_projects() {
        // 4 cycles at 30 minutes each; the completed project is excluded.
        assert_eq!(active_minutes(&sample()), 120);
    }

    #[test]
    fn summary_counts_active_work() {
        let summary = project_summary(&sample());
        assert!(summary.contains("1 active projects with 1 tasks"));
        assert!(summary.contains("2 hours"));
    }

    #[test]
    fn context_lists_tasks_and_deadlines() {
        let mut projects = sample();
        projects[0].tasks[0].deadline = NaiveDate::from_ymd_opt(2025, 3, 1);

        let context = format_projects_for_context(&projects);
        assert!(context.contains("Project: Thesis"));
        assert!(context.contains("Description: Write it up"));
        assert!(context.contains("* Write report"));
        assert!(context.contains("Time spent: 2 hours"));
        assert!(context.contains("Deadline: 2025-03-01"));
        assert!(!context.contains("Old site"));
    }
}
