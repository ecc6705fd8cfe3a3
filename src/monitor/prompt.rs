use crate::{
    analysis::normalize::ResponseFormat,
    projects::{
        model::Project,
        view::{format_projects_for_context, project_summary},
    },
};

/// Builds the system prompt for one analysis cycle from the active project
/// context and the configured response format.
pub fn build_analysis_prompt(projects: &[Project], format: ResponseFormat) -> String {
    let format_instruction = match format {
        ResponseFormat::FencedJson => {
            "Reply with a single ```json fenced block containing an object with \
             keys: status, summary, analysis {onTask, offTask, unresolved} and \
             generalObservations."
        }
        ResponseFormat::StatusLine => {
            "Include a line of the form Status: \"<value>\" in your reply."
        }
    };

    format!(
        "You are a task monitoring assistant. I will send you a screenshot of my \
         screen, and you need to analyze if I'm working on any of my active \
         projects or tasks.\n\n\
         {summary}\n\n\
         For each analysis, provide:\n\
         1. Status: one of \"On Task\", \"Off Task\", \"Mixed Activity\", \
         \"Unclear\", \"Unresolved\"\n\
         2. If on task: which project and task, a confidence level (0-100) and \
         the estimated time spent\n\
         3. If off task: what I'm doing instead and a suggestion for getting \
         back on track\n\
         4. If unresolved: what you're seeing that's unusual, and any potential \
         issues or opportunities\n\
         5. General observations: patterns in my work habits, suggestions for \
         improvement, potential distractions\n\n\
         Current active projects and tasks:\n\
         {projects}\n\n\
         {format_instruction}",
        summary = project_summary(projects),
        projects = format_projects_for_context(projects),
    )
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::normalize::ResponseFormat,
        projects::model::{Project, Task},
    };

    use super::build_analysis_prompt;

    #[test]
    fn prompt_carries_project_context() {
        let mut project = Project::new("Thesis", "");
        project.tasks.push(Task::new("Write report", None));

        let prompt = build_analysis_prompt(&[project], ResponseFormat::FencedJson);
        assert!(prompt.contains("Project: Thesis"));
        assert!(prompt.contains("Write report"));
        assert!(prompt.contains("```json"));
    }

    #[test]
    fn status_line_format_asks_for_status_marker() {
        let prompt = build_analysis_prompt(&[], ResponseFormat::StatusLine);
        assert!(prompt.contains("Status: \"<value>\""));
        assert!(!prompt.contains("```json"));
    }
}
