use super::record::AnalysisRecord;

/// Renders one stored record as a human-readable review block, matching the
/// shape used by the `logreview` command.
pub fn render_record(timestamp: &str, record: &AnalysisRecord) -> String {
    let on_task = if record.analysis.on_task.is_empty() {
        "None detected.".to_string()
    } else {
        record
            .analysis
            .on_task
            .iter()
            .map(|t| format!("- {} ({}% confidence)", t.task, t.confidence as i64))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let off_task = if record.analysis.off_task.is_empty() {
        "None detected.".to_string()
    } else {
        record
            .analysis
            .off_task
            .iter()
            .map(|t| format!("- {}: {}", t.activity, t.suggestion))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let unresolved = if record.analysis.unresolved.is_empty() {
        "No unresolved issues noted.".to_string()
    } else {
        record
            .analysis
            .unresolved
            .iter()
            .map(|i| format!("- {}: {}", i.observation, i.possible_issue))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let distractions = if record.general_observations.potential_distractions.is_empty() {
        "None".to_string()
    } else {
        record.general_observations.potential_distractions.join(", ")
    };

    format!(
        "**{timestamp}** [{status}]\n\n\
         **Summary:** {summary}\n\n\
         **On-Task Focus:**\n{on_task}\n\n\
         **Off-Task Moments:**\n{off_task}\n\n\
         **Unresolved Issues:**\n{unresolved}\n\n\
         **Potential Distractions:** {distractions}",
        status = record.status,
        summary = record.summary,
    )
}

/// Renders a whole daily file, records separated by a rule.
pub fn render_file(entries: &[(String, AnalysisRecord)]) -> String {
    entries
        .iter()
        .map(|(timestamp, record)| render_record(timestamp, record))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use crate::analysis::record::{
        AnalysisRecord, AnalysisStatus, OffTaskEntry, OnTaskEntry,
    };

    use super::{render_file, render_record};

    #[test]
    fn render_includes_sections_and_fallbacks() {
        let record = AnalysisRecord {
            status: AnalysisStatus::OnTask,
            summary: "Deep in the editor".to_string(),
            ..AnalysisRecord::default()
        };

        let rendered = render_record("2025-01-01T10:00:00Z", &record);
        assert!(rendered.contains("[On Task]"));
        assert!(rendered.contains("**Summary:** Deep in the editor"));
        assert!(rendered.contains("None detected."));
        assert!(rendered.contains("No unresolved issues noted."));
        assert!(rendered.contains("**Potential Distractions:** None"));
    }

    #[test]
    fn render_lists_entries() {
        let mut record = AnalysisRecord::default();
        record.analysis.on_task.push(OnTaskEntry {
            task: "Write report".to_string(),
            confidence: 85.0,
            ..OnTaskEntry::default()
        });
        record.analysis.off_task.push(OffTaskEntry {
            activity: "Browsing".to_string(),
            suggestion: "Close the tab".to_string(),
            ..OffTaskEntry::default()
        });

        let rendered = render_record("t", &record);
        assert!(rendered.contains("- Write report (85% confidence)"));
        assert!(rendered.contains("- Browsing: Close the tab"));
    }

    #[test]
    fn file_rendering_separates_records() {
        let entries = vec![
            ("a".to_string(), AnalysisRecord::default()),
            ("b".to_string(), AnalysisRecord::default()),
        ];
        let rendered = render_file(&entries);
        assert_eq!(rendered.matches("\n\n---\n\n").count(), 1);
    }
}
