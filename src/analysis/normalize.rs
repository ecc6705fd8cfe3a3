use serde::{Deserialize, Serialize};
use tracing::warn;

use super::record::{AnalysisRecord, AnalysisStatus};

/// How a model's raw output is turned into an [AnalysisRecord]. Resolved
/// once per configuration, not re-detected per response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseFormat {
    /// Extract every ```json fenced block, concatenate and parse as JSON.
    #[default]
    FencedJson,
    /// Legacy-compatible line scan for a quoted `Status:` value. Tolerates
    /// free-text responses at the cost of discarding structured detail.
    StatusLine,
}

/// Converts a raw model response into a record. Never fails: a response
/// that cannot be understood produces an `Unclear` or `Error` record so that
/// every analysis cycle yields a loggable artifact.
pub fn normalize(raw: &str, format: ResponseFormat) -> AnalysisRecord {
    match format {
        ResponseFormat::FencedJson => normalize_fenced(raw),
        ResponseFormat::StatusLine => normalize_status_line(raw),
    }
}

fn normalize_fenced(raw: &str) -> AnalysisRecord {
    let Some(extracted) = extract_fenced_json(raw) else {
        return AnalysisRecord::unclear(raw);
    };

    match serde_json::from_str::<AnalysisRecord>(&extracted) {
        Ok(mut record) => {
            record.raw_response = Some(raw.to_string());
            record.clamped()
        }
        Err(e) => {
            warn!("Fenced block did not parse as an analysis record: {e}");
            AnalysisRecord::failure(raw, e)
        }
    }
}

fn normalize_status_line(raw: &str) -> AnalysisRecord {
    for line in raw.lines() {
        let Some(rest) = line.split_once("Status:").map(|(_, rest)| rest) else {
            continue;
        };
        let Some(value) = extract_quoted(rest) else {
            continue;
        };
        let status = value.parse().unwrap_or(AnalysisStatus::Unclear);
        return AnalysisRecord {
            status,
            raw_response: Some(raw.to_string()),
            ..AnalysisRecord::default()
        };
    }
    AnalysisRecord::unclear(raw)
}

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Collects the contents of every ```json fenced block, concatenated.
/// Returns None when no complete fence exists.
fn extract_fenced_json(raw: &str) -> Option<String> {
    let mut rest = raw;
    let mut collected = String::new();
    let mut found = false;

    while let Some(start) = rest.find(FENCE_OPEN) {
        let after = &rest[start + FENCE_OPEN.len()..];
        let Some(end) = after.find(FENCE_CLOSE) else {
            break;
        };
        collected.push_str(after[..end].trim());
        found = true;
        rest = &after[end + FENCE_CLOSE.len()..];
    }

    found.then_some(collected)
}

fn extract_quoted(text: &str) -> Option<&str> {
    let open = text.find('"')?;
    let rest = &text[open + 1..];
    let close = rest.find('"')?;
    Some(&rest[..close])
}
