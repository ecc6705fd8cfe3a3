use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Outcome classification of one screen-activity analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisStatus {
    #[serde(rename = "On Task")]
    OnTask,
    #[serde(rename = "Off Task")]
    OffTask,
    #[serde(rename = "Mixed Activity")]
    MixedActivity,
    #[default]
    Unclear,
    Unresolved,
    Error,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::OnTask => "On Task",
            AnalysisStatus::OffTask => "Off Task",
            AnalysisStatus::MixedActivity => "Mixed Activity",
            AnalysisStatus::Unclear => "Unclear",
            AnalysisStatus::Unresolved => "Unresolved",
            AnalysisStatus::Error => "Error",
        }
    }
}

impl Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "On Task" => Ok(AnalysisStatus::OnTask),
            "Off Task" => Ok(AnalysisStatus::OffTask),
            "Mixed Activity" => Ok(AnalysisStatus::MixedActivity),
            "Unclear" => Ok(AnalysisStatus::Unclear),
            "Unresolved" => Ok(AnalysisStatus::Unresolved),
            "Error" => Ok(AnalysisStatus::Error),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnTaskEntry {
    pub project: String,
    pub task: String,
    /// Confidence percentage, clamped to [0, 100].
    pub confidence: f64,
    /// Free text, e.g. "15 minutes" or "likely continuous".
    pub estimated_time_spent: String,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OffTaskEntry {
    pub activity: String,
    pub details: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnresolvedEntry {
    pub observation: String,
    pub potential_project: String,
    pub possible_issue: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisDetail {
    pub on_task: Vec<OnTaskEntry>,
    pub off_task: Vec<OffTaskEntry>,
    pub unresolved: Vec<UnresolvedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralObservations {
    pub elements: Vec<String>,
    pub habits: String,
    pub potential_distractions: Vec<String>,
    pub suggestions: Vec<String>,
    pub flags: Vec<String>,
}

/// One screen-activity analysis as persisted in the daily analysis files.
/// Array fields always deserialize to empty vectors rather than null, and
/// missing sections fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRecord {
    pub status: AnalysisStatus,
    pub summary: String,
    pub analysis: AnalysisDetail,
    pub general_observations: GeneralObservations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl AnalysisRecord {
    /// Record produced when a response carried nothing recognizable.
    pub fn unclear(raw: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::Unclear,
            raw_response: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Record produced when normalization failed outright. Failures become a
    /// loggable artifact instead of an error for the caller.
    pub fn failure(raw: impl Into<String>, reason: impl Display) -> Self {
        Self {
            status: AnalysisStatus::Error,
            summary: format!("Normalization failed: {reason}"),
            raw_response: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Clamps every confidence value into [0, 100].
    pub fn clamped(mut self) -> Self {
        for entry in &mut self.analysis.on_task {
            entry.confidence = entry.confidence.clamp(0.0, 100.0);
        }
        self
    }
}
