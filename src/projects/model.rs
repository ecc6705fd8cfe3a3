use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// One work cycle counts as this many minutes when deriving invested time.
pub const CYCLE_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Progress,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable lookup key. Legacy files without ids fall back to matching on
    /// `text`.
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub cycles: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<chrono::NaiveDate>,
}

impl Task {
    pub fn new(text: impl Into<String>, deadline: Option<chrono::NaiveDate>) -> Self {
        Self {
            id: new_task_id(),
            text: text.into(),
            status: ProjectStatus::Progress,
            cycles: 0,
            deadline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: ProjectStatus::Progress,
            tasks: vec![],
        }
    }

    /// Finds a task by stable id first, then by its text.
    pub fn find_task_mut(&mut self, id_or_text: &str) -> Option<&mut Task> {
        if let Some(index) = self
            .tasks
            .iter()
            .position(|t| !t.id.is_empty() && t.id == id_or_text)
        {
            return self.tasks.get_mut(index);
        }
        self.tasks.iter_mut().find(|t| t.text == id_or_text)
    }
}

pub fn new_task_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
