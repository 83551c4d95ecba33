use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use super::Resource;

const TITLE_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Todo,
    Doing,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::Doing => "DOING",
            Status::Done => "DONE",
        }
    }
}

/// A stored task. `task_id` is assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
}

/// Payload for creating or replacing a task. It has no `task_id`, so a
/// creation request can never carry one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }
}

impl Task {
    /// The task's fields without its identifier.
    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            priority: self.priority,
            status: self.status,
        }
    }
}

impl Resource for Task {
    type Draft = TaskDraft;

    const COLLECTION: &'static str = "tasks";
    const NOUN: &'static str = "task";
    const LABEL: &'static str = "Task";
    const ID_FIELD: &'static str = "task_id";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "priority", "status"];

    fn id(&self) -> &str {
        &self.task_id
    }

    fn from_draft(id: String, draft: TaskDraft) -> Self {
        Task {
            task_id: id,
            title: draft.title,
            description: draft.description,
            start_time: draft.start_time,
            end_time: draft.end_time,
            priority: draft.priority,
            status: draft.status,
        }
    }

    fn validate(draft: &TaskDraft) -> Result<(), ValidationError> {
        if draft.title.trim().is_empty() {
            return Err(ValidationError::new("Title is required"));
        }
        if draft.title.chars().count() > TITLE_MAX_CHARS {
            return Err(ValidationError::new(format!(
                "Title must be at most {} characters",
                TITLE_MAX_CHARS
            )));
        }
        if let Some(description) = &draft.description {
            if description.chars().count() > DESCRIPTION_MAX_CHARS {
                return Err(ValidationError::new(format!(
                    "Description must be at most {} characters",
                    DESCRIPTION_MAX_CHARS
                )));
            }
        }
        Ok(())
    }

    fn search_values(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.priority.as_str()),
            Cow::Borrowed(self.status.as_str()),
        ]
    }

    // Latest start first, unscheduled tasks last; ties by wire name.
    fn ordering(a: &Self, b: &Self) -> Ordering {
        b.start_time
            .cmp(&a.start_time)
            .then_with(|| a.priority.as_str().cmp(b.priority.as_str()))
            .then_with(|| a.status.as_str().cmp(b.status.as_str()))
    }
}
