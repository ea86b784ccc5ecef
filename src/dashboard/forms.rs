//! Form drafts and their validation into request bodies.

use chrono::NaiveDate;

use crate::api::{NewGoal, NewNote, NewTask, Priority};

/// Draft for a new task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl TaskForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// `None` when the title is blank.
    pub fn into_request(self, user_id: i64) -> Option<NewTask> {
        if self.title.trim().is_empty() {
            return None;
        }
        Some(NewTask {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            user_id,
        })
    }
}

/// Draft for a new goal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalForm {
    pub title: String,
    pub description: String,
    pub target_date: Option<NaiveDate>,
    pub progress: u8,
}

impl GoalForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// `None` when the title is blank.
    pub fn into_request(self, user_id: i64) -> Option<NewGoal> {
        if self.title.trim().is_empty() {
            return None;
        }
        Some(NewGoal {
            title: self.title,
            description: self.description,
            target_date: self.target_date,
            progress: self.progress.min(100),
            user_id,
        })
    }
}

/// Draft for a new text note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NoteForm {
    /// `None` when both title and content are blank.
    pub fn into_request(self, user_id: i64) -> Option<NewNote> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return None;
        }
        Some(NewNote {
            title: self.title,
            content: self.content,
            tags: self.tags,
            user_id,
        })
    }
}

/// Parse a goal progress entry; only whole numbers in 0..=100 are accepted.
pub fn parse_progress(input: &str) -> Option<u8> {
    let value: i64 = input.trim().parse().ok()?;
    (0..=100).contains(&value).then_some(value as u8)
}

/// Parse a `YYYY-MM-DD` date field; blank means unset.
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map(Some)
}

/// Split a comma-separated tag list, dropping empty entries.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
