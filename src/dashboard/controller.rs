//! Dashboard controller: maps user actions onto backend calls.
//!
//! Every mutation is "call, then re-fetch": on success the affected list and
//! the summary are reloaded from the server. Failures are logged and dropped;
//! the view keeps showing the last successful fetch.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::forms::{GoalForm, NoteForm, TaskForm};
use super::state::{Tab, ViewState};
use crate::api::{
    AgentApi, ChatRequest, ChatTurn, ContentKind, Goal, GoalUpdate, Note, NoteUpdate, Task,
    TaskStatus, TaskUpdate, VoiceNoteUpload,
};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::voice::RecordedClip;

/// Thin controller over an [`AgentApi`] and the local [`ViewState`].
pub struct Dashboard {
    api: Arc<dyn AgentApi>,
    user_id: i64,
    conversation_limit: u32,
    state: RwLock<ViewState>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn AgentApi>, user_id: i64, conversation_limit: u32) -> Self {
        Self {
            api,
            user_id,
            conversation_limit,
            state: RwLock::new(ViewState::default()),
        }
    }

    pub fn from_config(api: Arc<dyn AgentApi>, config: &ClientConfig) -> Self {
        Self::new(api, config.user_id, config.conversation_limit)
    }

    /// Copy of the current view.
    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub async fn set_tab(&self, tab: Tab) {
        self.state.write().await.active_tab = tab;
    }

    // ── Loads ───────────────────────────────────────────────────────

    /// Initial load: all five reads, concurrently.
    pub async fn load_all(&self) {
        tokio::join!(
            self.load_dashboard(),
            self.load_tasks(),
            self.load_goals(),
            self.load_notes(),
            self.load_conversations(),
        );
    }

    pub async fn load_dashboard(&self) {
        if let Some(summary) = report("load dashboard", self.api.dashboard(self.user_id).await) {
            self.state.write().await.summary = summary;
        }
    }

    pub async fn load_tasks(&self) {
        if let Some(tasks) = report("load tasks", self.api.list_tasks(self.user_id).await) {
            debug!(count = tasks.len(), "Tasks loaded");
            self.state.write().await.tasks = tasks;
        }
    }

    pub async fn load_goals(&self) {
        if let Some(goals) = report("load goals", self.api.list_goals(self.user_id).await) {
            debug!(count = goals.len(), "Goals loaded");
            self.state.write().await.goals = goals;
        }
    }

    pub async fn load_notes(&self) {
        if let Some(notes) = report("load notes", self.api.list_notes(self.user_id).await) {
            debug!(count = notes.len(), "Notes loaded");
            self.state.write().await.notes = notes;
        }
    }

    /// Server returns newest first; the transcript is shown oldest first.
    pub async fn load_conversations(&self) {
        let result = self
            .api
            .list_conversations(self.user_id, self.conversation_limit)
            .await;
        if let Some(mut turns) = report("load conversations", result) {
            turns.reverse();
            self.state.write().await.chat = turns;
        }
    }

    async fn refresh_tasks(&self) {
        tokio::join!(self.load_tasks(), self.load_dashboard());
    }

    async fn refresh_goals(&self) {
        tokio::join!(self.load_goals(), self.load_dashboard());
    }

    async fn refresh_notes(&self) {
        tokio::join!(self.load_notes(), self.load_dashboard());
    }

    // ── Chat ────────────────────────────────────────────────────────

    /// Send a chat message and append the exchange to the transcript.
    pub async fn send_message(&self, message: &str) -> Option<ChatTurn> {
        if message.trim().is_empty() {
            return None;
        }

        self.state.write().await.loading = true;

        let request = ChatRequest {
            message: message.to_string(),
            user_id: self.user_id,
        };
        let result = self.api.send_chat(&request).await;

        let mut state = self.state.write().await;
        state.loading = false;
        let reply = report("send message", result)?;

        let turn = ChatTurn {
            id: reply.conversation_id,
            message: request.message,
            response: Some(reply.response),
            message_type: Some(ContentKind::Text),
            created_at: Some(Utc::now().naive_utc()),
            user_id: Some(self.user_id),
        };
        state.chat.push(turn.clone());
        Some(turn)
    }

    // ── Tasks ───────────────────────────────────────────────────────

    pub async fn create_task(&self, form: TaskForm) -> Option<Task> {
        let Some(request) = form.into_request(self.user_id) else {
            debug!("Ignoring task form without a title");
            return None;
        };
        let task = report("create task", self.api.create_task(&request).await)?;
        info!(task_id = task.id, "Task created");
        self.refresh_tasks().await;
        Some(task)
    }

    pub async fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Option<Task> {
        let update = TaskUpdate::status(status);
        let task = report("update task", self.api.update_task(task_id, &update).await)?;
        info!(task_id, status = status.as_str(), "Task updated");
        self.refresh_tasks().await;
        Some(task)
    }

    pub async fn complete_task(&self, task_id: i64) -> Option<Task> {
        self.update_task_status(task_id, TaskStatus::Completed).await
    }

    pub async fn delete_task(&self, task_id: i64) -> bool {
        if report("delete task", self.api.delete_task(task_id).await).is_none() {
            return false;
        }
        info!(task_id, "Task deleted");
        self.refresh_tasks().await;
        true
    }

    // ── Goals ───────────────────────────────────────────────────────

    pub async fn create_goal(&self, form: GoalForm) -> Option<Goal> {
        let Some(request) = form.into_request(self.user_id) else {
            debug!("Ignoring goal form without a title");
            return None;
        };
        let goal = report("create goal", self.api.create_goal(&request).await)?;
        info!(goal_id = goal.id, "Goal created");
        self.refresh_goals().await;
        Some(goal)
    }

    /// Progress outside 0..=100 is ignored without a request.
    pub async fn update_goal_progress(&self, goal_id: i64, progress: u8) -> Option<Goal> {
        if progress > 100 {
            debug!(goal_id, progress, "Ignoring out-of-range goal progress");
            return None;
        }
        let update = GoalUpdate::progress(progress);
        let goal = report("update goal", self.api.update_goal(goal_id, &update).await)?;
        info!(goal_id, progress, "Goal progress updated");
        self.refresh_goals().await;
        Some(goal)
    }

    pub async fn delete_goal(&self, goal_id: i64) -> bool {
        if report("delete goal", self.api.delete_goal(goal_id).await).is_none() {
            return false;
        }
        info!(goal_id, "Goal deleted");
        self.refresh_goals().await;
        true
    }

    // ── Notes ───────────────────────────────────────────────────────

    pub async fn create_note(&self, form: NoteForm) -> Option<Note> {
        let Some(request) = form.into_request(self.user_id) else {
            debug!("Ignoring empty note form");
            return None;
        };
        let note = report("create note", self.api.create_note(&request).await)?;
        info!(note_id = note.id, "Note created");
        self.refresh_notes().await;
        Some(note)
    }

    pub async fn update_note(&self, note_id: i64, update: NoteUpdate) -> Option<Note> {
        let note = report("update note", self.api.update_note(note_id, &update).await)?;
        info!(note_id, "Note updated");
        self.refresh_notes().await;
        Some(note)
    }

    pub async fn delete_note(&self, note_id: i64) -> bool {
        if report("delete note", self.api.delete_note(note_id).await).is_none() {
            return false;
        }
        info!(note_id, "Note deleted");
        self.refresh_notes().await;
        true
    }

    /// Upload a finished recording as a voice note.
    pub async fn upload_voice_note(&self, clip: RecordedClip) -> Option<Note> {
        let upload = VoiceNoteUpload {
            audio: clip.bytes,
            file_name: clip.file_name,
            user_id: self.user_id,
            title: voice_note_title(&Local::now()),
        };
        let note = report("upload voice note", self.api.upload_voice_note(upload).await)?;
        info!(note_id = note.id, "Voice note uploaded");
        self.refresh_notes().await;
        Some(note)
    }
}

/// Title given to voice notes, e.g. `Voice Note 3/7/2025, 9:05:12 AM`.
pub fn voice_note_title<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Voice Note {}", at.format("%-m/%-d/%Y, %-I:%M:%S %p"))
}

fn report<T>(action: &'static str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(action, error = %e, "API call failed");
            None
        }
    }
}
