//! REST backend access.
//!
//! [`AgentApi`] is the seam between the dashboard controller and the
//! transport: [`HttpApi`] talks to the real backend, tests plug in stubs.

pub mod http;
pub mod model;

pub use http::HttpApi;
pub use model::*;

use async_trait::async_trait;

use crate::error::ApiError;

/// One method per backend endpoint.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// `GET /dashboard?user_id=`
    async fn dashboard(&self, user_id: i64) -> Result<DashboardSummary, ApiError>;

    // ── Tasks ───────────────────────────────────────────────────────

    /// `GET /tasks?user_id=`
    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, ApiError>;

    /// `POST /tasks`
    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError>;

    /// `PUT /tasks/{id}`
    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Task, ApiError>;

    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, id: i64) -> Result<(), ApiError>;

    // ── Goals ───────────────────────────────────────────────────────

    /// `GET /goals?user_id=`
    async fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>, ApiError>;

    /// `POST /goals`
    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, ApiError>;

    /// `PUT /goals/{id}`
    async fn update_goal(&self, id: i64, update: &GoalUpdate) -> Result<Goal, ApiError>;

    /// `DELETE /goals/{id}`
    async fn delete_goal(&self, id: i64) -> Result<(), ApiError>;

    // ── Notes ───────────────────────────────────────────────────────

    /// `GET /notes?user_id=`
    async fn list_notes(&self, user_id: i64) -> Result<Vec<Note>, ApiError>;

    /// `POST /notes`
    async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError>;

    /// `PUT /notes/{id}`
    async fn update_note(&self, id: i64, update: &NoteUpdate) -> Result<Note, ApiError>;

    /// `DELETE /notes/{id}`
    async fn delete_note(&self, id: i64) -> Result<(), ApiError>;

    /// `POST /notes/voice` (multipart)
    async fn upload_voice_note(&self, upload: VoiceNoteUpload) -> Result<Note, ApiError>;

    // ── Chat ────────────────────────────────────────────────────────

    /// `GET /conversations?user_id=&limit=`, newest first.
    async fn list_conversations(&self, user_id: i64, limit: u32)
    -> Result<Vec<ChatTurn>, ApiError>;

    /// `POST /chat`
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
}
