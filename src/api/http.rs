//! reqwest-backed implementation of [`AgentApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::AgentApi;
use super::model::*;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// MIME type of uploaded voice clips.
const VOICE_MIME: &str = "audio/wav";

/// HTTP client for the Master Agent REST backend.
pub struct HttpApi {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .timeout(self.timeout)
    }

    /// Send a request and reject non-2xx responses.
    async fn dispatch(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        debug!(endpoint, "API request");

        let resp = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "API request failed");
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), "API returned error status");
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self.dispatch(endpoint, request).await?;
        let bytes = resp.bytes().await.map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(endpoint, error = %e, "API response did not decode");
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })
    }

    async fn fetch_empty(&self, endpoint: &str, request: RequestBuilder) -> Result<(), ApiError> {
        self.dispatch(endpoint, request).await.map(|_| ())
    }
}

#[async_trait]
impl AgentApi for HttpApi {
    async fn dashboard(&self, user_id: i64) -> Result<DashboardSummary, ApiError> {
        let req = self
            .request(Method::GET, "/dashboard")
            .query(&[("user_id", user_id)]);
        self.fetch("GET /dashboard", req).await
    }

    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, ApiError> {
        let req = self
            .request(Method::GET, "/tasks")
            .query(&[("user_id", user_id)]);
        self.fetch("GET /tasks", req).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let req = self.request(Method::POST, "/tasks").json(task);
        self.fetch("POST /tasks", req).await
    }

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Task, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/tasks/{id}"))
            .json(update);
        self.fetch("PUT /tasks/{id}", req).await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &format!("/tasks/{id}"));
        self.fetch_empty("DELETE /tasks/{id}", req).await
    }

    async fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>, ApiError> {
        let req = self
            .request(Method::GET, "/goals")
            .query(&[("user_id", user_id)]);
        self.fetch("GET /goals", req).await
    }

    async fn create_goal(&self, goal: &NewGoal) -> Result<Goal, ApiError> {
        let req = self.request(Method::POST, "/goals").json(goal);
        self.fetch("POST /goals", req).await
    }

    async fn update_goal(&self, id: i64, update: &GoalUpdate) -> Result<Goal, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/goals/{id}"))
            .json(update);
        self.fetch("PUT /goals/{id}", req).await
    }

    async fn delete_goal(&self, id: i64) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &format!("/goals/{id}"));
        self.fetch_empty("DELETE /goals/{id}", req).await
    }

    async fn list_notes(&self, user_id: i64) -> Result<Vec<Note>, ApiError> {
        let req = self
            .request(Method::GET, "/notes")
            .query(&[("user_id", user_id)]);
        self.fetch("GET /notes", req).await
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError> {
        let req = self.request(Method::POST, "/notes").json(note);
        self.fetch("POST /notes", req).await
    }

    async fn update_note(&self, id: i64, update: &NoteUpdate) -> Result<Note, ApiError> {
        let req = self
            .request(Method::PUT, &format!("/notes/{id}"))
            .json(update);
        self.fetch("PUT /notes/{id}", req).await
    }

    async fn delete_note(&self, id: i64) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &format!("/notes/{id}"));
        self.fetch_empty("DELETE /notes/{id}", req).await
    }

    async fn upload_voice_note(&self, upload: VoiceNoteUpload) -> Result<Note, ApiError> {
        let endpoint = "POST /notes/voice";
        let size = upload.audio.len();

        let part = Part::bytes(upload.audio)
            .file_name(upload.file_name)
            .mime_str(VOICE_MIME)
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let form = Form::new()
            .part("audio", part)
            .text("user_id", upload.user_id.to_string())
            .text("title", upload.title);

        debug!(bytes = size, "Uploading voice note");
        let req = self.request(Method::POST, "/notes/voice").multipart(form);
        self.fetch(endpoint, req).await
    }

    async fn list_conversations(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<ChatTurn>, ApiError> {
        let req = self
            .request(Method::GET, "/conversations")
            .query(&[("user_id", user_id.to_string()), ("limit", limit.to_string())]);
        self.fetch("GET /conversations", req).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let req = self.request(Method::POST, "/chat").json(request);
        self.fetch("POST /chat", req).await
    }
}
