//! Error types for the Master Agent client.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Backend call failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl ApiError {
    /// HTTP status of the failed call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Voice capture errors.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Invalid audio clip: {reason}")]
    InvalidClip { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordingError {
    /// Text shown to the user when recording cannot start.
    pub fn alert_message(&self) -> &'static str {
        "Failed to access microphone. Please check permissions."
    }

    /// Text shown to the user when a finished recording is thrown away.
    pub fn discard_message(&self) -> String {
        match self {
            Self::InvalidClip { reason } => format!("Voice note not saved: {reason}"),
            other => format!("Voice note not saved: {other}"),
        }
    }
}
