//! Audio source that replays a clip from disk.

use std::path::PathBuf;

use tracing::debug;

use super::{AudioSource, RecordedClip};
use crate::error::RecordingError;

/// Treats a WAV file as the "microphone": `start` checks it can be opened,
/// `stop` reads it.
pub struct FileAudioSource {
    path: PathBuf,
    started: bool,
}

impl FileAudioSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: false,
        }
    }
}

impl AudioSource for FileAudioSource {
    fn start(&mut self) -> Result<(), RecordingError> {
        let meta = std::fs::metadata(&self.path).map_err(|e| {
            RecordingError::Device(format!("{}: {e}", self.path.display()))
        })?;
        if !meta.is_file() {
            return Err(RecordingError::Device(format!(
                "{} is not a file",
                self.path.display()
            )));
        }
        debug!(path = %self.path.display(), "File audio source opened");
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<RecordedClip, RecordingError> {
        if !self.started {
            return Err(RecordingError::Device("source was never started".into()));
        }
        self.started = false;
        let bytes = std::fs::read(&self.path)?;
        Ok(RecordedClip::wav(bytes))
    }
}
