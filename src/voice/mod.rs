//! Voice note capture.
//!
//! A [`VoiceRecorder`] drives an [`AudioSource`] through an idle/recording
//! cycle and hands back a WAV clip ready for upload. The device is held only
//! between `start` and `stop`.

pub mod file;
#[cfg(feature = "microphone")]
pub mod microphone;

pub use file::FileAudioSource;
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneSource;

use tracing::{debug, info, warn};

use crate::error::RecordingError;

/// File name the backend receives for every voice upload.
pub const VOICE_FILE_NAME: &str = "voice_note.wav";

/// Clips shorter than this are rejected before upload.
const MIN_CLIP_MILLIS: u64 = 100;

/// A finished recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedClip {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl RecordedClip {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: VOICE_FILE_NAME.to_string(),
        }
    }

    /// Duration in milliseconds, when the clip carries a readable WAV header.
    pub fn duration_millis(&self) -> Option<u64> {
        wav_duration_millis(&self.bytes)
    }

    /// Reject clips the backend would refuse anyway.
    pub fn validate(&self) -> Result<(), RecordingError> {
        if self.bytes.is_empty() {
            return Err(RecordingError::InvalidClip {
                reason: "Audio file is empty".into(),
            });
        }
        match self.duration_millis() {
            Some(0) => Err(RecordingError::InvalidClip {
                reason: "Audio file has no content".into(),
            }),
            Some(ms) if ms < MIN_CLIP_MILLIS => Err(RecordingError::InvalidClip {
                reason: "Audio file is too short".into(),
            }),
            _ => Ok(()),
        }
    }
}

/// Something that can capture audio between `start` and `stop`.
pub trait AudioSource: Send {
    /// Acquire the device and begin capturing.
    fn start(&mut self) -> Result<(), RecordingError>;

    /// Stop capturing, release the device and return what was captured.
    fn stop(&mut self) -> Result<RecordedClip, RecordingError>;
}

/// Idle/recording state machine over an [`AudioSource`].
pub struct VoiceRecorder {
    source: Box<dyn AudioSource>,
    recording: bool,
}

impl VoiceRecorder {
    pub fn new(source: Box<dyn AudioSource>) -> Self {
        Self {
            source,
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Begin recording. Already recording is a no-op.
    pub fn start(&mut self) -> Result<(), RecordingError> {
        if self.recording {
            debug!("Recorder already running");
            return Ok(());
        }
        self.source.start().inspect_err(|e| {
            warn!(error = %e, "Failed to start recording");
        })?;
        self.recording = true;
        info!("Recording started");
        Ok(())
    }

    /// Stop recording. Returns `None` when nothing was being recorded.
    pub fn stop(&mut self) -> Result<Option<RecordedClip>, RecordingError> {
        if !self.recording {
            return Ok(None);
        }
        self.recording = false;
        let clip = self.source.stop()?;
        clip.validate()?;
        info!(bytes = clip.bytes.len(), "Recording stopped");
        Ok(Some(clip))
    }
}

/// Encode interleaved 16-bit PCM samples as a RIFF/WAVE file.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Walk the RIFF chunks for `fmt ` byte rate and `data` length.
fn wav_duration_millis(bytes: &[u8]) -> Option<u64> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return None;
    }

    let read_u32 = |at: usize| -> Option<u32> {
        bytes
            .get(at..at + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    };

    let mut byte_rate = None;
    let mut data_len = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(pos + 4)? as usize;
        match id {
            b"fmt " => byte_rate = read_u32(pos + 16),
            b"data" => data_len = Some(size.min(bytes.len() - pos - 8) as u64),
            _ => {}
        }
        // Chunks are word-aligned.
        pos += 8 + size + (size & 1);
    }

    match (byte_rate, data_len) {
        (Some(rate), Some(len)) if rate > 0 => Some(len * 1000 / u64::from(rate)),
        _ => None,
    }
}
