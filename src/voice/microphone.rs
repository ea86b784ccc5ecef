//! Live microphone capture via cpal (`microphone` feature).
//!
//! cpal streams are not `Send`, so each recording runs on its own thread
//! which owns the stream; dropping the stream on that thread releases the
//! input device.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use super::{AudioSource, RecordedClip, encode_wav};
use crate::error::RecordingError;

struct Captured {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

struct ActiveCapture {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<Result<Captured, RecordingError>>,
}

/// Records from the host's default input device.
#[derive(Default)]
pub struct MicrophoneSource {
    active: Option<ActiveCapture>,
}

impl MicrophoneSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSource for MicrophoneSource {
    fn start(&mut self) -> Result<(), RecordingError> {
        if self.active.is_some() {
            return Ok(());
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), RecordingError>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = std::thread::spawn(move || capture(ready_tx, stop_rx));

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.active = Some(ActiveCapture { stop_tx, handle });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(RecordingError::Device("capture thread exited".into()))
            }
        }
    }

    fn stop(&mut self) -> Result<RecordedClip, RecordingError> {
        let active = self
            .active
            .take()
            .ok_or_else(|| RecordingError::Device("microphone is not recording".into()))?;

        let _ = active.stop_tx.send(());
        let captured = active
            .handle
            .join()
            .map_err(|_| RecordingError::Device("capture thread panicked".into()))??;

        info!(
            samples = captured.samples.len(),
            sample_rate = captured.sample_rate,
            channels = captured.channels,
            "Microphone released"
        );
        Ok(RecordedClip::wav(encode_wav(
            &captured.samples,
            captured.sample_rate,
            captured.channels,
        )))
    }
}

fn capture(
    ready_tx: mpsc::Sender<Result<(), RecordingError>>,
    stop_rx: mpsc::Receiver<()>,
) -> Result<Captured, RecordingError> {
    let (stream, samples, sample_rate, channels) = match open_stream() {
        Ok(parts) => parts,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return Err(RecordingError::Device("input stream never opened".into()));
        }
    };

    let _ = ready_tx.send(Ok(()));
    // Either an explicit stop or the recorder being dropped ends the capture.
    let _ = stop_rx.recv();
    drop(stream);

    let samples = samples
        .lock()
        .map(|mut buf| std::mem::take(&mut *buf))
        .unwrap_or_default();

    Ok(Captured {
        samples,
        sample_rate,
        channels,
    })
}

type OpenedStream = (cpal::Stream, Arc<Mutex<Vec<i16>>>, u32, u16);

fn open_stream() -> Result<OpenedStream, RecordingError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(RecordingError::NoInputDevice)?;

    let supported = device
        .default_input_config()
        .map_err(|e| RecordingError::PermissionDenied(e.to_string()))?;
    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels();
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let samples = Arc::new(Mutex::new(Vec::<i16>::new()));
    let sink = Arc::clone(&samples);
    let on_error = |e: cpal::StreamError| warn!(error = %e, "Microphone stream error");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = sink.lock() {
                    buf.extend(
                        data.iter()
                            .map(|s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16),
                    );
                }
            },
            on_error,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = sink.lock() {
                    buf.extend_from_slice(data);
                }
            },
            on_error,
            None,
        ),
        other => {
            return Err(RecordingError::Device(format!(
                "unsupported sample format {other:?}"
            )));
        }
    }
    .map_err(|e| RecordingError::PermissionDenied(e.to_string()))?;

    stream
        .play()
        .map_err(|e| RecordingError::Device(e.to_string()))?;

    Ok((stream, samples, sample_rate, channels))
}
