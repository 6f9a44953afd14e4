use super::capture::{CaptureDevice, CaptureError};
use super::encode::wav_data_uri;
use super::endpoint::{CountRequest, CountingEndpoint, EndpointError};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

/// Where the voice-counting cycle currently is
///
/// `Idle -> Recording -> Processing -> Idle`; errors return to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicePhase {
    Idle,
    Recording,
    Processing,
}

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("could not count chants from audio")]
    Endpoint(#[from] EndpointError),

    #[error("could not encode the captured audio: {0}")]
    Encode(String),

    #[error("a voice counting cycle is already in progress")]
    Busy,

    #[error("no recording in progress")]
    NotRecording,

    #[error("recording contained no audio")]
    EmptyRecording,
}

/// The voice-counting flow
///
/// At most one record/process cycle is active at a time; `start` is rejected
/// with `Busy` until the previous cycle resolves. An in-flight endpoint call
/// cannot be cancelled; the caller waits for success or failure. Every
/// failure is recoverable and returns the phase to `Idle` with the running
/// counter untouched.
pub struct VoiceCounter {
    capture: Mutex<Box<dyn CaptureDevice>>,
    endpoint: Arc<dyn CountingEndpoint>,
    phase: Mutex<VoicePhase>,
}

impl VoiceCounter {
    pub fn new(capture: Box<dyn CaptureDevice>, endpoint: Arc<dyn CountingEndpoint>) -> Self {
        Self {
            capture: Mutex::new(capture),
            endpoint,
            phase: Mutex::new(VoicePhase::Idle),
        }
    }

    pub fn phase(&self) -> VoicePhase {
        *self.phase.lock().unwrap()
    }

    /// Begin a recording cycle
    ///
    /// Opens the microphone; on denial the phase returns to `Idle` and the
    /// error is surfaced to the caller.
    pub fn start(&self) -> Result<(), VoiceError> {
        {
            let mut phase = self.phase.lock().unwrap();
            if *phase != VoicePhase::Idle {
                return Err(VoiceError::Busy);
            }
            *phase = VoicePhase::Recording;
        }

        let result = {
            let capture = self.capture.lock().unwrap();
            capture.start()
        };

        if let Err(e) = result {
            warn!("Could not start voice capture: {}", e);
            *self.phase.lock().unwrap() = VoicePhase::Idle;
            return Err(e.into());
        }

        info!("Voice counting: recording");
        Ok(())
    }

    /// Stop recording, send the clip to the counting endpoint and return the
    /// detected count
    ///
    /// The caller adds the count to the running counter on success; on any
    /// failure the counter is left unchanged.
    pub async fn finish(&self, mantra: &str) -> Result<u64, VoiceError> {
        {
            let mut phase = self.phase.lock().unwrap();
            if *phase != VoicePhase::Recording {
                return Err(VoiceError::NotRecording);
            }
            *phase = VoicePhase::Processing;
        }

        let result = self.process(mantra).await;

        *self.phase.lock().unwrap() = VoicePhase::Idle;

        match &result {
            Ok(count) => info!("Voice counting: {} chants detected", count),
            Err(e) => warn!("Voice counting failed: {}", e),
        }

        result
    }

    async fn process(&self, mantra: &str) -> Result<u64, VoiceError> {
        let audio = {
            let capture = self.capture.lock().unwrap();
            capture.stop()?
        };

        if audio.samples.is_empty() {
            return Err(VoiceError::EmptyRecording);
        }

        let audio_data_uri = wav_data_uri(&audio).map_err(|e| VoiceError::Encode(format!("{e:#}")))?;

        let request = CountRequest {
            audio_data_uri,
            mantra: mantra.to_string(),
            sample_rate: audio.sample_rate,
        };

        let response = self.endpoint.count_mantras(&request).await?;

        Ok(response.count)
    }
}
