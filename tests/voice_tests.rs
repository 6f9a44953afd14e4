// Integration tests for voice counting
//
// These tests drive the Idle -> Recording -> Processing cycle with fake
// capture devices and a fake counting endpoint, verifying the request
// contract, the single-flight constraint and the recoverable failures.

use async_trait::async_trait;
use base64::Engine;
use mantra_jaap::session::{CounterSession, FeedbackSink, LogFeedback};
use mantra_jaap::store::MemoryStore;
use mantra_jaap::voice::{
    parse_count, wav_data_uri, CaptureDevice, CaptureError, CapturedAudio, CountRequest,
    CountResponse, CountingEndpoint, EndpointError, VoiceCounter, VoiceError, VoicePhase,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fakes
// ============================================================================

/// Capture device that returns a scripted clip
struct FakeCapture {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl FakeCapture {
    fn with_tone() -> Self {
        Self {
            samples: vec![1000, -1000, 500, -500, 250, -250],
            sample_rate: 16000,
        }
    }

    fn silent() -> Self {
        Self {
            samples: Vec::new(),
            sample_rate: 16000,
        }
    }
}

impl CaptureDevice for FakeCapture {
    fn start(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn stop(&self) -> Result<CapturedAudio, CaptureError> {
        Ok(CapturedAudio {
            samples: self.samples.clone(),
            sample_rate: self.sample_rate,
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Capture device with no microphone permission
struct DeniedCapture;

impl CaptureDevice for DeniedCapture {
    fn start(&self) -> Result<(), CaptureError> {
        Err(CaptureError::Denied("permission refused".to_string()))
    }

    fn stop(&self) -> Result<CapturedAudio, CaptureError> {
        Err(CaptureError::NotActive)
    }

    fn name(&self) -> &str {
        "denied"
    }
}

/// Endpoint that always answers with a fixed count, recording the request
struct FakeEndpoint {
    count: u64,
    last_request: Mutex<Option<CountRequest>>,
}

impl FakeEndpoint {
    fn returning(count: u64) -> Arc<Self> {
        Arc::new(Self {
            count,
            last_request: Mutex::new(None),
        })
    }
}

#[async_trait]
impl CountingEndpoint for FakeEndpoint {
    async fn count_mantras(&self, request: &CountRequest) -> Result<CountResponse, EndpointError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(CountResponse { count: self.count })
    }
}

/// Endpoint that always fails
struct FailingEndpoint;

#[async_trait]
impl CountingEndpoint for FailingEndpoint {
    async fn count_mantras(&self, _request: &CountRequest) -> Result<CountResponse, EndpointError> {
        Err(EndpointError::Http("connection refused".to_string()))
    }
}

fn test_counter() -> CounterSession {
    CounterSession::new(Arc::new(MemoryStore::new()), Arc::new(LogFeedback) as Arc<dyn FeedbackSink>)
}

// ============================================================================
// Cycle behavior
// ============================================================================

#[tokio::test]
async fn test_successful_cycle_adds_detected_count() {
    let counter = test_counter();
    counter.increment();

    let endpoint = FakeEndpoint::returning(5);
    let voice = VoiceCounter::new(Box::new(FakeCapture::with_tone()), endpoint.clone());

    voice.start().unwrap();
    assert_eq!(voice.phase(), VoicePhase::Recording);

    let added = voice.finish("Om Namah Shivaya").await.unwrap();
    counter.add(added);

    // Counter increased by exactly the detected count
    assert_eq!(added, 5);
    assert_eq!(counter.count(), 6);
    assert_eq!(voice.phase(), VoicePhase::Idle);
}

#[tokio::test]
async fn test_request_carries_audio_uri_mantra_and_rate() {
    let endpoint = FakeEndpoint::returning(1);
    let voice = VoiceCounter::new(Box::new(FakeCapture::with_tone()), endpoint.clone());

    voice.start().unwrap();
    voice.finish("Om Namah Shivaya").await.unwrap();

    let request = endpoint.last_request.lock().unwrap().clone().unwrap();
    assert!(request.audio_data_uri.starts_with("data:audio/wav;base64,"));
    assert_eq!(request.mantra, "Om Namah Shivaya");
    assert_eq!(request.sample_rate, 16000);
}

#[tokio::test]
async fn test_endpoint_failure_leaves_counter_unchanged() {
    let counter = test_counter();
    counter.increment();
    counter.increment();

    let voice = VoiceCounter::new(Box::new(FakeCapture::with_tone()), Arc::new(FailingEndpoint));

    voice.start().unwrap();
    let result = voice.finish("Om Namah Shivaya").await;

    let error = result.unwrap_err();
    assert!(matches!(error, VoiceError::Endpoint(_)));
    assert_eq!(error.to_string(), "could not count chants from audio");

    // Counter untouched, phase back to Idle, ready for another attempt
    assert_eq!(counter.count(), 2);
    assert_eq!(voice.phase(), VoicePhase::Idle);
    assert!(voice.start().is_ok());
}

#[tokio::test]
async fn test_start_is_single_flight() {
    let voice = VoiceCounter::new(Box::new(FakeCapture::with_tone()), FakeEndpoint::returning(1));

    voice.start().unwrap();

    assert!(matches!(voice.start(), Err(VoiceError::Busy)));
}

#[tokio::test]
async fn test_finish_without_start_is_rejected() {
    let voice = VoiceCounter::new(Box::new(FakeCapture::with_tone()), FakeEndpoint::returning(1));

    let result = voice.finish("Om Namah Shivaya").await;
    assert!(matches!(result, Err(VoiceError::NotRecording)));
}

#[tokio::test]
async fn test_microphone_denial_returns_to_idle() {
    let voice = VoiceCounter::new(Box::new(DeniedCapture), FakeEndpoint::returning(1));

    let error = voice.start().unwrap_err();
    assert!(error.to_string().contains("microphone access denied"));
    assert_eq!(voice.phase(), VoicePhase::Idle);
}

#[tokio::test]
async fn test_empty_recording_is_a_recoverable_error() {
    let voice = VoiceCounter::new(Box::new(FakeCapture::silent()), FakeEndpoint::returning(1));

    voice.start().unwrap();
    let result = voice.finish("Om Namah Shivaya").await;

    assert!(matches!(result, Err(VoiceError::EmptyRecording)));
    assert_eq!(voice.phase(), VoicePhase::Idle);
}

// ============================================================================
// Encoding and response parsing
// ============================================================================

#[test]
fn test_wav_data_uri_encodes_a_playable_clip() {
    let audio = CapturedAudio {
        samples: vec![0, 1000, -1000, 0],
        sample_rate: 16000,
    };

    let uri = wav_data_uri(&audio).unwrap();

    let payload = uri.strip_prefix("data:audio/wav;base64,").unwrap();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();

    // RIFF/WAVE header plus 4 16-bit samples
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(bytes.len(), 44 + 8);
}

#[test]
fn test_parse_count_accepts_conforming_response() {
    let payload = json!({
        "choices": [{ "message": { "content": "{\"count\": 5}" } }]
    });

    let response = parse_count(&payload).unwrap();
    assert_eq!(response.count, 5);
}

#[test]
fn test_parse_count_rejects_prose_content() {
    let payload = json!({
        "choices": [{ "message": { "content": "I heard about five chants." } }]
    });

    assert!(matches!(
        parse_count(&payload),
        Err(EndpointError::Schema(_))
    ));
}

#[test]
fn test_parse_count_rejects_missing_or_negative_count() {
    let missing = json!({
        "choices": [{ "message": { "content": "{\"chants\": 5}" } }]
    });
    assert!(matches!(parse_count(&missing), Err(EndpointError::Schema(_))));

    let negative = json!({
        "choices": [{ "message": { "content": "{\"count\": -2}" } }]
    });
    assert!(matches!(
        parse_count(&negative),
        Err(EndpointError::Schema(_))
    ));
}

#[test]
fn test_parse_count_rejects_empty_response() {
    let payload = json!({ "choices": [] });

    assert!(matches!(
        parse_count(&payload),
        Err(EndpointError::Schema(_))
    ));
}
