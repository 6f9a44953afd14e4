//! Voice-activated counting
//!
//! This module records a clip from the microphone, encodes it as a
//! `data:audio/wav;base64,...` URI and asks a hosted model how many times
//! the mantra was chanted in it:
//! - `CaptureDevice` / `MicrophoneCapture`: buffered microphone capture
//! - `CountingEndpoint` / `HttpCountingEndpoint`: the one-shot model call
//! - `VoiceCounter`: the `Idle -> Recording -> Processing` flow

mod capture;
mod client;
mod encode;
mod endpoint;

pub use capture::{CaptureDevice, CaptureError, CapturedAudio, MicrophoneCapture};
pub use client::{VoiceCounter, VoiceError, VoicePhase};
pub use encode::{data_uri_payload, wav_data_uri};
pub use endpoint::{
    parse_count, CountRequest, CountResponse, CountingEndpoint, EndpointError, HttpCountingEndpoint,
};
