use crate::session::CounterSession;
use crate::voice::VoiceCounter;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The live counting session
    pub counter: Arc<CounterSession>,

    /// Voice counting, absent when running without a microphone
    pub voice: Option<Arc<VoiceCounter>>,
}

impl AppState {
    pub fn new(counter: Arc<CounterSession>, voice: Option<Arc<VoiceCounter>>) -> Self {
        Self { counter, voice }
    }
}
