pub mod config;
pub mod http;
pub mod session;
pub mod store;
pub mod voice;

pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    CounterSession, CounterStatus, FeedbackSink, LogFeedback, SessionRecord, Settings,
};
pub use store::{FileStore, KvStore, MemoryStore, NullStore, Persisted};
pub use voice::{
    CaptureDevice, CapturedAudio, CountRequest, CountResponse, CountingEndpoint,
    HttpCountingEndpoint, MicrophoneCapture, VoiceCounter, VoiceError, VoicePhase,
};
