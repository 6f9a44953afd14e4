use tracing::info;

/// Sink for count feedback pulses
///
/// `tick` is the short pulse fired on every increment when the sound toggle
/// is on; `mala_completed` is the longer pulse fired exactly when the new
/// count reaches a positive multiple of repetitions-per-mala.
pub trait FeedbackSink: Send + Sync {
    fn tick(&self, count: u64);
    fn mala_completed(&self, malas: u64);
}

/// Default sink that surfaces pulses through the log
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn tick(&self, count: u64) {
        info!("Count: {}", count);
    }

    fn mala_completed(&self, malas: u64) {
        info!("Mala {} completed", malas);
    }
}
