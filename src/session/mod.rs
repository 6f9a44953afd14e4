//! Counting session management
//!
//! This module provides the live counter and its surroundings:
//! - Count / mala arithmetic and the elapsed-time clock
//! - Persisted settings (mantra, repetitions-per-mala, sound toggle)
//! - Immutable session records and the newest-first history
//! - Feedback pulses on counts and mala completions

mod clock;
mod counter;
mod feedback;
mod record;
mod settings;

pub use clock::ElapsedClock;
pub use counter::{CounterSession, CounterStatus};
pub use feedback::{FeedbackSink, LogFeedback};
pub use record::{format_elapsed, malas_completed, SessionRecord};
pub use settings::{Settings, SettingsError, DEFAULT_MALA_REPS, DEFAULT_MANTRA};
