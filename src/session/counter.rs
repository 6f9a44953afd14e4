use super::clock::ElapsedClock;
use super::feedback::FeedbackSink;
use super::record::{format_elapsed, malas_completed, SessionRecord};
use super::settings::Settings;
use crate::store::{keys, KvStore, Persisted};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Snapshot of the live counter for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterStatus {
    pub count: u64,
    pub malas_completed: f64,
    pub elapsed: String,
    pub mantra: String,
}

/// The live counting session
///
/// Owns the running count, the elapsed-time clock, the persisted settings
/// and the session history. Counting operations are cheap and synchronous;
/// the clock runs as a background task started on the first increment.
pub struct CounterSession {
    settings: Settings,
    history: Persisted<Vec<SessionRecord>>,
    count: AtomicU64,
    clock: ElapsedClock,
    feedback: Arc<dyn FeedbackSink>,
}

impl CounterSession {
    pub fn new(store: Arc<dyn KvStore>, feedback: Arc<dyn FeedbackSink>) -> Self {
        Self {
            settings: Settings::bind(Arc::clone(&store)),
            history: Persisted::bind(store, keys::SESSIONS, Vec::new()),
            count: AtomicU64::new(0),
            clock: ElapsedClock::new(),
            feedback,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Add one repetition
    ///
    /// Starts the elapsed clock on the first count. Fires the short feedback
    /// pulse when the sound toggle is on, and the mala pulse exactly when
    /// the new count is a positive multiple of repetitions-per-mala.
    pub fn increment(&self) -> u64 {
        let new_count = self.count.fetch_add(1, Ordering::SeqCst) + 1;

        self.clock.start();

        if self.settings.sound_on_count() {
            self.feedback.tick(new_count);
        }

        let reps = self.settings.mala_reps() as u64;
        if new_count % reps == 0 {
            self.feedback.mala_completed(new_count / reps);
        }

        new_count
    }

    /// Add several repetitions at once (voice counting result); additive,
    /// never replaces the running count
    pub fn add(&self, n: u64) -> u64 {
        self.count.fetch_add(n, Ordering::SeqCst) + n
    }

    /// Remove one repetition, saturating at zero
    pub fn decrement(&self) -> u64 {
        let prev = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                Some(c.saturating_sub(1))
            })
            .unwrap_or(0);
        prev.saturating_sub(1)
    }

    /// Zero the count and stop the elapsed clock
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
        self.clock.stop_and_reset();
    }

    /// Freeze the current state into a `SessionRecord`, prepend it to the
    /// history and reset
    ///
    /// A save with nothing counted is a no-op and returns `None`.
    pub fn save(&self) -> Option<SessionRecord> {
        let count = self.count.load(Ordering::SeqCst);
        if count == 0 {
            return None;
        }

        let record = SessionRecord::create(
            self.settings.mantra(),
            count,
            self.settings.mala_reps(),
            self.clock.elapsed_secs(),
        );

        self.history.update(|history| {
            history.insert(0, record.clone());
        });

        self.reset();

        info!(
            "Session saved: {} x {} ({} malas)",
            record.count, record.mantra, record.malas
        );

        Some(record)
    }

    /// Remove the record with the given id from the history; silent if absent
    pub fn delete_session(&self, id: &str) {
        self.history.update(|history| {
            history.retain(|record| record.id != id);
        });
    }

    /// Saved sessions, newest first
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.history.get()
    }

    pub fn status(&self) -> CounterStatus {
        let count = self.count.load(Ordering::SeqCst);

        CounterStatus {
            count,
            malas_completed: malas_completed(count, self.settings.mala_reps()),
            elapsed: format_elapsed(self.clock.elapsed_secs()),
            mantra: self.settings.mantra(),
        }
    }
}
