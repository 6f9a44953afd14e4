use crate::store::{keys, KvStore, Persisted};
use std::sync::Arc;
use thiserror::Error;

/// Seed mantra used until the user picks their own.
pub const DEFAULT_MANTRA: &str = "Om Namah Shivaya";

/// Traditional mala length.
pub const DEFAULT_MALA_REPS: u32 = 108;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("repetitions per mala must be a positive integer")]
    InvalidMalaReps,
}

/// User-adjustable settings, each bound to its own store key
pub struct Settings {
    mantra: Persisted<String>,
    mala_reps: Persisted<u32>,
    sound_on_count: Persisted<bool>,
}

impl Settings {
    pub fn bind(store: Arc<dyn KvStore>) -> Self {
        Self {
            mantra: Persisted::bind(
                Arc::clone(&store),
                keys::MANTRA,
                DEFAULT_MANTRA.to_string(),
            ),
            mala_reps: Persisted::bind(Arc::clone(&store), keys::MALA_REPS, DEFAULT_MALA_REPS),
            sound_on_count: Persisted::bind(store, keys::SOUND_ON_COUNT, false),
        }
    }

    pub fn mantra(&self) -> String {
        self.mantra.get()
    }

    pub fn set_mantra(&self, mantra: String) {
        self.mantra.set(mantra);
    }

    /// Repetitions per mala, always positive
    ///
    /// A stored zero (possible through a hand-edited store file) is treated
    /// as corrupted and falls back to the default so the mala arithmetic
    /// never divides by zero.
    pub fn mala_reps(&self) -> u32 {
        let reps = self.mala_reps.get();
        if reps == 0 {
            DEFAULT_MALA_REPS
        } else {
            reps
        }
    }

    /// Set repetitions per mala; zero is rejected, never stored
    pub fn set_mala_reps(&self, reps: u32) -> Result<(), SettingsError> {
        if reps == 0 {
            return Err(SettingsError::InvalidMalaReps);
        }
        self.mala_reps.set(reps);
        Ok(())
    }

    pub fn sound_on_count(&self) -> bool {
        self.sound_on_count.get()
    }

    pub fn set_sound_on_count(&self, enabled: bool) {
        self.sound_on_count.set(enabled);
    }
}
