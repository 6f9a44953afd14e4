//! Persisted key-value state
//!
//! This module provides the durability layer for the counter:
//! - `KvStore`: a synchronous string-keyed store of JSON-serialized values
//! - `FileStore` / `MemoryStore` / `NullStore`: store implementations
//! - `Persisted<T>`: binds one in-memory value to one store key

mod binding;
mod kv;

pub use binding::Persisted;
pub use kv::{FileStore, KvStore, MemoryStore, NullStore};

/// Store keys used by the application.
pub mod keys {
    pub const MANTRA: &str = "mantra";
    pub const MALA_REPS: &str = "malaReps";
    pub const SOUND_ON_COUNT: &str = "soundOnCount";
    pub const SESSIONS: &str = "sessions";
}
