use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

/// One saved chanting session
///
/// Records are immutable once created: the mantra and the derived fields are
/// copied by value at save time, so later edits to the live settings never
/// change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique identifier, derived from the save timestamp
    pub id: String,

    /// Local date of the save, display-only
    pub date: String,

    /// The mantra that was active when the session was saved
    pub mantra: String,

    /// Repetitions accumulated in the session
    pub count: u64,

    /// Completed malas, `count / reps` rounded to 2 decimal places
    pub malas: f64,

    /// Elapsed time as `MM:SS`, frozen at save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl SessionRecord {
    /// Build a record from the live counter state, freezing all derived
    /// values at the moment of the save
    pub fn create(mantra: String, count: u64, mala_reps: u32, elapsed_secs: u64) -> Self {
        Self {
            id: Utc::now().to_rfc3339(),
            date: Local::now().format("%Y-%m-%d").to_string(),
            mantra,
            count,
            malas: malas_completed(count, mala_reps),
            duration: Some(format_elapsed(elapsed_secs)),
        }
    }
}

/// Completed malas for a raw count, rounded to 2 decimal places
///
/// Guards the degenerate divisor: a zero repetitions-per-mala yields 0.0
/// rather than a NaN/infinite display value.
pub fn malas_completed(count: u64, mala_reps: u32) -> f64 {
    if mala_reps == 0 {
        return 0.0;
    }
    (count as f64 / mala_reps as f64 * 100.0).round() / 100.0
}

/// Format elapsed seconds as `MM:SS`
pub fn format_elapsed(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
