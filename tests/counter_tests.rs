// Integration tests for the counting session
//
// These tests verify count arithmetic, session saving, history immutability
// and the feedback pulse edges.

use anyhow::Result;
use mantra_jaap::session::{CounterSession, FeedbackSink, DEFAULT_MALA_REPS, DEFAULT_MANTRA};
use mantra_jaap::store::{keys, KvStore, MemoryStore};
use std::sync::{Arc, Mutex};

/// Records every pulse instead of making noise
#[derive(Default)]
struct RecordingFeedback {
    ticks: Mutex<Vec<u64>>,
    malas: Mutex<Vec<u64>>,
}

impl FeedbackSink for RecordingFeedback {
    fn tick(&self, count: u64) {
        self.ticks.lock().unwrap().push(count);
    }

    fn mala_completed(&self, malas: u64) {
        self.malas.lock().unwrap().push(malas);
    }
}

fn test_counter() -> (CounterSession, Arc<RecordingFeedback>) {
    let feedback = Arc::new(RecordingFeedback::default());
    let counter = CounterSession::new(Arc::new(MemoryStore::new()), feedback.clone());
    (counter, feedback)
}

#[tokio::test]
async fn test_count_never_goes_below_zero() {
    let (counter, _) = test_counter();

    assert_eq!(counter.decrement(), 0);

    counter.increment();
    counter.increment();
    counter.decrement();
    counter.decrement();
    counter.decrement();

    assert_eq!(counter.count(), 0);
}

#[tokio::test]
async fn test_save_at_zero_is_a_noop() {
    let (counter, _) = test_counter();

    assert!(counter.save().is_none());
    assert_eq!(counter.count(), 0);
    assert!(counter.sessions().is_empty());
}

#[tokio::test]
async fn test_save_freezes_record_and_resets() {
    let (counter, _) = test_counter();

    for _ in 0..54 {
        counter.increment();
    }

    let record = counter.save().expect("save with a count should record");

    // Frozen fields
    assert_eq!(record.mantra, DEFAULT_MANTRA);
    assert_eq!(record.count, 54);
    assert_eq!(record.malas, 0.5); // 54 / 108
    assert!(record.duration.is_some());
    assert!(!record.id.is_empty());

    // Counter and clock reset
    assert_eq!(counter.count(), 0);
    let status = counter.status();
    assert_eq!(status.count, 0);
    assert_eq!(status.elapsed, "00:00");

    // One record in the history
    let sessions = counter.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0], record);
}

#[tokio::test]
async fn test_malas_rounded_to_two_decimals() {
    let (counter, _) = test_counter();

    counter.increment();

    let record = counter.save().unwrap();
    // 1 / 108 = 0.00925... rounds to 0.01
    assert_eq!(record.malas, 0.01);
}

#[tokio::test]
async fn test_mantra_edit_does_not_change_saved_records() {
    let (counter, _) = test_counter();

    counter.increment();
    counter.save().unwrap();

    counter
        .settings()
        .set_mantra("Om Mani Padme Hum".to_string());

    let sessions = counter.sessions();
    assert_eq!(sessions[0].mantra, DEFAULT_MANTRA);

    // The live status reflects the new mantra
    assert_eq!(counter.status().mantra, "Om Mani Padme Hum");
}

#[tokio::test]
async fn test_sessions_are_newest_first() {
    let (counter, _) = test_counter();

    counter.increment();
    counter.save().unwrap();

    counter.increment();
    counter.increment();
    counter.save().unwrap();

    let sessions = counter.sessions();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].count, 2);
    assert_eq!(sessions[1].count, 1);
}

#[tokio::test]
async fn test_delete_removes_exactly_one_record() {
    let (counter, _) = test_counter();

    counter.increment();
    let first = counter.save().unwrap();

    counter.increment();
    let second = counter.save().unwrap();

    counter.delete_session(&first.id);

    let sessions = counter.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, second.id);

    // Deleting an unknown id is silent
    counter.delete_session("no-such-id");
    assert_eq!(counter.sessions().len(), 1);
}

#[tokio::test]
async fn test_mala_pulse_fires_exactly_on_completion() {
    let (counter, feedback) = test_counter();

    // 107 -> 108 fires, 108 -> 109 does not
    for _ in 0..109 {
        counter.increment();
    }

    let malas = feedback.malas.lock().unwrap().clone();
    assert_eq!(malas, vec![1]);
}

#[tokio::test]
async fn test_tick_pulse_gated_by_sound_toggle() {
    let (counter, feedback) = test_counter();

    counter.increment();
    assert!(feedback.ticks.lock().unwrap().is_empty());

    counter.settings().set_sound_on_count(true);
    counter.increment();
    counter.increment();

    let ticks = feedback.ticks.lock().unwrap().clone();
    assert_eq!(ticks, vec![2, 3]);
}

#[tokio::test]
async fn test_zero_mala_reps_is_rejected() {
    let (counter, _) = test_counter();

    assert!(counter.settings().set_mala_reps(0).is_err());
    assert_eq!(counter.settings().mala_reps(), DEFAULT_MALA_REPS);

    counter.settings().set_mala_reps(27).unwrap();
    assert_eq!(counter.settings().mala_reps(), 27);
}

#[tokio::test]
async fn test_stored_zero_reps_falls_back_to_default() -> Result<()> {
    let store = Arc::new(MemoryStore::new());

    // A hand-edited store could hold a degenerate divisor
    store.set(keys::MALA_REPS, "0")?;

    let counter = CounterSession::new(store, Arc::new(RecordingFeedback::default()));
    assert_eq!(counter.settings().mala_reps(), DEFAULT_MALA_REPS);

    Ok(())
}

#[tokio::test]
async fn test_history_survives_a_new_session_over_the_same_store() {
    let store = Arc::new(MemoryStore::new());

    {
        let counter = CounterSession::new(
            Arc::clone(&store) as Arc<dyn KvStore>,
            Arc::new(RecordingFeedback::default()),
        );
        counter.increment();
        counter.save().unwrap();
    }

    let counter = CounterSession::new(store, Arc::new(RecordingFeedback::default()));
    assert_eq!(counter.sessions().len(), 1);
}
