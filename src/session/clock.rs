use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Elapsed-time clock for the live counting session
///
/// A spawned task ticks once per second and increments an elapsed-seconds
/// counter while the clock is running. The counter is a plain monotonic
/// count of ticks, not a wall-clock derivation, so the clock must be
/// explicitly stopped when the session resets.
pub struct ElapsedClock {
    elapsed_secs: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl ElapsedClock {
    pub fn new() -> Self {
        Self {
            elapsed_secs: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            tick_task: Mutex::new(None),
        }
    }

    /// Start ticking; a no-op if the clock is already running
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        debug!("Elapsed clock started");

        let running = Arc::clone(&self.running);
        let elapsed_secs = Arc::clone(&self.elapsed_secs);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately
            interval.tick().await;

            while running.load(Ordering::SeqCst) {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                elapsed_secs.fetch_add(1, Ordering::SeqCst);
            }
        });

        let mut handle = self.tick_task.lock().unwrap();
        *handle = Some(task);
    }

    /// Stop ticking and reset elapsed time to zero
    pub fn stop_and_reset(&self) {
        self.running.store(false, Ordering::SeqCst);

        let mut handle = self.tick_task.lock().unwrap();
        if let Some(task) = handle.take() {
            task.abort();
        }

        self.elapsed_secs.store(0, Ordering::SeqCst);

        debug!("Elapsed clock stopped and reset");
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for ElapsedClock {
    fn default() -> Self {
        Self::new()
    }
}
