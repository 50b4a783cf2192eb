//! Background sweep driver — periodic trigger for the expiration sweep and
//! the reminder pass.
//!
//! Spawns a dedicated thread that wakes up on the configured interval, runs
//! both pipelines and logs their summaries. Shutdown is cooperative: the
//! thread sleeps in small increments and checks the flag, and the handle
//! joins it on drop. A sweep aborted between assignments leaves no partial
//! state behind — every emitted alert is already committed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use crate::state::AppState;

use super::reminders::dispatch_due_reminders;
use super::sweep::run_expiration_sweep;

/// Sleep granularity for shutdown responsiveness (5 seconds).
const SLEEP_GRANULARITY_SECS: u64 = 5;

/// Handle for the background driver thread.
pub struct SweepDriverHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl SweepDriverHandle {
    /// Request graceful shutdown. A pass in flight completes; no new pass
    /// starts.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for SweepDriverHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start the driver on a separate thread. The first pass runs immediately,
/// subsequent passes on the configured interval.
pub fn start_sweep_driver(state: AppState) -> SweepDriverHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let interval = state.config.sweep_interval_secs;

    let handle = std::thread::spawn(move || {
        tracing::info!("Sweep driver started (interval {interval}s)");
        run_pass(&state);
        driver_loop(&state, &flag, interval);
    });

    SweepDriverHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn driver_loop(state: &AppState, shutdown: &AtomicBool, interval_secs: u64) {
    while !shutdown.load(Ordering::Relaxed) {
        // Sleep in small increments for responsive shutdown
        for _ in 0..interval_secs.div_ceil(SLEEP_GRANULARITY_SECS) {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!("Sweep driver shutting down");
                return;
            }
            std::thread::sleep(Duration::from_secs(SLEEP_GRANULARITY_SECS));
        }
        run_pass(state);
    }
    tracing::info!("Sweep driver shutting down");
}

fn run_pass(state: &AppState) {
    let now = Local::now().naive_local();
    let conn = match state.conn() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Sweep pass skipped");
            return;
        }
    };

    if let Err(e) = run_expiration_sweep(&conn, now, &state.config) {
        tracing::error!(error = %e, "Expiration sweep failed");
    }
    if let Err(e) = dispatch_due_reminders(&conn, state.dispatcher.as_ref(), now) {
        tracing::error!(error = %e, "Reminder pass failed");
    }
}
