//! Shared application state: the database handle, the notification channel
//! and the engine tunables, used by both the HTTP layer and the background
//! driver.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::engine::reminders::ReminderDispatcher;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Single writer connection behind a mutex; the unique indexes on alerts and
/// the reminder log do the per-key serialization on top of it.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub dispatcher: Arc<dyn ReminderDispatcher>,
    pub config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(
        conn: Connection,
        dispatcher: Arc<dyn ReminderDispatcher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            dispatcher,
            config: Arc::new(config),
        }
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, StateError> {
        self.db.lock().map_err(|_| StateError::LockPoisoned)
    }
}
