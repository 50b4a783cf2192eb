use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "RootedCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,rootedcare=debug".to_string()
}

/// Application data directory: ~/RootedCare/
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Path of the backing SQLite database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("practice.db")
}

/// Tunables for the alert & reminder engine. Injected everywhere a window
/// decision is made so tests can pin both the clock and the lead time.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Days before a deadline during which a pending-condition alert is
    /// considered active. Both window ends are inclusive.
    pub lead_time_days: i64,
    /// How often the background driver runs a sweep + reminder pass.
    pub sweep_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lead_time_days: 30,
            sweep_interval_secs: 15 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn database_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
    }

    #[test]
    fn default_lead_time_is_thirty_days() {
        let config = EngineConfig::default();
        assert_eq!(config.lead_time_days, 30);
    }
}
