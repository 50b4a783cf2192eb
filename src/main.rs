use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use rootedcare::config::{self, EngineConfig};
use rootedcare::engine::{start_sweep_driver, LogDispatcher};
use rootedcare::state::AppState;
use rootedcare::{api, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let conn = db::open_database(&config::database_path())?;

    let state = AppState::new(conn, Arc::new(LogDispatcher), EngineConfig::default());

    let _driver = start_sweep_driver(state.clone());

    let addr: SocketAddr = ([0, 0, 0, 0], 8080).into();
    api::server::serve(state, addr).await?;

    Ok(())
}
