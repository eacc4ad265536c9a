use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use bus_server::config::ServerConfig;
use bus_server::store::Store;
use bus_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bus_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr()?;

    // Open the store (memory-only without a data file)
    let store = match &config.data_file {
        Some(path) => {
            let store = Store::open(path.clone()).await?;
            info!(path = %path.display(), "loaded snapshot store");
            store
        }
        None => {
            info!("no BUS_DATA_FILE set, using in-memory store");
            Store::memory()
        }
    };

    let static_dir = config.static_dir.clone();
    let state = AppState::new(store, config);
    let app = create_router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Bus booking server listening on http://{addr}");
    info!("  GET  /health                 - Health check");
    info!("  GET  /login                  - Web interface");
    info!("  GET  /api/schedules/search   - Search buses");
    info!("  POST /api/bookings/confirm   - Confirm seats");

    axum::serve(listener, app).await?;
    Ok(())
}
