use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ws_hub::adapters::{app_router, InMemoryConnectionRegistry};
use ws_hub::application::Hub;
use ws_hub::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    init_tracing(&config.server);

    tracing::info!("ws-hub v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = InMemoryConnectionRegistry::new_shared();
    let (hub, _coordinator) = Hub::start(registry, &config.hub);
    tracing::info!(
        queue_capacity = config.hub.inbound_queue_capacity,
        "Coordinator listening to inbound queue"
    );

    let app = app_router(hub, &config);
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, path = %config.server.ws_path, "Starting web server");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `server.log_level`.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if server.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
