use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use trip_server::config::ServerConfig;
use trip_server::osrm::OsrmClient;
use trip_server::transit::TransitRoutingClient;
use trip_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trip_server=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");

    let transit = TransitRoutingClient::new(config.transit.clone(), None)
        .expect("Failed to create transit client");
    let osrm = OsrmClient::new(config.osrm.clone()).expect("Failed to create OSRM client");
    let protocol = transit.protocol();

    let state = AppState::new(transit, Arc::new(osrm), config.walking_color.clone());
    let app = create_router(state);

    info!(
        addr = %config.addr,
        transit = %config.transit.base_url,
        protocol = %protocol,
        osrm = %config.osrm.base_url,
        "trip server listening"
    );

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
