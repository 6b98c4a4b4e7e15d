//! Flare - A lightweight incident reporting and tracking service.
//!
//! # API Endpoints
//!
//! - `POST /api/incident/report` - Report a new incident
//! - `GET /api/incident/:incident_id` - Fetch a single incident
//! - `PATCH /api/incident/:incident_id` - Update an incident's status
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus exposition

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use flare::api::{AppState, router};
use flare::auth::{Authenticator, StaticTokenValidator, TrustedMock};
use flare::metrics::Metrics;
use flare::storage::Storage;

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

/// Default database path if not specified via environment variable.
const DEFAULT_DB_PATH: &str = "sqlite:flare.db?mode=rwc";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("flare=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("FLARE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let db_url = env::var("FLARE_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    info!(port, db_url = %db_url, "Starting Flare server");

    // Initialize storage
    let storage = Storage::new(&db_url).await?;
    info!("Database initialized");

    // Pick the authenticator: a configured token means real validation,
    // otherwise any bearer token is accepted
    let auth: Arc<dyn Authenticator> = match env::var("FLARE_AUTH_TOKEN") {
        Ok(token) => Arc::new(StaticTokenValidator::new(token)),
        Err(_) => {
            warn!("FLARE_AUTH_TOKEN not set; accepting any bearer token");
            Arc::new(TrustedMock)
        }
    };

    let metrics = Metrics::new()?;

    // Create application state and router
    let state = AppState {
        storage,
        auth,
        metrics,
    };
    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Flare is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
