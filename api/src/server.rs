use axum::Router;
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::info;

use crate::{create_router, AppState};

/// API server configuration
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to seed development data (debug builds only)
    pub init_seed_data: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            #[cfg(debug_assertions)]
            init_seed_data: true,
            #[cfg(not(debug_assertions))]
            init_seed_data: false,
        }
    }
}

impl ApiConfig {
    /// Create a new API configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set whether to seed development data
    pub fn with_seed_data(mut self, init: bool) -> Self {
        self.init_seed_data = init;
        self
    }
}

/// Start the API server with the given configuration
pub async fn start_server_with_config<Store>(
    state: AppState,
    resources: Router<AppState>,
    sessions: SessionManagerLayer<Store>,
    config: ApiConfig,
) -> Result<(), Box<dyn std::error::Error>>
where
    Store: SessionStore + Clone,
{
    #[cfg(debug_assertions)]
    if config.init_seed_data {
        info!("Seeding development data");
        if let Err(e) = crate::seed::seed_dev_data(&state.db).await {
            tracing::warn!("Failed to seed development data: {}", e);
        }
    }

    let app = create_router(state, resources, sessions);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on {}", addr);
    info!(
        "Swagger UI available at http://localhost:{}/api/swagger",
        config.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Start the API server with default configuration
pub async fn start_server<Store>(
    state: AppState,
    resources: Router<AppState>,
    sessions: SessionManagerLayer<Store>,
) -> Result<(), Box<dyn std::error::Error>>
where
    Store: SessionStore + Clone,
{
    start_server_with_config(state, resources, sessions, ApiConfig::default()).await
}
