mod config;
mod logging;

use std::process;
use std::sync::Arc;

use axum::middleware;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;
use tracing::info;

use api::models::{Article, Note};
use api::{
    ApiConfig, AppState, ResourceRegistry, ARTICLES_COLLECTION, NOTES_COLLECTION, USERS_COLLECTION,
};
use auth::{require_role, AuthProvider, RoleGate, SessionProvider, TokenProvider, ADMIN};
use config::{AuthMode, ServerConfig};
use docstore::{initialize_database, DatabaseConfig};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("corbeld: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let _log_guard = logging::init_logging(&config.data_path)?;

    info!("=== Corbel starting up ===");
    info!("Data path: {:?}", config.data_path);

    let db = initialize_database(DatabaseConfig::new_with_path(
        config.data_path.join("corbel.db"),
    ))
    .await?;

    let provider: Arc<dyn AuthProvider> = match &config.auth_mode {
        AuthMode::Session => {
            info!("Identity strategy: server-side sessions");
            Arc::new(SessionProvider::new())
        }
        AuthMode::Token {
            private_key_pem,
            public_key_pem,
        } => {
            info!("Identity strategy: signed bearer tokens");
            Arc::new(TokenProvider::new(private_key_pem, public_key_pem)?)
        }
    };

    let public = ResourceRegistry::new().bind::<Article>("/articles", ARTICLES_COLLECTION)?;
    let admin_only = ResourceRegistry::new().bind::<Note>("/notes", NOTES_COLLECTION)?;

    // Every bound collection plus the account store must exist before the
    // first request hits a handler.
    db.collection(USERS_COLLECTION).ensure().await?;
    for descriptor in public.descriptors().iter().chain(admin_only.descriptors()) {
        db.collection(descriptor.collection()).ensure().await?;
        info!(
            "Bound resource {} at /api{}",
            descriptor.type_name(),
            descriptor.path()
        );
    }

    let gate = RoleGate::new(provider.clone(), ADMIN);
    let resources = public.into_router().merge(
        admin_only
            .into_router()
            .route_layer(middleware::from_fn_with_state(gate, require_role)),
    );

    // Session records share the SQLite file with the document collections.
    let session_store = SqliteStore::new(db.get_pool());
    session_store.migrate().await?;
    let sessions = SessionManagerLayer::new(session_store).with_secure(false);

    let state = AppState {
        db,
        provider,
    };

    api::start_server_with_config(state, resources, sessions, ApiConfig::new().with_port(config.port))
        .await
}
