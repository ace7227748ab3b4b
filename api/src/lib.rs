use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{require_role, AuthProvider, RoleGate};
use docstore::Database;

pub mod error;
pub mod handlers;
pub mod models;
pub mod resource;
pub mod seed;
pub mod server;

#[cfg(test)]
mod router_tests;

// Re-export server functions for convenience
pub use server::{start_server, start_server_with_config, ApiConfig};

pub use error::{ApiError, ApiResult};
pub use resource::{BindError, Resource, ResourceDescriptor, ResourceRegistry};

/// Collection holding identity records.
pub const USERS_COLLECTION: &str = "users";
/// Collection backing the sample article resource.
pub const ARTICLES_COLLECTION: &str = "articles";
/// Collection backing the admin-gated note resource.
pub const NOTES_COLLECTION: &str = "notes";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub provider: Arc<dyn AuthProvider>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::post_login,
        handlers::auth::current_login,
        handlers::auth::post_register,
        handlers::auth::update_account,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::LoginRequest,
            models::RegisterRequest,
            models::TokenReply,
            models::HealthResponse,
            models::DatabaseHealth,
        )
    ),
    tags(
        (name = "auth", description = "Login, registration and account maintenance"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "Corbel API",
        description = "CRUD-over-HTTP resources with pluggable authentication",
    ),
)]
pub struct ApiDoc;

/// Create the main API router with all routes and middleware.
///
/// `resources` carries the CRUD routes of one or more bound registries,
/// already wrapped in whatever role gates the caller wants; the auth and
/// health endpoints are added here. The session layer is installed for both
/// identity strategies; the token provider simply never touches it.
pub fn create_router<Store>(
    state: AppState,
    resources: Router<AppState>,
    sessions: SessionManagerLayer<Store>,
) -> Router
where
    Store: SessionStore + Clone,
{
    // Account maintenance is admin-only regardless of how the resource
    // routes are gated.
    let admin_gate = RoleGate::new(state.provider.clone(), auth::ADMIN);
    let account_routes = Router::new()
        .route("/auth/account/:id", put(handlers::auth::update_account))
        .route_layer(middleware::from_fn_with_state(admin_gate, require_role));

    let api_routes = Router::new()
        .route(
            "/auth/login",
            get(handlers::auth::current_login).post(handlers::auth::post_login),
        )
        .route("/auth/register", post(handlers::auth::post_register))
        .route("/health", get(handlers::health::health_check))
        .merge(account_routes)
        .merge(resources);

    // Main router
    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/api/swagger").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(sessions),
        )
        .with_state(state)
}
