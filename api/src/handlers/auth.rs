use std::collections::HashSet;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{request::Parts, Request},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info};

use auth::{secure_compare, LoginReply, User, DEFAULT, MSG_NOT_LOGGED_IN};
use docstore::StoreError;

use crate::{
    error::{ApiError, ApiResult},
    models::{LoginRequest, RegisterRequest, TokenReply},
    AppState, USERS_COLLECTION,
};

pub const MSG_LOGIN_FAILED: &str = "Login failed!";
pub const MSG_SESSION_ESTABLISHED: &str = "User successfully logged in!";
pub const MSG_REGISTERED: &str = "Registered.";
pub const MSG_ID_TAKEN: &str = "UserID already in use.";

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Authenticate a caller and record the login with the active provider.
///
/// POST /api/auth/login
///
/// Unknown id, wrong password and empty credentials all answer with the
/// same 401 so callers cannot probe which accounts exist.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login accepted; token mode replies with a token, session mode with a confirmation text"),
        (status = 401, description = "Bad credentials"),
    ),
    tag = "auth"
)]
pub async fn post_login(
    State(state): State<AppState>,
    request: Request<Body>,
) -> ApiResult<Response> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("could not read body: {}", e)))?;

    let credentials: LoginRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid payload: {}", e)))?;

    if credentials.id.is_empty() || credentials.password.is_empty() {
        debug!("Login rejected: missing id or password");
        return Err(ApiError::Unauthorized(MSG_LOGIN_FAILED));
    }

    info!("Login attempt for user: {}", credentials.id);

    let users = state.db.collection(USERS_COLLECTION);
    let stored: User = match users.find_by_id(&credentials.id).await {
        Ok(user) => user,
        Err(e) => {
            debug!("Login rejected for {}: {}", credentials.id, e);
            return Err(ApiError::Unauthorized(MSG_LOGIN_FAILED));
        }
    };

    if !secure_compare(&credentials.password, &stored.password) {
        debug!("Login rejected for {}: wrong password", credentials.id);
        return Err(ApiError::Unauthorized(MSG_LOGIN_FAILED));
    }

    match state.provider.login(&parts, &stored).await {
        Ok(LoginReply::Token(token)) => Ok(Json(TokenReply { token }).into_response()),
        Ok(LoginReply::SessionEstablished) => Ok(MSG_SESSION_ESTABLISHED.into_response()),
        Err(e) => {
            error!("Could not record login for {}: {}", credentials.id, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// Return the caller's identity as the active provider resolves it.
///
/// GET /api/auth/login
#[utoipa::path(
    get,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Caller's identity record, password cleared"),
        (status = 401, description = "No authenticated caller"),
    ),
    tag = "auth"
)]
pub async fn current_login(
    State(state): State<AppState>,
    parts: Parts,
) -> ApiResult<impl IntoResponse> {
    match state.provider.user(&parts).await {
        Some(user) => Ok(Json(user.sanitized())),
        None => Err(ApiError::Unauthorized(MSG_NOT_LOGGED_IN)),
    }
}

/// Create a new account with the default role set.
///
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created"),
        (status = 409, description = "Id already taken"),
    ),
    tag = "auth"
)]
pub async fn post_register(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request: RegisterRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid payload: {}", e)))?;

    if request.id.is_empty() {
        return Err(ApiError::BadRequest(
            "user id must not be empty".to_string(),
        ));
    }

    info!("Registering user: {}", request.id);

    let users = state.db.collection(USERS_COLLECTION);

    // Existence check is "query by id, proceed only on not-found".
    match users.find_by_id::<User>(&request.id).await {
        Err(StoreError::NotFound(_)) => {}
        Ok(_) => return Err(ApiError::Conflict(MSG_ID_TAKEN)),
        Err(e) => {
            error!("Store error checking user {}: {}", request.id, e);
            return Err(ApiError::Internal(e.to_string()));
        }
    }

    // Submitted payloads never decide role membership.
    let user = User {
        id: request.id,
        password: request.password,
        mail: request.mail,
        alias: request.alias,
        roles: HashSet::from([DEFAULT.to_string()]),
    };

    match users.insert(&user.id, &user).await {
        Ok(()) => {
            info!("Registered user: {}", user.id);
            Ok(MSG_REGISTERED)
        }
        // Two concurrent registrations can both pass the lookup; the
        // store's key constraint settles the race.
        Err(StoreError::Duplicate(_)) => Err(ApiError::Conflict(MSG_ID_TAKEN)),
        Err(e) => {
            error!("Store error registering user {}: {}", user.id, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// Replace a stored account wholesale, keeping its id and persisted roles.
///
/// PUT /api/auth/account/:id
///
/// Whatever id and role set the payload carries are overwritten with the
/// stored values before persisting.
#[utoipa::path(
    put,
    path = "/api/auth/account/{id}",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account replaced"),
        (status = 404, description = "No such account"),
        (status = 401, description = "Caller is not an admin"),
    ),
    tag = "auth"
)]
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let mut submitted: User = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid payload: {}", e)))?;

    info!("Updating account: {}", id);

    let users = state.db.collection(USERS_COLLECTION);
    let stored: User = match users.find_by_id(&id).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            return Err(ApiError::NotFound("no such account".to_string()))
        }
        Err(e) => {
            error!("Store error reading account {}: {}", id, e);
            return Err(ApiError::BadRequest(e.to_string()));
        }
    };

    // Id and roles only change through the store, never from the payload.
    submitted.id = stored.id;
    submitted.roles = stored.roles;

    match users.replace_by_id(&id, &submitted).await {
        Ok(()) => Ok("Updated."),
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound("no such account".to_string())),
        Err(e) => {
            error!("Store error updating account {}: {}", id, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}
