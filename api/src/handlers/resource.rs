use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use tracing::{debug, error, info};

use docstore::{DocumentId, StoreError};

use crate::{
    error::{ApiError, ApiResult},
    resource::{Resource, ResourceDescriptor},
    AppState,
};

/// Fixed number of documents returned by the list route.
pub const LIST_LIMIT: i64 = 50;

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().starts_with("application/json"))
        .unwrap_or(false)
}

/// List up to [`LIST_LIMIT`] documents of a bound resource, unfiltered.
///
/// GET {path}
pub async fn list_resources<T: Resource>(
    State(state): State<AppState>,
    Extension(descriptor): Extension<Arc<ResourceDescriptor>>,
) -> ApiResult<impl IntoResponse> {
    info!("Listing documents: collection={}", descriptor.collection());

    let collection = state.db.collection(descriptor.collection());
    match collection.find::<T>(LIST_LIMIT).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            error!("Store error listing {}: {}", descriptor.collection(), e);
            Err(ApiError::BadRequest(e.to_string()))
        }
    }
}

/// Read a single document by id.
///
/// GET {path}/:id
///
/// The id is validated before the store is consulted; a malformed id never
/// turns into a query.
pub async fn read_resource<T: Resource>(
    State(state): State<AppState>,
    Extension(descriptor): Extension<Arc<ResourceDescriptor>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Reading document: collection={}, id={}",
        descriptor.collection(),
        id
    );

    let id: DocumentId = id.parse().map_err(|_| ApiError::InvalidId)?;

    let collection = state.db.collection(descriptor.collection());
    match collection.find_by_id::<T>(&id.to_string()).await {
        Ok(record) => Ok(Json(record)),
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound("document not found".to_string())),
        Err(e) => {
            error!(
                "Store error reading {}/{}: {}",
                descriptor.collection(),
                id,
                e
            );
            Err(ApiError::BadRequest(e.to_string()))
        }
    }
}

/// Create a document from a JSON payload, assigning a fresh id.
///
/// POST {path}
///
/// Whatever id the payload carries is discarded and replaced by the
/// generated one. Replies 201 with the new id as the body.
pub async fn create_resource<T: Resource>(
    State(state): State<AppState>,
    Extension(descriptor): Extension<Arc<ResourceDescriptor>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    info!("Creating document: collection={}", descriptor.collection());

    if !is_json_content_type(&headers) {
        return Err(ApiError::UnsupportedMediaType);
    }

    let mut record: T = serde_json::from_slice(&body).map_err(|e| {
        debug!(
            "Rejected create payload for {}: {}",
            descriptor.collection(),
            e
        );
        ApiError::BadRequest(format!("invalid payload: {}", e))
    })?;

    let id = DocumentId::new();
    record.set_id(id.to_string());

    let collection = state.db.collection(descriptor.collection());
    if let Err(e) = collection.insert(&id.to_string(), &record).await {
        error!(
            "Store error creating {}/{}: {}",
            descriptor.collection(),
            id,
            e
        );
        return Err(ApiError::Internal(e.to_string()));
    }

    Ok((StatusCode::CREATED, id.to_string()))
}

/// Replace a document wholesale, keeping its id.
///
/// PUT {path}/:id
pub async fn update_resource<T: Resource>(
    State(state): State<AppState>,
    Extension(descriptor): Extension<Arc<ResourceDescriptor>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Updating document: collection={}, id={}",
        descriptor.collection(),
        id
    );

    let id: DocumentId = id.parse().map_err(|_| ApiError::InvalidId)?;

    let mut record: T = serde_json::from_slice(&body).map_err(|e| {
        debug!(
            "Rejected update payload for {}: {}",
            descriptor.collection(),
            e
        );
        ApiError::BadRequest(format!("invalid payload: {}", e))
    })?;

    // The path decides the document id, not the payload.
    record.set_id(id.to_string());

    let collection = state.db.collection(descriptor.collection());
    match collection.replace_by_id(&id.to_string(), &record).await {
        Ok(()) => Ok("Added"),
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound("document not found".to_string())),
        Err(e) => {
            error!(
                "Store error updating {}/{}: {}",
                descriptor.collection(),
                id,
                e
            );
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

/// Remove a document by id.
///
/// DELETE {path}/:id
pub async fn delete_resource<T: Resource>(
    State(state): State<AppState>,
    Extension(descriptor): Extension<Arc<ResourceDescriptor>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!(
        "Deleting document: collection={}, id={}",
        descriptor.collection(),
        id
    );

    let id: DocumentId = id.parse().map_err(|_| ApiError::InvalidId)?;

    let collection = state.db.collection(descriptor.collection());
    match collection.remove_by_id(&id.to_string()).await {
        Ok(()) => Ok("Deleted"),
        Err(StoreError::NotFound(_)) => Err(ApiError::NotFound("document not found".to_string())),
        Err(e) => {
            error!(
                "Store error deleting {}/{}: {}",
                descriptor.collection(),
                id,
                e
            );
            Err(ApiError::Internal(e.to_string()))
        }
    }
}
