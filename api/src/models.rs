use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resource::Resource;

/// Credentials submitted to the login endpoint
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

/// Payload accepted by the register endpoint.
///
/// Role membership is not part of the payload; new accounts always start
/// with the default role only.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    pub id: String,
    pub password: String,
    pub mail: String,
    pub alias: String,
}

/// Reply body for a login in token mode
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenReply {
    pub token: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub message: String,
}

/// Sample record type served publicly at /api/articles
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
}

impl Resource for Article {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Sample record type served behind the admin gate at /api/notes
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl Resource for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
