use async_trait::async_trait;
use axum::http::request::Parts;
use tower_sessions::Session;
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::provider::{AuthProvider, LoginReply};
use crate::types::User;

/// Key under which the signed-in identity lives inside the session.
pub const SESSION_USER_KEY: &str = "user";

/// Server-side identity via cookie-backed sessions.
///
/// Login writes the full identity record into the session store; later
/// requests resolve it from the session the middleware attached for the
/// request cookie. The session layer itself is configured by the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionProvider;

impl SessionProvider {
    pub fn new() -> Self {
        Self
    }

    fn session_from(&self, parts: &Parts) -> Option<Session> {
        parts.extensions.get::<Session>().cloned()
    }
}

#[async_trait]
impl AuthProvider for SessionProvider {
    async fn user_id(&self, parts: &Parts) -> String {
        self.user(parts)
            .await
            .map(|user| user.id)
            .unwrap_or_default()
    }

    async fn user(&self, parts: &Parts) -> Option<User> {
        let session = self.session_from(parts)?;
        match session.get::<User>(SESSION_USER_KEY).await {
            Ok(user) => user,
            Err(err) => {
                debug!("Could not read identity from session: {}", err);
                None
            }
        }
    }

    async fn login(&self, parts: &Parts, user: &User) -> Result<LoginReply> {
        let session = self
            .session_from(parts)
            .ok_or_else(|| AuthError::Session("no session on request".to_string()))?;

        session
            .insert(SESSION_USER_KEY, user)
            .await
            .map_err(|err| AuthError::Session(err.to_string()))?;

        // Persist eagerly so a store failure fails the login request itself
        // instead of surfacing after the response is already on the wire.
        session
            .save()
            .await
            .map_err(|err| AuthError::Session(err.to_string()))?;

        debug!("Stored session identity for user: {}", user.id);
        Ok(LoginReply::SessionEstablished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn parts_with_session() -> Parts {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut parts = Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts.extensions.insert(session);
        parts
    }

    #[tokio::test]
    async fn test_login_stores_identity_in_session() {
        let provider = SessionProvider::new();
        let parts = parts_with_session();
        let user = User {
            id: "u1".to_string(),
            alias: "Number One".to_string(),
            roles: HashSet::from(["default".to_string()]),
            ..Default::default()
        };

        let reply = provider.login(&parts, &user).await.unwrap();
        assert!(matches!(reply, LoginReply::SessionEstablished));

        assert_eq!(provider.user_id(&parts).await, "u1");
        let resolved = provider.user(&parts).await.unwrap();
        assert_eq!(resolved, user);
    }

    #[tokio::test]
    async fn test_fresh_session_is_anonymous() {
        let provider = SessionProvider::new();
        let parts = parts_with_session();

        assert_eq!(provider.user_id(&parts).await, "");
        assert!(provider.user(&parts).await.is_none());
    }

    #[tokio::test]
    async fn test_request_without_session_cannot_login() {
        let provider = SessionProvider::new();
        let parts = Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let user = User {
            id: "u1".to_string(),
            ..Default::default()
        };

        assert!(provider.user(&parts).await.is_none());
        assert!(provider.login(&parts, &user).await.is_err());
    }
}
