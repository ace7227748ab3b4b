use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::provider::AuthProvider;

pub const MSG_NOT_LOGGED_IN: &str = "User not logged in!";
pub const MSG_NO_PERMISSION: &str = "No permission!";

/// Why a gated request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotLoggedIn,
    NoPermission,
}

impl Denial {
    pub fn message(&self) -> &'static str {
        match self {
            Denial::NotLoggedIn => MSG_NOT_LOGGED_IN,
            Denial::NoPermission => MSG_NO_PERMISSION,
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, self.message()).into_response()
    }
}

/// Role requirement enforced in front of a group of routes.
///
/// The gate only consults the identity provider and the persisted role set;
/// it never inspects the request body.
#[derive(Clone)]
pub struct RoleGate {
    provider: Arc<dyn AuthProvider>,
    role: String,
}

impl RoleGate {
    pub fn new(provider: Arc<dyn AuthProvider>, role: impl Into<String>) -> Self {
        Self {
            provider,
            role: role.into(),
        }
    }

    /// Decide whether the request head carries an identity holding the
    /// required role.
    pub async fn check(&self, parts: &Parts) -> Result<(), Denial> {
        let Some(user) = self.provider.user(parts).await else {
            debug!("Denied {} {}: no identity", parts.method, parts.uri);
            return Err(Denial::NotLoggedIn);
        };

        if !user.has_role(&self.role) {
            debug!(
                "Denied {} {} for user {}: missing role {}",
                parts.method, parts.uri, user.id, self.role
            );
            return Err(Denial::NoPermission);
        }

        Ok(())
    }
}

/// Middleware wrapper over [`RoleGate::check`] for `route_layer`.
pub async fn require_role(State(gate): State<RoleGate>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    match gate.check(&parts).await {
        Ok(()) => next.run(Request::from_parts(parts, body)).await,
        Err(denial) => denial.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LoginReply;
    use crate::types::{User, ADMIN, DEFAULT};
    use async_trait::async_trait;
    use axum::http::Request;

    struct FixedProvider(Option<User>);

    #[async_trait]
    impl AuthProvider for FixedProvider {
        async fn user_id(&self, _parts: &Parts) -> String {
            self.0.as_ref().map(|u| u.id.clone()).unwrap_or_default()
        }

        async fn user(&self, _parts: &Parts) -> Option<User> {
            self.0.clone()
        }

        async fn login(&self, _parts: &Parts, _user: &User) -> crate::Result<LoginReply> {
            Ok(LoginReply::SessionEstablished)
        }
    }

    fn parts() -> Parts {
        Request::builder()
            .uri("/gated")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn user_with_roles(roles: &[&str]) -> User {
        User {
            id: "u1".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_anonymous_request_is_not_logged_in() {
        let gate = RoleGate::new(Arc::new(FixedProvider(None)), ADMIN);
        assert_eq!(gate.check(&parts()).await, Err(Denial::NotLoggedIn));
    }

    #[tokio::test]
    async fn test_identity_without_role_has_no_permission() {
        let provider = FixedProvider(Some(user_with_roles(&[DEFAULT])));
        let gate = RoleGate::new(Arc::new(provider), ADMIN);
        assert_eq!(gate.check(&parts()).await, Err(Denial::NoPermission));
    }

    #[tokio::test]
    async fn test_identity_with_role_passes() {
        let provider = FixedProvider(Some(user_with_roles(&[DEFAULT, ADMIN])));
        let gate = RoleGate::new(Arc::new(provider), ADMIN);
        assert_eq!(gate.check(&parts()).await, Ok(()));
    }

    #[tokio::test]
    async fn test_denials_render_unauthorized() {
        let response = Denial::NotLoggedIn.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), MSG_NOT_LOGGED_IN.as_bytes());

        let response = Denial::NoPermission.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), MSG_NO_PERMISSION.as_bytes());
    }
}
