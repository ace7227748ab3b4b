use async_trait::async_trait;
use axum::http::request::Parts;

use crate::error::Result;
use crate::types::User;

/// What a successful login hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginReply {
    /// Stateless variant: an opaque signed token the caller must present on
    /// subsequent requests.
    Token(String),
    /// Stateful variant: the server-side session now carries the identity,
    /// nothing for the caller to hold on to beyond the session cookie.
    SessionEstablished,
}

/// Resolves "who is calling" and records logins, independent of how
/// identity travels with the request.
///
/// Implementations read everything they need from the request head
/// ([`Parts`]): the token variant looks at the `Authorization` header, the
/// session variant at the session extension. Resolution never fails for
/// "no user"; malformed credentials are swallowed to anonymous after
/// logging. Neither variant touches the record store.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Id of the authenticated subject, or empty string for anonymous
    async fn user_id(&self, parts: &Parts) -> String;

    /// The resolved identity record, if any
    async fn user(&self, parts: &Parts) -> Option<User>;

    /// Record `user` as logged in for subsequent requests
    async fn login(&self, parts: &Parts, user: &User) -> Result<LoginReply>;
}
