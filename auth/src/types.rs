use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Role granting full administrative access.
pub const ADMIN: &str = "admin";

/// Role granted to every newly registered account.
pub const DEFAULT: &str = "default";

/// A stored principal: credentials, attributes, and the roles it holds.
///
/// The id doubles as the document key in the user collection and is
/// immutable once the account exists. An empty id means "anonymous". The
/// role set is only ever authoritative when read from the store; values
/// submitted by clients are discarded before anything is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub roles: HashSet<String>,
}

impl User {
    /// Check membership of a single role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Strip credential material before the record leaves the service
    pub fn sanitized(mut self) -> Self {
        self.password.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_underscore_id() {
        let user = User {
            id: "u1".to_string(),
            password: "p".to_string(),
            mail: "u1@example.com".to_string(),
            alias: "One".to_string(),
            roles: HashSet::from([DEFAULT.to_string()]),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["_id"], "u1");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_sparse_payload_decodes_with_defaults() {
        let user: User = serde_json::from_str(r#"{"_id":"u1","password":"p"}"#).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.password, "p");
        assert!(user.mail.is_empty());
        assert!(user.roles.is_empty());
    }

    #[test]
    fn test_has_role() {
        let mut user = User::default();
        assert!(!user.has_role(ADMIN));

        user.roles.insert(ADMIN.to_string());
        assert!(user.has_role(ADMIN));
        assert!(!user.has_role(DEFAULT));
    }

    #[test]
    fn test_sanitized_clears_password_only() {
        let user = User {
            id: "u1".to_string(),
            password: "secret".to_string(),
            alias: "One".to_string(),
            ..Default::default()
        };

        let clean = user.sanitized();
        assert!(clean.password.is_empty());
        assert_eq!(clean.id, "u1");
        assert_eq!(clean.alias, "One");
    }
}
