use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A user identity. Can hold a password credential, linked OAuth accounts,
/// or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address. Present for password accounts; optional for
    /// OAuth-only accounts (some providers withhold it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Argon2id PHC hash. Absent for OAuth-only accounts.
    /// Persisted in the data column; never exposed through the API —
    /// responses use [`UserPublic`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Whether the user account is active.
    #[serde(default = "default_true")]
    pub active: bool,

    /// Linked accounts: provider id -> external user id.
    /// e.g. {"github": "12345"}
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub linked_accounts: HashMap<String, String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// User data returned in API responses (credential material redacted).
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar: u.avatar,
            active: u.active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_view_has_no_hash() {
        let user = User {
            id: "u1".into(),
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
            avatar: None,
            password_hash: Some("$argon2id$...".into()),
            active: true,
            linked_accounts: HashMap::new(),
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        };
        let public: UserPublic = user.into();
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}
