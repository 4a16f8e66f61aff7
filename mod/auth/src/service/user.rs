use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use opentodo_core::{new_id, now_rfc3339};
use opentodo_sql::Value;

use crate::model::{LoginRequest, RegisterRequest, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Register a new password account.
    ///
    /// Email uniqueness is enforced by the unique index; a duplicate comes
    /// back as Conflict.
    pub fn register_user(&self, input: RegisterRequest) -> Result<User, AuthError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("a valid email is required".into()));
        }
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name must not be empty".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: input.name,
            email: Some(email.clone()),
            avatar: None,
            password_hash: Some(hash_password(&input.password)?),
            active: true,
            linked_accounts: Default::default(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("email", Value::Text(email)),
                ("active", Value::Integer(1)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )
        .map_err(|e| match e {
            AuthError::Conflict(_) => {
                AuthError::Conflict("an account with this email already exists".into())
            }
            other => other,
        })?;

        Ok(user)
    }

    /// Verify email/password credentials and return the user.
    ///
    /// Wrong email and wrong password produce the same error.
    pub fn verify_login(&self, input: &LoginRequest) -> Result<User, AuthError> {
        let invalid = || AuthError::Unauthorized("invalid credentials".into());

        let email = input.email.trim().to_lowercase();
        let user = self.find_user_by_email(&email)?.ok_or_else(invalid)?;

        if !user.active {
            return Err(invalid());
        }
        let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
        if !verify_password(&input.password, hash) {
            return Err(invalid());
        }

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.get_record("users", id)
    }

    /// Find a user by email via the indexed column.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE email = ?1",
                &[Value::Text(email.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match rows.first().and_then(|r| r.get_str("data")) {
            Some(data) => {
                let user = serde_json::from_str(data)
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Find a user by linked account (provider id, external user id).
    /// Used during OAuth callback to find or create a user.
    ///
    /// Scans active users; fine for small-to-medium user bases.
    pub fn find_user_by_linked_account(
        &self,
        provider_id: &str,
        external_id: &str,
    ) -> Result<Option<User>, AuthError> {
        let rows = self
            .sql
            .query("SELECT data FROM users WHERE active = 1", &[])
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        for row in &rows {
            if let Some(data) = row.get_str("data") {
                if let Ok(user) = serde_json::from_str::<User>(data) {
                    if user.linked_accounts.get(provider_id).map(|s| s.as_str())
                        == Some(external_id)
                    {
                        return Ok(Some(user));
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Hash a password with argon2id, producing a PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password attempt against a stored argon2id hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
