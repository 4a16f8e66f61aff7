use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use opentodo_core::new_id;
use opentodo_sql::Value;

use crate::model::{Claims, Session, TokenPair, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Issue a JWT token pair (access + refresh) for a user.
    ///
    /// Creates a session record and returns signed tokens. Both tokens
    /// carry the same session id; revoking it invalidates both.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let access_exp = now + chrono::Duration::seconds(self.config.access_token_ttl);
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_token_ttl);

        let access_claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
        };

        let refresh_claims = Claims {
            exp: refresh_exp.timestamp(),
            ..access_claims.clone()
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {e}")))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {e}")))?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: refresh_exp.to_rfc3339(),
            revoked: false,
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::Integer(0)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Verify and decode a JWT access token.
    /// Returns the claims if the signature is valid, the token is not
    /// expired, and the session has not been revoked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {e}")))?;

        let claims = token_data.claims;

        let session: Session = self
            .get_record("sessions", &claims.sid)
            .map_err(|_| AuthError::Unauthorized("unknown session".into()))?;
        if session.revoked {
            return Err(AuthError::Unauthorized("session has been revoked".into()));
        }

        Ok(claims)
    }

    /// Refresh an access token using a refresh token.
    /// Validates the refresh token, revokes the old session, and issues a
    /// new pair (refresh tokens are single-use).
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verify_token(refresh_token)?;

        let user: User = self
            .get_record("users", &claims.sub)
            .map_err(|_| AuthError::Unauthorized("user not found".into()))?;

        if !user.active {
            return Err(AuthError::Unauthorized("user is deactivated".into()));
        }

        self.revoke_session(&claims.sid)?;
        self.issue_tokens(&user)
    }

    /// Revoke a session (both tokens become invalid).
    pub fn revoke_session(&self, session_id: &str) -> Result<(), AuthError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;

        self.update_record(
            "sessions",
            session_id,
            &session,
            &[("revoked", Value::Integer(1))],
        )?;

        Ok(())
    }
}
