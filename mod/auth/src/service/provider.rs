use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use opentodo_core::{new_id, now_rfc3339};
use opentodo_sql::Value;

use crate::model::{Provider, ProviderPublic, User};
use crate::service::{AuthError, AuthService};

/// User profile extracted from an OAuth provider after token exchange.
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
    pub provider_user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Lifetime of the `state` parameter round-tripped through the provider.
/// Long enough for the user to finish the consent screen.
const STATE_TTL_SECS: i64 = 600;

/// Claims signed into the OAuth `state` parameter. Stateless CSRF check:
/// the callback only proceeds if the state was minted by this server, for
/// this provider, within the last [`STATE_TTL_SECS`].
#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    provider: String,
    nonce: String,
    exp: i64,
}

impl AuthService {
    /// Look up an enabled provider by id.
    pub fn provider(&self, id: &str) -> Result<&Provider, AuthError> {
        self.providers
            .get(id)
            .ok_or_else(|| AuthError::NotFound(format!("provider '{id}' is not configured")))
    }

    /// The enabled providers, as presented to the sign-in page.
    pub fn list_providers(&self) -> Vec<ProviderPublic> {
        let mut items: Vec<ProviderPublic> =
            self.providers.values().map(ProviderPublic::from).collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Mint a signed `state` parameter for a provider redirect.
    pub fn oauth_state(&self, provider_id: &str) -> Result<String, AuthError> {
        self.provider(provider_id)?;

        let claims = StateClaims {
            provider: provider_id.to_string(),
            nonce: new_id(),
            exp: (chrono::Utc::now() + chrono::Duration::seconds(STATE_TTL_SECS)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("state encode failed: {e}")))
    }

    /// Verify a callback's `state` parameter before touching the code.
    pub fn verify_oauth_state(&self, provider_id: &str, state: &str) -> Result<(), AuthError> {
        let data = decode::<StateClaims>(
            state,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::Unauthorized("invalid or expired state parameter".into()))?;

        if data.claims.provider != provider_id {
            return Err(AuthError::Unauthorized(
                "state was issued for a different provider".into(),
            ));
        }
        Ok(())
    }

    /// Build the OAuth authorization URL for a provider.
    /// The caller should redirect the user's browser to this URL.
    pub fn oauth_authorize_url(&self, provider_id: &str, state: &str) -> Result<String, AuthError> {
        let provider = self.provider(provider_id)?;

        let scopes = provider.scopes.join(" ");
        let url = format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}&response_type=code",
            provider.auth_url,
            urlencoded(&provider.client_id),
            urlencoded(&provider.redirect_url),
            urlencoded(&scopes),
            urlencoded(state),
        );

        Ok(url)
    }

    /// Exchange an OAuth authorization code for user info.
    ///
    /// This performs:
    /// 1. POST to token_url to exchange code for access_token
    /// 2. GET to userinfo_url to fetch the user profile
    pub async fn oauth_callback(
        &self,
        provider_id: &str,
        code: &str,
    ) -> Result<OAuthUserInfo, AuthError> {
        let provider = self.provider(provider_id)?.clone();

        let client = reqwest::Client::new();
        let token_resp = client
            .post(&provider.token_url)
            .header("accept", "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &provider.client_id),
                ("client_secret", &provider.client_secret),
                ("redirect_uri", &provider.redirect_url),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("token exchange failed: {e}")))?;

        if !token_resp.status().is_success() {
            let status = token_resp.status();
            let body = token_resp.text().await.unwrap_or_default();
            return Err(AuthError::Internal(format!(
                "token exchange returned {status}: {body}"
            )));
        }

        let token_json: serde_json::Value = token_resp
            .json()
            .await
            .map_err(|e| AuthError::Internal(format!("token response parse failed: {e}")))?;

        let access_token = token_json["access_token"]
            .as_str()
            .ok_or_else(|| AuthError::Internal("missing access_token in response".into()))?;

        let userinfo_url = provider
            .userinfo_url
            .as_deref()
            .ok_or_else(|| AuthError::Internal("provider missing userinfo_url".into()))?;

        let userinfo_resp = client
            .get(userinfo_url)
            .header("user-agent", "opentodod")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("userinfo fetch failed: {e}")))?;

        if !userinfo_resp.status().is_success() {
            let status = userinfo_resp.status();
            let body = userinfo_resp.text().await.unwrap_or_default();
            return Err(AuthError::Internal(format!(
                "userinfo returned {status}: {body}"
            )));
        }

        let userinfo: serde_json::Value = userinfo_resp
            .json()
            .await
            .map_err(|e| AuthError::Internal(format!("userinfo parse failed: {e}")))?;

        // Different providers use different field names.
        let provider_user_id = extract_provider_user_id(&userinfo, provider_id).ok_or_else(|| {
            AuthError::Internal(format!("no user id in '{provider_id}' userinfo response"))
        })?;
        let name = userinfo["name"]
            .as_str()
            .or_else(|| userinfo["login"].as_str())
            .or_else(|| userinfo["display_name"].as_str())
            .unwrap_or("Unknown")
            .to_string();
        let email = userinfo["email"].as_str().map(|s| s.to_string());
        let avatar = userinfo["avatar_url"]
            .as_str()
            .or_else(|| userinfo["picture"].as_str())
            .or_else(|| userinfo["avatar"].as_str())
            .map(|s| s.to_string());

        Ok(OAuthUserInfo {
            provider_user_id,
            name,
            email,
            avatar,
        })
    }

    /// Find or create a user from OAuth callback info.
    /// If the user already exists (by linked account), refresh their
    /// profile fields. Otherwise create a new user with the linked account.
    pub fn find_or_create_oauth_user(
        &self,
        provider_id: &str,
        info: &OAuthUserInfo,
    ) -> Result<User, AuthError> {
        if let Some(mut user) =
            self.find_user_by_linked_account(provider_id, &info.provider_user_id)?
        {
            if !info.name.is_empty() {
                user.name = info.name.clone();
            }
            if info.email.is_some() {
                user.email = info.email.clone();
            }
            if info.avatar.is_some() {
                user.avatar = info.avatar.clone();
            }
            user.updated_at = now_rfc3339();

            let updated_at = user.updated_at.clone();
            self.update_record(
                "users",
                &user.id.clone(),
                &user,
                &[
                    ("email", Value::opt_text(user.email.as_deref())),
                    ("updated_at", Value::Text(updated_at)),
                ],
            )?;
            return Ok(user);
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: info.name.clone(),
            email: info.email.clone(),
            avatar: info.avatar.clone(),
            password_hash: None,
            active: true,
            linked_accounts: [(provider_id.to_string(), info.provider_user_id.clone())]
                .into_iter()
                .collect(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("email", Value::opt_text(user.email.as_deref())),
                ("active", Value::Integer(1)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        Ok(user)
    }
}

/// Extract the external user id from a provider's userinfo response.
fn extract_provider_user_id(userinfo: &serde_json::Value, provider_id: &str) -> Option<String> {
    match provider_id {
        "github" => userinfo["id"].as_i64().map(|id| id.to_string()),
        "google" => userinfo["sub"].as_str().map(|s| s.to_string()),
        _ => userinfo["id"]
            .as_str()
            .map(|s| s.to_string())
            .or_else(|| userinfo["id"].as_i64().map(|id| id.to_string()))
            .or_else(|| userinfo["sub"].as_str().map(|s| s.to_string())),
    }
}

/// Percent-encode a query component.
fn urlencoded(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(ch),
            ' ' => result.push('+'),
            _ => {
                let mut buf = [0u8; 4];
                let encoded = ch.encode_utf8(&mut buf);
                for byte in encoded.bytes() {
                    result.push('%');
                    result.push_str(&format!("{:02X}", byte));
                }
            }
        }
    }
    result
}
