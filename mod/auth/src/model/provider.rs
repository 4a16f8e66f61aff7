use serde::{Deserialize, Serialize};

/// An OAuth login provider, enumerated in the server configuration.
///
/// Providers are a static configuration object built once at startup —
/// there is no runtime provider CRUD. A provider is enabled iff both
/// client id and client secret are configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// Unique identifier (e.g. "github", "google").
    pub id: String,

    /// Display name.
    pub name: String,

    /// OAuth client id. May be blank in config — the provider is then
    /// skipped at startup.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret. Never returned in API responses.
    #[serde(default)]
    pub client_secret: String,

    /// Authorization URL.
    pub auth_url: String,

    /// Token exchange URL.
    pub token_url: String,

    /// User info URL (to fetch profile after token exchange).
    #[serde(default)]
    pub userinfo_url: Option<String>,

    /// OAuth scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Redirect URL after OAuth callback.
    pub redirect_url: String,
}

impl Provider {
    /// Whether this provider has usable credentials.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

/// Provider data returned in API responses — the sign-in button list.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPublic {
    pub id: String,
    pub name: String,
}

impl From<&Provider> for ProviderPublic {
    fn from(p: &Provider) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
        }
    }
}
