//! Server-side configuration.
//!
//! Read from a TOML file, e.g. `/etc/opentodo/prod.toml`:
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//!
//! [storage]
//! data_dir = "/var/lib/opentodo"
//!
//! [jwt]
//! secret = "..."
//! access_ttl_secs = 86400
//! refresh_ttl_secs = 604800
//!
//! [[oauth.providers]]
//! id = "github"
//! name = "GitHub"
//! client_id = "..."
//! client_secret = "..."
//! auth_url = "https://github.com/login/oauth/authorize"
//! token_url = "https://github.com/login/oauth/access_token"
//! userinfo_url = "https://api.github.com/user"
//! scopes = ["read:user", "user:email"]
//! redirect_url = "http://localhost:8080/auth/callback/github"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use auth::model::Provider;

/// Server configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,

    pub storage: StorageConfig,

    pub jwt: JwtConfig,

    #[serde(default)]
    pub oauth: OAuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Listen address. The `--listen` CLI flag takes precedence.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// JWT signing secret.
    pub secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,

    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
}

fn default_access_ttl() -> i64 {
    86400 // 24h
}

fn default_refresh_ttl() -> i64 {
    604800 // 7 days
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfig {
    /// OAuth providers. Entries missing credentials are skipped at startup.
    #[serde(default)]
    pub providers: Vec<Provider>,
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// A bare name resolves to `/etc/opentodo/<name>.toml`; anything
    /// containing `/` or `.` is treated as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/opentodo/{name_or_path}.toml"))
        }
    }

    /// Load configuration from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
