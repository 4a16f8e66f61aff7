//! Startup checks — refuse to run with a config that would be unsafe
//! or unusable.

use tracing::warn;

use crate::config::ServerConfig;

/// The placeholder secret baked into development defaults. Refusing it
/// here keeps it out of any real deployment.
const DEV_SECRET: &str = "opentodo-dev-secret-change-me";

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.trim().is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.jwt.secret == DEV_SECRET {
        anyhow::bail!("JWT secret is the development placeholder. Set a real secret.");
    }
    if config.storage.data_dir.trim().is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.jwt.access_ttl_secs <= 0 || config.jwt.refresh_ttl_secs <= 0 {
        anyhow::bail!("Token TTLs must be positive.");
    }

    for p in &config.oauth.providers {
        if !p.has_credentials() {
            warn!(provider = %p.id, "OAuth provider has no credentials, skipping");
        }
    }

    Ok(())
}
