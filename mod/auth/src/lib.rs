//! Auth module — the session resolver.
//!
//! # Resources
//!
//! - **User** — identity with an optional password credential and linked
//!   OAuth accounts
//! - **Session** — JWT issuance record (refresh rotation, revocation)
//! - **Provider** — OAuth provider, static configuration built at startup
//!
//! Business modules never see this crate: the middleware injects an
//! `opentodo_core::Principal` extension and handlers extract that.
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, AuthConfig::default())?;
//! let router = module.routes(); // carries /auth/... paths
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use opentodo_core::Module;
use opentodo_sql::SQLStore;

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create a new AuthModule.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        config: AuthConfig,
    ) -> Result<Self, opentodo_core::ServiceError> {
        let service = AuthService::new(sql, config).map_err(opentodo_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
