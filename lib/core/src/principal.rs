//! Authenticated principal for business modules.
//!
//! Business modules do NOT depend on any specific auth module. They only
//! know this extractor. The auth middleware (injected at startup) verifies
//! credentials and inserts a `Principal` into the request extensions; a
//! handler that extracts one gets a 401 for free when it is absent.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::ServiceError;

/// The authenticated user id associated with a request.
#[derive(Debug, Clone)]
pub struct Principal(pub String);

impl Principal {
    /// The owning user id as a string slice.
    pub fn user_id(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("authentication required".into()))
    }
}
