use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (auth, task, ...) implements this trait to
/// register its API endpoints. The binary entry point collects all
/// modules and merges their routes into a single Router.
pub trait Module: Send + Sync {
    /// Module name, used for startup logging.
    fn name(&self) -> &str;

    /// Return the module's routes. Routes carry their own absolute paths
    /// (`/tasks`, `/auth/...`) and are merged, not nested.
    fn routes(&self) -> Router;
}
