//! Task module — per-user to-do items.
//!
//! The only component that touches the task table. Enforces the ownership
//! contract: a task is visible, mutable, and deletable only through
//! requests authenticated as its owning user, and a task owned by someone
//! else is indistinguishable from one that does not exist.

pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;
use opentodo_core::Module;
use opentodo_sql::SQLStore;

use service::TaskService;

/// Task module implementing the Module trait.
pub struct TaskModule {
    service: Arc<TaskService>,
}

impl TaskModule {
    /// Create the task module and initialise storage.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, opentodo_core::ServiceError> {
        Ok(Self {
            service: Arc::new(TaskService::new(db)?),
        })
    }

    /// Get a reference to the underlying TaskService.
    pub fn service(&self) -> &Arc<TaskService> {
        &self.service
    }
}

impl Module for TaskModule {
    fn name(&self) -> &str {
        "task"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
