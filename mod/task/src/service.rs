use std::sync::Arc;

use opentodo_core::{ServiceError, new_id, now_rfc3339};
use opentodo_sql::SQLStore;

use crate::model::{CreateTaskRequest, Task, UpdateTaskRequest};
use crate::store::TaskStore;

/// The Task Service — enforces ownership and validation around task
/// mutations. The only component that touches the task store.
///
/// Holds no in-process mutable state between requests; every operation
/// re-reads current state from the store, so concurrent updates by the
/// owner resolve last-write-wins.
pub struct TaskService {
    store: TaskStore,
}

impl TaskService {
    /// Create the service, initialising storage.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        Ok(Self {
            store: TaskStore::new(db)?,
        })
    }

    /// All tasks owned by the principal, oldest first.
    pub fn list(&self, principal: &str) -> Result<Vec<Task>, ServiceError> {
        self.store.list_owned(principal)
    }

    /// Create a task owned by the principal. One new row; `completed`
    /// starts false and `created_at == updated_at`.
    pub fn create(&self, principal: &str, req: CreateTaskRequest) -> Result<Task, ServiceError> {
        let title = validate_title(req.title.as_deref())?;

        let now = now_rfc3339();
        let task = Task {
            id: new_id(),
            title,
            description: req.description,
            completed: false,
            user_id: principal.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.store.insert(&task)?;
        Ok(task)
    }

    /// Apply a partial update to a task owned by the principal.
    ///
    /// Omitted fields keep their prior value; `description` set to null
    /// clears it. `updated_at` is refreshed even for an empty patch.
    pub fn update(
        &self,
        principal: &str,
        task_id: &str,
        patch: UpdateTaskRequest,
    ) -> Result<Task, ServiceError> {
        // Single lookup filtered by both id and owner — never fetch by id
        // alone and check ownership after.
        let mut task = self.store.get_owned(task_id, principal)?;

        if let Some(title) = patch.title {
            task.title = validate_title(Some(&title))?;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = now_rfc3339();

        self.store.update(&task)?;
        Ok(task)
    }

    /// Remove a task owned by the principal. Permanent; a second delete of
    /// the same id is NotFound.
    pub fn delete(&self, principal: &str, task_id: &str) -> Result<(), ServiceError> {
        self.store.delete_owned(task_id, principal)
    }
}

/// Title must be present and non-blank. Returns the trimmed-checked title
/// as stored (original spacing preserved).
fn validate_title(title: Option<&str>) -> Result<String, ServiceError> {
    match title {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        _ => Err(ServiceError::Validation("title must not be empty".into())),
    }
}
