use std::sync::Arc;

use opentodo_core::ServiceError;
use opentodo_sql::{Row, SQLStore, Value};

use crate::model::Task;

/// SQL schema for the tasks table.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    title       TEXT NOT NULL,
    description TEXT,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(user_id, created_at);
";

/// Persistent storage for tasks, backed by SQLStore (SQLite).
///
/// Every lookup that targets a single task filters by `id` AND `user_id`
/// in one statement. There is deliberately no fetch-by-id-alone: a task
/// owned by another user must be indistinguishable from a missing one.
pub struct TaskStore {
    db: Arc<dyn SQLStore>,
}

impl TaskStore {
    /// Create a new TaskStore and initialise the schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        db.exec_batch(SCHEMA)
            .map_err(|e| storage("task schema init", e))?;
        Ok(Self { db })
    }

    /// Insert a new task row.
    pub fn insert(&self, task: &Task) -> Result<(), ServiceError> {
        self.db
            .exec(
                "INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                &[
                    Value::Text(task.id.clone()),
                    Value::Text(task.user_id.clone()),
                    Value::Text(task.title.clone()),
                    Value::opt_text(task.description.as_deref()),
                    Value::bool(task.completed),
                    Value::Text(task.created_at.clone()),
                    Value::Text(task.updated_at.clone()),
                ],
            )
            .map_err(|e| storage("insert task", e))?;
        Ok(())
    }

    /// Get a task owned by `user_id`, or NotFound.
    pub fn get_owned(&self, id: &str, user_id: &str) -> Result<Task, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, user_id, title, description, completed, created_at, updated_at \
                 FROM tasks WHERE id = ?1 AND user_id = ?2",
                &[Value::Text(id.to_string()), Value::Text(user_id.to_string())],
            )
            .map_err(|e| storage("get task", e))?;

        let row = rows
            .first()
            .ok_or_else(|| not_found(id))?;

        row_to_task(row)
    }

    /// List all tasks owned by `user_id`, oldest first. No pagination.
    pub fn list_owned(&self, user_id: &str) -> Result<Vec<Task>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, user_id, title, description, completed, created_at, updated_at \
                 FROM tasks WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| storage("list tasks", e))?;

        rows.iter().map(row_to_task).collect()
    }

    /// Write back a mutated task. The WHERE clause re-checks ownership so a
    /// row can never be updated across owners, even if a caller constructed
    /// the Task by hand.
    pub fn update(&self, task: &Task) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "UPDATE tasks SET title = ?1, description = ?2, completed = ?3, updated_at = ?4 \
                 WHERE id = ?5 AND user_id = ?6",
                &[
                    Value::Text(task.title.clone()),
                    Value::opt_text(task.description.as_deref()),
                    Value::bool(task.completed),
                    Value::Text(task.updated_at.clone()),
                    Value::Text(task.id.clone()),
                    Value::Text(task.user_id.clone()),
                ],
            )
            .map_err(|e| storage("update task", e))?;

        if affected == 0 {
            return Err(not_found(&task.id));
        }
        Ok(())
    }

    /// Delete a task owned by `user_id`. Deleting an already-deleted id is
    /// NotFound, not idempotent success.
    pub fn delete_owned(&self, id: &str, user_id: &str) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                &[Value::Text(id.to_string()), Value::Text(user_id.to_string())],
            )
            .map_err(|e| storage("delete task", e))?;

        if affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

/// The single NotFound constructor — "doesn't exist" and "not yours" must
/// produce byte-identical errors.
fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("task '{id}' not found"))
}

/// Log a store failure with its operation context, then wrap it.
fn storage(op: &str, e: opentodo_sql::SQLError) -> ServiceError {
    tracing::error!(op, error = %e, "task store failure");
    ServiceError::Storage(format!("{op}: {e}"))
}

fn row_to_task(row: &Row) -> Result<Task, ServiceError> {
    let col = |name: &str| {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Internal(format!("tasks row missing column '{name}'")))
    };

    Ok(Task {
        id: col("id")?,
        user_id: col("user_id")?,
        title: col("title")?,
        description: row.get_str("description").map(str::to_string),
        completed: row.get_bool("completed").unwrap_or(false),
        created_at: col("created_at")?,
        updated_at: col("updated_at")?,
    })
}
