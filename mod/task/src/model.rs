use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Task — the core data model, maps 1:1 to SQL columns
// ---------------------------------------------------------------------------

/// A single to-do item, owned by exactly one user for its entire lifetime.
///
/// All fields map directly to SQL columns — no JSON blob. `user_id` is set
/// once at creation from the authenticated session and never client-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    /// Never empty after a successful create or update.
    pub title: String,

    /// Serializes as `null` when absent — the wire shape promises the key.
    pub description: Option<String>,

    pub completed: bool,

    /// The owning principal. Immutable.
    pub user_id: String,

    /// RFC 3339, set at creation. Immutable.
    pub created_at: String,

    /// RFC 3339, refreshed on every successful mutation. Always >= created_at.
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Body for `POST /tasks`.
///
/// `title` is optional at the serde level so a missing field reaches the
/// service and comes back as a 400 VALIDATION_FAILED, not a body rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `PATCH /tasks/{id}` — partial update.
///
/// Omitted fields retain their prior value. For `description`, an explicit
/// `null` (clear) is distinguished from an omitted key (keep): the outer
/// Option is presence, the inner Option is the value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub completed: Option<bool>,
}

/// Wraps a deserialized value in `Some`, so a field that appears in the
/// body — even as `null` — is `Some(...)` and an absent field stays `None`
/// via `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
