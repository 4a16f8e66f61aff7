//! Embedded relational storage for opentodo.
//!
//! Modules own their schemas and SQL text; this crate only provides the
//! [`SQLStore`] trait over dynamically typed [`Value`]/[`Row`], and the
//! rusqlite-backed [`SqliteStore`] that the server opens at startup.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::SQLError;
pub use sqlite::SqliteStore;
pub use traits::{Row, SQLStore, Value};
