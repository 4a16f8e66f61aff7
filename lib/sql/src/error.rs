use thiserror::Error;

/// Errors surfaced by the SQL layer.
///
/// Variants carry the underlying rusqlite message as text; callers wrap
/// them into their own error types rather than matching on the cause.
#[derive(Error, Debug)]
pub enum SQLError {
    /// Opening the database file or applying connection pragmas failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A SELECT failed to prepare, bind, or decode its rows.
    #[error("query error: {0}")]
    Query(String),

    /// A write statement or schema script failed. Includes constraint
    /// violations (UNIQUE et al.), which callers sniff from the message.
    #[error("execution error: {0}")]
    Execution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_prefixed_by_layer() {
        assert_eq!(
            SQLError::Connection("locked".into()).to_string(),
            "connection error: locked"
        );
        assert_eq!(
            SQLError::Query("no such table".into()).to_string(),
            "query error: no such table"
        );
        assert_eq!(
            SQLError::Execution("UNIQUE constraint failed".into()).to_string(),
            "execution error: UNIQUE constraint failed"
        );
    }
}
