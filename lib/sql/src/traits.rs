use crate::error::SQLError;

/// A dynamically-typed SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Convenience constructor: SQLite has no boolean type, booleans are
    /// stored as 0/1 integers.
    pub fn bool(b: bool) -> Value {
        Value::Integer(if b { 1 } else { 0 })
    }

    /// Convenience constructor: `None` maps to SQL NULL.
    pub fn opt_text(s: Option<&str>) -> Value {
        match s {
            Some(s) => Value::Text(s.to_string()),
            None => Value::Null,
        }
    }
}

/// A row returned from a SQL query — column name to value.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column value by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get an integer column value by name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Get a boolean column value by name (stored as 0/1).
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_i64(name).map(|i| i != 0)
    }
}

/// SQLStore provides a SQL execution interface backed by an embedded database.
pub trait SQLStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Execute a multi-statement script with no parameters.
    /// Used for schema initialization.
    fn exec_batch(&self, sql: &str) -> Result<(), SQLError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_bool_maps_to_integer() {
        assert_eq!(Value::bool(true), Value::Integer(1));
        assert_eq!(Value::bool(false), Value::Integer(0));
    }

    #[test]
    fn value_opt_text_maps_none_to_null() {
        assert_eq!(Value::opt_text(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::opt_text(None), Value::Null);
    }

    #[test]
    fn row_accessors() {
        let row = Row {
            columns: vec![
                ("id".into(), Value::Text("abc".into())),
                ("completed".into(), Value::Integer(1)),
            ],
        };
        assert_eq!(row.get_str("id"), Some("abc"));
        assert_eq!(row.get_i64("completed"), Some(1));
        assert_eq!(row.get_bool("completed"), Some(true));
        assert_eq!(row.get_str("missing"), None);
    }
}
