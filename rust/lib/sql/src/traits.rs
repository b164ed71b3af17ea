use crate::error::SQLError;

/// A dynamically-typed SQL parameter value.
///
/// Telemetry rows are integers, reals and RFC 3339 text; there is no
/// blob storage anywhere in this system.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
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

    /// Get a real column value by name.
    ///
    /// Integer values widen to f64, covering expression columns that
    /// land in integer storage class.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Value::Real(f)) => Some(*f),
            Some(Value::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }
}

/// SQLStore provides a SQL execution interface backed by an embedded database.
pub trait SQLStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement (UPDATE/DELETE/DDL) and return affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Execute an INSERT and return the id the database assigned
    /// (SQLite `last_insert_rowid`). Device and reading ids are
    /// integer autoincrement, so inserts go through this instead of
    /// [`SQLStore::exec`].
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64, SQLError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lookup_by_name() {
        let row = Row {
            columns: vec![
                ("id".to_string(), Value::Integer(3)),
                ("name".to_string(), Value::Text("Bridge North".to_string())),
                ("latitude".to_string(), Value::Real(60.17)),
                ("address".to_string(), Value::Null),
            ],
        };
        assert_eq!(row.get_i64("id"), Some(3));
        assert_eq!(row.get_str("name"), Some("Bridge North"));
        assert_eq!(row.get_f64("latitude"), Some(60.17));
        assert_eq!(row.get("address"), Some(&Value::Null));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn get_f64_widens_integers() {
        let row = Row {
            columns: vec![("humidity".to_string(), Value::Integer(55))],
        };
        assert_eq!(row.get_f64("humidity"), Some(55.0));
    }
}
