use anyhow::Result;
use serde_json::Value;

/// Row-level access to the named content tables.
///
/// Rows travel as JSON objects in the remote column layout. Keys are passed as
/// text and matched with equality on `key_column`.
pub trait ContentStore {
    /// All rows of `table`, ascending by `order_by`.
    async fn select(&self, table: &str, order_by: &str) -> Result<Vec<Value>>;

    /// Inserts one row and returns it as stored (with any generated key).
    async fn insert(&self, table: &str, key_column: &str, row: Value) -> Result<Value>;

    /// Overwrites the columns present in `row` on the row whose `key_column`
    /// equals `key`.
    async fn update(&self, table: &str, key_column: &str, key: &str, row: Value) -> Result<()>;

    async fn delete(&self, table: &str, key_column: &str, key: &str) -> Result<()>;

    /// Inserts or replaces each row, matching on `on_conflict`.
    async fn upsert(&self, table: &str, on_conflict: &str, rows: Vec<Value>) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub name: String,
    pub created_at: Option<String>,
}

/// The media bucket.
pub trait MediaStore {
    /// Newest first.
    async fn list_objects(&self, limit: usize) -> Result<Vec<StoredObject>>;

    async fn upload_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn move_object(&self, from: &str, to: &str) -> Result<()>;

    async fn remove_objects(&self, names: &[String]) -> Result<()>;

    fn public_url(&self, name: &str) -> String;
}

/// Text form of a key column value, as used in equality filters.
pub fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
