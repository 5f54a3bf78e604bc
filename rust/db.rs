use std::cmp::Ordering;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::store::{key_text, ContentStore, MediaStore, StoredObject};

/// Local SQLite mirror of the hosted tables and bucket, used when no remote
/// service is configured.
pub struct Database {
    conn: Connection,
    bucket: String,
}

impl Database {
    pub fn new(path: &str, bucket: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, bucket)
    }

    #[cfg(test)]
    pub fn in_memory(bucket: &str) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, bucket)
    }

    fn with_connection(conn: Connection, bucket: &str) -> Result<Self> {
        let db = Self {
            conn,
            bucket: bucket.to_string(),
        };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS content_rows (
              tbl TEXT NOT NULL,
              key TEXT NOT NULL,
              body TEXT NOT NULL,
              created_at TEXT NOT NULL,
              PRIMARY KEY (tbl, key)
            );

            CREATE TABLE IF NOT EXISTS media_objects (
              name TEXT PRIMARY KEY,
              content_type TEXT NOT NULL,
              data BLOB NOT NULL,
              created_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn next_id(&self, table: &str) -> Result<i64> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(CAST(key AS INTEGER)) FROM content_rows WHERE tbl = ?",
            params![table],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) + 1)
    }

    fn find_body(&self, table: &str, key: &str) -> Result<Option<Value>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM content_rows WHERE tbl = ? AND key = ?",
                params![table, key],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|body| serde_json::from_str(&body).context("Stored row is not valid JSON"))
            .transpose()
    }

    fn write_row(&self, table: &str, key: &str, row: &Value) -> Result<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        self.conn.execute(
            "INSERT INTO content_rows (tbl, key, body, created_at) VALUES (?, ?, ?, ?)",
            params![table, key, row.to_string(), now],
        )?;
        Ok(())
    }

    /// Reads an uploaded object back, with its content type.
    #[cfg(test)]
    pub fn read_object(&self, name: &str) -> Result<Option<(String, Vec<u8>)>> {
        Ok(self
            .conn
            .query_row(
                "SELECT content_type, data FROM media_objects WHERE name = ?",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM content_rows", [], |row| row.get(0))?;
        Ok(count == 0)
    }
}

fn compare_column(a: &Value, b: &Value, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

impl ContentStore for Database {
    async fn select(&self, table: &str, order_by: &str) -> Result<Vec<Value>> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM content_rows WHERE tbl = ? ORDER BY created_at")?;
        let bodies = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
        let mut rows = Vec::new();
        for body in bodies {
            rows.push(serde_json::from_str::<Value>(&body?).context("Stored row is not valid JSON")?);
        }
        rows.sort_by(|a, b| compare_column(a, b, order_by));
        Ok(rows)
    }

    async fn insert(&self, table: &str, key_column: &str, mut row: Value) -> Result<Value> {
        let object = row
            .as_object_mut()
            .ok_or_else(|| anyhow!("Row for {} must be a JSON object", table))?;
        let key = match object.get(key_column).and_then(key_text) {
            Some(key) => key,
            None if key_column == "id" => {
                let id = self.next_id(table)?;
                object.insert("id".to_string(), Value::from(id));
                id.to_string()
            }
            None => bail!("Row for {} is missing its {}", table, key_column),
        };
        self.write_row(table, &key, &row)
            .with_context(|| format!("Insert into {} failed for {} {}", table, key_column, key))?;
        Ok(row)
    }

    async fn update(&self, table: &str, _key_column: &str, key: &str, row: Value) -> Result<()> {
        let Some(mut stored) = self.find_body(table, key)? else {
            return Ok(());
        };
        if let (Some(target), Some(changes)) = (stored.as_object_mut(), row.as_object()) {
            for (column, value) in changes {
                target.insert(column.clone(), value.clone());
            }
        }
        self.conn.execute(
            "UPDATE content_rows SET body = ? WHERE tbl = ? AND key = ?",
            params![stored.to_string(), table, key],
        )?;
        Ok(())
    }

    async fn delete(&self, table: &str, _key_column: &str, key: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM content_rows WHERE tbl = ? AND key = ?",
            params![table, key],
        )?;
        Ok(())
    }

    async fn upsert(&self, table: &str, on_conflict: &str, rows: Vec<Value>) -> Result<()> {
        for row in rows {
            let key = row
                .get(on_conflict)
                .and_then(key_text)
                .ok_or_else(|| anyhow!("Row for {} is missing its {}", table, on_conflict))?;
            if self.find_body(table, &key)?.is_some() {
                self.update(table, on_conflict, &key, row).await?;
            } else {
                self.write_row(table, &key, &row)?;
            }
        }
        Ok(())
    }
}

impl MediaStore for Database {
    async fn list_objects(&self, limit: usize) -> Result<Vec<StoredObject>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, created_at FROM media_objects ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(StoredObject {
                name: row.get(0)?,
                created_at: row.get(1)?,
            })
        })?;
        let mut objects = Vec::new();
        for object in rows {
            objects.push(object?);
        }
        Ok(objects)
    }

    async fn upload_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        self.conn
            .execute(
                "INSERT INTO media_objects (name, content_type, data, created_at) VALUES (?, ?, ?, ?)",
                params![name, content_type, bytes, now],
            )
            .with_context(|| format!("Object {} already exists", name))?;
        Ok(())
    }

    async fn move_object(&self, from: &str, to: &str) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE media_objects SET name = ? WHERE name = ?",
                params![to, from],
            )
            .with_context(|| format!("Object {} already exists", to))?;
        if changed == 0 {
            bail!("Object {} not found", from);
        }
        Ok(())
    }

    async fn remove_objects(&self, names: &[String]) -> Result<()> {
        for name in names {
            self.conn
                .execute("DELETE FROM media_objects WHERE name = ?", params![name])?;
        }
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!("local-media://{}/{}", self.bucket, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn database() -> Database {
        Database::in_memory("testBucket").unwrap()
    }

    #[tokio::test]
    async fn insert_numbers_rows_per_table() {
        let db = database();
        let first = db
            .insert("punwarka_staff", "id", json!({ "name_en": "A" }))
            .await
            .unwrap();
        let second = db
            .insert("punwarka_staff", "id", json!({ "name_en": "B" }))
            .await
            .unwrap();
        let other = db
            .insert("punwarka_news", "id", json!({ "text_en": "C" }))
            .await
            .unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
        assert_eq!(other["id"], 1);
    }

    #[tokio::test]
    async fn natural_keys_are_unique() {
        let db = database();
        db.insert("punwarka_results", "year", json!({ "year": "2023-24" }))
            .await
            .unwrap();
        let duplicate = db
            .insert("punwarka_results", "year", json!({ "year": "2023-24" }))
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn update_patches_only_given_columns() {
        let db = database();
        db.insert("t", "id", json!({ "title_en": "Old", "img": "a.jpg" }))
            .await
            .unwrap();
        db.update("t", "id", "1", json!({ "title_en": "New" }))
            .await
            .unwrap();
        let rows = db.select("t", "id").await.unwrap();
        assert_eq!(rows, vec![json!({ "id": 1, "title_en": "New", "img": "a.jpg" })]);
    }

    #[tokio::test]
    async fn select_orders_by_column() {
        let db = database();
        for year in ["2024-25", "2022-23", "2023-24"] {
            db.insert("r", "year", json!({ "year": year })).await.unwrap();
        }
        let years: Vec<_> = db
            .select("r", "year")
            .await
            .unwrap()
            .into_iter()
            .map(|row| row["year"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(years, ["2022-23", "2023-24", "2024-25"]);
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let db = database();
        db.upsert("s", "key", vec![json!({ "key": "phone", "value": "1" })])
            .await
            .unwrap();
        db.upsert("s", "key", vec![json!({ "key": "phone", "value": "2" })])
            .await
            .unwrap();
        let rows = db.select("s", "key").await.unwrap();
        assert_eq!(rows, vec![json!({ "key": "phone", "value": "2" })]);
    }

    #[tokio::test]
    async fn media_objects_move_and_remove() {
        let db = database();
        db.upload_object("a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        db.upload_object("b.png", vec![4], "image/png").await.unwrap();

        assert!(db.move_object("a.png", "b.png").await.is_err());
        db.move_object("a.png", "c.png").await.unwrap();
        assert!(db.move_object("missing.png", "d.png").await.is_err());

        let (content_type, data) = db.read_object("c.png").unwrap().unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(data, vec![1, 2, 3]);

        db.remove_objects(&["b.png".to_string()]).await.unwrap();
        let names: Vec<_> = db
            .list_objects(100)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, ["c.png"]);
        assert_eq!(db.public_url("c.png"), "local-media://testBucket/c.png");
    }
}
