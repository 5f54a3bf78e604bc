use anyhow::{anyhow, Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::store::{ContentStore, MediaStore, StoredObject};

/// Client for the hosted tables (`/rest/v1`) and storage bucket
/// (`/storage/v1`) of a Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(url: &str, api_key: &str, bucket: &str) -> Result<Self> {
        let base = Url::parse(url).with_context(|| format!("Invalid SUPABASE_URL: {}", url))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("SUPABASE_URL must be an http(s) URL, got {}", url));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn table_url(&self, table: &str) -> Url {
        self.endpoint(["rest", "v1", table])
    }

    fn object_url(&self, name: &str) -> Url {
        self.endpoint(
            ["storage", "v1", "object", self.bucket.as_str()]
                .into_iter()
                .chain(name.split('/')),
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<String> {
        let resp = self
            .authed(request)
            .send()
            .await
            .with_context(|| format!("{} request failed", what))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("{} response read failed", what))?;

        if !status.is_success() {
            return Err(anyhow!("{} failed: {} - {}", what, status, body));
        }
        Ok(body)
    }
}

fn eq_filter(key: &str) -> String {
    format!("eq.{}", key)
}

impl ContentStore for SupabaseClient {
    async fn select(&self, table: &str, order_by: &str) -> Result<Vec<Value>> {
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*".to_string()), ("order", format!("{}.asc", order_by))]);
        let body = self.send(request, &format!("Select from {}", table)).await?;
        serde_json::from_str(&body).with_context(|| format!("Select from {} returned invalid JSON", table))
    }

    async fn insert(&self, table: &str, _key_column: &str, row: Value) -> Result<Value> {
        let request = self
            .http
            .post(self.table_url(table))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&[&row]);
        let body = self.send(request, &format!("Insert into {}", table)).await?;
        let mut stored: Vec<Value> = serde_json::from_str(&body)
            .with_context(|| format!("Insert into {} returned invalid JSON", table))?;
        // Row-level security may hide the inserted row from the caller.
        Ok(if stored.is_empty() { row } else { stored.swap_remove(0) })
    }

    async fn update(&self, table: &str, key_column: &str, key: &str, row: Value) -> Result<()> {
        let request = self
            .http
            .patch(self.table_url(table))
            .query(&[(key_column, eq_filter(key))])
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .json(&row);
        self.send(request, &format!("Update of {}", table)).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, key_column: &str, key: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.table_url(table))
            .query(&[(key_column, eq_filter(key))]);
        self.send(request, &format!("Delete from {}", table)).await?;
        Ok(())
    }

    async fn upsert(&self, table: &str, on_conflict: &str, rows: Vec<Value>) -> Result<()> {
        let request = self
            .http
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows);
        self.send(request, &format!("Upsert into {}", table)).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    sort_by: SortBy<'a>,
}

#[derive(Debug, Serialize)]
struct SortBy<'a> {
    column: &'a str,
    order: &'a str,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    name: String,
    #[serde(default)]
    created_at: Option<String>,
}

impl MediaStore for SupabaseClient {
    async fn list_objects(&self, limit: usize) -> Result<Vec<StoredObject>> {
        let request = self
            .http
            .post(self.endpoint(["storage", "v1", "object", "list", self.bucket.as_str()]))
            .json(&ListRequest {
                prefix: "",
                limit,
                offset: 0,
                sort_by: SortBy {
                    column: "created_at",
                    order: "desc",
                },
            });
        let body = self.send(request, "Bucket listing").await?;
        let entries: Vec<ObjectEntry> =
            serde_json::from_str(&body).context("Bucket listing returned invalid JSON")?;
        Ok(entries
            .into_iter()
            .map(|entry| StoredObject {
                name: entry.name,
                created_at: entry.created_at,
            })
            .collect())
    }

    async fn upload_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let request = self
            .http
            .post(self.object_url(name))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        self.send(request, &format!("Upload of {}", name)).await?;
        Ok(())
    }

    async fn move_object(&self, from: &str, to: &str) -> Result<()> {
        let request = self
            .http
            .post(self.endpoint(["storage", "v1", "object", "move"]))
            .json(&json!({
                "bucketId": self.bucket,
                "sourceKey": from,
                "destinationKey": to,
            }));
        self.send(request, &format!("Move of {}", from)).await?;
        Ok(())
    }

    async fn remove_objects(&self, names: &[String]) -> Result<()> {
        let request = self
            .http
            .delete(self.endpoint(["storage", "v1", "object", self.bucket.as_str()]))
            .json(&json!({ "prefixes": names }));
        self.send(request, "Object removal").await?;
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        self.endpoint(
            ["storage", "v1", "object", "public", self.bucket.as_str()]
                .into_iter()
                .chain(name.split('/')),
        )
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single HTTP request with `status` and `body`, handing back the
    /// raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(SupabaseClient::new("not a url", "key", "bucket").is_err());
        assert!(SupabaseClient::new("ftp://example.com", "key", "bucket").is_err());
    }

    #[test]
    fn public_urls_point_into_the_bucket() {
        let client =
            SupabaseClient::new("https://abc.supabase.co/", "key", "punwarkaschoolBucket").unwrap();
        assert_eq!(
            client.public_url("hero 1.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/punwarkaschoolBucket/hero%201.jpg"
        );
        assert_eq!(
            client.table_url("punwarka_events").as_str(),
            "https://abc.supabase.co/rest/v1/punwarka_events"
        );
    }

    #[tokio::test]
    async fn insert_returns_the_stored_row() {
        let (url, server) = serve_once("201 Created", r#"[{"id":42,"title_en":"Sports Day"}]"#).await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        let stored = client
            .insert("punwarka_events", "id", json!({ "title_en": "Sports Day" }))
            .await
            .unwrap();
        assert_eq!(stored["id"], 42);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /rest/v1/punwarka_events "));
        assert!(request.to_lowercase().contains("prefer: return=representation"));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
        assert!(request.contains(r#"[{"title_en":"Sports Day"}]"#));
    }

    #[tokio::test]
    async fn update_filters_on_the_key_column() {
        let (url, server) = serve_once("204 No Content", "").await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        client
            .update("punwarka_results", "year", "2023-24", json!({ "class10": {} }))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("PATCH /rest/v1/punwarka_results?year=eq.2023-24 "));
    }

    #[tokio::test]
    async fn select_orders_by_the_given_column() {
        let (url, server) = serve_once("200 OK", r#"[{"year":"2023-24"}]"#).await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        let rows = client.select("punwarka_results", "year").await.unwrap();
        assert_eq!(rows[0]["year"], "2023-24");

        let request = server.await.unwrap();
        let line = request.lines().next().unwrap();
        assert!(line.starts_with("GET /rest/v1/punwarka_results?"));
        assert!(line.contains("select=*") || line.contains("select=%2A"));
        assert!(line.contains("order=year.asc"));
        assert!(request.to_lowercase().contains("apikey: secret"));
    }

    #[tokio::test]
    async fn upsert_merges_on_the_conflict_column() {
        let (url, server) = serve_once("201 Created", "").await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        client
            .upsert(
                "punwarka_settings",
                "key",
                vec![json!({ "key": "contact_phone", "value": "+91 1" })],
            )
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /rest/v1/punwarka_settings?on_conflict=key "));
        assert!(request
            .to_lowercase()
            .contains("prefer: resolution=merge-duplicates,return=minimal"));
        assert!(request.contains(r#"[{"key":"contact_phone","value":"+91 1"}]"#));
    }

    #[tokio::test]
    async fn upload_posts_raw_bytes_without_overwriting() {
        let (url, server) = serve_once("200 OK", r#"{"Key":"bucket/x1.png"}"#).await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        client
            .upload_object("x1.png", b"PNGDATA".to_vec(), "image/png")
            .await
            .unwrap();

        let request = server.await.unwrap();
        let lower = request.to_lowercase();
        assert!(request.starts_with("POST /storage/v1/object/bucket/x1.png "));
        assert!(lower.contains("content-type: image/png"));
        assert!(lower.contains("x-upsert: false"));
        assert!(request.ends_with("\r\n\r\nPNGDATA"));
    }

    #[tokio::test]
    async fn move_names_bucket_source_and_destination() {
        let (url, server) = serve_once("200 OK", r#"{"message":"Successfully moved"}"#).await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        client.move_object("a.jpg", "campus.jpg").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /storage/v1/object/move "));
        assert!(request.contains(r#""bucketId":"bucket""#));
        assert!(request.contains(r#""sourceKey":"a.jpg""#));
        assert!(request.contains(r#""destinationKey":"campus.jpg""#));
    }

    #[tokio::test]
    async fn removal_deletes_by_prefix_list() {
        let (url, server) = serve_once("200 OK", "[]").await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        client
            .remove_objects(&["a.jpg".to_string(), "b.jpg".to_string()])
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /storage/v1/object/bucket "));
        assert!(request.contains(r#"{"prefixes":["a.jpg","b.jpg"]}"#));
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let (url, server) = serve_once("409 Conflict", r#"{"message":"duplicate key"}"#).await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        let err = client
            .delete("punwarka_staff", "id", "3")
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("409"));
        assert!(err.contains("duplicate key"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn listing_parses_object_names() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"name":"b.jpg","created_at":"2024-05-02T00:00:00Z"},{"name":".emptyFolderPlaceholder"}]"#,
        )
        .await;
        let client = SupabaseClient::new(&url, "secret", "bucket").unwrap();

        let objects = client.list_objects(100).await.unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "b.jpg");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /storage/v1/object/list/bucket "));
        assert!(request.contains(r#""sortBy":{"column":"created_at","order":"desc"}"#));
    }
}
