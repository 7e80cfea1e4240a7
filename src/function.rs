//! Function-per-request transport.
//!
//! Accepts a serverless-style HTTP event and produces a serverless-style
//! response. Routing is done by hand on the method and path, everything else
//! goes through [`BookmarkService`], so the rules match the HTTP server.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::{self, APIResponse};
use crate::model::BookmarkInput;
use crate::store::BookmarkService;

pub const DEFAULT_DATA_FILE: &str = "/tmp/bookmarks.json";
pub const MSG_FUNCTION_HEALTH: &str = "Bookmark Manager API is running as a function";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    pub path: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    fn json(status_code: u16, body: &APIResponse) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to encode response");
            String::from(r#"{"success":false,"error":"Internal server error"}"#)
        });
        FunctionResponse {
            status_code,
            headers: default_headers(),
            body,
        }
    }

    fn empty(status_code: u16) -> Self {
        FunctionResponse {
            status_code,
            headers: default_headers(),
            body: String::new(),
        }
    }

    /// Generic 500, used when the event itself cannot be handled.
    pub fn internal_error() -> Self {
        FunctionResponse::json(500, &APIResponse::failure(api::ERR_INTERNAL))
    }

    pub fn parsed_body(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

fn default_headers() -> HashMap<String, String> {
    [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "Content-Type"),
        ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
        ("Content-Type", "application/json"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Id of a single-bookmark path such as `/.netlify/functions/bookmarks/<id>`.
fn bookmark_id(path: &str) -> Option<&str> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() > 3 {
        parts.last().copied().filter(|id| !id.is_empty())
    } else {
        None
    }
}

fn parse_input(body: Option<&str>) -> Result<BookmarkInput, FunctionResponse> {
    serde_json::from_str(body.unwrap_or_default()).map_err(|e| {
        tracing::info!(error = %e, "rejected request body");
        FunctionResponse::json(400, &APIResponse::failure(api::ERR_BAD_BODY))
    })
}

fn store_failure(err: crate::error::StoreError) -> FunctionResponse {
    let (status, body) = api::from_store_error(err);
    FunctionResponse::json(status.as_u16(), &body)
}

/// Decodes a raw event and handles it. An event that does not decode is
/// answered with a 500 envelope rather than an error.
pub async fn handle_raw<S: BookmarkService>(store: &S, raw: &str) -> FunctionResponse {
    match serde_json::from_str::<FunctionEvent>(raw) {
        Ok(event) => handle(store, event).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to decode function event");
            FunctionResponse::internal_error()
        }
    }
}

pub async fn handle<S: BookmarkService>(store: &S, event: FunctionEvent) -> FunctionResponse {
    tracing::info!(method = %event.http_method, path = %event.path, "function invoked");

    let method = event.http_method.to_uppercase();
    let id = bookmark_id(&event.path);

    match method.as_str() {
        "OPTIONS" => FunctionResponse::empty(200),
        "GET" if event.path.contains("/health") => {
            FunctionResponse::json(200, &APIResponse::new_from_msg(MSG_FUNCTION_HEALTH))
        }
        "GET" => {
            let params = event.query_string_parameters.unwrap_or_default();
            let tag = params.get("tag").map(String::as_str);
            let bookmarks = match params.get("q") {
                Some(q) => store.search(q, tag).await,
                None => store.list(tag).await,
            };
            FunctionResponse::json(200, &APIResponse::list(bookmarks))
        }
        "POST" => {
            let input = match parse_input(event.body.as_deref()) {
                Ok(input) => input,
                Err(resp) => return resp,
            };
            match store.create(input).await {
                Ok(bookmark) => FunctionResponse::json(201, &APIResponse::one(&bookmark, api::MSG_CREATED)),
                Err(e) => store_failure(e),
            }
        }
        "PUT" | "DELETE" => {
            let Some(id) = id else {
                return FunctionResponse::json(400, &APIResponse::failure("Bookmark ID is required"));
            };

            if method == "DELETE" {
                return match store.delete(id).await {
                    Ok(bookmark) => FunctionResponse::json(200, &APIResponse::one(&bookmark, api::MSG_DELETED)),
                    Err(e) => store_failure(e),
                };
            }

            let input = match parse_input(event.body.as_deref()) {
                Ok(input) => input,
                Err(resp) => return resp,
            };
            match store.update(id, input).await {
                Ok(bookmark) => FunctionResponse::json(200, &APIResponse::one(&bookmark, api::MSG_UPDATED)),
                Err(e) => store_failure(e),
            }
        }
        _ => FunctionResponse::json(405, &APIResponse::failure("Method not allowed")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use serde_json::json;
    use tempfile::TempDir;

    const BASE: &str = "/.netlify/functions/bookmarks";

    async fn open_store() -> (Store, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("bookmarks.json"), None).await;
        (store, dir)
    }

    fn event(method: &str, path: &str, body: Option<serde_json::Value>) -> FunctionEvent {
        FunctionEvent {
            http_method: method.to_string(),
            path: path.to_string(),
            query_string_parameters: None,
            body: body.map(|b| b.to_string()),
        }
    }

    #[test]
    fn test_bookmark_id() {
        assert_eq!(bookmark_id("/.netlify/functions/bookmarks/abc"), Some("abc"));
        assert_eq!(bookmark_id("/.netlify/functions/bookmarks"), None);
        assert_eq!(bookmark_id("/.netlify/functions/bookmarks/"), None);
    }

    #[tokio::test]
    async fn test_options_and_health() {
        let (store, _dir) = open_store().await;

        let resp = handle(&store, event("OPTIONS", BASE, None)).await;
        assert_eq!(resp.status_code, 200);
        assert!(resp.body.is_empty());
        assert_eq!(resp.headers["Access-Control-Allow-Origin"], "*");

        let resp = handle(&store, event("GET", "/.netlify/functions/bookmarks/health", None)).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.parsed_body()["message"], MSG_FUNCTION_HEALTH);
    }

    #[tokio::test]
    async fn test_list_with_tag() {
        let (store, _dir) = open_store().await;

        let mut ev = event("GET", BASE, None);
        ev.query_string_parameters = Some(HashMap::from([("tag".to_string(), "Tools".to_string())]));
        let resp = handle(&store, ev).await;

        let body = resp.parsed_body();
        assert_eq!(resp.status_code, 200);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["id"], "seed5");
        assert_eq!(body["data"][1]["id"], "seed7");
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let (store, _dir) = open_store().await;

        let resp = handle(
            &store,
            event("POST", BASE, Some(json!({"url": "https://example.com", "title": "Example"}))),
        )
        .await;
        assert_eq!(resp.status_code, 201);
        let id = resp.parsed_body()["data"]["id"].as_str().unwrap().to_string();

        let path = format!("{}/{}", BASE, id);
        let resp = handle(
            &store,
            event("PUT", &path, Some(json!({"url": "https://example.org", "title": "Renamed"}))),
        )
        .await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.parsed_body()["data"]["title"], "Renamed");

        let resp = handle(&store, event("DELETE", &path, None)).await;
        assert_eq!(resp.status_code, 200);

        let resp = handle(&store, event("DELETE", &path, None)).await;
        assert_eq!(resp.status_code, 404);
        assert_eq!(resp.parsed_body()["error"], "Bookmark not found");
    }

    #[tokio::test]
    async fn test_errors() {
        let (store, _dir) = open_store().await;

        let resp = handle(&store, event("PUT", BASE, Some(json!({})))).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.parsed_body()["error"], "Bookmark ID is required");

        let resp = handle(&store, event("POST", BASE, Some(json!({"url": "not-a-url", "title": "x"})))).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.parsed_body()["details"][0]["param"], "url");

        let mut bad = event("POST", BASE, None);
        bad.body = Some("{ nope".to_string());
        assert_eq!(handle(&store, bad).await.status_code, 400);

        let resp = handle(&store, event("PATCH", BASE, None)).await;
        assert_eq!(resp.status_code, 405);
    }

    #[tokio::test]
    async fn test_wrong_field_types_are_validation_errors() {
        let (store, _dir) = open_store().await;

        let resp = handle(&store, event("POST", BASE, Some(json!({"url": "not-a-url", "tags": "web"})))).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(
            resp.parsed_body(),
            json!({
                "success": false,
                "error": "Validation failed",
                "details": [
                    {"param": "url", "msg": "Invalid URL format"},
                    {"param": "title", "msg": "Title is required"},
                    {"param": "tags", "msg": "Tags must be an array"}
                ]
            })
        );

        let path = format!("{}/seed2", BASE);
        let resp = handle(
            &store,
            event("PUT", &path, Some(json!({"url": "https://example.com", "title": "t", "tags": ["ok", 1]}))),
        )
        .await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.parsed_body()["details"][0]["msg"], "Tags must be lowercase strings");

        let resp = handle(&store, event("POST", BASE, Some(json!(["not", "an", "object"])))).await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.parsed_body()["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_handle_raw() {
        let (store, _dir) = open_store().await;

        let resp = handle_raw(&store, r#"{"httpMethod": "GET", "path": "/.netlify/functions/bookmarks"}"#).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.parsed_body()["count"], 7);

        let resp = handle_raw(&store, "not an event").await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.parsed_body(), json!({"success": false, "error": "Internal server error"}));
        assert_eq!(resp.headers["Content-Type"], "application/json");
    }
}
