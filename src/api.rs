use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, StoreError};
use crate::model::Bookmark;

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub tag: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct APIResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl APIResponse {
    pub fn new_from_msg(msg: &str) -> Self {
        APIResponse {
            success: true,
            message: Some(msg.to_owned()),
            ..Default::default()
        }
    }

    pub fn list(bookmarks: Vec<Bookmark>) -> Self {
        let count = bookmarks.len();
        APIResponse {
            success: true,
            data: serde_json::to_value(bookmarks).ok(),
            count: Some(count),
            ..Default::default()
        }
    }

    pub fn one(bookmark: &Bookmark, msg: &str) -> Self {
        APIResponse {
            success: true,
            data: serde_json::to_value(bookmark).ok(),
            message: Some(msg.to_owned()),
            ..Default::default()
        }
    }

    pub fn failure(error: &str) -> Self {
        APIResponse {
            success: false,
            error: Some(error.to_owned()),
            ..Default::default()
        }
    }

    pub fn validation_failed(details: Vec<FieldError>) -> Self {
        APIResponse {
            details: Some(details),
            ..APIResponse::failure("Validation failed")
        }
    }
}

pub const MSG_HEALTH: &str = "Bookmark Manager API is running";
pub const MSG_CREATED: &str = "Bookmark created successfully";
pub const MSG_UPDATED: &str = "Bookmark updated successfully";
pub const MSG_DELETED: &str = "Bookmark deleted successfully";
pub const ERR_NOT_FOUND: &str = "Bookmark not found";
pub const ERR_INTERNAL: &str = "Internal server error";
pub const ERR_BAD_BODY: &str = "Invalid request body";

/// Status code and envelope for a failed store call.
pub fn from_store_error(err: StoreError) -> (StatusCode, APIResponse) {
    match err {
        StoreError::Validation(details) => (StatusCode::BAD_REQUEST, APIResponse::validation_failed(details)),
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, APIResponse::failure(ERR_NOT_FOUND)),
        StoreError::Internal(e) => {
            tracing::error!(error = format!("{:#}", e), "internal error");
            (StatusCode::INTERNAL_SERVER_ERROR, APIResponse::failure(ERR_INTERNAL))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_bookmarks;

    #[test]
    fn test_list_envelope() {
        let value = serde_json::to_value(APIResponse::list(seed_bookmarks())).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 7);
        assert_eq!(value["data"][0]["id"], "seed1");
        assert!(value.get("error").is_none());
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_validation_envelope() {
        let (status, body) = from_store_error(StoreError::Validation(vec![FieldError::new(
            "url",
            "Invalid URL format",
        )]));
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            value,
            serde_json::json!({
                "success": false,
                "error": "Validation failed",
                "details": [{"param": "url", "msg": "Invalid URL format"}]
            })
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let (status, body) = from_store_error(StoreError::Internal(anyhow::anyhow!("disk on fire")));
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value, serde_json::json!({"success": false, "error": "Internal server error"}));
    }
}
