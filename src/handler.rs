use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use tracing::info;

use crate::api::{self, APIResponse, QueryParams};
use crate::model::BookmarkInput;
use crate::store::{BookmarkService, Store};
use crate::respond;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(APIResponse::new_from_msg(api::MSG_HEALTH))
}

pub async fn get_bookmarks(State(state): State<AppState>, Query(qp): Query<QueryParams>) -> Response {
    let tag = qp.tag.as_deref();
    let bookmarks = match qp.q.as_deref() {
        Some(q) => state.store.search(q, tag).await,
        None => state.store.list(tag).await,
    };

    info!(count = bookmarks.len(), tag = ?tag, "got bookmarks");
    respond(StatusCode::OK, APIResponse::list(bookmarks))
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    payload: Result<Json<BookmarkInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(input) => input,
        Err(e) => return rejected(e),
    };

    match state.store.create(input).await {
        Ok(bookmark) => respond(StatusCode::CREATED, APIResponse::one(&bookmark, api::MSG_CREATED)),
        Err(e) => {
            info!(error = %e, "failed to create bookmark");
            let (status, body) = api::from_store_error(e);
            respond(status, body)
        }
    }
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BookmarkInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(input) => input,
        Err(e) => return rejected(e),
    };

    match state.store.update(&id, input).await {
        Ok(bookmark) => respond(StatusCode::OK, APIResponse::one(&bookmark, api::MSG_UPDATED)),
        Err(e) => {
            info!(id = %id, error = %e, "failed to update bookmark");
            let (status, body) = api::from_store_error(e);
            respond(status, body)
        }
    }
}

pub async fn delete_bookmark(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete(&id).await {
        Ok(bookmark) => respond(StatusCode::OK, APIResponse::one(&bookmark, api::MSG_DELETED)),
        Err(e) => {
            info!(id = %id, error = %e, "failed to delete bookmark");
            let (status, body) = api::from_store_error(e);
            respond(status, body)
        }
    }
}

fn rejected(e: JsonRejection) -> Response {
    info!(error = %e, "rejected request body");
    respond(StatusCode::BAD_REQUEST, APIResponse::failure(api::ERR_BAD_BODY))
}
