use std::any::Any;

use axum::{
    Router,
    http::{Method, StatusCode},
    response::Response,
    routing::{get, put},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};

use crate::api::{self, APIResponse};
use crate::handler::{self, AppState};
use crate::respond;

pub fn routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handler::healthcheck))
        .route("/bookmarks", get(handler::get_bookmarks).post(handler::create_bookmark))
        .route(
            "/bookmarks/:id",
            put(handler::update_bookmark).delete(handler::delete_bookmark),
        );

    with_layers(router).with_state(state)
}

/// CORS on every response, and a JSON 500 when a handler panics.
fn with_layers<S: Clone + Send + Sync + 'static>(router: Router<S>) -> Router<S> {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AnyOrigin);

    router.layer(CatchPanicLayer::custom(internal_error)).layer(cors)
}

fn internal_error(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(error = %detail, "handler panicked");
    respond(StatusCode::INTERNAL_SERVER_ERROR, APIResponse::failure(api::ERR_INTERNAL))
}
