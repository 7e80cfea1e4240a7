use crate::api::APIResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod function;
pub mod handler;
pub mod model;
pub mod routes;
pub mod seed;
pub mod store;
pub mod validation;

pub fn respond(status: StatusCode, body: APIResponse) -> Response {
    (status, Json(body)).into_response()
}

/// `err` and each of its sources, joined with ": ".
pub fn unpack_error(err: &(dyn Error + 'static)) -> String {
    std::iter::successors(Some(err), |&e| e.source())
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

/// JSON logs, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
}
