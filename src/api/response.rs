// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::error::ApiError;
use crate::http;
use crate::logger;

/// Build JSON response
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => http::build_json_response(status, json, is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            http::build_500_response(is_head)
        }
    }
}

/// Map a lookup failure to its response; server faults are logged, not exposed
pub fn error_response(err: &ApiError, is_head: bool) -> Response<Full<Bytes>> {
    match err {
        ApiError::NotFound(detail) => http::build_detail_response(err.status(), detail, is_head),
        ApiError::Store(source) => {
            logger::log_error(&format!("Query failed: {source}"));
            http::build_500_response(is_head)
        }
    }
}

/// Turn a handler result into a response
pub fn into_response<T: Serialize>(
    result: Result<T, ApiError>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match result {
        Ok(body) => json_response(StatusCode::OK, &body, is_head),
        Err(err) => error_response(&err, is_head),
    }
}
