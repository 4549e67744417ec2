//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method and size checks, health
//! probes, the static mount, the creature queries, then 404.

use crate::api;
use crate::config::{AppState, HttpConfig};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue, SERVER};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

pub const LIVENESS_PATH: &str = "/healthz";
pub const READINESS_PATH: &str = "/readyz";

/// Request context encapsulating information needed for request processing
///
/// Owned, so the request itself can be dropped before any I/O.
pub struct RequestContext {
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range_header: Option<String>,
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let headers = req.headers();

    let ctx = RequestContext {
        path: req.uri().path().to_string(),
        is_head: method == Method::HEAD,
        if_none_match: header_string(headers, "if-none-match"),
        range_header: header_string(headers, "range"),
    };

    let access_log = state.cached_access_log.load(Ordering::Relaxed);
    let mut entry = access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            ctx.path.clone(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = format_version(req.version()).to_string();
        entry.referer = header_string(headers, "referer");
        entry.user_agent = header_string(headers, "user-agent");
        entry
    });

    let early = check_http_method(&method, state.config.http.enable_cors)
        .or_else(|| check_body_size(headers, state.config.http.max_body_size));
    let query = req.uri().query().map(ToString::to_string);
    drop(req);

    let mut response = match early {
        Some(resp) => resp,
        None => route_request(&ctx, query.as_deref(), &state).await,
    };
    apply_common_headers(&mut response, &state.config.http);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

const fn format_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = headers.get("content-length")?.to_str().ok()?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

/// Route request based on path and configuration
async fn route_request(
    ctx: &RequestContext,
    query: Option<&str>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let path = ctx.path.as_str();

    // 1. Health probes
    if path == LIVENESS_PATH {
        return http::build_health_response(StatusCode::OK, "ok");
    }
    if path == READINESS_PATH {
        return readiness(state).await;
    }

    // 2. Static mount
    let prefix = state.config.static_prefix();
    if is_under_prefix(path, prefix) {
        return static_files::serve_directory(ctx, &state.config.static_files.dir, prefix).await;
    }

    // 3. Creature queries
    if let Some(route) = api::match_route(path) {
        return api::dispatch(&route, &state.store, ctx.is_head).await;
    }

    // 4. Same route without the trailing slash
    if let Some(target) = path.strip_suffix('/').filter(|t| !t.is_empty()) {
        if api::match_route(target).is_some() {
            let location = match query {
                Some(q) => format!("{target}?{q}"),
                None => target.to_string(),
            };
            return http::build_redirect_response(&location);
        }
    }

    http::build_404_response(ctx.is_head)
}

fn is_under_prefix(path: &str, prefix: &str) -> bool {
    !prefix.is_empty()
        && path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Readiness: the store file opens and the table is readable
async fn readiness(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match state.store.ping().await {
        Ok(()) => http::build_health_response(StatusCode::OK, "ok"),
        Err(e) => {
            logger::log_warning(&format!("Readiness check failed: {e}"));
            http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}

/// Headers every response carries: `Server`, and CORS when enabled
fn apply_common_headers(response: &mut Response<Full<Bytes>>, http_config: &HttpConfig) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&http_config.server_name) {
        headers.insert(SERVER, server);
    }
    if http_config.enable_cors {
        headers.insert(
            "Access-Control-Allow-Origin",
            HeaderValue::from_static("*"),
        );
    }
}
