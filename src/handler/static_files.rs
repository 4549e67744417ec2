//! Static file serving module
//!
//! Serves image assets verbatim from one directory under the static prefix.
//! No index files and no directory listing: anything but a regular file
//! inside the directory is a 404.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Serve a file from `dir` for a request under `prefix`
pub async fn serve_directory(
    ctx: &RequestContext,
    dir: &str,
    prefix: &str,
) -> Response<Full<Bytes>> {
    match load_from_directory(dir, &ctx.path, prefix).await {
        Some((content, content_type)) => build_static_file_response(
            content,
            content_type,
            ctx.if_none_match.as_deref(),
            ctx.range_header.as_deref(),
            ctx.is_head,
        ),
        None => http::build_404_response(ctx.is_head),
    }
}

/// Map the request path to a relative file path, rejecting traversal
fn relative_file_path(path: &str, prefix: &str) -> Option<PathBuf> {
    let rest = path.strip_prefix(prefix)?.trim_start_matches('/');
    if rest.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(rest).ok()?;
    let relative = PathBuf::from(decoded.as_ref());

    if relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(relative)
    } else {
        None
    }
}

/// Load a static file from the directory
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    prefix: &str,
) -> Option<(Bytes, &'static str)> {
    let relative = relative_file_path(path, prefix)?;
    let file_path = Path::new(static_dir).join(&relative);

    let static_dir_canonical = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // Missing files are routine 404s, not worth a warning
    let file_path_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path escapes static directory: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }
    if !fs::metadata(&file_path_canonical).await.ok()?.is_file() {
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    Some((Bytes::from(content), content_type))
}

/// Build static file response with `ETag` and Range support
fn build_static_file_response(
    data: Bytes,
    content_type: &str,
    if_none_match: Option<&str>,
    range_header: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    match http::parse_range_header(range_header, data.len()) {
        RangeParseResult::Valid(range) => http::response::build_partial_response(
            &data,
            range,
            content_type,
            &etag,
            is_head,
        ),
        RangeParseResult::NotSatisfiable => http::build_416_response(data.len()),
        RangeParseResult::None => {
            http::response::build_file_response(data, content_type, &etag, is_head)
        }
    }
}
