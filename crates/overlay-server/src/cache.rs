//! Cache-control policy per path class.
//!
//! Applied to `GET` and `HEAD` responses only:
//!
//! | Path | Headers |
//! |------|---------|
//! | `/static/...` | `public, max-age=N, s-maxage=N`, `Vary: Accept-Encoding` |
//! | `/`, `/admin`, `*.html` | `no-cache, no-store, must-revalidate`, `Pragma`, `Expires` |
//! | `/api/...` | `no-cache, no-store, must-revalidate` |
//!
//! The notification core does not depend on these headers.

use axum::extract::{Request, State};
use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA, VARY};
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// Which cache policy a request path falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Files under `/static/`.
    Static,
    /// HTML entry documents.
    Page,
    /// JSON API.
    Api,
    /// Anything else; headers are left alone.
    Other,
}

impl PathClass {
    /// Classify a request path.
    pub fn of(path: &str) -> Self {
        if path.starts_with("/static/") {
            Self::Static
        } else if path == "/" || path == "/admin" || path.ends_with(".html") {
            Self::Page
        } else if path.starts_with("/api/") {
            Self::Api
        } else {
            Self::Other
        }
    }
}

/// Middleware attaching cache headers. The state is the static `max-age`
/// in seconds.
pub async fn cache_headers(
    State(max_age_secs): State<u32>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let class = PathClass::of(request.uri().path());
    let mut response = next.run(request).await;

    if method != Method::GET && method != Method::HEAD {
        return response;
    }

    let headers = response.headers_mut();
    match class {
        PathClass::Static => {
            let value = format!("public, max-age={max_age_secs}, s-maxage={max_age_secs}");
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(CACHE_CONTROL, value);
            }
            headers
                .entry(VARY)
                .or_insert(HeaderValue::from_static("Accept-Encoding"));
        }
        PathClass::Page => {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
            headers.insert(EXPIRES, HeaderValue::from_static("0"));
        }
        PathClass::Api => {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
        }
        PathClass::Other => {}
    }

    response
}
