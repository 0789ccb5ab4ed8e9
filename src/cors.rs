//! CORS policy for the HTTP transport.
//!
//! Browser-based MCP clients (inspectors, playgrounds) call `/sse`,
//! `/messages` and `/mcp` cross-origin. By default only loopback origins
//! are allowed; `--cors permissive` opens the endpoints to any origin for
//! public deployments.

use http::{header::HeaderValue, HeaderName, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use url::{Host, Url};

/// Headers accepted on cross-origin requests
pub const ALLOWED_HEADERS: [HeaderName; 3] = [
    http::header::CONTENT_TYPE,
    http::header::ACCEPT,
    http::header::AUTHORIZATION,
];

/// Methods accepted on cross-origin requests
pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// Preflight cache lifetime
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// Which origins may call the HTTP endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CorsPolicy {
    /// `localhost`, `127.0.0.1` and `[::1]` on any port
    #[default]
    Localhost,
    /// Any origin, any header
    Permissive,
}

/// Build the tower-http layer for `policy`
pub fn cors_layer(policy: CorsPolicy) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .max_age(Duration::from_secs(DEFAULT_MAX_AGE_SECS));

    match policy {
        CorsPolicy::Localhost => layer
            .allow_origin(AllowOrigin::predicate(|origin, _| {
                is_localhost_origin(origin)
            }))
            .allow_headers(ALLOWED_HEADERS),
        CorsPolicy::Permissive => layer.allow_origin(Any).allow_headers(Any),
    }
}

/// Whether `origin` is an http(s) loopback origin.
///
/// Only the exact host names count, so `http://localhost.evil.com` and
/// `http://127.0.0.1.nip.io` are rejected.
pub fn is_localhost_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let Ok(url) = Url::parse(origin) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
