//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: captures the request into an
//! explicit context, dispatches it and writes the access log.

use crate::config::AppState;
use crate::handler::static_files;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{ACCEPT_ENCODING, CONTENT_ENCODING, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Everything the server needs to know about one request
///
/// Owned, so the routing code never touches the hyper request itself.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// URL path, still percent-encoded
    pub path: String,
    /// Query string, ignored for file resolution
    pub query: Option<String>,
    pub method: Method,
    pub is_head: bool,
    pub version: Version,
    pub accept_encoding: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub remote_addr: SocketAddr,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, remote_addr: SocketAddr) -> Self {
        let header = |name: hyper::header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            method: req.method().clone(),
            is_head: req.method() == Method::HEAD,
            version: req.version(),
            accept_encoding: header(ACCEPT_ENCODING),
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
            remote_addr,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req, remote_addr);

    let response = route_request(&ctx, &state).await;

    if state.config.logging.access_log {
        log_access(&ctx, &response, started, &state.config.logging.access_log_format);
    }
    Ok(response)
}

/// Route request: every method resolves the same way, HEAD drops the body
pub async fn route_request(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    static_files::serve(ctx, state).await
}

fn log_access(
    ctx: &RequestContext,
    response: &Response<Full<Bytes>>,
    started: Instant,
    format: &str,
) {
    let mut entry = AccessLogEntry::new(
        ctx.remote_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.path.clone(),
    );
    entry.query.clone_from(&ctx.query);
    entry.http_version = version_label(ctx.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.content_encoding = response
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry.referer.clone_from(&ctx.referer);
    entry.user_agent.clone_from(&ctx.user_agent);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, format);
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
