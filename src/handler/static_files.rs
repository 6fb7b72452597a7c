//! Static file serving module
//!
//! Resolves the request to a file, reads it, negotiates compression and
//! builds the response.

use crate::config::AppState;
use crate::handler::{RequestContext, ServeError};
use crate::http::compress::{self, CompressError};
use crate::http::{self, mime};
use crate::logger;
use crate::routing;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve the file addressed by `ctx`, or the matching 400/404
pub async fn serve(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    let server_name = &state.config.http.server_name;
    match load_file(ctx, state).await {
        Ok((path, data)) => build_static_file_response(ctx, state, &path, data).await,
        Err(e) => {
            if e.is_fault() {
                logger::log_error(&e.to_string());
            } else {
                logger::log_debug(&format!("{} -> {}", ctx.path, e));
            }
            if e.status() == hyper::StatusCode::BAD_REQUEST {
                logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
                http::build_400_response(server_name, ctx.is_head)
            } else {
                http::build_404_response(server_name, ctx.is_head)
            }
        }
    }
}

/// A regular file under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFile {
    /// Path as addressed by the request; its extension drives the headers
    pub path: PathBuf,
    /// Symlink-resolved path that passed the containment check; read from here
    pub real: PathBuf,
}

/// Map the request path to a regular file under the root
pub async fn locate(ctx: &RequestContext, state: &AppState) -> Result<LocatedFile, ServeError> {
    let candidate = match state.aliases.resolve(&ctx.path, &state.root) {
        Some(aliased) => aliased,
        None => routing::resolve_under_root(&state.root, &ctx.path)?,
    };

    let Some(real) = routing::contained_target(&state.root, &candidate).await? else {
        return Err(ServeError::NotFound(ctx.path.clone()));
    };

    match fs::metadata(&real).await {
        Ok(meta) if meta.is_file() => Ok(LocatedFile {
            path: candidate,
            real,
        }),
        _ => Err(ServeError::NotFound(ctx.path.clone())),
    }
}

/// Locate and read the whole file, bounded by the configured read timeout
///
/// The bytes come from the checked canonical path, so a symlink swapped after
/// the containment check is not followed. The returned path is the addressed one.
pub async fn load_file(
    ctx: &RequestContext,
    state: &AppState,
) -> Result<(PathBuf, Bytes), ServeError> {
    let LocatedFile { path, real } = locate(ctx, state).await?;

    match tokio::time::timeout(state.read_timeout, fs::read(&real)).await {
        Ok(Ok(data)) => Ok((path, Bytes::from(data))),
        Ok(Err(source)) => Err(ServeError::Unreadable {
            path: real.display().to_string(),
            source,
        }),
        Err(_) => Err(ServeError::ReadTimeout(real.display().to_string())),
    }
}

/// Compress `data` when the client and the file type both allow it
///
/// Returns the body to send and whether it is gzip-encoded.
pub async fn negotiate_encoding(
    ctx: &RequestContext,
    state: &AppState,
    extension: Option<&str>,
    data: Bytes,
) -> (Bytes, bool) {
    if !state.config.http.compression
        || !compress::is_compressible(extension)
        || !compress::accepts_gzip(ctx.accept_encoding.as_deref())
    {
        return (data, false);
    }

    let compressed = compress::gzip_blocking(data.clone()).await;
    settle_encoding(ctx, data, compressed)
}

/// Pick the body from a compression attempt, falling back to `raw` on failure
fn settle_encoding(
    ctx: &RequestContext,
    raw: Bytes,
    compressed: Result<Vec<u8>, CompressError>,
) -> (Bytes, bool) {
    match compressed {
        Ok(compressed) => (Bytes::from(compressed), true),
        Err(e) => {
            logger::log_warning(&format!("{e}; sending {} uncompressed", ctx.path));
            (raw, false)
        }
    }
}

async fn build_static_file_response(
    ctx: &RequestContext,
    state: &AppState,
    path: &Path,
    data: Bytes,
) -> Response<Full<Bytes>> {
    let extension = mime::extension_of(path);
    let extension = extension.as_deref();

    let (body, gzip) = negotiate_encoding(ctx, state, extension, data).await;
    file_response(ctx, state, extension, body, gzip)
}

fn file_response(
    ctx: &RequestContext,
    state: &AppState,
    extension: Option<&str>,
    body: Bytes,
    gzip: bool,
) -> Response<Full<Bytes>> {
    http::build_file_response(http::FileResponse {
        body,
        content_type: state.mime.content_type(extension),
        cache_control: state.cache.cache_control(extension),
        gzip,
        vary_encoding: state.config.http.compression && compress::is_compressible(extension),
        server_name: &state.config.http.server_name,
        is_head: ctx.is_head,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::handler::router::tests::context;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
    use std::io;
    use tempfile::TempDir;

    fn site() -> (TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        let state = AppState::new(&test_config(dir.path())).unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn test_locate_alias() {
        let (_dir, state) = site();
        let located = locate(&context("/", None), &state).await.unwrap();
        assert_eq!(located.path, state.root.join("index.html"));
        assert_eq!(located.real, state.root.join("index.html"));
    }

    #[tokio::test]
    async fn test_locate_directory_is_not_found() {
        let (_dir, state) = site();
        let err = locate(&context("/images", None), &state).await.unwrap_err();
        assert!(matches!(err, ServeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_locate_traversal() {
        let (_dir, state) = site();
        let err = locate(&context("/../../etc/passwd", None), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::PathUnsafe(_)));
    }

    #[tokio::test]
    async fn test_negotiate_respects_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = test_config(dir.path());
        cfg.http.compression = false;
        let state = AppState::new(&cfg).unwrap();

        let ctx = context("/app.js", Some("gzip"));
        let (body, gzip) =
            negotiate_encoding(&ctx, &state, Some(".js"), Bytes::from_static(b"let a;")).await;
        assert!(!gzip);
        assert_eq!(body, "let a;");
    }

    #[tokio::test]
    async fn test_negotiate_skips_images() {
        let (_dir, state) = site();
        let ctx = context("/images/a.png", Some("gzip"));
        let (_, gzip) =
            negotiate_encoding(&ctx, &state, Some(".png"), Bytes::from_static(b"\x89PNG")).await;
        assert!(!gzip);
    }

    #[tokio::test]
    async fn test_failed_compression_sends_raw_body() {
        let (_dir, state) = site();
        let ctx = context("/style.css", Some("gzip"));
        let raw = Bytes::from_static(b"body { color: red; }");
        let failed = Err(CompressError::Io(io::Error::new(
            io::ErrorKind::Other,
            "encoder rejected input",
        )));

        let (body, gzip) = settle_encoding(&ctx, raw.clone(), failed);
        assert!(!gzip);
        assert_eq!(body, raw);

        let resp = file_response(&ctx, &state, Some(".css"), body, gzip);
        assert_eq!(resp.status(), hyper::StatusCode::OK);
        assert!(resp.headers().get(CONTENT_ENCODING).is_none());
        assert_eq!(resp.headers()[CONTENT_LENGTH], raw.len().to_string().as_str());
        let sent = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(sent, raw);
    }

    #[tokio::test]
    async fn test_successful_compression_is_used() {
        let ctx = context("/style.css", Some("gzip"));
        let (body, gzip) = settle_encoding(&ctx, Bytes::from_static(b"raw"), Ok(vec![0x1f, 0x8b]));
        assert!(gzip);
        assert_eq!(body, Bytes::from_static(&[0x1f, 0x8b]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_inside_root_is_typed_by_address() {
        let (dir, state) = site();
        std::fs::write(dir.path().join("notes.txt"), "body{}").unwrap();
        std::os::unix::fs::symlink(dir.path().join("notes.txt"), dir.path().join("link.css"))
            .unwrap();

        let located = locate(&context("/link.css", None), &state).await.unwrap();
        assert_eq!(located.path, state.root.join("link.css"));
        assert_eq!(located.real, state.root.join("notes.txt"));

        let resp = serve(&context("/link.css", None), &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/css; charset=UTF-8");
        let sent = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(sent, "body{}");
    }
}
