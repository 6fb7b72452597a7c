//! HTTP response building module
//!
//! Builders for the three responses the server produces: a served file,
//! 400 Bad Request and 404 Not Found.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, SERVER, VARY,
};
use hyper::{Response, StatusCode};

const PLAIN_TEXT: &str = "text/plain; charset=UTF-8";

/// Error answers must not be reused once the file appears
const ERROR_CACHE_CONTROL: &str = "no-cache";

/// Everything needed to answer 200 for a file
#[derive(Debug)]
pub struct FileResponse<'a> {
    /// Bytes to transmit, already compressed when `gzip` is set
    pub body: Bytes,
    pub content_type: &'a str,
    pub cache_control: &'a str,
    pub gzip: bool,
    /// Representation depends on `Accept-Encoding`
    pub vary_encoding: bool,
    pub server_name: &'a str,
    pub is_head: bool,
}

/// Build 200 OK for a served file
///
/// `Content-Length` is always the length of `body`, which HEAD keeps in the
/// header while dropping the payload.
pub fn build_file_response(file: FileResponse<'_>) -> Response<Full<Bytes>> {
    let content_length = file.body.len();
    let body = if file.is_head { Bytes::new() } else { file.body };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, file.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(CACHE_CONTROL, file.cache_control)
        .header(SERVER, file.server_name);

    if file.gzip {
        builder = builder.header(CONTENT_ENCODING, "gzip");
    }
    if file.vary_encoding {
        builder = builder.header(VARY, "Accept-Encoding");
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 400 Bad Request response
pub fn build_400_response(server_name: &str, is_head: bool) -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::BAD_REQUEST, "Bad request", server_name, is_head)
}

/// Build 404 Not Found response
pub fn build_404_response(server_name: &str, is_head: bool) -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::NOT_FOUND, "Not found", server_name, is_head)
}

/// Plain-text error answer carrying the same header set as a served file
fn build_plain_response(
    status: StatusCode,
    message: &'static str,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(message.as_bytes())
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, PLAIN_TEXT)
        .header(CONTENT_LENGTH, message.len())
        .header(CACHE_CONTROL, ERROR_CACHE_CONTROL)
        .header(SERVER, server_name)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut resp = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
            *resp.status_mut() = status;
            resp
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn file(body: &'static [u8], gzip: bool, is_head: bool) -> FileResponse<'static> {
        FileResponse {
            body: Bytes::from_static(body),
            content_type: "text/css; charset=UTF-8",
            cache_control: "no-cache",
            gzip,
            vary_encoding: true,
            server_name: "site-server",
            is_head,
        }
    }

    #[tokio::test]
    async fn test_file_response_headers() {
        let resp = build_file_response(file(b"a{}", false, false));
        assert_eq!(resp.status(), StatusCode::OK);
        let h = resp.headers();
        assert_eq!(h[CONTENT_TYPE], "text/css; charset=UTF-8");
        assert_eq!(h[CONTENT_LENGTH], "3");
        assert_eq!(h[CACHE_CONTROL], "no-cache");
        assert_eq!(h[VARY], "Accept-Encoding");
        assert!(h.get(CONTENT_ENCODING).is_none());
        assert_eq!(body_of(resp).await, "a{}");
    }

    #[tokio::test]
    async fn test_gzip_header() {
        let resp = build_file_response(file(b"xx", true, false));
        assert_eq!(resp.headers()[CONTENT_ENCODING], "gzip");
    }

    #[tokio::test]
    async fn test_head_keeps_length() {
        let resp = build_file_response(file(b"hello", false, true));
        assert_eq!(resp.headers()[CONTENT_LENGTH], "5");
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_responses() {
        let resp = build_400_response("site-server", false);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[CONTENT_TYPE], PLAIN_TEXT);
        assert_eq!(body_of(resp).await, "Bad request");

        let resp = build_404_response("site-server", false);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get(CONTENT_ENCODING).is_none());
        assert_eq!(body_of(resp).await, "Not found");
    }

    #[tokio::test]
    async fn test_error_responses_share_header_set() {
        let ok = build_file_response(file(b"a{}", false, false));
        for resp in [
            build_400_response("site-server", false),
            build_404_response("site-server", false),
        ] {
            let h = resp.headers();
            for name in [CONTENT_TYPE, CONTENT_LENGTH, CACHE_CONTROL, SERVER] {
                assert!(h.contains_key(&name), "{} missing on {}", name, resp.status());
                assert!(ok.headers().contains_key(&name));
            }
            assert_eq!(h[CACHE_CONTROL], "no-cache");
            assert_eq!(h[SERVER], "site-server");
        }
    }

    #[tokio::test]
    async fn test_head_error_keeps_length() {
        let resp = build_404_response("site-server", true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
        assert_eq!(resp.headers()[CACHE_CONTROL], "no-cache");
        assert!(body_of(resp).await.is_empty());
    }
}
