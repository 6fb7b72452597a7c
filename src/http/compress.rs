//! Response compression module
//!
//! gzip negotiation and encoding for text-like assets.

use flate2::{write::GzEncoder, Compression};
use std::io::Write;

/// Extensions eligible for on-the-fly gzip
const COMPRESSIBLE: &[&str] = &[".html", ".css", ".js", ".json", ".svg"];

#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("gzip encoding failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("compression task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub fn is_compressible(extension: Option<&str>) -> bool {
    extension.is_some_and(|ext| COMPRESSIBLE.contains(&ext))
}

/// Whether the client's `Accept-Encoding` admits gzip
///
/// Tokens are compared case-insensitively; `gzip;q=0` is a refusal.
pub fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    let Some(header) = accept_encoding else {
        return false;
    };

    header.split(',').any(|item| {
        let mut parts = item.split(';');
        let coding = parts.next().unwrap_or_default().trim();
        if !coding.eq_ignore_ascii_case("gzip") {
            return false;
        }
        // Only an explicit zero weight disables it
        !parts.any(|param| {
            param
                .trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        })
    })
}

/// gzip `data` in memory
pub fn gzip(data: &[u8]) -> Result<Vec<u8>, CompressError> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity((data.len() / 2).max(256)),
        Compression::default(),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// gzip on the blocking pool so large files don't stall other requests
pub async fn gzip_blocking(data: hyper::body::Bytes) -> Result<Vec<u8>, CompressError> {
    tokio::task::spawn_blocking(move || gzip(&data)).await?
}
