//! Request path resolution
//!
//! Turns a URL path into a file path under the site root, refusing anything
//! that would land outside it.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// A request path that would escape the site root or cannot be decoded
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsafe request path: {0}")]
pub struct UnsafePath(pub String);

/// Percent-decode and lexically normalize a URL path into a relative path.
///
/// `.` and empty segments vanish, `..` drops the previous segment. A `..`
/// with nothing left to drop escapes the root and is rejected, as are NUL
/// bytes, invalid UTF-8 and anything that is not a plain file name segment.
pub fn normalize(raw: &str) -> Result<PathBuf, UnsafePath> {
    let unsafe_path = || UnsafePath(raw.to_string());

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| unsafe_path())?;
    if decoded.contains('\0') {
        return Err(unsafe_path());
    }

    let mut segments: Vec<&str> = Vec::new();
    // Backslash counts as a separator so `..\..` can't slip through
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(unsafe_path());
                }
            }
            s => segments.push(s),
        }
    }

    let relative: PathBuf = segments.iter().collect();
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(unsafe_path());
    }
    Ok(relative)
}

/// Join a request path onto `root`, which must already be canonical.
///
/// The result starts with `root`; whether it exists is not checked here.
pub fn resolve_under_root(root: &Path, raw: &str) -> Result<PathBuf, UnsafePath> {
    let candidate = root.join(normalize(raw)?);
    if candidate.starts_with(root) {
        Ok(candidate)
    } else {
        Err(UnsafePath(raw.to_string()))
    }
}

/// Check that an existing file still lies under `root` once symlinks are
/// followed.
///
/// `Ok(None)` means the target could not be resolved at all (missing).
pub async fn contained_target(root: &Path, candidate: &Path) -> Result<Option<PathBuf>, UnsafePath> {
    match tokio::fs::canonicalize(candidate).await {
        Ok(real) if real.starts_with(root) => Ok(Some(real)),
        Ok(real) => Err(UnsafePath(real.display().to_string())),
        Err(_) => Ok(None),
    }
}
