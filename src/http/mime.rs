//! MIME type detection module
//!
//! Maps a file extension to the Content-Type sent with it.

use std::collections::HashMap;
use std::path::Path;

/// Sent when the extension is unknown or missing
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const ENTRIES: &[(&str, &str)] = &[
    // Text
    (".html", "text/html; charset=UTF-8"),
    (".htm", "text/html; charset=UTF-8"),
    (".css", "text/css; charset=UTF-8"),
    (".js", "application/javascript; charset=UTF-8"),
    (".json", "application/json; charset=UTF-8"),
    (".txt", "text/plain; charset=UTF-8"),
    // Images
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".webp", "image/webp"),
    (".avif", "image/avif"),
    // Fonts
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    (".ttf", "font/ttf"),
    (".otf", "font/otf"),
];

/// Lower-cased extension, dot included (`"Logo.PNG"` -> `".png"`)
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
}

/// Extension -> Content-Type lookup, built once at startup
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<&'static str, &'static str>,
}

impl MimeTable {
    /// Content-Type for a dotted, lower-cased extension
    ///
    /// # Examples
    /// ```ignore
    /// let mime = MimeTable::default();
    /// assert_eq!(mime.content_type(Some(".png")), "image/png");
    /// assert_eq!(mime.content_type(None), "application/octet-stream");
    /// ```
    pub fn content_type(&self, extension: Option<&str>) -> &'static str {
        extension
            .and_then(|ext| self.types.get(ext).copied())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self {
            types: ENTRIES.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        let mime = MimeTable::default();
        assert_eq!(mime.content_type(Some(".html")), "text/html; charset=UTF-8");
        assert_eq!(mime.content_type(Some(".css")), "text/css; charset=UTF-8");
        assert_eq!(
            mime.content_type(Some(".js")),
            "application/javascript; charset=UTF-8"
        );
        assert_eq!(
            mime.content_type(Some(".json")),
            "application/json; charset=UTF-8"
        );
        assert_eq!(mime.content_type(Some(".png")), "image/png");
        assert_eq!(mime.content_type(Some(".jpeg")), "image/jpeg");
        assert_eq!(mime.content_type(Some(".svg")), "image/svg+xml");
        assert_eq!(mime.content_type(Some(".ico")), "image/x-icon");
    }

    #[test]
    fn test_unknown_extension() {
        let mime = MimeTable::default();
        assert_eq!(mime.content_type(Some(".xyz")), DEFAULT_CONTENT_TYPE);
        assert_eq!(mime.content_type(None), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/Logo.PNG")).as_deref(), Some(".png"));
        assert_eq!(
            extension_of(Path::new("latitude sales favicon.svg")).as_deref(),
            Some(".svg")
        );
        assert_eq!(extension_of(Path::new("archive.tar.gz")).as_deref(), Some(".gz"));
        assert_eq!(extension_of(Path::new("Makefile")), None);
        assert_eq!(extension_of(Path::new(".hidden")), None);
    }
}
