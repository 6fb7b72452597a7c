//! HTTP cache control module
//!
//! Chooses the Cache-Control directive for a file from its extension.

use std::collections::HashMap;

/// Cache class of a served file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    /// Fingerprint-free but effectively static: images and fonts
    Immutable,
    /// Stylesheets and scripts
    Asset,
    /// JSON data files
    Data,
    /// Markup, always revalidated
    Document,
    /// Anything not classified
    Default,
}

impl CacheClass {
    /// Cache-Control header value for this class
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Immutable => "public, max-age=31536000, immutable",
            Self::Asset => "public, max-age=86400, must-revalidate",
            Self::Data => "public, max-age=300, must-revalidate",
            Self::Document => "no-cache",
            Self::Default => "public, max-age=600",
        }
    }
}

const CLASSES: &[(CacheClass, &[&str])] = &[
    (
        CacheClass::Immutable,
        &[
            ".png", ".jpg", ".jpeg", ".gif", ".webp", ".avif", ".svg", ".ico", ".woff", ".woff2",
            ".ttf", ".otf",
        ],
    ),
    (CacheClass::Asset, &[".css", ".js"]),
    (CacheClass::Data, &[".json"]),
    (CacheClass::Document, &[".html", ".htm"]),
];

/// Extension -> cache class lookup, built once at startup
#[derive(Debug, Clone)]
pub struct CacheTable {
    classes: HashMap<&'static str, CacheClass>,
}

impl CacheTable {
    pub fn class_of(&self, extension: Option<&str>) -> CacheClass {
        extension
            .and_then(|ext| self.classes.get(ext).copied())
            .unwrap_or(CacheClass::Default)
    }

    pub fn cache_control(&self, extension: Option<&str>) -> &'static str {
        self.class_of(extension).header_value()
    }
}

impl Default for CacheTable {
    fn default() -> Self {
        let classes = CLASSES
            .iter()
            .flat_map(|(class, exts)| exts.iter().map(move |ext| (*ext, *class)))
            .collect();
        Self { classes }
    }
}
