// Application state module
// Immutable tables built once at startup and shared by every request

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::Config;
use crate::http::cache::CacheTable;
use crate::http::mime::MimeTable;
use crate::routing::AliasTable;

/// Application state
///
/// Nothing in here changes after startup, so handlers read it through a
/// plain `Arc` without locking.
pub struct AppState {
    pub config: Config,
    /// Canonical (symlink-free, absolute) site root
    pub root: PathBuf,
    pub aliases: AliasTable,
    pub mime: MimeTable,
    pub cache: CacheTable,
    pub read_timeout: Duration,
}

impl AppState {
    /// Resolve the site root and build the lookup tables.
    ///
    /// Fails when the root directory cannot be resolved; nothing could be
    /// served without it.
    pub fn new(config: &Config) -> std::io::Result<Self> {
        let root = Path::new(&config.site.root).canonicalize()?;
        if !root.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("site root is not a directory: {}", root.display()),
            ));
        }

        Ok(Self {
            aliases: AliasTable::new(&config.site),
            mime: MimeTable::default(),
            cache: CacheTable::default(),
            read_timeout: Duration::from_secs(config.performance.read_timeout.max(1)),
            root,
            config: config.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_root_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("public");
        std::fs::create_dir(&nested).unwrap();
        let dotted = dir.path().join("public/../public");

        let state = AppState::new(&test_config(&dotted)).unwrap();
        assert_eq!(state.root, nested.canonicalize().unwrap());
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(AppState::new(&test_config(&missing)).is_err());
    }

    #[test]
    fn test_file_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<html></html>").unwrap();
        assert!(AppState::new(&test_config(&file)).is_err());
    }
}
