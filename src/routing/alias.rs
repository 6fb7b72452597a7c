//! Reserved alias routes
//!
//! A handful of exact request paths that map straight to a file, skipping
//! general path resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;

/// Exact-path -> root-relative file table, fixed at startup
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<&'static str, PathBuf>,
}

impl AliasTable {
    pub fn new(site: &SiteConfig) -> Self {
        let entries = [
            ("/", &site.index_file),
            ("/admin", &site.admin_file),
            ("/favicon.ico", &site.favicon_file),
        ]
        .into_iter()
        .map(|(path, file)| (path, PathBuf::from(file.trim_start_matches('/'))))
        .collect();

        Self { entries }
    }

    /// Aliased file for `path`, joined onto `root`
    ///
    /// Matching is exact: `/admin/` and `/Admin` are not aliases.
    pub fn resolve(&self, path: &str, root: &Path) -> Option<PathBuf> {
        self.entries.get(path).map(|file| root.join(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            root: "public".to_string(),
            index_file: "index.html".to_string(),
            admin_file: "admin.html".to_string(),
            favicon_file: "latitude sales favicon.svg".to_string(),
        }
    }

    #[test]
    fn test_reserved_paths() {
        let table = AliasTable::new(&site());
        let root = Path::new("/srv/site");
        assert_eq!(table.resolve("/", root), Some(root.join("index.html")));
        assert_eq!(table.resolve("/admin", root), Some(root.join("admin.html")));
        assert_eq!(
            table.resolve("/favicon.ico", root),
            Some(root.join("latitude sales favicon.svg"))
        );
    }

    #[test]
    fn test_exact_match_only() {
        let table = AliasTable::new(&site());
        let root = Path::new("/srv/site");
        assert_eq!(table.resolve("/admin/", root), None);
        assert_eq!(table.resolve("/Admin", root), None);
        assert_eq!(table.resolve("/index.html", root), None);
    }

    #[test]
    fn test_leading_slash_in_config_stays_under_root() {
        let mut cfg = site();
        cfg.admin_file = "/pages/admin.html".to_string();
        let table = AliasTable::new(&cfg);
        let root = Path::new("/srv/site");
        assert_eq!(
            table.resolve("/admin", root),
            Some(root.join("pages/admin.html"))
        );
    }
}
