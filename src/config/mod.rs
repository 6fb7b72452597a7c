// Configuration module entry point
// Loads layered configuration and builds the immutable runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, PerformanceConfig, SiteConfig};

/// Port used when neither the config file nor `PORT` sets one
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "PORT";

impl Config {
    /// Load configuration from the default file name (`config`, any supported extension)
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Layers, lowest priority first: built-in defaults, the optional file,
    /// `SITE_*` environment variables, then `PORT`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_port(config_path, std::env::var(PORT_ENV).ok())
    }

    fn load_with_port(
        config_path: &str,
        port_override: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("site.root", "public")?
            .set_default("site.index_file", "index.html")?
            .set_default("site.admin_file", "admin.html")?
            .set_default("site.favicon_file", "latitude sales favicon.svg")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "site-server")?
            .set_default("http.compression", true)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SITE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", port_override.filter(|p| !p.trim().is_empty()))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Default configuration pointed at `root`, for tests that need a real site tree
#[cfg(test)]
pub fn test_config(root: &std::path::Path) -> Config {
    let mut cfg = Config::load_with_port("definitely-not-a-config-file-4f1c", None)
        .expect("default configuration must load");
    cfg.site.root = root.to_string_lossy().into_owned();
    cfg.logging.access_log = false;
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_FILE: &str = "definitely-not-a-config-file-4f1c";

    #[test]
    fn test_defaults() {
        let cfg = Config::load_with_port(MISSING_FILE, None).unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.site.root, "public");
        assert_eq!(cfg.site.index_file, "index.html");
        assert_eq!(cfg.site.admin_file, "admin.html");
        assert!(cfg.http.compression);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_port_override() {
        let cfg = Config::load_with_port(MISSING_FILE, Some("8081".to_string())).unwrap();
        assert_eq!(cfg.server.port, 8081);
    }

    #[test]
    fn test_blank_port_override_ignored() {
        let cfg = Config::load_with_port(MISSING_FILE, Some("  ".to_string())).unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port_override_rejected() {
        assert!(Config::load_with_port(MISSING_FILE, Some("not-a-port".to_string())).is_err());
    }

    #[test]
    fn test_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9000\n\n[site]\nroot = \"dist\"\n\n[http]\ncompression = false\n",
        )
        .unwrap();
        let stem = dir.path().join("site");

        let cfg = Config::load_with_port(stem.to_str().unwrap(), None).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.site.root, "dist");
        assert!(!cfg.http.compression);
        // Untouched keys keep their defaults
        assert_eq!(cfg.site.index_file, "index.html");

        let cfg = Config::load_with_port(stem.to_str().unwrap(), Some("7000".into())).unwrap();
        assert_eq!(cfg.server.port, 7000);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_with_port(MISSING_FILE, None).unwrap();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }
}
