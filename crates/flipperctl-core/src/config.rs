//! Configuration for flipperctl.
//!
//! Provides the [`FlipperConfig`] struct, persisted as a single YAML file
//! and merged over built-in defaults at load time.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `FLIPPERCTL_CONFIG` environment variable
//! 3. XDG default: `~/.config/flipperctl/config.yaml`
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::stats::port_in_range;

// ============================================================================
// Configuration struct
// ============================================================================

/// Flat configuration for flipperctl.
///
/// Keys mirror the YAML file one-to-one. Unset keys fall back to the
/// defaults below, and every update rewrites the file wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipperConfig {
    /// Base URL of the FlipperHTTP device API.
    pub flipper_url: String,

    /// Request timeout in seconds for all device calls.
    pub timeout: u64,

    /// Default logging level when `RUST_LOG` and `--log-level` are unset.
    pub log_level: String,

    /// Port the device-side proxy listens on.
    pub proxy_port: u16,

    /// Whether the local web dashboard is enabled.
    pub enable_web_ui: bool,

    /// Port the local web dashboard binds to.
    pub web_ui_port: u16,

    /// Start the proxy automatically when the dashboard comes up.
    pub auto_start_proxy: bool,
}

impl Default for FlipperConfig {
    fn default() -> Self {
        Self {
            flipper_url: "http://localhost:8080".to_string(),
            timeout: 10,
            log_level: "INFO".to_string(),
            proxy_port: 8888,
            enable_web_ui: true,
            web_ui_port: 5000,
            auto_start_proxy: false,
        }
    }
}

// ============================================================================
// Loading and persistence
// ============================================================================

impl FlipperConfig {
    /// Load configuration from the resolved path, merging over defaults.
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse is a hard error rather than a silent fallback.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(config_path) {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| Error::io_with_path(e, &path))?;
                serde_yaml::from_str(&content).map_err(|e| {
                    Error::config(format!("failed to parse {}: {e}", path.display()))
                })
            }
            _ => Ok(Self::default()),
        }
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        // 1. Explicit --config flag
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        // 2. FLIPPERCTL_CONFIG env var
        if let Ok(path) = std::env::var("FLIPPERCTL_CONFIG") {
            return Some(PathBuf::from(path));
        }

        // 3. XDG default
        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("flipperctl").join("config.yaml"))
    }

    /// Rewrite the whole config file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
        }
        let yaml = self.to_yaml_string()?;
        std::fs::write(path, yaml).map_err(|e| Error::io_with_path(e, path))?;
        tracing::info!("configuration saved to {}", path.display());
        Ok(())
    }

    /// Serialize this config to a YAML string.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Return the config as a JSON value for display.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The request timeout as a `Duration`.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout)
    }
}

// ============================================================================
// Key-based access
// ============================================================================

impl FlipperConfig {
    /// Get a single configuration value by key.
    pub fn get(&self, key: &str) -> Result<serde_json::Value> {
        let value = self.to_value()?;
        value
            .get(key)
            .cloned()
            .ok_or_else(|| Error::config(format!("unknown configuration key '{key}'")))
    }

    /// Set a configuration value from its string form.
    ///
    /// The value is parsed with the same priority as the original tool:
    /// boolean, then integer, then string. Unknown keys and type
    /// mismatches are rejected; port keys must fall within 1-65535.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = match self.to_value()? {
            serde_json::Value::Object(map) => map,
            _ => return Err(Error::config("configuration is not a mapping")),
        };
        if !map.contains_key(key) {
            return Err(Error::config(format!("unknown configuration key '{key}'")));
        }

        let parsed = parse_value(value);
        if matches!(key, "proxy_port" | "web_ui_port") {
            let port = parsed
                .as_i64()
                .ok_or_else(|| Error::config(format!("'{key}' must be an integer")))?;
            if !port_in_range(port) {
                return Err(Error::config(format!(
                    "'{key}' must be between 1 and 65535, got {port}"
                )));
            }
        }
        map.insert(key.to_string(), parsed);

        *self = serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| Error::config(format!("invalid value for '{key}': {e}")))?;
        Ok(())
    }
}

/// Parse a string value into a JSON scalar, auto-detecting the type.
///
/// Priority: bool, integer, string.
fn parse_value(s: &str) -> serde_json::Value {
    if s.eq_ignore_ascii_case("true") {
        return serde_json::Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return serde_json::Value::Bool(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return serde_json::Value::Number(i.into());
    }
    serde_json::Value::String(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// RAII guard for env var manipulation in tests.
    struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(ref val) = self.prev {
                unsafe { std::env::set_var(&self.key, val) };
            } else {
                unsafe { std::env::remove_var(&self.key) };
            }
        }
    }

    // ------------------------------------------------------------------------
    // Default tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_flipper_config_default() {
        let config = FlipperConfig::default();
        assert_eq!(config.flipper_url, "http://localhost:8080");
        assert_eq!(config.timeout, 10);
        assert_eq!(config.log_level, "INFO");
        assert_eq!(config.proxy_port, 8888);
        assert!(config.enable_web_ui);
        assert_eq!(config.web_ui_port, 5000);
        assert!(!config.auto_start_proxy);
    }

    // ------------------------------------------------------------------------
    // Serialization tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_flipper_config_yaml_round_trip() {
        let config = FlipperConfig {
            flipper_url: "http://192.168.1.50:8080".into(),
            proxy_port: 9999,
            ..Default::default()
        };
        let yaml = config.to_yaml_string().unwrap();
        let parsed: FlipperConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_flipper_config_partial_file_merges_defaults() {
        let yaml = "flipper_url: http://flipper.local:8080\ntimeout: 30\n";
        let config: FlipperConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.flipper_url, "http://flipper.local:8080");
        assert_eq!(config.timeout, 30);
        // Unset keys come from defaults
        assert_eq!(config.proxy_port, 8888);
        assert_eq!(config.web_ui_port, 5000);
    }

    // ------------------------------------------------------------------------
    // Loading tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_flipper_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "proxy_port: 7777\nauto_start_proxy: true\n").unwrap();

        let config = FlipperConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.proxy_port, 7777);
        assert!(config.auto_start_proxy);
        assert_eq!(config.flipper_url, "http://localhost:8080");
    }

    #[test]
    fn test_flipper_config_load_missing_file_defaults() {
        let config = FlipperConfig::load(Some("/nonexistent/config.yaml")).unwrap();
        assert_eq!(config, FlipperConfig::default());
    }

    #[test]
    fn test_flipper_config_load_malformed_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "proxy_port: [not, a, port]\n").unwrap();

        let result = FlipperConfig::load(Some(path.to_str().unwrap()));
        assert!(result.is_err());
    }

    // ------------------------------------------------------------------------
    // Persistence tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_flipper_config_save_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("flipperctl").join("config.yaml");

        let config = FlipperConfig::default();
        config.save(&path).unwrap();
        assert!(path.exists());

        let reloaded = FlipperConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_flipper_config_save_rewrites_wholesale() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "proxy_port: 1234\nstale_key: gone\n").unwrap();

        let config = FlipperConfig::default();
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale_key"));
        assert!(content.contains("proxy_port"));
    }

    // ------------------------------------------------------------------------
    // resolve_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = FlipperConfig::resolve_config_path(Some("/explicit/config.yaml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.yaml")));
    }

    #[test]
    fn test_resolve_config_path_env() {
        let _guard = EnvGuard::new("FLIPPERCTL_CONFIG", "/env/config.yaml");
        let path = FlipperConfig::resolve_config_path(None);
        assert_eq!(path, Some(PathBuf::from("/env/config.yaml")));
    }

    #[test]
    fn test_resolve_config_path_default() {
        let _guard = EnvGuard::remove("FLIPPERCTL_CONFIG");
        let path = FlipperConfig::resolve_config_path(None);
        assert!(path.is_some());
        let p = path.unwrap();
        assert!(p.to_str().unwrap().contains("flipperctl"));
        assert!(p.to_str().unwrap().ends_with("config.yaml"));
    }

    // ------------------------------------------------------------------------
    // get/set tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_get_known_key() {
        let config = FlipperConfig::default();
        assert_eq!(
            config.get("flipper_url").unwrap(),
            serde_json::json!("http://localhost:8080")
        );
        assert_eq!(config.get("proxy_port").unwrap(), serde_json::json!(8888));
    }

    #[test]
    fn test_get_unknown_key() {
        let config = FlipperConfig::default();
        let result = config.get("nonexistent");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("nonexistent"));
    }

    #[test]
    fn test_set_string_value() {
        let mut config = FlipperConfig::default();
        config.set("flipper_url", "http://10.0.0.5:8080").unwrap();
        assert_eq!(config.flipper_url, "http://10.0.0.5:8080");
    }

    #[test]
    fn test_set_integer_value() {
        let mut config = FlipperConfig::default();
        config.set("timeout", "25").unwrap();
        assert_eq!(config.timeout, 25);
    }

    #[test]
    fn test_set_bool_value() {
        let mut config = FlipperConfig::default();
        config.set("auto_start_proxy", "true").unwrap();
        assert!(config.auto_start_proxy);
        config.set("auto_start_proxy", "false").unwrap();
        assert!(!config.auto_start_proxy);
    }

    #[test]
    fn test_set_unknown_key_rejected() {
        let mut config = FlipperConfig::default();
        let result = config.set("no_such_key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn test_set_type_mismatch_rejected() {
        let mut config = FlipperConfig::default();
        let result = config.set("timeout", "not-a-number");
        assert!(result.is_err());
        // Config unchanged on failure
        assert_eq!(config.timeout, 10);
    }

    #[test]
    fn test_set_port_boundaries() {
        let mut config = FlipperConfig::default();
        assert!(config.set("proxy_port", "0").is_err());
        assert!(config.set("proxy_port", "65536").is_err());
        assert!(config.set("proxy_port", "-1").is_err());
        assert!(config.set("proxy_port", "1").is_ok());
        assert_eq!(config.proxy_port, 1);
        assert!(config.set("proxy_port", "65535").is_ok());
        assert_eq!(config.proxy_port, 65535);
    }

    // ------------------------------------------------------------------------
    // parse_value tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), serde_json::json!(true));
        assert_eq!(parse_value("False"), serde_json::json!(false));
        assert_eq!(parse_value("42"), serde_json::json!(42));
        assert_eq!(parse_value("-7"), serde_json::json!(-7));
        assert_eq!(parse_value("hello"), serde_json::json!("hello"));
        // No float detection, matching the original tool
        assert_eq!(parse_value("3.14"), serde_json::json!("3.14"));
    }

    // ------------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------------

    #[test]
    fn test_timeout_duration() {
        let config = FlipperConfig {
            timeout: 30,
            ..Default::default()
        };
        assert_eq!(config.timeout(), std::time::Duration::from_secs(30));
    }

    #[test]
    fn test_flipper_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlipperConfig>();
    }
}
