//! Configuration management for static asset serving

use crate::error::{AssetError, Result};
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Cache-Control value used outside production when no override applies
pub const NO_CACHE: &str = "no-cache";

/// Configuration for the asset service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory assets are served from (default: "public")
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// URL prefix the HTTP endpoint strips before resolving (default: "/assets")
    #[serde(default = "default_mount_prefix")]
    pub mount_prefix: String,

    /// Address for the HTTP endpoint (default: "127.0.0.1:9000")
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Production mode: validators are memoized, gzip siblings are served
    /// and the default Cache-Control applies (default: false)
    #[serde(default)]
    pub production: bool,

    /// Cache-Control directive used in production when no override matches
    #[serde(default = "default_cache_control")]
    pub default_cache_control: String,

    /// Per-resource Cache-Control overrides, keyed by resource path: the
    /// root path joined with the request path, always with a leading '/'
    /// (root "public" and request "app.css" give "/public/app.css")
    #[serde(default)]
    pub cache_control: HashMap<String, String>,

    /// Charset appended to textual content types (default: "utf-8")
    #[serde(default = "default_charset")]
    pub default_charset: String,

    /// Path on the HTTP endpoint that exposes metrics (optional)
    #[serde(default)]
    pub metrics_path: Option<String>,

    /// Log level for the binary (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions for serde
fn default_root_path() -> String {
    "public".to_string()
}

fn default_mount_prefix() -> String {
    "/assets".to_string()
}

fn default_listen_address() -> String {
    "127.0.0.1:9000".to_string()
}

fn default_cache_control() -> String {
    "max-age=3600".to_string()
}

fn default_charset() -> String {
    "utf-8".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AssetConfig {
    fn default() -> Self {
        AssetConfig {
            root_path: default_root_path(),
            mount_prefix: default_mount_prefix(),
            listen_address: default_listen_address(),
            production: false,
            default_cache_control: default_cache_control(),
            cache_control: HashMap::new(),
            default_charset: default_charset(),
            metrics_path: None,
            log_level: default_log_level(),
        }
    }
}

impl AssetConfig {
    /// Load configuration from a YAML file
    ///
    /// # Returns
    /// * `Ok(AssetConfig)` if loading and validation succeed
    /// * `Err(AssetError)` if file cannot be read or config is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AssetError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AssetConfig = serde_yaml::from_str(content).map_err(|e| {
            AssetError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - root_path and default_charset must not be empty
    /// - default_charset must be valid inside a Content-Type header
    /// - mount_prefix and metrics_path must start with '/'
    /// - listen_address must be a socket address
    /// - every Cache-Control directive must be a valid header value
    pub fn validate(&self) -> Result<()> {
        if self.root_path.trim().is_empty() {
            return Err(AssetError::ConfigError(
                "root_path must not be empty".to_string(),
            ));
        }

        if self.default_charset.trim().is_empty() {
            return Err(AssetError::ConfigError(
                "default_charset must not be empty".to_string(),
            ));
        }

        if !self.mount_prefix.starts_with('/') {
            return Err(AssetError::ConfigError(format!(
                "mount_prefix must start with '/', got '{}'",
                self.mount_prefix
            )));
        }

        if let Some(path) = &self.metrics_path {
            if !path.starts_with('/') {
                return Err(AssetError::ConfigError(format!(
                    "metrics_path must start with '/', got '{}'",
                    path
                )));
            }
        }

        self.listen_address.parse::<SocketAddr>().map_err(|e| {
            AssetError::ConfigError(format!(
                "Invalid listen_address '{}': {}",
                self.listen_address, e
            ))
        })?;

        let content_type = format!("text/plain; charset={}", self.default_charset);
        HeaderValue::from_str(&content_type).map_err(|e| {
            AssetError::ConfigError(format!(
                "default_charset '{}' is not usable in Content-Type: {}",
                self.default_charset.escape_debug(),
                e
            ))
        })?;

        validate_directive("default_cache_control", &self.default_cache_control)?;
        for (path, directive) in &self.cache_control {
            validate_directive(path, directive)?;
        }

        Ok(())
    }

    /// Look up the per-path Cache-Control override for a resource path
    pub fn cache_control_override(&self, resource_path: &str) -> Option<&str> {
        self.cache_control.get(resource_path).map(String::as_str)
    }
}

fn validate_directive(name: &str, directive: &str) -> Result<()> {
    if directive.trim().is_empty() {
        return Err(AssetError::ConfigError(format!(
            "Cache-Control directive for '{}' must not be empty",
            name
        )));
    }
    HeaderValue::from_str(directive).map_err(|e| {
        AssetError::ConfigError(format!(
            "Cache-Control directive for '{}' is not a valid header value: {}",
            name, e
        ))
    })?;
    Ok(())
}
