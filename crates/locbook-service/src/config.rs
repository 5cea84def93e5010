//! Service configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Service configuration.
///
/// Built once at startup and handed to every component explicitly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener settings.
    pub server: ServerConfig,
    /// History snapshot settings.
    pub storage: StorageConfig,
    /// Rendered file locations.
    pub output: OutputConfig,
    /// Bucketing and heatmap display settings.
    pub render: RenderConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format, non-zero port)
    /// - Snapshot and output paths are not empty
    /// - Precision is between 0 and [`MAX_PRECISION`]
    /// - Blur is at least 1
    ///
    /// # Example
    ///
    /// ```
    /// use locbook_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.output.validate());
        errors.extend(self.render.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Default listener port.
pub const DEFAULT_PORT: u16 = 9001;

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:9001").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: format!("0.0.0.0:{}", DEFAULT_PORT),
        }
    }
}

impl ServerConfig {
    /// Replace the port of the bind address, keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = match self.bind.rsplit_once(':') {
            Some((host, _)) if !host.is_empty() => host,
            _ => "0.0.0.0",
        };
        self.bind = format!("{}:{}", host, port);
    }

    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "bind address cannot be empty".to_string(),
            });
        } else {
            match self.bind.rsplit_once(':') {
                None => {
                    errors.push(ValidationError {
                        field: "server.bind".to_string(),
                        message: format!(
                            "invalid bind address '{}': expected format 'host:port'",
                            self.bind
                        ),
                    });
                }
                Some((_, port_str)) => match port_str.parse::<u16>() {
                    Ok(0) => {
                        errors.push(ValidationError {
                            field: "server.bind".to_string(),
                            message: "port cannot be 0".to_string(),
                        });
                    }
                    Err(_) => {
                        errors.push(ValidationError {
                            field: "server.bind".to_string(),
                            message: format!(
                                "invalid port '{}': must be a number 1-65535",
                                port_str
                            ),
                        });
                    }
                    Ok(_) => {}
                },
            }
        }

        errors
    }
}

/// History snapshot configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot file path.
    pub history_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from(locbook_store::DEFAULT_HISTORY_FILE),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        non_empty_path("storage.history_path", &self.history_path)
            .into_iter()
            .collect()
    }
}

/// Rendered output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Heatmap script, rewritten after every change.
    pub heatmap_path: PathBuf,
    /// Single-point GeoJSON of the latest observation.
    pub live_geojson_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            heatmap_path: PathBuf::from("map.js"),
            live_geojson_path: PathBuf::from("realtime.geojson"),
        }
    }
}

impl OutputConfig {
    /// Validate output configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        [
            non_empty_path("output.heatmap_path", &self.heatmap_path),
            non_empty_path("output.live_geojson_path", &self.live_geojson_path),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Largest accepted bucket precision.
pub const MAX_PRECISION: u32 = 10;

/// Bucketing and heatmap display settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Decimal places coordinates are rounded to. Only 4 or 5 make sense
    /// for phone data.
    pub precision: u32,
    /// Heatmap blur.
    pub blur: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            precision: 4,
            blur: 5,
        }
    }
}

impl RenderConfig {
    /// Validate render configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.precision > MAX_PRECISION {
            errors.push(ValidationError {
                field: "render.precision".to_string(),
                message: format!(
                    "precision {} is too high (maximum {})",
                    self.precision, MAX_PRECISION
                ),
            });
        }

        if self.blur == 0 {
            errors.push(ValidationError {
                field: "render.blur".to_string(),
                message: "blur must be at least 1".to_string(),
            });
        }

        errors
    }
}

fn non_empty_path(field: &str, path: &Path) -> Option<ValidationError> {
    path.as_os_str().is_empty().then(|| ValidationError {
        field: field.to_string(),
        message: "path cannot be empty".to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `render.precision`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("locbook")
        .join("locbook.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:9001");
        assert_eq!(config.storage.history_path, PathBuf::from("history.snapshot"));
        assert_eq!(config.output.heatmap_path, PathBuf::from("map.js"));
        assert_eq!(config.output.live_geojson_path, PathBuf::from("realtime.geojson"));
        assert_eq!(config.render.precision, 4);
        assert_eq!(config.render.blur, 5);
    }

    #[test]
    fn test_set_port_keeps_host() {
        let mut server = ServerConfig::default();
        server.set_port(8080);
        assert_eq!(server.bind, "0.0.0.0:8080");

        let mut server = ServerConfig {
            bind: "[::1]:9001".to_string(),
        };
        server.set_port(9100);
        assert_eq!(server.bind, "[::1]:9100");

        let mut server = ServerConfig {
            bind: "garbage".to_string(),
        };
        server.set_port(9002);
        assert_eq!(server.bind, "0.0.0.0:9002");
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("locbook.toml");
        std::fs::write(
            &config_path,
            r#"
                [server]
                bind = "127.0.0.1:9090"

                [storage]
                history_path = "/var/lib/locbook/history.snapshot"

                [render]
                precision = 5
                blur = 8
            "#,
        )
        .unwrap();

        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded.server.bind, "127.0.0.1:9090");
        assert_eq!(
            loaded.storage.history_path,
            PathBuf::from("/var/lib/locbook/history.snapshot")
        );
        assert_eq!(loaded.output.heatmap_path, PathBuf::from("map.js"));
        assert_eq!(loaded.render.precision, 5);
        assert_eq!(loaded.render.blur, 8);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/locbook.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let toml = r#"
            [render]
            precision = 5
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.precision, 5);
        assert_eq!(config.render.blur, 5);
        assert_eq!(config.server.bind, "0.0.0.0:9001");
        assert_eq!(config.output.live_geojson_path, PathBuf::from("realtime.geojson"));
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
            [server]
            bind = "192.168.1.1:8888"

            [storage]
            history_path = "/data/history.snapshot"

            [output]
            heatmap_path = "/www/map.js"
            live_geojson_path = "/www/realtime.geojson"

            [render]
            precision = 4
            blur = 3
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "192.168.1.1:8888");
        assert_eq!(
            config.storage.history_path,
            PathBuf::from("/data/history.snapshot")
        );
        assert_eq!(config.render.blur, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("locbook/locbook.toml"));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Read {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let display = format!("{}", error);
        assert!(display.contains("/test/path"));
        assert!(display.contains("not found"));
    }

    // ==========================================================================
    // Validation tests
    // ==========================================================================

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_server_bind_validation() {
        let valid = ServerConfig {
            bind: "127.0.0.1:9001".to_string(),
        };
        assert!(valid.validate().is_empty());

        let valid_ipv6 = ServerConfig {
            bind: "[::1]:9001".to_string(),
        };
        assert!(valid_ipv6.validate().is_empty());

        let empty = ServerConfig {
            bind: "".to_string(),
        };
        let errors = empty.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be empty"));

        let no_port = ServerConfig {
            bind: "127.0.0.1".to_string(),
        };
        let errors = no_port.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("host:port"));

        let port_zero = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
        };
        let errors = port_zero.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be 0"));

        let bad_port = ServerConfig {
            bind: "127.0.0.1:abc".to_string(),
        };
        let errors = bad_port.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("must be a number"));
    }

    #[test]
    fn test_path_validation() {
        let storage = StorageConfig {
            history_path: PathBuf::new(),
        };
        let errors = storage.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "storage.history_path");

        let output = OutputConfig {
            heatmap_path: PathBuf::new(),
            live_geojson_path: PathBuf::new(),
        };
        assert_eq!(output.validate().len(), 2);
    }

    #[test]
    fn test_render_validation() {
        let too_precise = RenderConfig {
            precision: 11,
            blur: 5,
        };
        let errors = too_precise.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("too high"));

        let no_blur = RenderConfig {
            precision: 4,
            blur: 0,
        };
        let errors = no_blur.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("at least 1"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let config = Config {
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
            },
            render: RenderConfig {
                precision: 20,
                blur: 5,
            },
            ..Config::default()
        };
        let display = config.validate().unwrap_err().to_string();
        assert!(display.contains("server.bind"));
        assert!(display.contains("render.precision"));
    }
}
