//! Configuration types for the webhook receiver service.
//!
//! Every field carries a serde default so an empty configuration source still
//! produces a usable [`ServiceConfig`]. Sources are layered by [`load_config`]:
//!
//! 1. `/etc/platform/webhook-service.yaml`
//! 2. `./config/webhook-service.yaml`
//! 3. the file named by `PLATFORM_SERVICE_CONFIG` (must exist when set)
//! 4. `PLATFORM__*` environment variables, e.g. `PLATFORM__SERVER__PORT=9090`

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_FILE_ENV_VAR: &str = "PLATFORM_SERVICE_CONFIG";

/// Prefix for configuration overrides taken from the environment.
pub const ENV_PREFIX: &str = "PLATFORM";

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook intake settings
    pub webhooks: WebhookConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check the configuration for values the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.webhooks.validate()?;
        self.logging.validate()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "server.host must not be empty".to_string(),
            });
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// `host:port` form used for binding and log output.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Webhook intake configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Path the webhook endpoint is mounted on
    pub path: String,

    /// Shared signing secret.
    ///
    /// When absent the secret is read from `PLATFORM_WEBHOOK_SECRET`.
    #[serde(skip_serializing)]
    pub secret: Option<String>,

    /// Largest event payload accepted after authentication
    pub max_payload_size: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: "/webhooks".to_string(),
            secret: None,
            max_payload_size: 1024 * 1024,
        }
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("path", &self.path)
            .field("secret", &self.secret.as_ref().map(|_| "<REDACTED>"))
            .field("max_payload_size", &self.max_payload_size)
            .finish()
    }
}

impl WebhookConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.path.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!("webhooks.path must start with '/', got '{}'", self.path),
            });
        }

        if self.path == "/health" {
            return Err(ConfigError::Invalid {
                message: "webhooks.path conflicts with the health endpoint".to_string(),
            });
        }

        if matches!(&self.secret, Some(s) if s.is_empty()) {
            return Err(ConfigError::Invalid {
                message: "webhooks.secret is set but empty".to_string(),
            });
        }

        if self.max_payload_size == 0 {
            return Err(ConfigError::Invalid {
                message: "webhooks.max_payload_size must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON structured logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "logging.level must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Load the layered service configuration.
///
/// `explicit_path` takes the place of the `PLATFORM_SERVICE_CONFIG` lookup so
/// callers (and tests) can supply the file directly.
pub fn load_config(explicit_path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/platform/webhook-service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/webhook-service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    if let Some(path) = explicit_path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX).separator("__"),
        )
        .build()?;

    let service_config: ServiceConfig = config.try_deserialize()?;
    service_config.validate()?;
    Ok(service_config)
}

/// Resolve the explicit configuration file from `PLATFORM_SERVICE_CONFIG`.
pub fn config_path_from_env() -> Option<std::path::PathBuf> {
    std::env::var(CONFIG_FILE_ENV_VAR)
        .ok()
        .filter(|p| !p.is_empty())
        .map(std::path::PathBuf::from)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
