//! Configuration types and builders.

use crate::error::{ConfigError, McpError, Result};
use std::borrow::Cow;
use std::env;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8787;

/// Default bound on a single tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum accepted request body (4 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Server configuration.
///
/// Values take effect on the next `start`; a listening server is never
/// reconfigured in place.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: Cow<'static, str>,
    pub version: Cow<'static, str>,
    pub port: u16,
    pub enabled: bool,
    pub tool_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "devtools-mcp".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            port: DEFAULT_PORT,
            enabled: true,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig with fluent API.
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Build from environment variables.
    pub fn from_env(mut self) -> Result<Self> {
        if let Ok(port) = env::var("DEVTOOLS_MCP_PORT") {
            self.config.port = port.trim().parse().map_err(|_| {
                McpError::Config(ConfigError::InvalidValue {
                    field: "DEVTOOLS_MCP_PORT".into(),
                    message: format!("Invalid port number: {}", port).into(),
                })
            })?;
        }

        if let Ok(enabled) = env::var("DEVTOOLS_MCP_ENABLED") {
            self.config.enabled = parse_bool(&enabled).ok_or_else(|| {
                McpError::Config(ConfigError::InvalidValue {
                    field: "DEVTOOLS_MCP_ENABLED".into(),
                    message: format!("Expected a boolean, got: {}", enabled).into(),
                })
            })?;
        }

        if let Ok(timeout) = env::var("DEVTOOLS_MCP_TOOL_TIMEOUT_MS") {
            let millis: u64 = timeout.trim().parse().map_err(|_| {
                McpError::Config(ConfigError::InvalidValue {
                    field: "DEVTOOLS_MCP_TOOL_TIMEOUT_MS".into(),
                    message: "Must be a positive integer".into(),
                })
            })?;
            self.config.tool_timeout = Duration::from_millis(millis);
        }

        if let Ok(limit) = env::var("DEVTOOLS_MCP_MAX_BODY_BYTES") {
            self.config.max_body_bytes = limit.trim().parse().map_err(|_| {
                McpError::Config(ConfigError::InvalidValue {
                    field: "DEVTOOLS_MCP_MAX_BODY_BYTES".into(),
                    message: "Must be a positive integer".into(),
                })
            })?;
        }

        Ok(self)
    }

    pub fn build(self) -> Result<ServerConfig> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<()> {
        if self.config.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".into(),
                message: "Port must be greater than 0".into(),
            }
            .into());
        }
        if self.config.tool_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "tool_timeout".into(),
                message: "Tool timeout must be greater than 0".into(),
            }
            .into());
        }
        if self.config.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_body_bytes".into(),
                message: "Body limit must be greater than 0".into(),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8787);
        assert!(config.enabled);
        assert_eq!(config.tool_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::builder()
            .port(9000)
            .enabled(false)
            .tool_timeout(Duration::from_millis(250))
            .build()
            .unwrap();

        assert_eq!(config.port, 9000);
        assert!(!config.enabled);
        assert_eq!(config.tool_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_builder_rejects_zero_port() {
        let err = ServerConfig::builder().port(0).build().unwrap_err();
        assert!(matches!(err, McpError::Config(_)));
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        assert!(
            ServerConfig::builder()
                .tool_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
