//! # Application State and Configuration
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Holds the configuration and the entity backend.
//! Nothing in here is mutated after startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use entities_core::{EntityBackend, StubBackend};
use thiserror::Error;

/// Error reading configuration from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address to bind the HTTP server to.
    pub host: IpAddr,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Whether to record request metrics and serve `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            metrics_enabled: true,
        }
    }
}

impl AppConfig {
    /// Build configuration from `HOST`, `PORT` and `ENTITIES_METRICS_ENABLED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Absent variables take their defaults. Metrics stay enabled unless the
    /// flag is exactly `false` (case-insensitive).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "HOST",
                value,
                expected: "IP address",
            })?,
            None => defaults.host,
        };

        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value,
                expected: "port number",
            })?,
            None => defaults.port,
        };

        let metrics_enabled = lookup("ENTITIES_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(defaults.metrics_enabled);

        Ok(Self {
            host,
            port,
            metrics_enabled,
        })
    }

    /// Socket address the server listens on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub backend: Arc<dyn EntityBackend>,
}

impl AppState {
    /// Default configuration backed by the [`StubBackend`].
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Given configuration backed by the [`StubBackend`].
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_backend(config, Arc::new(StubBackend::new()))
    }

    /// Given configuration and backend.
    pub fn with_backend(config: AppConfig, backend: Arc<dyn EntityBackend>) -> Self {
        Self { config, backend }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_host_and_port() {
        let config =
            AppConfig::from_lookup(lookup(&[("HOST", "127.0.0.1"), ("PORT", "9090")])).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9090");
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"), "got: {err}");
        assert!(err.to_string().contains("eighty"), "got: {err}");
    }

    #[test]
    fn invalid_host_is_reported() {
        assert!(AppConfig::from_lookup(lookup(&[("HOST", "localhost:80")])).is_err());
    }

    #[test]
    fn metrics_disabled_only_by_false() {
        let off = AppConfig::from_lookup(lookup(&[("ENTITIES_METRICS_ENABLED", "FALSE")])).unwrap();
        assert!(!off.metrics_enabled);
        let on = AppConfig::from_lookup(lookup(&[("ENTITIES_METRICS_ENABLED", "0")])).unwrap();
        assert!(on.metrics_enabled);
    }

    #[test]
    fn state_defaults_to_stub_backend() {
        let state = AppState::new();
        assert!(format!("{:?}", state.backend).contains("StubBackend"));
    }
}
