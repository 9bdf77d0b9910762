//! Diagram service settings, loaded once at startup.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading [`EngineConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineConfigError {
    /// `HOST` is not an IP address.
    #[error("HOST must be an IP address, got '{value}'")]
    InvalidHost {
        /// The rejected value.
        value: String,
    },

    /// `PORT` is not a port number.
    #[error("PORT must be a number between 0 and 65535, got '{value}'")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },
}

/// Bind address and renderer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Address the HTTP server binds.
    pub bind: SocketAddr,
    /// Graphviz `dot` binary.
    pub dot_binary: PathBuf,
    /// Fixed output stem; the image is written to `<stem>.jpg`.
    pub output_stem: PathBuf,
}

impl EngineConfig {
    /// Loads settings from `HOST` (default `0.0.0.0`), `PORT` (default
    /// `8000`), `DOT_BINARY` (default `dot`), and `FLOWCHART_OUTPUT`
    /// (default `flowchart`).
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, EngineConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let host: IpAddr = host
            .parse()
            .map_err(|_| EngineConfigError::InvalidHost { value: host.clone() })?;

        let port = lookup("PORT").unwrap_or_else(|| "8000".to_string());
        let port: u16 = port
            .parse()
            .map_err(|_| EngineConfigError::InvalidPort { value: port.clone() })?;

        Ok(Self {
            bind: SocketAddr::new(host, port),
            dot_binary: lookup("DOT_BINARY")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("dot")),
            output_stem: lookup("FLOWCHART_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("flowchart")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.dot_binary, PathBuf::from("dot"));
        assert_eq!(config.output_stem, PathBuf::from("flowchart"));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(|k| match k {
            "HOST" => Some("127.0.0.1".to_string()),
            "PORT" => Some("9000".to_string()),
            "FLOWCHART_OUTPUT" => Some("/tmp/render/out".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.output_stem, PathBuf::from("/tmp/render/out"));
    }

    #[test]
    fn test_invalid_port() {
        assert_eq!(
            EngineConfig::from_lookup(|k| (k == "PORT").then(|| "eighty".to_string())),
            Err(EngineConfigError::InvalidPort {
                value: "eighty".to_string()
            })
        );
    }
}
