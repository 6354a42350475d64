//! Configuration types.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::connections::model::DEFAULT_ENDPOINT;
use crate::connections::probe::DEFAULT_PROBE_TIMEOUT;
use crate::error::ConfigError;

/// Runtime configuration, read from `CONNECTIONS_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the persisted settings document.
    pub data_path: PathBuf,
    /// Address the HTTP settings API binds to.
    pub bind_addr: IpAddr,
    /// Port for the HTTP settings API.
    pub port: u16,
    /// Upper bound on a single connectivity probe.
    pub probe_timeout: Duration,
    /// Endpoint given to newly added profiles and to persisted entries without one.
    pub default_endpoint: String,
    /// Whether to run the interactive stdin console.
    pub console: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(None),
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            default_endpoint: DEFAULT_ENDPOINT.to_string(),
            console: true,
        }
    }
}

impl AppConfig {
    /// Build the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup. Unset variables
    /// fall back to their defaults; set but unparseable ones are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_path = lookup("CONNECTIONS_DATA_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_path(lookup("HOME")));

        let bind_addr = match lookup("CONNECTIONS_BIND") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "CONNECTIONS_BIND".into(),
                message: format!("'{raw}' is not an IP address"),
            })?,
            None => defaults.bind_addr,
        };

        let port = match lookup("CONNECTIONS_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "CONNECTIONS_PORT".into(),
                message: format!("'{raw}' is not a port number"),
            })?,
            None => defaults.port,
        };

        let probe_timeout = match lookup("CONNECTIONS_PROBE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "CONNECTIONS_PROBE_TIMEOUT_SECS".into(),
                    message: format!("'{raw}' is not a whole number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "CONNECTIONS_PROBE_TIMEOUT_SECS".into(),
                        message: "timeout must be at least 1 second".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.probe_timeout,
        };

        let default_endpoint = lookup("CONNECTIONS_DEFAULT_ENDPOINT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_endpoint);

        let console = match lookup("CONNECTIONS_CONSOLE") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "CONNECTIONS_CONSOLE".into(),
                message: format!("'{raw}' is not a boolean"),
            })?,
            None => defaults.console,
        };

        Ok(Self {
            data_path,
            bind_addr,
            port,
            probe_timeout,
            default_endpoint,
            console,
        })
    }
}

fn default_data_path(home: Option<String>) -> PathBuf {
    let home = home.unwrap_or_else(|| ".".to_string());
    PathBuf::from(home).join(".connection-settings/data.json")
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("HOME", "/home/dev")])).unwrap();
        assert_eq!(
            config.data_path,
            PathBuf::from("/home/dev/.connection-settings/data.json")
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
        assert_eq!(config.default_endpoint, "https://github.com");
        assert!(config.console);
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CONNECTIONS_DATA_PATH", "/tmp/conn.json"),
            ("CONNECTIONS_BIND", "0.0.0.0"),
            ("CONNECTIONS_PORT", "9191"),
            ("CONNECTIONS_PROBE_TIMEOUT_SECS", "3"),
            ("CONNECTIONS_DEFAULT_ENDPOINT", "https://github.acme.com"),
            ("CONNECTIONS_CONSOLE", "off"),
        ]))
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/conn.json"));
        assert_eq!(config.bind_addr, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(config.port, 9191);
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.default_endpoint, "https://github.acme.com");
        assert!(!config.console);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("CONNECTIONS_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("CONNECTIONS_PORT"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result =
            AppConfig::from_lookup(lookup_from(&[("CONNECTIONS_PROBE_TIMEOUT_SECS", "0")]));
        assert!(result.is_err());
    }

    #[test]
    fn blank_default_endpoint_falls_back() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("CONNECTIONS_DEFAULT_ENDPOINT", "  ")])).unwrap();
        assert_eq!(config.default_endpoint, "https://github.com");
    }
}
