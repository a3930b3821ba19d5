//! Server configuration with environment overrides.
//!
//! Reads:
//! - `AEBRIDGE_HOST`: listen address (default: "127.0.0.1")
//! - `AEBRIDGE_PORT`: listen port (default: "2000")
//! - `AEBRIDGE_MAX_BODY_BYTES`: POST body cap (default: 1 MiB)
//! - `AEBRIDGE_EVAL_TIMEOUT_SECS`: evaluator deadline (default: "30")
//! - `AEBRIDGE_EVAL_COMMAND`: host program and arguments, whitespace separated
//! - `AEBRIDGE_EVAL_CONCURRENCY`: concurrent host command runs (default: "1")

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::host::HostCommand;

pub const DEFAULT_PORT: u16 = 2000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_EVAL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("AEBRIDGE_EVAL_COMMAND is not set; the server needs a host program to evaluate scripts")]
    MissingEvalCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_bytes: usize,
    pub eval_timeout: Duration,
    pub host_command: Option<HostCommand>,
    pub eval_concurrency: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            eval_timeout: DEFAULT_EVAL_TIMEOUT,
            host_command: None,
            eval_concurrency: 1,
        }
    }
}

impl BridgeConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; set keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BridgeConfig::default();

        if let Some(host) = lookup("AEBRIDGE_HOST") {
            config.host = parse("AEBRIDGE_HOST", &host)?;
        }
        if let Some(port) = lookup("AEBRIDGE_PORT") {
            config.port = parse("AEBRIDGE_PORT", &port)?;
        }
        if let Some(limit) = lookup("AEBRIDGE_MAX_BODY_BYTES") {
            config.max_body_bytes = parse_positive("AEBRIDGE_MAX_BODY_BYTES", &limit)?;
        }
        if let Some(secs) = lookup("AEBRIDGE_EVAL_TIMEOUT_SECS") {
            let secs: u64 = parse_positive("AEBRIDGE_EVAL_TIMEOUT_SECS", &secs)?;
            config.eval_timeout = Duration::from_secs(secs);
        }
        if let Some(command) = lookup("AEBRIDGE_EVAL_COMMAND") {
            let parsed = HostCommand::parse(&command).ok_or_else(|| ConfigError::Invalid {
                key: "AEBRIDGE_EVAL_COMMAND",
                value: command.clone(),
                reason: "expected a program name".to_string(),
            })?;
            config.host_command = Some(parsed);
        }
        if let Some(permits) = lookup("AEBRIDGE_EVAL_CONCURRENCY") {
            config.eval_concurrency = parse_positive("AEBRIDGE_EVAL_CONCURRENCY", &permits)?;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let parsed: T = parse(key, value)?;
    if parsed == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_listen_on_loopback_2000() {
        let config = BridgeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:2000");
        assert_eq!(config.eval_concurrency, 1);
        assert!(config.host_command.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = BridgeConfig::from_lookup(lookup(&[
            ("AEBRIDGE_HOST", "::1"),
            ("AEBRIDGE_PORT", "8123"),
            ("AEBRIDGE_MAX_BODY_BYTES", "4096"),
            ("AEBRIDGE_EVAL_TIMEOUT_SECS", "5"),
            ("AEBRIDGE_EVAL_COMMAND", "osascript -l JavaScript"),
            ("AEBRIDGE_EVAL_CONCURRENCY", "2"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "[::1]:8123");
        assert_eq!(config.max_body_bytes, 4096);
        assert_eq!(config.eval_timeout, Duration::from_secs(5));
        let command = config.host_command.unwrap();
        assert_eq!(command.program, "osascript");
        assert_eq!(command.args, vec!["-l".to_string(), "JavaScript".to_string()]);
        assert_eq!(config.eval_concurrency, 2);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = BridgeConfig::from_lookup(lookup(&[("AEBRIDGE_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "AEBRIDGE_PORT", .. }));

        let err =
            BridgeConfig::from_lookup(lookup(&[("AEBRIDGE_EVAL_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        let err = BridgeConfig::from_lookup(lookup(&[("AEBRIDGE_EVAL_COMMAND", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "AEBRIDGE_EVAL_COMMAND", .. }));
    }
}
