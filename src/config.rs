// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the note database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SESSION_SECRET` | HMAC secret for session tokens | Random per process |
//! | `SESSION_TTL_SECS` | Session lifetime in seconds | `604800` (7 days) |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `CORS_PERMISSIVE` | Allow any origin (`true`/`false`) | `true` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{
    env,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use chrono::Duration;
use ring::rand::{SecureRandom, SystemRandom};

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
/// Environment variable name for the session signing secret.
///
/// When unset a random secret is generated, so sessions do not survive a
/// restart.
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const CORS_PERMISSIVE_ENV: &str = "CORS_PERMISSIVE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// Seven days.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 604_800;

/// Length of a generated session secret in bytes.
const GENERATED_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} is set but {1} is not; both are required for TLS")]
    IncompleteTls(&'static str, &'static str),

    #[error("failed to generate session secret")]
    SecretGeneration,
}

/// Certificate and key locations for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (case-insensitive) is pretty.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    pub fn from_env() -> Self {
        env::var(LOG_FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Process configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub session_secret: Vec<u8>,
    /// True when the secret was generated rather than configured.
    pub session_secret_generated: bool,
    pub session_ttl: Duration,
    pub tls: Option<TlsPaths>,
    pub cors_permissive: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = parse_var(HOST_ENV, &host)?;
        let port = match get(PORT_ENV) {
            Some(raw) => parse_var(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };

        let (session_secret, session_secret_generated) = match get(SESSION_SECRET_ENV) {
            Some(secret) => (secret.into_bytes(), false),
            None => (generate_secret()?, true),
        };

        let session_ttl = match get(SESSION_TTL_ENV) {
            Some(raw) => {
                let secs: i64 = parse_var(SESSION_TTL_ENV, &raw)?;
                Duration::try_seconds(secs)
                    .filter(|ttl| *ttl > Duration::zero())
                    .ok_or_else(|| ConfigError::InvalidValue {
                        name: SESSION_TTL_ENV,
                        value: raw,
                        reason: "must be a positive number of seconds".to_string(),
                    })?
            }
            None => Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (Some(_), None) => return Err(ConfigError::IncompleteTls(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::IncompleteTls(TLS_KEY_PATH_ENV, TLS_CERT_PATH_ENV)),
            (None, None) => None,
        };

        let cors_permissive = match get(CORS_PERMISSIVE_ENV) {
            Some(raw) => parse_var(CORS_PERMISSIVE_ENV, &raw.to_ascii_lowercase())?,
            None => true,
        };

        Ok(Self {
            data_dir,
            bind_addr: SocketAddr::new(host, port),
            session_secret,
            session_secret_generated,
            session_ttl,
            tls,
            cors_permissive,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("data_dir", &self.data_dir)
            .field("bind_addr", &self.bind_addr)
            .field("session_secret", &"<redacted>")
            .field("session_secret_generated", &self.session_secret_generated)
            .field("session_ttl", &self.session_ttl)
            .field("tls", &self.tls)
            .field("cors_permissive", &self.cors_permissive)
            .finish()
    }
}

fn parse_var<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn generate_secret() -> Result<Vec<u8>, ConfigError> {
    let mut secret = vec![0u8; GENERATED_SECRET_LEN];
    SystemRandom::new()
        .fill(&mut secret)
        .map_err(|_| ConfigError::SecretGeneration)?;
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.session_ttl, Duration::days(7));
        assert!(config.session_secret_generated);
        assert_eq!(config.session_secret.len(), GENERATED_SECRET_LEN);
        assert!(config.tls.is_none());
        assert!(config.cors_permissive);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = config_from(&[
            (DATA_DIR_ENV, "/var/lib/notes"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (SESSION_SECRET_ENV, "s3cret"),
            (SESSION_TTL_ENV, "60"),
            (TLS_CERT_PATH_ENV, "/tls/cert.pem"),
            (TLS_KEY_PATH_ENV, "/tls/key.pem"),
            (CORS_PERMISSIVE_ENV, "FALSE"),
        ])
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/notes"));
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 9000)));
        assert_eq!(config.session_secret, b"s3cret".to_vec());
        assert!(!config.session_secret_generated);
        assert_eq!(config.session_ttl, Duration::seconds(60));
        assert_eq!(
            config.tls.unwrap().cert_path,
            PathBuf::from("/tls/cert.pem")
        );
        assert!(!config.cors_permissive);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            config_from(&[(PORT_ENV, "eighty")]),
            Err(ConfigError::InvalidValue { name: PORT_ENV, .. })
        ));
        assert!(matches!(
            config_from(&[(SESSION_TTL_ENV, "0")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config_from(&[(TLS_CERT_PATH_ENV, "/tls/cert.pem")]),
            Err(ConfigError::IncompleteTls(..))
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let config = config_from(&[(SESSION_SECRET_ENV, "visible-if-leaked")]).unwrap();
        assert!(!format!("{config:?}").contains("visible-if-leaked"));
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("other"), LogFormat::Pretty);
    }
}
