// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Any error
//! here is fatal: the process must not start with a partial key set or a
//! half-parsed policy.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_PUBLIC_KEYS` | Comma-separated PEM files with RSA public keys, in verification order | Required |
//! | `API_KEY_SECRET` | Fixed API-key secret (unset rejects every API key) | Unset |
//! | `API_KEY_HEADER` | Header carrying the API key | `X-Api-Key` |
//! | `AUTH_COOKIE_NAME` | Cookie carrying a bearer token (empty disables) | Empty |
//! | `ADMIN_GROUP` | Group eligible for admin elevation | `admin` |
//! | `ELEVATION_HEADER` | Legacy admin elevation header | `X-Admin-Request` |
//! | `ELEVATION_VALUE` | Value the elevation header must carry | `available` |
//! | `PAYMENT_SERVICE_URL` | Payment provider base URL | `http://localhost:9001` |
//! | `ATTENDEE_SERVICE_URL` | Registration service base URL | `http://localhost:9002` |
//! | `DOWNSTREAM_TIMEOUT_SECS` | Collaborator HTTP timeout | `10` |
//! | `SHUTDOWN_GRACE_SECS` | Graceful shutdown window | `10` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS when both are set | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;
use url::Url;

use crate::auth::{AuthPolicy, CredentialSources, KeyRing, KeyRingError};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_PUBLIC_KEYS_ENV: &str = "AUTH_PUBLIC_KEYS";
pub const API_KEY_SECRET_ENV: &str = "API_KEY_SECRET";
pub const API_KEY_HEADER_ENV: &str = "API_KEY_HEADER";
pub const AUTH_COOKIE_NAME_ENV: &str = "AUTH_COOKIE_NAME";
pub const ADMIN_GROUP_ENV: &str = "ADMIN_GROUP";
pub const ELEVATION_HEADER_ENV: &str = "ELEVATION_HEADER";
pub const ELEVATION_VALUE_ENV: &str = "ELEVATION_VALUE";
pub const PAYMENT_SERVICE_URL_ENV: &str = "PAYMENT_SERVICE_URL";
pub const ATTENDEE_SERVICE_URL_ENV: &str = "ATTENDEE_SERVICE_URL";
pub const DOWNSTREAM_TIMEOUT_ENV: &str = "DOWNSTREAM_TIMEOUT_SECS";
pub const SHUTDOWN_GRACE_ENV: &str = "SHUTDOWN_GRACE_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_KEY_HEADER: &str = "X-Api-Key";
const DEFAULT_ADMIN_GROUP: &str = "admin";
const DEFAULT_ELEVATION_HEADER: &str = "X-Admin-Request";
const DEFAULT_ELEVATION_VALUE: &str = "available";
const DEFAULT_PAYMENT_SERVICE_URL: &str = "http://localhost:9001";
const DEFAULT_ATTENDEE_SERVICE_URL: &str = "http://localhost:9002";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to load bearer verification keys: {0}")]
    KeyRing(#[from] KeyRingError),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected `json` or `pretty`, got `{other}`")),
        }
    }
}

/// Certificate and key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Fully validated process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub public_key_paths: Vec<PathBuf>,
    pub credential_sources: CredentialSources,
    pub policy: AuthPolicy,
    pub payment_service_url: Url,
    pub attendee_service_url: Url,
    pub downstream_timeout: Duration,
    pub shutdown_grace: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = parse(HOST_ENV, &host)?;
        let port = match var(PORT_ENV) {
            Some(port) => parse(PORT_ENV, &port)?,
            None => DEFAULT_PORT,
        };

        let public_key_paths: Vec<PathBuf> = var(AUTH_PUBLIC_KEYS_ENV)
            .ok_or(ConfigError::Missing(AUTH_PUBLIC_KEYS_ENV))?
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
        if public_key_paths.is_empty() {
            return Err(ConfigError::Missing(AUTH_PUBLIC_KEYS_ENV));
        }

        let credential_sources = CredentialSources {
            api_key_header: header_name(
                API_KEY_HEADER_ENV,
                var(API_KEY_HEADER_ENV).as_deref().unwrap_or(DEFAULT_API_KEY_HEADER),
            )?,
            cookie_name: var(AUTH_COOKIE_NAME_ENV).unwrap_or_default(),
        };

        let policy = AuthPolicy {
            api_key_secret: var(API_KEY_SECRET_ENV),
            admin_group: var(ADMIN_GROUP_ENV).unwrap_or_else(|| DEFAULT_ADMIN_GROUP.to_string()),
            elevation_header: header_name(
                ELEVATION_HEADER_ENV,
                var(ELEVATION_HEADER_ENV).as_deref().unwrap_or(DEFAULT_ELEVATION_HEADER),
            )?,
            elevation_value: var(ELEVATION_VALUE_ENV)
                .unwrap_or_else(|| DEFAULT_ELEVATION_VALUE.to_string()),
        };

        let payment_service_url = parse_url(
            PAYMENT_SERVICE_URL_ENV,
            var(PAYMENT_SERVICE_URL_ENV).as_deref().unwrap_or(DEFAULT_PAYMENT_SERVICE_URL),
        )?;
        let attendee_service_url = parse_url(
            ATTENDEE_SERVICE_URL_ENV,
            var(ATTENDEE_SERVICE_URL_ENV).as_deref().unwrap_or(DEFAULT_ATTENDEE_SERVICE_URL),
        )?;

        let downstream_timeout = seconds(DOWNSTREAM_TIMEOUT_ENV, var(DOWNSTREAM_TIMEOUT_ENV))?;
        let shutdown_grace = seconds(SHUTDOWN_GRACE_ENV, var(SHUTDOWN_GRACE_ENV))?;

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(format) => format
                .parse()
                .map_err(|reason| ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason,
                })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            public_key_paths,
            credential_sources,
            policy,
            payment_service_url,
            attendee_service_url,
            downstream_timeout,
            shutdown_grace,
            tls,
            log_format,
        })
    }

    /// Parse the configured key files. A single bad key fails the whole ring.
    pub fn load_keyring(&self) -> Result<KeyRing, ConfigError> {
        Ok(KeyRing::from_pem_files(&self.public_key_paths)?)
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn header_name(name: &'static str, value: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(value.as_bytes()).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url: Url = parse(name, value)?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("{value} cannot be used as a base URL"),
        });
    }
    Ok(url)
}

fn seconds(name: &'static str, value: Option<String>) -> Result<Duration, ConfigError> {
    match value {
        Some(v) => parse(name, &v).map(Duration::from_secs),
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    }
}
