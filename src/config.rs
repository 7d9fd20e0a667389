// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup into an
//! [`AppConfig`] and passed to constructors. Nothing reads the environment
//! after that.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3001` |
//! | `DATA_DIR` | Directory of the auth-record database | `./data` |
//! | `JWT_SECRET` | HMAC secret for access tokens | Required |
//! | `JWT_ISSUER` | `iss` claim of issued tokens | Required |
//! | `JWT_EXPIRES_IN` | Access-token lifetime (seconds) | `3600` |
//! | `SESSION_CACHE_CAPACITY` | Max cached sessions | `100000` |
//! | `SESSION_PURGE_INTERVAL_SECS` | How often expired sessions are swept | `60` |
//! | `STORE_TIMEOUT_SECS` | Bound on one auth-store call | `5` |
//! | `CACHE_TIMEOUT_SECS` | Bound on one cache call | `10` |
//! | `SSO_HOST` | SSO validation base URL | Required |
//! | `SSO_APP_ID` / `SSO_APP_SECRET` | SSO service credentials | Required |
//! | `SSO_TIMEOUT_SECS` | SSO request bound | `10` |
//! | `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` | OAuth client | Required |
//! | `GOOGLE_REDIRECT_URI` | OAuth redirect URI | Required |
//! | `GOOGLE_AUTH_URL` / `GOOGLE_TOKEN_URL` / `GOOGLE_USERINFO_URL` | OAuth endpoints | Google |
//! | `USER_SERVICE_URL` | User profile service base URL | Required |
//! | `USER_SERVICE_TIMEOUT_SECS` | Profile call bound | `60` |
//! | `CURRENT_ACADEMIC_YEAR` | Two-digit academic year | `65` |
//! | `MAX_RESTRICT_YEAR` | Highest admitted study year | `8` |
//! | `SHUTDOWN_TIMEOUT_SECS` | Bound on graceful shutdown | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::IssuanceSettings;
use crate::identity::google::{DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL, DEFAULT_USERINFO_URL};
use crate::identity::{GoogleOAuthConfig, SsoConfig};
use crate::profile::ProfileClientConfig;
use crate::provisioning::{PolicyConfig, DEFAULT_CURRENT_ACADEMIC_YEAR, DEFAULT_MAX_RESTRICT_YEAR};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory.
///
/// The redb file `auth.redb` is created inside it.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_EXPIRES_IN_ENV: &str = "JWT_EXPIRES_IN";

pub const SESSION_CACHE_CAPACITY_ENV: &str = "SESSION_CACHE_CAPACITY";
pub const SESSION_PURGE_INTERVAL_ENV: &str = "SESSION_PURGE_INTERVAL_SECS";
pub const STORE_TIMEOUT_ENV: &str = "STORE_TIMEOUT_SECS";
pub const CACHE_TIMEOUT_ENV: &str = "CACHE_TIMEOUT_SECS";

pub const SSO_HOST_ENV: &str = "SSO_HOST";
pub const SSO_APP_ID_ENV: &str = "SSO_APP_ID";
pub const SSO_APP_SECRET_ENV: &str = "SSO_APP_SECRET";
pub const SSO_TIMEOUT_ENV: &str = "SSO_TIMEOUT_SECS";

pub const GOOGLE_CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";
pub const GOOGLE_CLIENT_SECRET_ENV: &str = "GOOGLE_CLIENT_SECRET";
pub const GOOGLE_REDIRECT_URI_ENV: &str = "GOOGLE_REDIRECT_URI";
pub const GOOGLE_AUTH_URL_ENV: &str = "GOOGLE_AUTH_URL";
pub const GOOGLE_TOKEN_URL_ENV: &str = "GOOGLE_TOKEN_URL";
pub const GOOGLE_USERINFO_URL_ENV: &str = "GOOGLE_USERINFO_URL";

pub const USER_SERVICE_URL_ENV: &str = "USER_SERVICE_URL";
pub const USER_SERVICE_TIMEOUT_ENV: &str = "USER_SERVICE_TIMEOUT_SECS";

pub const CURRENT_ACADEMIC_YEAR_ENV: &str = "CURRENT_ACADEMIC_YEAR";
pub const MAX_RESTRICT_YEAR_ENV: &str = "MAX_RESTRICT_YEAR";

pub const SHUTDOWN_TIMEOUT_ENV: &str = "SHUTDOWN_TIMEOUT_SECS";

/// `json` or `pretty`.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_JWT_EXPIRES_IN: u64 = 3600;
const DEFAULT_SESSION_CACHE_CAPACITY: usize = 100_000;
const DEFAULT_SESSION_PURGE_INTERVAL_SECS: u64 = 60;
const MAX_SESSION_PURGE_INTERVAL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;
const MAX_STORE_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CACHE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SSO_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GOOGLE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_SERVICE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Upper bound for `JWT_EXPIRES_IN` (30 days).
pub const MAX_JWT_EXPIRES_IN: u64 = 30 * 24 * 60 * 60;
/// Upper bound for `CACHE_TIMEOUT_SECS`.
pub const MAX_CACHE_TIMEOUT_SECS: u64 = 300;

/// Database file name inside `DATA_DIR`.
pub const AUTH_DB_FILE: &str = "auth.redb";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub expires_in: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub capacity: usize,
    pub timeout: Duration,
    pub purge_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub store_timeout: Duration,
    pub jwt: JwtConfig,
    pub cache: CacheConfig,
    pub sso: SsoConfig,
    pub google: GoogleOAuthConfig,
    pub user_service: ProfileClientConfig,
    pub policy: PolicyConfig,
    pub shutdown_timeout: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let host = env.or_default(HOST_ENV, DEFAULT_HOST);
        let port: u16 = env.parsed_or(PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                value: host.clone(),
            })?;

        let secret = env.required(JWT_SECRET_ENV)?;
        let jwt = JwtConfig {
            secret,
            issuer: env.required(JWT_ISSUER_ENV)?,
            expires_in: env.bounded_seconds_or(JWT_EXPIRES_IN_ENV, DEFAULT_JWT_EXPIRES_IN, MAX_JWT_EXPIRES_IN)?,
        };

        let capacity: usize = env.parsed_or(SESSION_CACHE_CAPACITY_ENV, DEFAULT_SESSION_CACHE_CAPACITY)?;
        if capacity == 0 {
            return Err(ConfigError::Invalid {
                name: SESSION_CACHE_CAPACITY_ENV,
                value: "0".to_string(),
            });
        }
        let cache = CacheConfig {
            capacity,
            timeout: env.bounded_seconds_or(CACHE_TIMEOUT_ENV, DEFAULT_CACHE_TIMEOUT_SECS, MAX_CACHE_TIMEOUT_SECS)?,
            purge_interval: env.bounded_seconds_or(
                SESSION_PURGE_INTERVAL_ENV,
                DEFAULT_SESSION_PURGE_INTERVAL_SECS,
                MAX_SESSION_PURGE_INTERVAL_SECS,
            )?,
        };

        let sso = SsoConfig {
            host: env.required(SSO_HOST_ENV)?,
            app_id: env.required(SSO_APP_ID_ENV)?,
            app_secret: env.required(SSO_APP_SECRET_ENV)?,
            timeout: env.seconds_or(SSO_TIMEOUT_ENV, DEFAULT_SSO_TIMEOUT_SECS)?,
        };

        let google = GoogleOAuthConfig {
            client_id: env.required(GOOGLE_CLIENT_ID_ENV)?,
            client_secret: env.required(GOOGLE_CLIENT_SECRET_ENV)?,
            redirect_uri: env.required(GOOGLE_REDIRECT_URI_ENV)?,
            auth_url: env.or_default(GOOGLE_AUTH_URL_ENV, DEFAULT_AUTH_URL),
            token_url: env.or_default(GOOGLE_TOKEN_URL_ENV, DEFAULT_TOKEN_URL),
            userinfo_url: env.or_default(GOOGLE_USERINFO_URL_ENV, DEFAULT_USERINFO_URL),
            timeout: Duration::from_secs(DEFAULT_GOOGLE_TIMEOUT_SECS),
        };

        let user_service = ProfileClientConfig {
            base_url: env.required(USER_SERVICE_URL_ENV)?,
            timeout: env.seconds_or(USER_SERVICE_TIMEOUT_ENV, DEFAULT_USER_SERVICE_TIMEOUT_SECS)?,
        };

        let policy = PolicyConfig {
            current_academic_year: env.parsed_or(CURRENT_ACADEMIC_YEAR_ENV, DEFAULT_CURRENT_ACADEMIC_YEAR)?,
            max_restrict_year: env.parsed_or(MAX_RESTRICT_YEAR_ENV, DEFAULT_MAX_RESTRICT_YEAR)?,
        };

        let log_format = match env.optional(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            data_dir: PathBuf::from(env.or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR)),
            store_timeout: env.bounded_seconds_or(STORE_TIMEOUT_ENV, DEFAULT_STORE_TIMEOUT_SECS, MAX_STORE_TIMEOUT_SECS)?,
            jwt,
            cache,
            sso,
            google,
            user_service,
            policy,
            shutdown_timeout: env.seconds_or(SHUTDOWN_TIMEOUT_ENV, DEFAULT_SHUTDOWN_TIMEOUT_SECS)?,
            log_format,
        })
    }

    pub fn auth_db_path(&self) -> PathBuf {
        self.data_dir.join(AUTH_DB_FILE)
    }

    pub fn issuance_settings(&self) -> IssuanceSettings {
        IssuanceSettings {
            issuer: self.jwt.issuer.clone(),
            access_ttl: self.jwt.expires_in,
            cache_timeout: self.cache.timeout,
        }
    }
}

/// Read the log format before the rest of the config, for tracing init.
pub fn log_format_from_env() -> LogFormat {
    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Unset and blank are treated alike.
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        }
    }

    fn seconds_or(&self, name: &'static str, default: u64) -> Result<Duration, ConfigError> {
        self.parsed_or(name, default).map(Duration::from_secs)
    }

    /// Seconds in `1..=max`.
    fn bounded_seconds_or(&self, name: &'static str, default: u64, max: u64) -> Result<Duration, ConfigError> {
        let secs: u64 = self.parsed_or(name, default)?;
        if secs == 0 || secs > max {
            return Err(ConfigError::Invalid {
                name,
                value: secs.to_string(),
            });
        }
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (JWT_SECRET_ENV, "asuperstrong32bitpasswordgohere!"),
            (JWT_ISSUER_ENV, "graderlist-auth"),
            (SSO_HOST_ENV, "https://sso.example"),
            (SSO_APP_ID_ENV, "app-id"),
            (SSO_APP_SECRET_ENV, "app-secret"),
            (GOOGLE_CLIENT_ID_ENV, "client-id"),
            (GOOGLE_CLIENT_SECRET_ENV, "client-secret"),
            (GOOGLE_REDIRECT_URI_ENV, "https://app.example/callback"),
            (USER_SERVICE_URL_ENV, "http://users.internal:3000"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = load(&required_vars()).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3001".parse().unwrap());
        assert_eq!(config.jwt.expires_in, Duration::from_secs(3600));
        assert_eq!(config.cache.capacity, 100_000);
        assert_eq!(config.cache.timeout, Duration::from_secs(10));
        assert_eq!(config.cache.purge_interval, Duration::from_secs(60));
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.user_service.timeout, Duration::from_secs(60));
        assert_eq!(config.google.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.policy, PolicyConfig::default());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.auth_db_path(), PathBuf::from("./data").join("auth.redb"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = required_vars();
        vars.insert(PORT_ENV, "8443");
        vars.insert(JWT_EXPIRES_IN_ENV, "900");
        vars.insert(CURRENT_ACADEMIC_YEAR_ENV, "67");
        vars.insert(MAX_RESTRICT_YEAR_ENV, "4");
        vars.insert(LOG_FORMAT_ENV, "json");

        let config = load(&vars).unwrap();
        assert_eq!(config.bind_addr.port(), 8443);
        assert_eq!(config.issuance_settings().access_ttl, Duration::from_secs(900));
        assert_eq!(config.policy.current_academic_year, 67);
        assert_eq!(config.policy.max_restrict_year, 4);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_or_blank_secret_is_rejected() {
        let mut vars = required_vars();
        vars.remove(JWT_SECRET_ENV);
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing(JWT_SECRET_ENV));

        vars.insert(JWT_SECRET_ENV, "   ");
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing(JWT_SECRET_ENV));
    }

    #[test]
    fn unparsable_numbers_are_invalid() {
        let mut vars = required_vars();
        vars.insert(JWT_EXPIRES_IN_ENV, "an hour");
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid {
                name: JWT_EXPIRES_IN_ENV,
                value: "an hour".to_string(),
            }
        );
    }

    #[test]
    fn access_lifetime_outside_bounds_is_invalid() {
        for value in ["0", "2592001", "18446744073709551615"] {
            let mut vars = required_vars();
            vars.insert(JWT_EXPIRES_IN_ENV, value);
            assert_eq!(
                load(&vars).unwrap_err(),
                ConfigError::Invalid {
                    name: JWT_EXPIRES_IN_ENV,
                    value: value.to_string(),
                }
            );
        }

        let mut vars = required_vars();
        vars.insert(JWT_EXPIRES_IN_ENV, "2592000");
        assert_eq!(
            load(&vars).unwrap().jwt.expires_in,
            Duration::from_secs(MAX_JWT_EXPIRES_IN)
        );
    }

    #[test]
    fn cache_timeout_outside_bounds_is_invalid() {
        for value in ["0", "301"] {
            let mut vars = required_vars();
            vars.insert(CACHE_TIMEOUT_ENV, value);
            assert!(matches!(
                load(&vars),
                Err(ConfigError::Invalid { name: CACHE_TIMEOUT_ENV, .. })
            ));
        }

        let mut vars = required_vars();
        vars.insert(SESSION_PURGE_INTERVAL_ENV, "0");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: SESSION_PURGE_INTERVAL_ENV, .. })
        ));
    }

    #[test]
    fn store_timeout_is_bounded() {
        for value in ["0", "301"] {
            let mut vars = required_vars();
            vars.insert(STORE_TIMEOUT_ENV, value);
            assert!(matches!(
                load(&vars),
                Err(ConfigError::Invalid { name: STORE_TIMEOUT_ENV, .. })
            ));
        }

        let mut vars = required_vars();
        vars.insert(STORE_TIMEOUT_ENV, "30");
        assert_eq!(load(&vars).unwrap().store_timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_cache_capacity_is_invalid() {
        let mut vars = required_vars();
        vars.insert(SESSION_CACHE_CAPACITY_ENV, "0");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: SESSION_CACHE_CAPACITY_ENV, .. })
        ));
    }

    #[test]
    fn unknown_log_format_is_invalid() {
        let mut vars = required_vars();
        vars.insert(LOG_FORMAT_ENV, "xml");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: LOG_FORMAT_ENV, .. })
        ));
    }
}
