//! Process settings read from the environment.

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/restshop";
pub const DEFAULT_SCHEMA: &str = "restshop";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_MEDIA_URL: &str = "/media/";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    /// PostgreSQL schema holding all shop tables. Must be a plain identifier.
    pub schema: String,
    pub bind: SocketAddr,
    /// Prefix joined with stored image paths to build public URLs.
    pub media_url: String,
    /// Root prefix every sub-application is mounted under. Empty means `/`.
    pub api_prefix: String,
    pub max_connections: u32,
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            schema: DEFAULT_SCHEMA.into(),
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            media_url: DEFAULT_MEDIA_URL.into(),
            api_prefix: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup; unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let schema = lookup("RESTSHOP_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        if !is_identifier(&schema) {
            return Err(ConfigError::Env {
                name: "RESTSHOP_SCHEMA",
                reason: format!("'{}' is not a valid identifier", schema),
            });
        }
        let bind_raw = lookup("RESTSHOP_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let bind = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Env {
            name: "RESTSHOP_BIND",
            reason: format!("{}: {}", bind_raw, e),
        })?;
        let media_url = lookup("RESTSHOP_MEDIA_URL").unwrap_or_else(|| DEFAULT_MEDIA_URL.into());
        let api_prefix = normalize_prefix(&lookup("RESTSHOP_API_PREFIX").unwrap_or_default());
        let max_connections = parse_or("RESTSHOP_MAX_CONNECTIONS", lookup("RESTSHOP_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        let body_limit = parse_or("RESTSHOP_BODY_LIMIT", lookup("RESTSHOP_BODY_LIMIT"), DEFAULT_BODY_LIMIT)?;
        Ok(Self {
            database_url,
            schema,
            bind,
            media_url,
            api_prefix,
            max_connections,
            body_limit,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|e: T::Err| ConfigError::Env {
            name,
            reason: format!("{}: {}", s, e),
        }),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// "" and "/" mean root; otherwise a single leading slash and no trailing slash.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
