//! Server configuration, loaded from environment variables.

use std::time::Duration;

use parlor_session::DEFAULT_SESSION_TTL;

use crate::ParlorError;

/// Default number of chat messages kept per room.
pub const DEFAULT_CHAT_HISTORY_LEN: usize = 100;

/// Which shared store backs the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// In-process store. Single process only.
    Memory,
    /// A `redis://` (or `rediss://`) URL.
    Redis(String),
}

impl StoreUrl {
    pub fn parse(raw: &str) -> Result<Self, ParlorError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("memory") {
            return Ok(Self::Memory);
        }
        if raw.starts_with("redis://") || raw.starts_with("rediss://") {
            return Ok(Self::Redis(raw.to_owned()));
        }
        Err(ParlorError::Config(format!(
            "PARLOR_STORE_URL must be `memory` or a redis:// URL, got `{raw}`"
        )))
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind: String,
    /// Address of the `/health` endpoint. `None` disables it.
    pub health_bind: Option<String>,
    pub store: StoreUrl,
    /// How long a session lives without inbound traffic.
    pub session_ttl: Duration,
    /// Chat messages kept per room; older ones are trimmed.
    pub chat_history_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_owned(),
            health_bind: None,
            store: StoreUrl::Memory,
            session_ttl: DEFAULT_SESSION_TTL,
            chat_history_len: DEFAULT_CHAT_HISTORY_LEN,
        }
    }
}

impl ServerConfig {
    /// Reads `PARLOR_*` variables, falling back to the defaults.
    ///
    /// # Errors
    /// Returns [`ParlorError::Config`] when a variable is set but can't be
    /// parsed.
    pub fn from_env() -> Result<Self, ParlorError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ParlorError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store = match var("PARLOR_STORE_URL") {
            Some(raw) => StoreUrl::parse(&raw)?,
            None => defaults.store,
        };
        let session_ttl = match var("PARLOR_SESSION_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_number("PARLOR_SESSION_TTL_SECS", &raw)?),
            None => defaults.session_ttl,
        };
        let chat_history_len = match var("PARLOR_CHAT_HISTORY_LEN") {
            Some(raw) => parse_number("PARLOR_CHAT_HISTORY_LEN", &raw)?,
            None => defaults.chat_history_len,
        };

        Ok(Self {
            bind: var("PARLOR_BIND").unwrap_or(defaults.bind),
            health_bind: var("PARLOR_HEALTH_BIND"),
            store,
            session_ttl,
            chat_history_len,
        })
    }
}

/// Parses a strictly positive number; zero is a config error.
fn parse_number<T>(name: &str, raw: &str) -> Result<T, ParlorError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    raw.trim()
        .parse()
        .ok()
        .filter(|n: &T| *n != T::default())
        .ok_or_else(|| ParlorError::Config(format!("{name} must be a positive number, got `{raw}`")))
}
