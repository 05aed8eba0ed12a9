use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::Duration;
use dotenv::dotenv;
use rand::RngCore;

use crate::session::SessionKey;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite:database.db";
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub database_url: String,
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
}

impl Settings {
    /// Reads settings from the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("SESSION_TTL_HOURS must be an integer, got '{}'", raw))?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };
        let session_ttl = Some(session_ttl_hours)
            .filter(|h| (1..=MAX_SESSION_TTL_HOURS).contains(h))
            .and_then(Duration::try_hours)
            .with_context(|| {
                format!(
                    "SESSION_TTL_HOURS must be between 1 and {}, got {}",
                    MAX_SESSION_TTL_HOURS, session_ttl_hours
                )
            })?;

        Ok(Settings {
            port,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            session_secret: lookup("SESSION_SECRET").filter(|s| !s.is_empty()),
            session_ttl,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        ([0, 0, 0, 0], self.port).into()
    }

    /// Without a configured secret every process start signs with a fresh random key,
    /// which invalidates sessions issued by previous runs.
    pub fn session_key(&self) -> SessionKey {
        let ttl = self.session_ttl;
        match &self.session_secret {
            Some(secret) => SessionKey::new(secret.as_bytes().to_vec(), ttl),
            None => {
                let mut key = vec![0u8; 32];
                rand::thread_rng().fill_bytes(&mut key);
                SessionKey::new(key, ttl)
            }
        }
    }
}
