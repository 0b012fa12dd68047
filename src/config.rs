use anyhow::Context;
use time::UtcOffset;

use crate::nutrition::timestamp::parse_offset;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Offset for dates without one and for calendar-day boundaries.
    pub utc_offset: UtcOffset,
    /// Upper bound on raw records accepted per request.
    pub max_records: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
            },
            utc_offset: UtcOffset::UTC,
            max_records: 5000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let server = ServerConfig {
            host: var("APP_HOST").unwrap_or(defaults.server.host),
            port: match var("APP_PORT") {
                Some(v) => v.parse::<u16>().with_context(|| format!("APP_PORT={v}"))?,
                None => defaults.server.port,
            },
        };
        let utc_offset = match var("MEALLEDGER_UTC_OFFSET") {
            Some(v) => parse_offset(&v)
                .with_context(|| format!("MEALLEDGER_UTC_OFFSET={v} is not ±HH:MM"))?,
            None => defaults.utc_offset,
        };
        let max_records = match var("MEALLEDGER_MAX_RECORDS") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MEALLEDGER_MAX_RECORDS={v}"))?,
            None => defaults.max_records,
        };
        Ok(Self {
            server,
            utc_offset,
            max_records,
        })
    }
}
