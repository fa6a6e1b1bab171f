use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::FixedOffset;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the service runs on the
    /// in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,

    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,

    pub store_timeout_secs: u64,

    /// Offset of the server's reference timezone, used to bucket mood
    /// entries into calendar days.
    pub reference_utc_offset_minutes: i32,

    pub seed_on_startup: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("PORT", 8080)?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            store_timeout_secs: parse_or("STORE_TIMEOUT_SECS", 5)?,
            reference_utc_offset_minutes: parse_or("REFERENCE_UTC_OFFSET_MINUTES", 0)?,
            seed_on_startup: parse_or("SEED_ON_STARTUP", true)?,
        };

        if config.store_timeout_secs == 0 {
            return Err(anyhow!("STORE_TIMEOUT_SECS must be greater than 0"));
        }
        config.reference_offset()?;

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn reference_offset(&self) -> anyhow::Result<FixedOffset> {
        self.reference_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow!(
                    "REFERENCE_UTC_OFFSET_MINUTES out of range: {}",
                    self.reference_utc_offset_minutes
                )
            })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 20,
            host: "0.0.0.0".into(),
            port: 8080,
            cors_allowed_origins: Vec::new(),
            store_timeout_secs: 5,
            reference_utc_offset_minutes: 0,
            seed_on_startup: true,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reference_offset_is_utc() {
        let config = Config::default();
        assert_eq!(config.reference_offset().unwrap().local_minus_utc(), 0);
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let config = Config {
            reference_utc_offset_minutes: 24 * 60,
            ..Config::default()
        };
        assert!(config.reference_offset().is_err());

        let overflowing = Config {
            reference_utc_offset_minutes: 40_000_000,
            ..Config::default()
        };
        assert!(overflowing.reference_offset().is_err());

        let west = Config {
            reference_utc_offset_minutes: -300,
            ..Config::default()
        };
        assert_eq!(west.reference_offset().unwrap().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_listen_addr() {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 9000,
            ..Config::default()
        };
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
    }
}
