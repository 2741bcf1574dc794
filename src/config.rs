use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow, bail};

use crate::{fixer, scheduler::Cadence};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fixer_api_key: String,
    pub fixer_base_url: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_address: String,
    pub provider_timeout: Duration,
    pub sync_cadence: Cadence,
    pub sync_on_start: bool,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("{} environment variable is not set", key))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let sync_cadence = match lookup("SYNC_INTERVAL_SECS") {
            Some(secs) => match parse::<u64>("SYNC_INTERVAL_SECS", &secs)? {
                0 => bail!("SYNC_INTERVAL_SECS must be greater than zero"),
                secs => Cadence::Every(Duration::from_secs(secs)),
            },
            None => Cadence::DailyAtUtcMidnight,
        };
        let timeout_secs = or_default("PROVIDER_TIMEOUT_SECS", "10");

        Ok(Self {
            fixer_api_key: required("FIXER_API_KEY")?,
            fixer_base_url: or_default("FIXER_BASE_URL", fixer::DEFAULT_BASE_URL),
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                &or_default("DATABASE_MAX_CONNECTIONS", "5"),
            )?,
            bind_address: or_default("BIND_ADDRESS", "127.0.0.1:8080"),
            provider_timeout: Duration::from_secs(parse("PROVIDER_TIMEOUT_SECS", &timeout_secs)?),
            sync_cadence,
            sync_on_start: parse("SYNC_ON_START", &or_default("SYNC_ON_START", "true"))?,
        })
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[
            ("FIXER_API_KEY", "secret"),
            ("DATABASE_URL", "postgres://localhost/rates"),
        ])
        .unwrap();

        assert_eq!(config.fixer_api_key, "secret");
        assert_eq!(config.fixer_base_url, "http://data.fixer.io/api");
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert_eq!(config.sync_cadence, Cadence::DailyAtUtcMidnight);
        assert!(config.sync_on_start);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = config(&[("DATABASE_URL", "postgres://localhost/rates")]).unwrap_err();

        assert!(err.to_string().contains("FIXER_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_fatal() {
        let result = config(&[
            ("FIXER_API_KEY", "  "),
            ("DATABASE_URL", "postgres://localhost/rates"),
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_interval_cadence() {
        let config = config(&[
            ("FIXER_API_KEY", "secret"),
            ("DATABASE_URL", "postgres://localhost/rates"),
            ("SYNC_INTERVAL_SECS", "120"),
            ("SYNC_ON_START", "false"),
            ("PROVIDER_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert_eq!(config.sync_cadence, Cadence::Every(Duration::from_secs(120)));
        assert!(!config.sync_on_start);
        assert_eq!(config.provider_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = config(&[
            ("FIXER_API_KEY", "secret"),
            ("DATABASE_URL", "postgres://localhost/rates"),
            ("SYNC_INTERVAL_SECS", "0"),
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = config(&[
            ("FIXER_API_KEY", "secret"),
            ("DATABASE_URL", "postgres://localhost/rates"),
            ("PROVIDER_TIMEOUT_SECS", "ten"),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("PROVIDER_TIMEOUT_SECS"));
    }
}
