use anyhow::{bail, Context};
use std::str::FromStr;
use std::time::Duration;

use crate::application::CommerceSettings;
use crate::domain::shared::{Money, DEFAULT_CURRENCY};
use crate::utils::RetryConfig;

// ============================================================================
// Configuration - environment variables
// ============================================================================
//
//   DATABASE_URL                 PostgreSQL URL; in-memory store when unset
//   DATABASE_MAX_CONNECTIONS     pool size (default 10)
//   HTTP_HOST / HTTP_PORT        bind address (default 0.0.0.0:8080)
//   DEFAULT_CURRENCY             ISO code for new orders/products (USD)
//   ENFORCE_STATUS_TRANSITIONS   reject illegal status jumps (true)
//   SEED_DEMO_DATA               load the demo catalogue (false)
//   RETRY_MAX_ATTEMPTS           attempts per use case (3)
//   RETRY_INITIAL_DELAY_MS       first backoff delay (50)
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub http_host: String,
    pub http_port: u16,
    pub default_currency: String,
    pub enforce_status_transitions: bool,
    pub seed_demo_data: bool,
    pub retry: RetryConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let default_currency = get("DEFAULT_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        // Validates the code and normalizes case
        let default_currency = Money::zero(&default_currency)
            .context("DEFAULT_CURRENCY")?
            .currency()
            .to_string();

        let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        if database_max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let retry_attempts = parse_or(&get, "RETRY_MAX_ATTEMPTS", 3u32)?;
        let retry_delay_ms = parse_or(&get, "RETRY_INITIAL_DELAY_MS", 50u64)?;

        Ok(Self {
            database_url: get("DATABASE_URL"),
            database_max_connections,
            http_host: get("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            http_port: parse_or(&get, "HTTP_PORT", 8080u16)?,
            default_currency,
            enforce_status_transitions: bool_or(&get, "ENFORCE_STATUS_TRANSITIONS", true)?,
            seed_demo_data: bool_or(&get, "SEED_DEMO_DATA", false)?,
            retry: RetryConfig::new(retry_attempts, Duration::from_millis(retry_delay_ms)),
        })
    }

    pub fn settings(&self) -> CommerceSettings {
        CommerceSettings {
            default_currency: self.default_currency.clone(),
            enforce_status_transitions: self.enforce_status_transitions,
            retry: self.retry.clone(),
        }
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        None => Ok(default),
    }
}

fn bool_or<G>(get: &G, name: &str, default: bool) -> anyhow::Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).map(|v| v.to_ascii_lowercase()).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => bail!("invalid value for {name}: {other:?} (expected true/false)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.default_currency, "USD");
        assert!(config.enforce_status_transitions);
        assert!(!config.seed_demo_data);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("HTTP_PORT", "9000"),
            ("DEFAULT_CURRENCY", "eur"),
            ("ENFORCE_STATUS_TRANSITIONS", "off"),
            ("SEED_DEMO_DATA", "1"),
            ("RETRY_MAX_ATTEMPTS", "5"),
        ])
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.default_currency, "EUR");
        assert!(!config.enforce_status_transitions);
        assert!(config.seed_demo_data);
        assert_eq!(config.settings().retry.max_attempts, 5);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = config(&[("HTTP_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));

        assert!(config(&[("SEED_DEMO_DATA", "maybe")]).is_err());
        assert!(config(&[("DEFAULT_CURRENCY", "dollars")]).is_err());
        assert!(config(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
    }
}
