use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// How the inbound `currency` parameter selects a transaction account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutingMode {
    /// Match against account names; a category is mandatory
    AccountName,
    /// Match against account currency codes; a category is optional
    CurrencyCode,
}

impl RoutingMode {
    pub fn requires_category(&self) -> bool {
        matches!(self, RoutingMode::AccountName)
    }
}

impl FromStr for RoutingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "account" | "name" => Ok(RoutingMode::AccountName),
            "currency" => Ok(RoutingMode::CurrencyCode),
            other => Err(Error::Config(format!(
                "invalid routing mode '{}'. Must be 'account' or 'currency'",
                other
            ))),
        }
    }
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub base_url: String,
    pub client_auth_key: String,
    pub routing_mode: RoutingMode,
    pub cache_ttl: Duration,
    pub cache_max_entries: Option<u64>,
    pub http_timeout: Duration,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const DEFAULT_BASE_URL: &str = "https://api.pocketsmith.com/v2";
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;
    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source; `from_env` passes the process environment
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = required(&var, "POCKETSMITH_API_KEY")?;
        let client_auth_key = required(&var, "CLIENT_AUTH_KEY")?;

        let routing_mode = match var("PROXY_ROUTING_MODE") {
            Some(mode) => mode.parse()?,
            None => RoutingMode::AccountName,
        };

        let base_url = var("POCKETSMITH_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let cache_ttl_secs = parse_or(&var, "PROXY_CACHE_TTL_SECS", Self::DEFAULT_CACHE_TTL_SECS)?;
        if cache_ttl_secs == 0 {
            return Err(Error::Config(
                "PROXY_CACHE_TTL_SECS must be greater than zero".to_string(),
            ));
        }

        let http_timeout_secs = parse_or(
            &var,
            "PROXY_HTTP_TIMEOUT_SECS",
            Self::DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        if http_timeout_secs == 0 {
            return Err(Error::Config(
                "PROXY_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let cache_max_entries = match var("PROXY_CACHE_MAX_ENTRIES") {
            Some(raw) => Some(parse_value::<u64>("PROXY_CACHE_MAX_ENTRIES", &raw)?),
            None => None,
        };

        Ok(Self {
            host: var("PROXY_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            port: parse_or(&var, "PROXY_HTTP_PORT", Self::DEFAULT_PORT)?,
            api_key,
            base_url,
            client_auth_key,
            routing_mode,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_max_entries,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("client_auth_key", &"<redacted>")
            .field("routing_mode", &self.routing_mode)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

fn required(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match var(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            warn!("{} is not set", name);
            Err(Error::Config(format!("{} must be set", name)))
        }
    }
}

fn parse_or<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T> {
    match var(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("POCKETSMITH_API_KEY", "dev-key"),
        ("CLIENT_AUTH_KEY", "client-token"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&REQUIRED)).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.base_url, "https://api.pocketsmith.com/v2");
        assert_eq!(config.routing_mode, RoutingMode::AccountName);
        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(config.cache_max_entries, None);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PROXY_HOST", "127.0.0.1"),
            ("PROXY_HTTP_PORT", "9000"),
            ("POCKETSMITH_BASE_URL", "http://localhost:1234/v2/"),
            ("PROXY_ROUTING_MODE", "Currency"),
            ("PROXY_CACHE_TTL_SECS", "60"),
            ("PROXY_CACHE_MAX_ENTRIES", "500"),
        ]);
        let config = Config::from_vars(vars(&pairs)).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.base_url, "http://localhost:1234/v2");
        assert_eq!(config.routing_mode, RoutingMode::CurrencyCode);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_max_entries, Some(500));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = Config::from_vars(vars(&[("CLIENT_AUTH_KEY", "client-token")]));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("POCKETSMITH_API_KEY")));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PROXY_HTTP_PORT", "eighty"));
        assert!(Config::from_vars(vars(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PROXY_ROUTING_MODE", "iban"));
        assert!(Config::from_vars(vars(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PROXY_CACHE_TTL_SECS", "0"));
        assert!(Config::from_vars(vars(&pairs)).is_err());
    }

    #[test]
    fn test_zero_http_timeout_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PROXY_HTTP_TIMEOUT_SECS", "0"));
        let result = Config::from_vars(vars(&pairs));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("PROXY_HTTP_TIMEOUT_SECS")));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PROXY_HTTP_TIMEOUT_SECS", "5"));
        let config = Config::from_vars(vars(&pairs)).unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_vars(vars(&REQUIRED)).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("dev-key"));
        assert!(!rendered.contains("client-token"));
    }
}
