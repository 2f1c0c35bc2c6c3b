//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// API base URL used when running against a local backend.
pub const LOCAL_API_BASE_URL: &str = "http://localhost:5000/api";

/// API base URL of the hosted backend.
pub const PRODUCTION_API_BASE_URL: &str =
    "https://prepsmart-backend.politegrass-4005e0e6.eastus.azurecontainerapps.io/api";

/// Deployment environment, selects the default API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Production,
}

impl Deployment {
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Local => LOCAL_API_BASE_URL,
            Self::Production => PRODUCTION_API_BASE_URL,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all API paths are appended to (no trailing slash).
    pub api_base_url: String,
    /// Delay between the settlement of one status fetch and the next.
    pub poll_interval: Duration,
    /// Upper bound on total polling time.
    pub max_wait: Duration,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Directory backing the session store.
    pub session_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(2000),
            max_wait: Duration::from_millis(300_000), // 5 minutes
            http_timeout: Duration::from_secs(30),
            session_dir: PathBuf::from("./data/session"),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from `PREPSMART_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let deployment = match lookup("PREPSMART_ENV").as_deref() {
            None | Some("") | Some("local") | Some("development") => Deployment::Local,
            Some("production") | Some("prod") => Deployment::Production,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "PREPSMART_ENV".into(),
                    message: format!("unknown deployment '{other}'"),
                });
            }
        };
        config.api_base_url = deployment.api_base_url().to_string();

        if let Some(url) = lookup("PREPSMART_API_URL").filter(|u| !u.is_empty()) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse_u64(&lookup, "PREPSMART_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64(&lookup, "PREPSMART_MAX_WAIT_MS")? {
            config.max_wait = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_u64(&lookup, "PREPSMART_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = lookup("PREPSMART_SESSION_DIR").filter(|d| !d.is_empty()) {
            config.session_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?} is not a non-negative integer ({e})"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_polling_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_wait, Duration::from_secs(300));
        assert_eq!(config.api_base_url, LOCAL_API_BASE_URL);
    }

    #[test]
    fn production_selects_hosted_backend() {
        let config = ClientConfig::from_lookup(lookup(&[("PREPSMART_ENV", "production")])).unwrap();
        assert_eq!(config.api_base_url, PRODUCTION_API_BASE_URL);
    }

    #[test]
    fn explicit_url_wins_and_is_trimmed() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PREPSMART_ENV", "production"),
            ("PREPSMART_API_URL", "http://127.0.0.1:9000/api/"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000/api");
    }

    #[test]
    fn numeric_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PREPSMART_POLL_INTERVAL_MS", "500"),
            ("PREPSMART_MAX_WAIT_MS", "10000"),
        ]))
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_wait, Duration::from_secs(10));
    }

    #[test]
    fn bad_number_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("PREPSMART_MAX_WAIT_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PREPSMART_MAX_WAIT_MS"));
    }

    #[test]
    fn unknown_deployment_is_rejected() {
        assert!(ClientConfig::from_lookup(lookup(&[("PREPSMART_ENV", "staging")])).is_err());
    }
}
