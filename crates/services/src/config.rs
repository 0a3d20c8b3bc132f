use std::env;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::error::ConfigError;

/// Fetch timeout used when `QUIZ_REMOTE_TIMEOUT_MS` is unset.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_millis(3_000);

pub const REMOTE_URL_ENV: &str = "QUIZ_REMOTE_URL";
pub const REMOTE_KEY_ENV: &str = "QUIZ_REMOTE_KEY";
pub const REMOTE_TIMEOUT_ENV: &str = "QUIZ_REMOTE_TIMEOUT_MS";

/// Connection settings for the hosted question table.
#[derive(Clone, Debug)]
pub struct RemoteQuestionConfig {
    pub base_url: Url,
    pub api_key: String,
    pub timeout: Duration,
}

impl RemoteQuestionConfig {
    /// Validate raw settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse or is not http(s), or
    /// if the API key is blank.
    pub fn from_parts(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            timeout,
        })
    }

    /// Read settings from the process environment.
    ///
    /// Returns `None` when the source is not configured or the values are
    /// invalid; invalid values are logged.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let base_url = lookup(REMOTE_URL_ENV).filter(|v| !v.trim().is_empty())?;
        let api_key = lookup(REMOTE_KEY_ENV).unwrap_or_default();

        let timeout = match lookup(REMOTE_TIMEOUT_ENV) {
            Some(raw) => match parse_timeout(&raw) {
                Ok(timeout) => timeout,
                Err(err) => {
                    warn!(%err, "ignoring remote timeout, using default");
                    DEFAULT_REMOTE_TIMEOUT
                }
            },
            None => DEFAULT_REMOTE_TIMEOUT,
        };

        match Self::from_parts(&base_url, &api_key, timeout) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(%err, "remote question source disabled");
                None
            }
        }
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| ConfigError::InvalidTimeout {
            raw: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_url_disables_source() {
        assert!(RemoteQuestionConfig::from_lookup(lookup(&[])).is_none());
    }

    #[test]
    fn reads_all_values() {
        let config = RemoteQuestionConfig::from_lookup(lookup(&[
            (REMOTE_URL_ENV, "https://example.supabase.co"),
            (REMOTE_KEY_ENV, "anon-key"),
            (REMOTE_TIMEOUT_ENV, "750"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.host_str(), Some("example.supabase.co"));
        assert_eq!(config.api_key, "anon-key");
        assert_eq!(config.timeout, Duration::from_millis(750));
    }

    #[test]
    fn bad_timeout_falls_back_to_default() {
        let config = RemoteQuestionConfig::from_lookup(lookup(&[
            (REMOTE_URL_ENV, "https://example.supabase.co"),
            (REMOTE_KEY_ENV, "anon-key"),
            (REMOTE_TIMEOUT_ENV, "soon"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, DEFAULT_REMOTE_TIMEOUT);
    }

    #[test]
    fn rejects_invalid_parts() {
        assert!(matches!(
            RemoteQuestionConfig::from_parts("not a url", "k", DEFAULT_REMOTE_TIMEOUT),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            RemoteQuestionConfig::from_parts("ftp://example.com", "k", DEFAULT_REMOTE_TIMEOUT),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            RemoteQuestionConfig::from_parts("https://example.com", "  ", DEFAULT_REMOTE_TIMEOUT),
            Err(ConfigError::EmptyApiKey)
        ));
    }
}
