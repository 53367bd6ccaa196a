//! Configuration management for the Kayako client.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure all required values are present.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::KayakoError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to a Kayako instance.
///
/// The API key and secret are kept out of `Debug` output.
#[derive(Clone)]
pub struct Config {
    /// REST endpoint of the Kayako instance (e.g., `https://support.example.com/api/index.php`).
    pub api_url: String,

    /// Public API key, sent with every request.
    pub api_key: String,

    /// Secret key used to sign request salts. Never sent or logged.
    pub secret_key: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Config {
    /// Builds a configuration from explicit values, applying the same
    /// validation as [`Config::from_env`].
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, KayakoError> {
        let api_url = Self::validate_api_url(api_url.into())?;
        let api_key = api_key.into();
        let secret_key = secret_key.into();
        Self::validate_key("KAYAKO_API_KEY", &api_key)?;
        Self::validate_key("KAYAKO_SECRET_KEY", &secret_key)?;

        Ok(Config {
            api_url,
            api_key,
            secret_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `KAYAKO_API_URL`: REST endpoint of the Kayako instance
    /// - `KAYAKO_API_KEY`: public API key
    /// - `KAYAKO_SECRET_KEY`: secret key used for request signatures
    ///
    /// # Optional
    ///
    /// - `KAYAKO_TIMEOUT_SECS`: request timeout in seconds (default 30)
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::Configuration` if any required variable is
    /// missing or if values fail validation.
    pub fn from_env() -> Result<Self, KayakoError> {
        let api_url = Self::get_required_env("KAYAKO_API_URL")?;
        let api_key = Self::get_required_env("KAYAKO_API_KEY")?;
        let secret_key = Self::get_required_env("KAYAKO_SECRET_KEY")?;

        let mut config = Self::new(api_url, api_key, secret_key)?;

        if let Ok(raw) = env::var("KAYAKO_TIMEOUT_SECS") {
            config.timeout = Self::parse_timeout(&raw)?;
        }

        Ok(config)
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, KayakoError> {
        env::var(name)
            .map_err(|_| KayakoError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(KayakoError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Validates and normalizes the API URL.
    fn validate_api_url(url: String) -> Result<String, KayakoError> {
        let url = url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&url).map_err(|e| {
            KayakoError::configuration(format!("KAYAKO_API_URL is not a valid URL: {}", e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(KayakoError::configuration(
                "KAYAKO_API_URL must start with http:// or https://",
            ));
        }

        Ok(url)
    }

    /// Validates a key is not a placeholder value.
    fn validate_key(name: &str, key: &str) -> Result<(), KayakoError> {
        if key.trim().is_empty() {
            return Err(KayakoError::missing_env(name));
        }

        let key_lower = key.to_lowercase();
        let placeholder_patterns = [
            "your_api_key",
            "your_secret",
            "your_key",
            "placeholder",
            "xxx",
            "changeme",
        ];

        for pattern in placeholder_patterns {
            if key_lower.contains(pattern) {
                return Err(KayakoError::configuration(format!(
                    "{} appears to be a placeholder value",
                    name
                )));
            }
        }

        Ok(())
    }

    fn parse_timeout(raw: &str) -> Result<Duration, KayakoError> {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(KayakoError::configuration(format!(
                "KAYAKO_TIMEOUT_SECS must be a positive integer, got {:?}",
                raw
            ))),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests avoid touching process environment so they can run in parallel.

    #[test]
    fn test_validate_api_url_removes_trailing_slash() {
        let result =
            Config::validate_api_url("https://support.example.com/api/index.php/".to_string())
                .unwrap();
        assert_eq!(result, "https://support.example.com/api/index.php");
    }

    #[test]
    fn test_validate_api_url_requires_scheme() {
        assert!(Config::validate_api_url("support.example.com".to_string()).is_err());
        assert!(Config::validate_api_url("ftp://support.example.com".to_string()).is_err());
    }

    #[test]
    fn test_validate_key_rejects_placeholder() {
        assert!(Config::validate_key("KAYAKO_API_KEY", "your_api_key_here").is_err());
        assert!(Config::validate_key("KAYAKO_SECRET_KEY", "changeme").is_err());
    }

    #[test]
    fn test_validate_key_accepts_real_key() {
        assert!(Config::validate_key("KAYAKO_API_KEY", "a1b2c3d4-e5f6").is_ok());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(Config::parse_timeout("5").unwrap(), Duration::from_secs(5));
        assert!(Config::parse_timeout("0").is_err());
        assert!(Config::parse_timeout("soon").is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::new("https://support.example.com/api/index.php", "key-123", "sec-456")
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("support.example.com"));
        assert!(!debug.contains("key-123"));
        assert!(!debug.contains("sec-456"));
    }
}
