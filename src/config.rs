// config.rs
use crate::errors::PipelineError;
use crate::sources::{REALTOR_BASE_URL, ZILLOW_BASE_URL};
use std::time::Duration;

const DEFAULT_DELAY_SECS: u64 = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for one listing source.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub zillow: SourceSettings,
    pub realtor: SourceSettings,
    /// Pause taken before and after every upstream request.
    pub request_delay: Duration,
}

impl Config {
    /// Reads settings from the process environment (after loading `.env`, if any).
    pub fn from_env() -> Result<Self, PipelineError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let shared_key = non_empty("RAPIDAPI_KEY");

        let zillow_key = non_empty("ZILLOW_API_KEY")
            .or_else(|| shared_key.clone())
            .ok_or_else(|| {
                PipelineError::Config("ZILLOW_API_KEY or RAPIDAPI_KEY must be set".into())
            })?;

        let realtor_key = non_empty("REALTOR_API_KEY")
            .or(shared_key)
            .ok_or_else(|| {
                PipelineError::Config("REALTOR_API_KEY or RAPIDAPI_KEY must be set".into())
            })?;

        let secs = |key: &str, default: u64| -> Result<u64, PipelineError> {
            match non_empty(key) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    PipelineError::Config(format!("{key} must be a whole number of seconds, got '{raw}'"))
                }),
                None => Ok(default),
            }
        };

        let timeout = Duration::from_secs(secs("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);
        let request_delay = Duration::from_secs(secs("REQUEST_DELAY_SECS", DEFAULT_DELAY_SECS)?);

        Ok(Config {
            zillow: SourceSettings {
                api_key: zillow_key,
                base_url: non_empty("ZILLOW_BASE_URL").unwrap_or_else(|| ZILLOW_BASE_URL.to_string()),
                timeout,
            },
            realtor: SourceSettings {
                api_key: realtor_key,
                base_url: non_empty("REALTOR_BASE_URL").unwrap_or_else(|| REALTOR_BASE_URL.to_string()),
                timeout,
            },
            request_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn shared_key_covers_both_sources() {
        let config = Config::from_lookup(lookup(&[("RAPIDAPI_KEY", "abc")])).unwrap();
        assert_eq!(config.zillow.api_key, "abc");
        assert_eq!(config.realtor.api_key, "abc");
        assert_eq!(config.request_delay, Duration::from_secs(DEFAULT_DELAY_SECS));
    }

    #[test]
    fn per_source_key_wins() {
        let config = Config::from_lookup(lookup(&[
            ("RAPIDAPI_KEY", "shared"),
            ("REALTOR_API_KEY", "realtor-only"),
            ("REQUEST_DELAY_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.zillow.api_key, "shared");
        assert_eq!(config.realtor.api_key, "realtor-only");
        assert_eq!(config.request_delay, Duration::from_secs(5));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[("ZILLOW_API_KEY", "z")])).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn bad_delay_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("RAPIDAPI_KEY", "abc"),
            ("REQUEST_DELAY_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
