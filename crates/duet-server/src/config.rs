use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use duet_api::clock::Clock;
use duet_llm::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];


#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Decides the day boundary for prompts and answers.
    pub clock: Clock,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("DUET_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("DUET_JWT_SECRET is unset or still a placeholder; set it to your auth provider's signing secret");
        }

        let port = match get("DUET_PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid DUET_PORT '{}'", v))?,
            None => 3000,
        };
        let clock = match get("DUET_TIMEZONE").filter(|v| !v.is_empty()) {
            Some(v) => Clock::from_zone_name(&v).context("invalid DUET_TIMEZONE")?,
            None => Clock::default(),
        };

        Ok(Self {
            host: get("DUET_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("DUET_DB_PATH").unwrap_or_else(|| "duet.db".into()).into(),
            jwt_secret,
            jwt_audience: get("DUET_JWT_AUDIENCE").filter(|v| !v.is_empty()),
            gemini_api_key: get("GEMINI_API_KEY").filter(|v| !v.is_empty()),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            clock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("DUET_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_path, PathBuf::from("duet.db"));
        assert_eq!(cfg.gemini_model, "gemini-2.0-flash");
        assert!(matches!(cfg.clock, Clock::Zone(tz) if tz == chrono_tz::America::New_York));
        assert!(cfg.gemini_api_key.is_none());
        assert!(cfg.jwt_audience.is_none());
    }

    #[test]
    fn placeholder_secrets_are_refused() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DUET_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(config(&[("DUET_JWT_SECRET", "s"), ("DUET_PORT", "http")]).is_err());
        assert!(config(&[("DUET_JWT_SECRET", "s"), ("DUET_TIMEZONE", "Eastern")]).is_err());
    }

    #[test]
    fn timezone_is_configurable() {
        let cfg = config(&[("DUET_JWT_SECRET", "s"), ("DUET_TIMEZONE", "Europe/Berlin")]).unwrap();
        assert!(matches!(cfg.clock, Clock::Zone(tz) if tz == chrono_tz::Europe::Berlin));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = config(&[("DUET_JWT_SECRET", "s"), ("GEMINI_API_KEY", "")]).unwrap();
        assert!(cfg.gemini_api_key.is_none());
    }
}
