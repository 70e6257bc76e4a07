use std::time::Duration;

use anyhow::{Context, Result};
use boletim_core::YearRange;
use seduc_client::PortalConfig;

/// Server configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Portal
    pub seduc_base_url: Option<String>,
    pub seduc_timeout_secs: u64,
    pub min_year: i32,
    pub max_year: i32,

    // Responses
    pub cache_max_age_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take their defaults; set keys
    /// that don't parse are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = YearRange::default();

        let config = Self {
            web_host: lookup("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parsed(&lookup, "WEB_PORT", 3000)?,
            seduc_base_url: lookup("SEDUC_BASE_URL").filter(|url| !url.is_empty()),
            seduc_timeout_secs: parsed(&lookup, "SEDUC_TIMEOUT_SECS", 30)?,
            min_year: parsed(&lookup, "BOLETIM_MIN_YEAR", defaults.min)?,
            max_year: parsed(&lookup, "BOLETIM_MAX_YEAR", defaults.max)?,
            cache_max_age_secs: parsed(&lookup, "CACHE_MAX_AGE_SECS", 3600)?,
        };

        anyhow::ensure!(
            config.min_year <= config.max_year,
            "BOLETIM_MIN_YEAR ({}) must not exceed BOLETIM_MAX_YEAR ({})",
            config.min_year,
            config.max_year
        );

        Ok(config)
    }

    pub fn portal(&self) -> PortalConfig {
        let mut portal = PortalConfig::default()
            .with_timeout(Duration::from_secs(self.seduc_timeout_secs))
            .with_years(YearRange::new(self.min_year, self.max_year));
        if let Some(ref url) = self.seduc_base_url {
            portal = portal.with_base_url(url);
        }
        portal
    }

    /// Log the effective configuration.
    pub fn log(&self) {
        tracing::info!(
            web_host = %self.web_host,
            web_port = self.web_port,
            seduc_base_url = self.seduc_base_url.as_deref().unwrap_or(seduc_client::config::DEFAULT_BASE_URL),
            seduc_timeout_secs = self.seduc_timeout_secs,
            min_year = self.min_year,
            max_year = self.max_year,
            cache_max_age_secs = self.cache_max_age_secs,
            "Config loaded"
        );
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = from(&[]).unwrap();
        assert_eq!(config.web_host, "0.0.0.0");
        assert_eq!(config.web_port, 3000);
        assert_eq!(config.min_year, 2020);
        assert_eq!(config.max_year, 2025);
        assert_eq!(config.cache_max_age_secs, 3600);

        let portal = config.portal();
        assert_eq!(portal.base_url, seduc_client::config::DEFAULT_BASE_URL);
        assert_eq!(portal.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_flow_into_portal_config() {
        let config = from(&[
            ("SEDUC_BASE_URL", "http://localhost:9000/boletim"),
            ("SEDUC_TIMEOUT_SECS", "5"),
            ("BOLETIM_MAX_YEAR", "2026"),
        ])
        .unwrap();

        let portal = config.portal();
        assert_eq!(portal.base_url, "http://localhost:9000/boletim/");
        assert_eq!(portal.timeout, Duration::from_secs(5));
        assert!(portal.years.contains(2026));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = from(&[("WEB_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("WEB_PORT"));
        assert!(from(&[("BOLETIM_MIN_YEAR", "2030")]).is_err());
    }
}
