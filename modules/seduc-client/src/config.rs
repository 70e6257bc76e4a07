use std::time::Duration;

use boletim_core::YearRange;

pub const DEFAULT_BASE_URL: &str = "https://www.seduc.pa.gov.br/portal/boletim_online/";

/// Page the portal serves the report from once the session is validated.
pub const RESULT_PATH: &str = "visualizaBoletim.php";

/// Where and how to reach the portal.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Always ends with `/`; relative portal paths are appended to it.
    pub base_url: String,
    pub result_path: String,
    /// Upper bound for each HTTP exchange.
    pub timeout: Duration,
    pub years: YearRange,
}

impl PortalConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = format!("{}/", base_url.trim_end_matches('/'));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_years(mut self, years: YearRange) -> Self {
        self.years = years;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            result_path: RESULT_PATH.to_string(),
            timeout: Duration::from_secs(30),
            years: YearRange::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = PortalConfig::default().with_base_url("http://localhost:8080/portal");
        assert_eq!(config.url("visualiza.php?id=5"), "http://localhost:8080/portal/visualiza.php?id=5");

        let config = PortalConfig::default().with_base_url("http://localhost:8080/portal//");
        assert_eq!(config.base_url, "http://localhost:8080/portal/");
    }
}
