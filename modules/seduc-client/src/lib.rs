pub mod config;
pub mod extract;
pub mod locator;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::PortalConfig;
pub use transport::{HttpTransport, PortalResponse, PortalTransport};

use std::sync::Arc;

use boletim_core::{validate_request, FetchRequest, QueryParams, Report, Result};
use tracing::info;

/// Client for the SEDUC-PA boletim portal.
///
/// Every call runs a fresh search → redirect → result page round trip; nothing
/// is cached or reused between calls.
pub struct SeducClient {
    transport: Arc<dyn PortalTransport>,
    config: PortalConfig,
}

impl SeducClient {
    pub fn new(config: PortalConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn PortalTransport>, config: PortalConfig) -> Self {
        Self { transport, config }
    }

    pub fn validate(&self, query: &QueryParams) -> Result<FetchRequest> {
        validate_request(query, &self.config.years)
    }

    /// Validate raw parameters, then fetch. Invalid input never reaches the portal.
    pub async fn fetch_from_query(&self, query: &QueryParams) -> Result<Report> {
        let request = self.validate(query)?;
        self.fetch_boletim(&request).await
    }

    /// Run the three portal steps in order, stopping at the first failure.
    pub async fn fetch_boletim(&self, request: &FetchRequest) -> Result<Report> {
        let transport = self.transport.as_ref();
        info!(year = request.year, "Fetching boletim");

        let session = session::start_session(transport, &self.config, request).await?;
        let result_path = locator::locate_result_page(transport, &self.config, &session).await?;
        let report =
            extract::fetch_report(transport, &self.config, &result_path, &session.session_id)
                .await?;

        info!(
            year = request.year,
            subjects = report.grades.len(),
            "Boletim fetched"
        );
        Ok(report)
    }
}
