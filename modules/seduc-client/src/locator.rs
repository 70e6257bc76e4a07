use boletim_core::{BoletimError, Result, SessionHandle};
use tracing::debug;

use crate::config::PortalConfig;
use crate::transport::PortalTransport;

/// Follow the search redirect with the session cookie.
///
/// The portal always serves the report from the same path afterwards, so the
/// body is ignored; this step only surfaces a dead session before extraction.
pub async fn locate_result_page(
    transport: &dyn PortalTransport,
    config: &PortalConfig,
    session: &SessionHandle,
) -> Result<String> {
    let url = config.url(&session.action_url);
    let resp = transport
        .get_with_session(&url, &session.session_id)
        .await?;

    if !resp.is_ok() {
        return Err(BoletimError::BoletimUrlFetch(resp.reason()));
    }

    debug!(action_url = %session.action_url, "Session accepted by portal");
    Ok(config.result_path.clone())
}
