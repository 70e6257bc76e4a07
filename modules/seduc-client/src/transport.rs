use std::time::Duration;

use async_trait::async_trait;
use boletim_core::{BoletimError, Result};
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};

/// Name of the cookie the portal keeps its PHP session in.
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// What the pipeline needs to know about one portal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalResponse {
    pub status: u16,
    /// Reason phrase for `status`, e.g. `Not Found`.
    pub status_text: String,
    /// Raw values of every `Set-Cookie` header, in order.
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl PortalResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Reason phrase, falling back to the bare status code.
    pub fn reason(&self) -> String {
        if self.status_text.is_empty() {
            self.status.to_string()
        } else {
            self.status_text.clone()
        }
    }
}

/// The three HTTP exchanges the portal workflow needs.
///
/// Transport failures (DNS, TLS, timeouts) come back as [`BoletimError::Unknown`].
#[async_trait]
pub trait PortalTransport: Send + Sync {
    /// POST an `application/x-www-form-urlencoded` body.
    async fn post_form(&self, url: &str, form: &[(&'static str, String)]) -> Result<PortalResponse>;

    /// GET carrying `Cookie: PHPSESSID=<session_id>`.
    async fn get_with_session(&self, url: &str, session_id: &str) -> Result<PortalResponse>;
}

/// [`PortalTransport`] over a `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Every request made through this transport is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self { client })
    }

    async fn read(resp: reqwest::Response) -> Result<PortalResponse> {
        let status = resp.status();
        let set_cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(String::from)
            .collect();
        let body = resp.text().await.map_err(transport_error)?;

        Ok(PortalResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            set_cookies,
            body,
        })
    }
}

#[async_trait]
impl PortalTransport for HttpTransport {
    async fn post_form(&self, url: &str, form: &[(&'static str, String)]) -> Result<PortalResponse> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        Self::read(resp).await
    }

    async fn get_with_session(&self, url: &str, session_id: &str) -> Result<PortalResponse> {
        let resp = self
            .client
            .get(url)
            .header(COOKIE, format!("{SESSION_COOKIE}={session_id}"))
            .send()
            .await
            .map_err(transport_error)?;

        Self::read(resp).await
    }
}

fn transport_error(err: reqwest::Error) -> BoletimError {
    BoletimError::Unknown(err.to_string())
}
