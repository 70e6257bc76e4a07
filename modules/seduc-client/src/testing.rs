// Test double for the portal transport.
//
// MockTransport maps (method, url) to a canned response or transport error and
// records every call, so tests can assert on what was sent and when the
// pipeline stopped.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use boletim_core::{BoletimError, Result};

use crate::transport::{PortalResponse, PortalTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

/// One call the pipeline made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub session_id: Option<String>,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HashMap-based transport. Unregistered URLs fail like a network error.
/// Builder pattern: `.on_post()`, `.on_get()`, `.fail_get()`.
#[derive(Default)]
pub struct MockTransport {
    responses: HashMap<(Method, String), std::result::Result<PortalResponse, String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_post(mut self, url: &str, resp: PortalResponse) -> Self {
        self.responses.insert((Method::Post, url.to_string()), Ok(resp));
        self
    }

    pub fn on_get(mut self, url: &str, resp: PortalResponse) -> Self {
        self.responses.insert((Method::Get, url.to_string()), Ok(resp));
        self
    }

    pub fn fail_post(mut self, url: &str, message: &str) -> Self {
        self.responses
            .insert((Method::Post, url.to_string()), Err(message.to_string()));
        self
    }

    pub fn fail_get(mut self, url: &str, message: &str) -> Self {
        self.responses
            .insert((Method::Get, url.to_string()), Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, request: RecordedRequest) -> Result<PortalResponse> {
        let key = (request.method, request.url.clone());
        self.requests.lock().unwrap().push(request);

        match self.responses.get(&key) {
            Some(Ok(resp)) => Ok(resp.clone()),
            Some(Err(message)) => Err(BoletimError::Unknown(message.clone())),
            None => Err(BoletimError::Unknown(format!(
                "no mock response for {:?} {}",
                key.0, key.1
            ))),
        }
    }
}

#[async_trait]
impl PortalTransport for MockTransport {
    async fn post_form(&self, url: &str, form: &[(&'static str, String)]) -> Result<PortalResponse> {
        self.respond(RecordedRequest {
            method: Method::Post,
            url: url.to_string(),
            session_id: None,
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        })
    }

    async fn get_with_session(&self, url: &str, session_id: &str) -> Result<PortalResponse> {
        self.respond(RecordedRequest {
            method: Method::Get,
            url: url.to_string(),
            session_id: Some(session_id.to_string()),
            form: Vec::new(),
        })
    }
}

// --- Response builders ---

pub fn ok(body: &str) -> PortalResponse {
    PortalResponse {
        status: 200,
        status_text: "OK".to_string(),
        set_cookies: Vec::new(),
        body: body.to_string(),
    }
}

pub fn status(code: u16, text: &str) -> PortalResponse {
    PortalResponse {
        status: code,
        status_text: text.to_string(),
        set_cookies: Vec::new(),
        body: String::new(),
    }
}

pub fn with_cookie(mut resp: PortalResponse, set_cookie: &str) -> PortalResponse {
    resp.set_cookies.push(set_cookie.to_string());
    resp
}
