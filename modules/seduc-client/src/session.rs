use std::collections::HashMap;
use std::sync::LazyLock;

use boletim_core::{BoletimError, FetchRequest, Result, SessionHandle};
use regex::Regex;
use tracing::debug;

use crate::config::PortalConfig;
use crate::transport::{PortalTransport, SESSION_COOKIE};

/// Text the portal prints when the search matches no student.
const NOT_FOUND_MARKER: &str = "O aluno informado";

const REDIRECT_MARKER: &str = "window.location";

static RE_REDIRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.location = '(.*?)';").unwrap());

/// Attributes that may appear in a `Set-Cookie` value without `=`.
const COOKIE_FLAGS: &[&str] = &["httponly", "secure", "partitioned"];

/// Form fields for the boletim search. Names are lower-cased the way the
/// portal's own page submits them.
pub fn search_form(request: &FetchRequest) -> Vec<(&'static str, String)> {
    vec![
        ("txtAnoLetivo", request.year.to_string()),
        ("txtDataNascimento", request.birth_date.clone()),
        ("txtNomeAluno", request.student_name.to_lowercase()),
        ("txtNomeMae", request.mother_name.to_lowercase()),
        ("rdTipoBoletim", "1".to_string()),
        ("btnVisualiza", "Pesquisar".to_string()),
    ]
}

/// Submit the search form and pull the redirect target and session id out of
/// the response.
pub async fn start_session(
    transport: &dyn PortalTransport,
    config: &PortalConfig,
    request: &FetchRequest,
) -> Result<SessionHandle> {
    let resp = transport
        .post_form(&config.base_url, &search_form(request))
        .await?;
    debug!(status = resp.status, bytes = resp.body.len(), "Search form submitted");

    let action_url = extract_redirect(&resp.body)?;
    let session_id = session_id(&resp.set_cookies)?;

    Ok(SessionHandle {
        action_url,
        session_id,
    })
}

/// Find the URL of the last `window.location = '...';` in the page.
///
/// A page without any redirect is indistinguishable from an unknown student.
pub fn extract_redirect(body: &str) -> Result<String> {
    if body.contains(NOT_FOUND_MARKER) {
        return Err(BoletimError::UserNotFound);
    }

    let start = body.rfind(REDIRECT_MARKER).ok_or(BoletimError::UserNotFound)?;
    let tail = &body[start..];
    let line = match tail.find("';") {
        Some(end) => &tail[..end + 2],
        None => return Err(BoletimError::NoRedirectUrlFound),
    };

    RE_REDIRECT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(BoletimError::NoRedirectUrlFound)
}

/// Split a `Set-Cookie` style string into key/value pairs.
///
/// Segments are separated by `;` and split on their first `=`. Empty segments
/// and the valueless flags (`HttpOnly`, `Secure`, `Partitioned`) are accepted;
/// any other segment without `=`, or with an empty key, is malformed.
pub fn parse_cookies(header: &str) -> Result<HashMap<String, String>> {
    let mut cookies = HashMap::new();

    for part in header.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        match part.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    return Err(BoletimError::CookieParse(format!("empty cookie name in '{part}'")));
                }
                cookies.insert(key.to_string(), value.trim().to_string());
            }
            None if COOKIE_FLAGS.contains(&part.to_ascii_lowercase().as_str()) => {
                cookies.insert(part.to_string(), String::new());
            }
            None => {
                return Err(BoletimError::CookieParse(format!("malformed cookie segment '{part}'")));
            }
        }
    }

    Ok(cookies)
}

/// Pick the portal session id out of a response's `Set-Cookie` headers.
pub fn session_id(set_cookies: &[String]) -> Result<String> {
    for header in set_cookies {
        let mut cookies = parse_cookies(header)?;
        if let Some(id) = cookies.remove(SESSION_COOKIE) {
            return Ok(id);
        }
    }

    Err(BoletimError::CookieParse(format!(
        "no {SESSION_COOKIE} cookie in response"
    )))
}
