use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use boletim_core::{error::ErrorBody, BoletimError, QueryParams};
use seduc_client::SeducClient;
use serde::Serialize;
use serde_json::Value;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

pub struct AppState {
    pub client: SeducClient,
    pub cache_max_age_secs: u64,
}

/// `{ "status": <http status>, "data": <payload> }`
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    status: u16,
    data: T,
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(Envelope {
            status: status.as_u16(),
            data,
        }),
    )
        .into_response()
}

fn respond_error(route: &'static str, err: &BoletimError) -> Response {
    // Never log the request itself: it carries names and birth dates.
    warn!(route, code = ?err.kind(), error = %err, "Boletim request failed");
    respond(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::from(err))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let max_age = HeaderValue::from_str(&format!("max-age={}", state.cache_max_age_secs))
        .unwrap_or_else(|_| HeaderValue::from_static("max-age=3600"));

    Router::new()
        .route("/api/v1/boletim/validate", any(validate_boletim))
        .route("/api/v1/boletim/fetch", any(fetch_boletim))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("vercel-cdn-cache-control"),
            max_age.clone(),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cdn-cache-control"),
            max_age.clone(),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            max_age,
        ))
        .route("/health", get(health))
        .with_state(state)
        // Method + path only; query strings carry personal data.
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

async fn health() -> &'static str {
    "ok"
}

async fn validate_boletim(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<QueryParams>,
) -> Response {
    if method != Method::GET {
        return respond(StatusCode::BAD_REQUEST, Value::Null);
    }

    match state.client.validate(&query) {
        Ok(request) => respond(StatusCode::OK, request),
        Err(err) => respond_error("validate", &err),
    }
}

async fn fetch_boletim(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<QueryParams>,
) -> Response {
    if method != Method::GET {
        return respond(StatusCode::BAD_REQUEST, Value::Null);
    }

    match state.client.fetch_from_query(&query).await {
        Ok(report) => respond(StatusCode::OK, report),
        Err(err) => respond_error("fetch", &err),
    }
}
