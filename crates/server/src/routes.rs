use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{CONTENT_TYPE, ORIGIN},
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use swimfit_core::advisor::FitAdvisor;
use swimfit_core::config::ServerConfig;
use swimfit_core::domain::request::FitRequest;
use swimfit_core::errors::{ApplicationError, DomainError};
use swimfit_core::response::RecommendResponse;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use uuid::Uuid;

use crate::bootstrap::{AnalyticsHandle, BootstrapError};
use crate::health;

pub const CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

#[derive(Clone)]
pub struct RecommendState {
    advisor: FitAdvisor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

pub fn router(
    advisor: FitAdvisor,
    analytics: AnalyticsHandle,
    server: &ServerConfig,
) -> Result<Router, BootstrapError> {
    let api = Router::new()
        .route("/api/recommend", post(recommend))
        .with_state(RecommendState { advisor });

    Ok(api.merge(health::router(analytics)).layer(cors_layer(server)?))
}

/// Any origin when none are configured, otherwise exactly the configured list.
pub fn cors_layer(server: &ServerConfig) -> Result<CorsLayer, BootstrapError> {
    let origins = if server.allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed = server
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| BootstrapError::InvalidOrigin(origin.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ORIGIN, CORRELATION_HEADER])
        .expose_headers([CORRELATION_HEADER]))
}

pub async fn recommend(
    State(state): State<RecommendState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = correlation_id(&headers);

    let parsed = serde_json::from_slice::<Value>(&body)
        .map_err(|error| DomainError::MalformedRequest(format!("invalid JSON body: {error}")))
        .and_then(|payload| FitRequest::from_json(&payload));

    let response = match parsed {
        Ok(request) => {
            let evaluation = state.advisor.recommend(&request, &correlation_id).await;
            Json(RecommendResponse::from(&evaluation)).into_response()
        }
        Err(error) => {
            let interface = ApplicationError::from(error).into_interface(correlation_id.as_str());
            warn!(
                event_name = "fit.request.rejected",
                correlation_id = interface.correlation_id(),
                error = interface.message(),
                "recommendation request rejected"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { ok: false, error: interface.message().to_string() }),
            )
                .into_response()
        }
    };

    with_correlation_header(response, &correlation_id)
}

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(&CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn with_correlation_header(mut response: Response, correlation_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}
