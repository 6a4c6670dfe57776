use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use swimfit_db::ping;

use crate::bootstrap::AnalyticsHandle;

#[derive(Clone)]
pub struct HealthState {
    analytics: AnalyticsHandle,
}

impl HealthState {
    pub fn new(analytics: AnalyticsHandle) -> Self {
        Self { analytics }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub analytics: HealthCheck,
    pub checked_at: String,
}

pub fn router(analytics: AnalyticsHandle) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState::new(analytics))
}

/// Always 200 while the process serves recommendations; analytics problems only
/// show up as `degraded`.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let analytics = analytics_check(&state.analytics).await;
    let degraded = analytics.status == "degraded";

    let payload = HealthResponse {
        status: if degraded { "degraded" } else { "ready" },
        service: HealthCheck {
            status: "ready",
            detail: "swimfit recommender initialized".to_string(),
        },
        analytics,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

async fn analytics_check(analytics: &AnalyticsHandle) -> HealthCheck {
    match analytics {
        AnalyticsHandle::Disabled => HealthCheck {
            status: "disabled",
            detail: "analytics backend disabled by configuration".to_string(),
        },
        AnalyticsHandle::Sqlite(pool) => match ping(pool).await {
            Ok(()) => {
                HealthCheck { status: "ready", detail: "sqlite analytics store reachable".to_string() }
            }
            Err(error) => HealthCheck {
                status: "degraded",
                detail: format!("sqlite analytics store query failed: {error}"),
            },
        },
        AnalyticsHandle::Rest(sink) => match sink.probe().await {
            Ok(()) => {
                HealthCheck { status: "ready", detail: "rest analytics store reachable".to_string() }
            }
            Err(error) => HealthCheck {
                status: "degraded",
                detail: format!("rest analytics store probe failed: {error}"),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};
    use swimfit_db::connect_with_settings;

    use crate::bootstrap::AnalyticsHandle;
    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_disabled_analytics_as_ready_service() {
        let (status, Json(payload)) =
            health(State(HealthState::new(AnalyticsHandle::Disabled))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.analytics.status, "disabled");
    }

    #[tokio::test]
    async fn health_returns_ready_when_analytics_store_is_reachable() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");

        let (status, Json(payload)) =
            health(State(HealthState::new(AnalyticsHandle::Sqlite(pool.clone())))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.analytics.status, "ready");
        assert_eq!(payload.service.status, "ready");

        pool.close().await;
    }

    #[tokio::test]
    async fn unreachable_analytics_store_degrades_without_failing_probe() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        pool.close().await;

        let (status, Json(payload)) =
            health(State(HealthState::new(AnalyticsHandle::Sqlite(pool)))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.analytics.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
