use std::sync::Arc;

use swimfit_core::advisor::FitAdvisor;
use swimfit_core::config::{AnalyticsBackend, AppConfig, ConfigError, DatabaseConfig};
use swimfit_core::fit::{build_runtime, chart::ChartError};
use swimfit_db::{connect_with_config, migrations, DbPool, SqlAnalyticsRepository};
use thiserror::Error;
use tracing::{info, warn};

use crate::analytics::{RestAnalyticsSink, RestSinkError};

pub struct Application {
    pub config: AppConfig,
    pub advisor: FitAdvisor,
    pub analytics: AnalyticsHandle,
}

/// Analytics backend as seen by health checks; the advisor holds the same store as a sink.
#[derive(Clone)]
pub enum AnalyticsHandle {
    Disabled,
    Sqlite(DbPool),
    Rest(Arc<RestAnalyticsSink>),
}

impl AnalyticsHandle {
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Sqlite(_) => "sqlite",
            Self::Rest(_) => "rest",
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("size chart could not be loaded: {0}")]
    Chart(#[from] ChartError),
    #[error("analytics client setup failed: {0}")]
    AnalyticsClient(#[from] RestSinkError),
    #[error("invalid CORS origin `{0}`")]
    InvalidOrigin(String),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        analytics_backend = config.analytics.backend.as_str(),
        length_unit = config.engine.length_unit.as_str(),
        "starting application bootstrap"
    );

    let runtime = build_runtime(&config.engine)?;
    info!(
        event_name = "system.bootstrap.chart_loaded",
        correlation_id = "bootstrap",
        chart_source = config
            .engine
            .size_chart_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "size chart loaded"
    );

    let advisor = FitAdvisor::new(Arc::new(runtime));
    let (advisor, analytics) = match config.analytics.backend {
        AnalyticsBackend::Disabled => (advisor, AnalyticsHandle::Disabled),
        AnalyticsBackend::Sqlite => match open_sqlite_store(&config.database).await {
            Ok(pool) => {
                let sink = Arc::new(SqlAnalyticsRepository::new(pool.clone()));
                (advisor.with_analytics(sink), AnalyticsHandle::Sqlite(pool))
            }
            Err(error) => {
                warn!(
                    event_name = "system.bootstrap.analytics_unavailable",
                    correlation_id = "bootstrap",
                    analytics_backend = "sqlite",
                    error = %error,
                    "analytics store unavailable, serving recommendations without analytics"
                );
                (advisor, AnalyticsHandle::Disabled)
            }
        },
        AnalyticsBackend::Rest => {
            let sink = Arc::new(RestAnalyticsSink::from_config(&config.analytics)?);
            info!(
                event_name = "system.bootstrap.analytics_client_ready",
                correlation_id = "bootstrap",
                endpoint = sink.endpoint(),
                "analytics rest client constructed"
            );
            (advisor.with_analytics(sink.clone()), AnalyticsHandle::Rest(sink))
        }
    };

    Ok(Application { config, advisor, analytics })
}

async fn open_sqlite_store(database: &DatabaseConfig) -> Result<DbPool, String> {
    let pool = connect_with_config(database)
        .await
        .map_err(|error| format!("database connection failed: {error}"))?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    if let Err(error) = migrations::run_pending(&pool).await {
        pool.close().await;
        return Err(format!("database migration failed: {error}"));
    }
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    Ok(pool)
}
