use serde::Serialize;
use swimfit_core::config::{AnalyticsBackend, AppConfig, LoadOptions, SQLITE_ANALYTICS_TABLE};
use swimfit_core::fit::chart::SizeChart;
use swimfit_db::{connect_with_config, ping, table_exists};

use crate::commands::block_on_runtime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn new(name: &'static str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name, status, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Pass,
                "configuration loaded and validated",
            ));
            checks.push(check_size_chart(&config));
            checks.push(check_analytics_connectivity(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::new("config_validation", CheckStatus::Fail, error.to_string()));
            for name in ["size_chart", "analytics_connectivity"] {
                checks.push(DoctorCheck::new(
                    name,
                    CheckStatus::Skipped,
                    "skipped because configuration did not load",
                ));
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_size_chart(config: &AppConfig) -> DoctorCheck {
    let (chart, source) = match &config.engine.size_chart_path {
        Some(path) => match SizeChart::load(path) {
            Ok(chart) => (chart, format!("`{}`", path.display())),
            Err(error) => {
                return DoctorCheck::new("size_chart", CheckStatus::Fail, error.to_string());
            }
        },
        None => (SizeChart::default(), "built-in chart".to_string()),
    };

    let violations = chart.monotonic_violations();
    if violations.is_empty() {
        DoctorCheck::new(
            "size_chart",
            CheckStatus::Pass,
            format!("{source} has {} ordered rows in {}", chart.rows.len(), chart.unit.as_str()),
        )
    } else {
        DoctorCheck::new(
            "size_chart",
            CheckStatus::Fail,
            format!("{source} is not ordered: {}", violations.join("; ")),
        )
    }
}

fn check_analytics_connectivity(config: &AppConfig) -> DoctorCheck {
    const NAME: &str = "analytics_connectivity";

    match config.analytics.backend {
        AnalyticsBackend::Disabled => {
            DoctorCheck::new(NAME, CheckStatus::Skipped, "analytics backend disabled")
        }
        AnalyticsBackend::Rest => DoctorCheck::new(
            NAME,
            CheckStatus::Skipped,
            "rest backend is probed by the server `/health` endpoint",
        ),
        AnalyticsBackend::Sqlite => check_sqlite_store(config),
    }
}

fn check_sqlite_store(config: &AppConfig) -> DoctorCheck {
    const NAME: &str = "analytics_connectivity";

    let runtime = match block_on_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck::new(
                NAME,
                CheckStatus::Fail,
                format!("failed to initialize async runtime: {error}"),
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;
        ping(&pool).await.map_err(|error| format!("database did not answer: {error}"))?;

        let exists = table_exists(&pool, SQLITE_ANALYTICS_TABLE)
            .await
            .map_err(|error| format!("failed to inspect schema: {error}"))?;
        pool.close().await;
        Ok::<bool, String>(exists)
    });

    match result {
        Ok(false) => DoctorCheck::new(
            NAME,
            CheckStatus::Fail,
            format!(
                "connected to `{}` but table `{}` is missing; run `swimfit migrate`",
                config.database.url, SQLITE_ANALYTICS_TABLE
            ),
        ),
        Ok(true) => DoctorCheck::new(
            NAME,
            CheckStatus::Pass,
            format!("connected using `{}`", config.database.url),
        ),
        Err(error) => DoctorCheck::new(NAME, CheckStatus::Fail, error),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
