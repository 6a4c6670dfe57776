use serde::Serialize;
use serde_json::json;
use swimfit_core::config::{AppConfig, LoadOptions, SQLITE_ANALYTICS_TABLE};
use swimfit_db::{connect_existing, table_exists, AnalyticsRepository, SqlAnalyticsRepository};

use crate::commands::{block_on_runtime, CommandResult};

#[derive(Debug, Serialize)]
struct RecentRow {
    recorded_at: String,
    correlation_id: String,
    size: String,
    size_source: String,
    coverage: String,
    product_handle: Option<String>,
}

pub fn run(limit: u32) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "stats",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match block_on_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "stats",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_existing(&config.database).await.map_err(|error| {
            ("db_connectivity", format!("could not open `{}`: {error}", config.database.url))
        })?;
        let migrated = table_exists(&pool, SQLITE_ANALYTICS_TABLE)
            .await
            .map_err(|error| ("db_query", error.to_string()))?;
        if !migrated {
            pool.close().await;
            return Err((
                "db_query",
                format!(
                    "table `{SQLITE_ANALYTICS_TABLE}` is missing from `{}`; run `swimfit migrate`",
                    config.database.url
                ),
            ));
        }
        let repository = SqlAnalyticsRepository::new(pool.clone());

        let summary =
            repository.summary().await.map_err(|error| ("db_query", error.to_string()))?;
        let recent =
            repository.recent(limit).await.map_err(|error| ("db_query", error.to_string()))?;
        pool.close().await;
        Ok::<_, (&'static str, String)>((summary, recent))
    });

    match result {
        Ok((summary, recent)) => {
            let rows: Vec<RecentRow> = recent
                .into_iter()
                .map(|record| RecentRow {
                    recorded_at: record.recorded_at.to_rfc3339(),
                    correlation_id: record.correlation_id,
                    size: record.size,
                    size_source: record.size_source,
                    coverage: record.coverage,
                    product_handle: record.product_handle,
                })
                .collect();

            CommandResult::success_with_data(
                "stats",
                format!("{} recommendations recorded", summary.total),
                Some(json!({ "summary": summary, "recent": rows })),
            )
        }
        Err((error_class, message)) => CommandResult::failure("stats", error_class, message, 4),
    }
}
