use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use swimfit_core::analytics::{AnalyticsError, AnalyticsRecord, AnalyticsSink};

use super::{sort_buckets, AnalyticsRepository, AnalyticsSummary, CountBucket, RepositoryError};
use crate::DbPool;

pub struct SqlAnalyticsRepository {
    pool: DbPool,
}

impl SqlAnalyticsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn count_by(&self, column: &'static str) -> Result<Vec<CountBucket>, RepositoryError> {
        let sql =
            format!("SELECT {column} AS bucket, COUNT(*) AS count FROM fit_analytics GROUP BY {column}");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut buckets = rows
            .iter()
            .map(|row| {
                Ok(CountBucket {
                    key: row.try_get("bucket").map_err(|e| RepositoryError::Decode(e.to_string()))?,
                    count: row.try_get("count").map_err(|e| RepositoryError::Decode(e.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        sort_buckets(&mut buckets);
        Ok(buckets)
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<AnalyticsRecord, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Decode(e.to_string());

    let recorded_at_str: String = row.try_get("recorded_at").map_err(decode)?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("recorded_at `{recorded_at_str}`: {e}")))?;
    let bra_band: Option<i64> = row.try_get("bra_band").map_err(decode)?;
    let bra_band = bra_band
        .map(u8::try_from)
        .transpose()
        .map_err(|e| RepositoryError::Decode(format!("bra_band: {e}")))?;

    Ok(AnalyticsRecord {
        id: row.try_get("id").map_err(decode)?,
        correlation_id: row.try_get("correlation_id").map_err(decode)?,
        recorded_at,
        unit_system: row.try_get("unit_system").map_err(decode)?,
        length_unit: row.try_get("length_unit").map_err(decode)?,
        height_cm: row.try_get("height_cm").map_err(decode)?,
        weight_kg: row.try_get("weight_kg").map_err(decode)?,
        bust: row.try_get("bust").map_err(decode)?,
        waist: row.try_get("waist").map_err(decode)?,
        hip: row.try_get("hip").map_err(decode)?,
        bra_raw: row.try_get("bra_raw").map_err(decode)?,
        bra_band,
        bra_cup: row.try_get("bra_cup").map_err(decode)?,
        activity: row.try_get("activity").map_err(decode)?,
        modesty: row.try_get("modesty").map_err(decode)?,
        tummy_control: row.try_get("tummy_control").map_err(decode)?,
        style_preference: row.try_get("style_preference").map_err(decode)?,
        product_handle: row.try_get("product_handle").map_err(decode)?,
        product_title: row.try_get("product_title").map_err(decode)?,
        size: row.try_get("size").map_err(decode)?,
        size_source: row.try_get("size_source").map_err(decode)?,
        coverage: row.try_get("coverage").map_err(decode)?,
        fit_notes: row.try_get("fit_notes").map_err(decode)?,
    })
}

#[async_trait]
impl AnalyticsRepository for SqlAnalyticsRepository {
    async fn save(&self, record: &AnalyticsRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO fit_analytics
                (id, correlation_id, recorded_at, unit_system, length_unit,
                 height_cm, weight_kg, bust, waist, hip,
                 bra_raw, bra_band, bra_cup, activity, modesty, tummy_control,
                 style_preference, product_handle, product_title,
                 size, size_source, coverage, fit_notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&record.id)
        .bind(&record.correlation_id)
        .bind(record.recorded_at.to_rfc3339())
        .bind(&record.unit_system)
        .bind(&record.length_unit)
        .bind(record.height_cm)
        .bind(record.weight_kg)
        .bind(record.bust)
        .bind(record.waist)
        .bind(record.hip)
        .bind(&record.bra_raw)
        .bind(record.bra_band.map(i64::from))
        .bind(&record.bra_cup)
        .bind(&record.activity)
        .bind(&record.modesty)
        .bind(record.tummy_control)
        .bind(&record.style_preference)
        .bind(&record.product_handle)
        .bind(&record.product_title)
        .bind(&record.size)
        .bind(&record.size_source)
        .bind(&record.coverage)
        .bind(&record.fit_notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<AnalyticsRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, correlation_id, recorded_at, unit_system, length_unit,
                    height_cm, weight_kg, bust, waist, hip,
                    bra_raw, bra_band, bra_cup, activity, modesty, tummy_control,
                    style_preference, product_handle, product_title,
                    size, size_source, coverage, fit_notes
             FROM fit_analytics
             ORDER BY recorded_at DESC, rowid DESC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn summary(&self) -> Result<AnalyticsSummary, RepositoryError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM fit_analytics").fetch_one(&self.pool).await?;

        Ok(AnalyticsSummary {
            total,
            by_size: self.count_by("size").await?,
            by_size_source: self.count_by("size_source").await?,
            by_coverage: self.count_by("coverage").await?,
        })
    }
}

#[async_trait]
impl AnalyticsSink for SqlAnalyticsRepository {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn record(&self, record: &AnalyticsRecord) -> Result<(), AnalyticsError> {
        self.save(record).await.map_err(|error| AnalyticsError::Storage(error.to_string()))
    }
}
