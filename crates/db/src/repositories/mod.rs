use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use swimfit_core::analytics::AnalyticsRecord;

pub mod analytics;
pub mod memory;

pub use analytics::SqlAnalyticsRepository;
pub use memory::InMemoryAnalyticsRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountBucket {
    pub key: String,
    pub count: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub total: i64,
    pub by_size: Vec<CountBucket>,
    pub by_size_source: Vec<CountBucket>,
    pub by_coverage: Vec<CountBucket>,
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn save(&self, record: &AnalyticsRecord) -> Result<(), RepositoryError>;

    /// Newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<AnalyticsRecord>, RepositoryError>;

    /// Counts per size, size source and coverage, each ordered by count then key.
    async fn summary(&self) -> Result<AnalyticsSummary, RepositoryError>;
}

pub(crate) fn sort_buckets(buckets: &mut [CountBucket]) {
    buckets.sort_by(|left, right| right.count.cmp(&left.count).then(left.key.cmp(&right.key)));
}
