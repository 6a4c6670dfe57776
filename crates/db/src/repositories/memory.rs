use std::collections::BTreeMap;

use tokio::sync::RwLock;

use swimfit_core::analytics::{AnalyticsError, AnalyticsRecord, AnalyticsSink};

use super::{sort_buckets, AnalyticsRepository, AnalyticsSummary, CountBucket, RepositoryError};

#[derive(Default)]
pub struct InMemoryAnalyticsRepository {
    records: RwLock<Vec<AnalyticsRecord>>,
}

impl InMemoryAnalyticsRepository {
    pub async fn records(&self) -> Vec<AnalyticsRecord> {
        self.records.read().await.clone()
    }
}

fn buckets<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CountBucket> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut buckets: Vec<CountBucket> = counts
        .into_iter()
        .map(|(key, count)| CountBucket { key: key.to_string(), count })
        .collect();
    sort_buckets(&mut buckets);
    buckets
}

#[async_trait::async_trait]
impl AnalyticsRepository for InMemoryAnalyticsRepository {
    async fn save(&self, record: &AnalyticsRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        if !records.iter().any(|existing| existing.id == record.id) {
            records.push(record.clone());
        }
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<AnalyticsRecord>, RepositoryError> {
        let records = self.records.read().await;
        let mut recent: Vec<AnalyticsRecord> = records.iter().rev().cloned().collect();
        // stable sort keeps insertion order (newest first) for equal timestamps
        recent.sort_by(|left, right| right.recorded_at.cmp(&left.recorded_at));
        recent.truncate(limit as usize);
        Ok(recent)
    }

    async fn summary(&self) -> Result<AnalyticsSummary, RepositoryError> {
        let records = self.records.read().await;

        Ok(AnalyticsSummary {
            total: records.len() as i64,
            by_size: buckets(records.iter().map(|record| record.size.as_str())),
            by_size_source: buckets(records.iter().map(|record| record.size_source.as_str())),
            by_coverage: buckets(records.iter().map(|record| record.coverage.as_str())),
        })
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for InMemoryAnalyticsRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn record(&self, record: &AnalyticsRecord) -> Result<(), AnalyticsError> {
        self.save(record).await.map_err(|error| AnalyticsError::Storage(error.to_string()))
    }
}
