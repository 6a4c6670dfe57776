pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{
    connect, connect_existing, connect_with_config, connect_with_settings, ping, table_exists,
    DbPool,
};
pub use repositories::{
    AnalyticsRepository, AnalyticsSummary, CountBucket, InMemoryAnalyticsRepository,
    RepositoryError, SqlAnalyticsRepository,
};
