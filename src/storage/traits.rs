//! Storage traits and error types

use crate::model::ScrapingResult;
use crate::storage::{PricePoint, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for result persistence backends
///
/// A sink receives whole per-site batch results; it never participates in
/// scraping decisions. Recording a result is transactional per call.
pub trait ResultSink {
    /// Creates a new scrape run tagged with the configuration hash
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run finished with the given status and a finish timestamp
    fn complete_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Persists one site's batch result, products and failures both
    fn record_result(&mut self, run_id: i64, result: &ScrapingResult) -> StorageResult<()>;

    /// Returns every price observed for a URL, oldest run first
    fn price_history(&self, url: &str) -> StorageResult<Vec<PricePoint>>;

    /// Counts product records persisted for a run
    fn count_products(&self, run_id: i64) -> StorageResult<u64>;
}
