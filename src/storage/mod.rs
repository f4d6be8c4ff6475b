//! Storage module for persisting scrape results
//!
//! Handles all database operations for the pipeline, including:
//! - SQLite database initialization and schema management
//! - Run tracking with configuration hashes
//! - Product record and failure persistence
//! - Price history queries across runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteSink;
pub use traits::{ResultSink, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a result database
pub fn open_sink(path: &Path) -> StorageResult<SqliteSink> {
    SqliteSink::new(path)
}

/// Represents a scrape run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// One observed price for a URL, from one run
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub run_id: i64,
    pub price: f64,
    pub currency: String,
    pub scraped_at: String,
}

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
