//! SQLite result sink implementation

use crate::model::ScrapingResult;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResultSink, StorageResult};
use crate::storage::{PricePoint, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite result sink
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates the result database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl ResultSink for SqliteSink {
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        let run = stmt
            .query_row([], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    config_hash: row.get(3)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                        .unwrap_or(RunStatus::Running),
                })
            })
            .optional()?;

        Ok(run)
    }

    fn record_result(&mut self, run_id: i64, result: &ScrapingResult) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        for product in &result.products {
            tx.execute(
                "INSERT OR REPLACE INTO products (
                    run_id, site_key, url, title, price, original_price, currency,
                    availability, stock_level, description, brand, sku, category,
                    tags, image_url, rating, review_count, scraped_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                params![
                    run_id,
                    product.site_key,
                    product.url,
                    product.title,
                    product.price,
                    product.original_price,
                    product.currency,
                    product.availability.as_str(),
                    product.stock_level,
                    product.description,
                    product.brand,
                    product.sku,
                    product.category,
                    product.tags.join(","),
                    product.image_url,
                    product.rating,
                    product.review_count,
                    product.scraped_at.to_rfc3339(),
                ],
            )?;
        }

        let now = Utc::now().to_rfc3339();
        for failure in &result.errors {
            tx.execute(
                "INSERT INTO failures (run_id, site_key, url, error, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![run_id, result.site_key, failure.url, failure.error, now],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn price_history(&self, url: &str) -> StorageResult<Vec<PricePoint>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, price, currency, scraped_at FROM products
             WHERE url = ?1 AND price IS NOT NULL
             ORDER BY run_id ASC",
        )?;

        let points = stmt
            .query_map(params![url], |row| {
                Ok(PricePoint {
                    run_id: row.get(0)?,
                    price: row.get(1)?,
                    currency: row.get(2)?,
                    scraped_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(points)
    }

    fn count_products(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
