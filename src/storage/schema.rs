//! Database schema definitions

use rusqlite::Connection;

/// SQL schema for the result database
pub const SCHEMA_SQL: &str = r#"
-- Track scrape runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Product records, one row per accepted record per run
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    site_key TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT,
    price REAL,
    original_price REAL,
    currency TEXT NOT NULL,
    availability TEXT NOT NULL,
    stock_level INTEGER,
    description TEXT,
    brand TEXT,
    sku TEXT,
    category TEXT,
    tags TEXT NOT NULL DEFAULT '',
    image_url TEXT,
    rating REAL,
    review_count INTEGER,
    scraped_at TEXT NOT NULL,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_products_url ON products(url);
CREATE INDEX IF NOT EXISTS idx_products_site ON products(site_key);

-- Per-URL failures and skips
CREATE TABLE IF NOT EXISTS failures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    site_key TEXT NOT NULL,
    url TEXT NOT NULL,
    error TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_failures_run ON failures(run_id);
"#;

/// Creates all tables and indexes if they do not exist
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
