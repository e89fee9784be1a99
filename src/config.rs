use std::{env, path::PathBuf};

/// Default commit interval: records per chunk.
const DEFAULT_CHUNK_SIZE: usize = 5;

/// Runtime configuration of the import job, taken from environment variables
/// with sensible defaults.
///
/// | Variable       | Default                       |
/// |----------------|-------------------------------|
/// | `STOCKS_FILE`  | `data/stocks.txt`             |
/// | `SCHEMA_FILE`  | `data/schema-create.sql`      |
/// | `DATABASE_URL` | `sqlite://stockprice.db?mode=rwc` |
/// | `CHUNK_SIZE`   | `5`                           |
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub input_path: PathBuf,
    pub schema_path: PathBuf,
    pub database_url: String,
    pub chunk_size: usize,
}

impl JobConfig {
    pub fn from_env() -> Self {
        Self {
            input_path: env::var("STOCKS_FILE")
                .unwrap_or_else(|_| "data/stocks.txt".to_string())
                .into(),
            schema_path: env::var("SCHEMA_FILE")
                .unwrap_or_else(|_| "data/schema-create.sql".to_string())
                .into(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://stockprice.db?mode=rwc".to_string()),
            chunk_size: parse_chunk_size(env::var("CHUNK_SIZE").ok().as_deref()),
        }
    }
}

/// Parses the chunk size, falling back to the default for anything that is
/// not a positive integer.
fn parse_chunk_size(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_CHUNK_SIZE)
}
