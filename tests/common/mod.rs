#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    io::Write,
};

use sqlx::SqlitePool;
use tempfile::NamedTempFile;

use stock_batch::core::{listener::ChunkListener, step::StepExecution};

/// Writes one input line per entry and returns the backing temp file.
pub fn write_input(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Unable to create input file");
    for line in lines {
        writeln!(file, "{}", line).expect("Unable to write input line");
    }
    file
}

/// The DDL script shipped with the job.
pub fn schema_script() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Unable to create schema file");
    writeln!(
        file,
        "CREATE TABLE IF NOT EXISTS STOCKPRICE (\n    symbol TEXT NOT NULL,\n    date TEXT NOT NULL,\n    price REAL NOT NULL\n);"
    )
    .expect("Unable to write schema file");
    file
}

/// A DDL script whose table rejects duplicate symbols.
pub fn unique_symbol_schema_script() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Unable to create schema file");
    writeln!(
        file,
        "CREATE TABLE IF NOT EXISTS STOCKPRICE (\n    symbol TEXT NOT NULL UNIQUE,\n    date TEXT NOT NULL,\n    price REAL NOT NULL\n);"
    )
    .expect("Unable to write schema file");
    file
}

/// Connects a pool to a fresh file-backed SQLite database.
///
/// The temp file must stay alive for the duration of the test.
pub async fn connect_temp_db() -> (SqlitePool, NamedTempFile) {
    let database_file = NamedTempFile::new().expect("Unable to create database file");
    let connection_uri = format!("sqlite://{}", database_file.path().display());
    let pool = SqlitePool::connect(&connection_uri)
        .await
        .expect("Unable to connect to database");
    (pool, database_file)
}

/// All rows of the destination table, in insertion order.
pub async fn fetch_rows(pool: &SqlitePool) -> Vec<(String, String, f64)> {
    sqlx::query_as("SELECT symbol, date, price FROM STOCKPRICE ORDER BY rowid")
        .fetch_all(pool)
        .await
        .expect("Unable to query STOCKPRICE")
}

/// Listener recording the cumulative read count at each chunk boundary.
#[derive(Default)]
pub struct RecordingListener {
    pub after_counts: RefCell<Vec<usize>>,
    pub error_count: Cell<usize>,
}

impl ChunkListener for RecordingListener {
    fn after_chunk(&self, step_execution: &StepExecution) {
        self.after_counts
            .borrow_mut()
            .push(step_execution.read_count);
    }

    fn after_chunk_error(&self, _step_execution: &StepExecution) {
        self.error_count.set(self.error_count.get() + 1);
    }
}
