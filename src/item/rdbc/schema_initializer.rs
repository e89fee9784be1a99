use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use sqlx::{Pool, Sqlite};

use crate::{core::job::JobInitializer, BatchError};

/// Runs a DDL script against the destination store before the job executes.
///
/// The script is read from disk and executed verbatim, statement by
/// statement, exactly once per job run. Any failure — unreadable script,
/// syntax error, unreachable store — is a [`BatchError::Resource`] and aborts
/// the job before its first chunk. Idempotence across runs is the script's
/// responsibility (the shipped script uses `CREATE TABLE IF NOT EXISTS`).
pub struct SchemaInitializer<'a> {
    pool: &'a Pool<Sqlite>,
    script_path: PathBuf,
}

impl<'a> SchemaInitializer<'a> {
    pub fn new<P: AsRef<Path>>(pool: &'a Pool<Sqlite>, script_path: P) -> Self {
        Self {
            pool,
            script_path: script_path.as_ref().to_path_buf(),
        }
    }
}

impl JobInitializer for SchemaInitializer<'_> {
    fn initialize(&self) -> Result<(), BatchError> {
        let script = fs::read_to_string(&self.script_path).map_err(|err| {
            BatchError::Resource(format!(
                "cannot read DDL script {}: {}",
                self.script_path.display(),
                err
            ))
        })?;

        info!("Executing DDL script: {}", self.script_path.display());

        let result = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(async { sqlx::raw_sql(&script).execute(self.pool).await })
        });

        result.map_err(|err| {
            BatchError::Resource(format!(
                "DDL script {} failed: {}",
                self.script_path.display(),
                err
            ))
        })?;

        Ok(())
    }
}
