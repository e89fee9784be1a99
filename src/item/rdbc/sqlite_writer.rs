use log::{debug, error};
use serde::Serialize;
use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    item::rdbc::DatabaseItemBinder,
    BatchError,
};

// The number of bound parameters per statement must stay within the
// database's limit.
const BIND_LIMIT: usize = 65535;

/// A writer that batch-inserts each chunk into a SQLite table.
///
/// All items of a chunk go into one multi-row parameterized INSERT executed
/// inside a single transaction: either the whole chunk is committed or the
/// transaction is rolled back and the chunk fails. The column list fixes the
/// parameter order; a [`DatabaseItemBinder`] binds each item accordingly.
///
/// Database calls are bridged from the synchronous `ItemWriter` contract via
/// `tokio::task::block_in_place`, so callers need a multi-thread runtime.
pub struct SqliteItemWriter<'a, O> {
    pool: &'a Pool<Sqlite>,
    table: &'a str,
    columns: Vec<&'a str>,
    item_binder: &'a dyn DatabaseItemBinder<O>,
}

impl<O: Serialize + Clone> ItemWriter<O> for SqliteItemWriter<'_, O> {
    /// Writes one chunk of items atomically.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Write`] when the insert or the commit fails
    /// (constraint violation, connectivity loss); the transaction is rolled
    /// back and no row of the chunk persists.
    fn write(&self, items: &[O]) -> ItemWriterResult {
        if items.is_empty() {
            return Ok(());
        }

        let mut query_builder = QueryBuilder::new("INSERT INTO ");
        query_builder.push(self.table);
        query_builder.push(" (");
        query_builder.push(self.columns.join(", "));
        query_builder.push(") ");

        query_builder.push_values(
            items.iter().take(BIND_LIMIT / self.columns.len()),
            |b, item| {
                self.item_binder.bind(item, b);
            },
        );

        let result = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let mut tx = self.pool.begin().await?;
                query_builder.build().execute(&mut *tx).await?;
                tx.commit().await
            })
        });

        match result {
            Ok(()) => {
                debug!("Wrote {} items to table {}", items.len(), self.table);
                Ok(())
            }
            Err(err) => {
                error!("Failed to write items to table {}: {}", self.table, err);
                Err(BatchError::Write(format!(
                    "insert into {} failed: {}",
                    self.table, err
                )))
            }
        }
    }
}

/// Builder for a [`SqliteItemWriter`].
///
/// Pool, table, at least one column and an item binder are mandatory.
pub struct SqliteItemWriterBuilder<'a, O> {
    pool: Option<&'a Pool<Sqlite>>,
    table: Option<&'a str>,
    columns: Vec<&'a str>,
    item_binder: Option<&'a dyn DatabaseItemBinder<O>>,
}

impl<'a, O> Default for SqliteItemWriterBuilder<'a, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, O> SqliteItemWriterBuilder<'a, O> {
    pub fn new() -> Self {
        Self {
            pool: None,
            table: None,
            columns: Vec::new(),
            item_binder: None,
        }
    }

    pub fn pool(mut self, pool: &'a Pool<Sqlite>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }

    /// Adds a column; call once per column, in insert order.
    pub fn add_column(mut self, column: &'a str) -> Self {
        self.columns.push(column);
        self
    }

    pub fn item_binder(mut self, item_binder: &'a dyn DatabaseItemBinder<O>) -> Self {
        self.item_binder = Some(item_binder);
        self
    }

    pub fn build(self) -> SqliteItemWriter<'a, O> {
        if self.columns.is_empty() {
            panic!("One or more columns are required");
        }

        SqliteItemWriter {
            pool: self.pool.expect("Pool is required for building a writer"),
            table: self.table.expect("Table is required for building a writer"),
            columns: self.columns,
            item_binder: self
                .item_binder
                .expect("Item binder is required for building a writer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use sqlx::{query_builder::Separated, Sqlite, SqlitePool};
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
    struct Quote {
        symbol: String,
        price: f64,
    }

    struct QuoteBinder;

    impl DatabaseItemBinder<Quote> for QuoteBinder {
        fn bind(&self, item: &Quote, mut query_builder: Separated<Sqlite, &str>) {
            query_builder.push_bind(item.symbol.clone());
            query_builder.push_bind(item.price);
        }
    }

    // A file-backed database: pooled connections to `sqlite::memory:` would
    // each see their own database.
    async fn setup_pool() -> (SqlitePool, NamedTempFile) {
        let database_file = NamedTempFile::new().unwrap();
        let connection_uri = format!("sqlite://{}", database_file.path().display());
        let pool = SqlitePool::connect(&connection_uri).await.unwrap();
        sqlx::query("CREATE TABLE quotes (symbol TEXT NOT NULL UNIQUE, price REAL NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        (pool, database_file)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn write_inserts_whole_chunk() {
        let (pool, _db) = setup_pool().await;
        let binder = QuoteBinder;
        let writer = SqliteItemWriterBuilder::new()
            .pool(&pool)
            .table("quotes")
            .add_column("symbol")
            .add_column("price")
            .item_binder(&binder)
            .build();

        let quotes = vec![
            Quote {
                symbol: "AAPL".to_string(),
                price: 150.25,
            },
            Quote {
                symbol: "GOOG".to_string(),
                price: 2800.50,
            },
        ];

        writer.write(&quotes).unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_chunk_is_a_no_op() {
        let (pool, _db) = setup_pool().await;
        let binder = QuoteBinder;
        let writer = SqliteItemWriterBuilder::new()
            .pool(&pool)
            .table("quotes")
            .add_column("symbol")
            .add_column("price")
            .item_binder(&binder)
            .build();

        writer.write(&[]).unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_chunk_is_rolled_back_entirely() {
        let (pool, _db) = setup_pool().await;
        let binder = QuoteBinder;
        let writer = SqliteItemWriterBuilder::new()
            .pool(&pool)
            .table("quotes")
            .add_column("symbol")
            .add_column("price")
            .item_binder(&binder)
            .build();

        // Duplicate symbol violates the UNIQUE constraint; the valid first
        // row must not survive on its own.
        let quotes = vec![
            Quote {
                symbol: "AAPL".to_string(),
                price: 150.25,
            },
            Quote {
                symbol: "AAPL".to_string(),
                price: 151.00,
            },
        ];

        let result = writer.write(&quotes);
        assert!(matches!(result, Err(BatchError::Write(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
