use sqlx::{query_builder::Separated, Sqlite};

/// SQLite chunk writer.
pub mod sqlite_writer;

/// DDL script runner executed before the job's first chunk.
pub mod schema_initializer;

pub use schema_initializer::SchemaInitializer;
pub use sqlite_writer::{SqliteItemWriter, SqliteItemWriterBuilder};

/// Maps an item's fields onto the positional parameters of an insert
/// statement.
///
/// The bind order must match the writer's column list exactly.
pub trait DatabaseItemBinder<O> {
    fn bind(&self, item: &O, query_builder: Separated<Sqlite, &str>);
}
