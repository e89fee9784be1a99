mod common;

use std::{io::Write, path::Path};

use sqlx::SqlitePool;
use tempfile::NamedTempFile;

use common::{
    connect_temp_db, fetch_rows, schema_script, unique_symbol_schema_script, write_input,
    RecordingListener,
};
use stock_batch::{
    core::{
        job::{Job, JobBuilder, JobExecution, JobStatus},
        listener::ChunkListener,
        step::StepBuilder,
    },
    item::{
        flat_file::FlatFileItemReaderBuilder,
        rdbc::{SchemaInitializer, SqliteItemWriterBuilder},
    },
    stock::{LogStockProcessor, StockRecordBinder, StockRecordMapper},
    BatchError,
};

fn run_import(
    pool: &SqlitePool,
    input: &Path,
    schema: &Path,
    chunk_size: usize,
    listener: &dyn ChunkListener,
) -> (Result<JobExecution, BatchError>, JobStatus) {
    let initializer = SchemaInitializer::new(pool, schema);

    let mapper = StockRecordMapper::default();
    let reader = FlatFileItemReaderBuilder::new()
        .delimiter(',')
        .names(&["symbol", "price", "date"])
        .mapper(&mapper)
        .from_path(input);

    let processor = LogStockProcessor::default();

    let binder = StockRecordBinder::default();
    let writer = SqliteItemWriterBuilder::new()
        .pool(pool)
        .table("STOCKPRICE")
        .add_column("symbol")
        .add_column("date")
        .add_column("price")
        .item_binder(&binder)
        .build();

    let step = StepBuilder::new()
        .name("import-stocks")
        .reader(&reader)
        .processor(&processor)
        .writer(&writer)
        .listener(listener)
        .chunk(chunk_size)
        .build();

    let job = JobBuilder::new()
        .name("import-stock-prices")
        .initializer(&initializer)
        .start(&step)
        .build();

    let result = job.run();
    let status = job.get_status();
    (result, status)
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_line_fails_its_chunk_but_keeps_prior_chunks() {
    let (pool, _db) = connect_temp_db().await;
    let input = write_input(&[
        "SYM01,101.50,2024-01-01",
        "SYM02,102.50,2024-01-02",
        "SYM03,103.50,2024-01-03",
        "SYM04,104.50,2024-01-04",
        "SYM05,105.50,2024-01-05",
        "AAPL,not-a-number,2024-01-01",
        "SYM07,107.50,2024-01-07",
    ]);
    let schema = schema_script();
    let listener = RecordingListener::default();

    let (result, status) = run_import(&pool, input.path(), schema.path(), 5, &listener);

    assert!(matches!(result, Err(BatchError::Step(_))));
    assert_eq!(status, JobStatus::Failed);

    // The first chunk was committed before the failure; nothing from the
    // failed chunk made it into the table.
    assert_eq!(fetch_rows(&pool).await.len(), 5);
    assert_eq!(*listener.after_counts.borrow(), vec![5]);
    assert_eq!(listener.error_count.get(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn mismatched_token_count_fails_the_job() {
    let (pool, _db) = connect_temp_db().await;
    let input = write_input(&["AAPL,150.25"]);
    let schema = schema_script();
    let listener = RecordingListener::default();

    let (result, status) = run_import(&pool, input.path(), schema.path(), 5, &listener);

    assert!(result.is_err());
    assert_eq!(status, JobStatus::Failed);
    assert!(fetch_rows(&pool).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_input_file_fails_the_job_after_schema_init() {
    let (pool, _db) = connect_temp_db().await;
    let schema = schema_script();
    let listener = RecordingListener::default();

    let (result, status) = run_import(
        &pool,
        Path::new("/does/not/exist.txt"),
        schema.path(),
        5,
        &listener,
    );

    assert!(result.is_err());
    assert_eq!(status, JobStatus::Failed);

    // The initializer ran before the reader failed, so the table exists and
    // is empty.
    assert!(fetch_rows(&pool).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_ddl_script_fails_the_job_before_any_read() {
    let (pool, _db) = connect_temp_db().await;
    let input = write_input(&["AAPL,150.25,2024-01-01"]);
    let listener = RecordingListener::default();

    let (result, status) = run_import(
        &pool,
        input.path(),
        Path::new("/does/not/exist.sql"),
        5,
        &listener,
    );

    assert!(matches!(result, Err(BatchError::Resource(_))));
    assert_eq!(status, JobStatus::Failed);
    assert!(listener.after_counts.borrow().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn broken_ddl_script_fails_the_job() {
    let (pool, _db) = connect_temp_db().await;
    let input = write_input(&["AAPL,150.25,2024-01-01"]);
    let mut script = NamedTempFile::new().unwrap();
    writeln!(script, "CREATE TABL oops;").unwrap();
    let listener = RecordingListener::default();

    let (result, status) = run_import(&pool, input.path(), script.path(), 5, &listener);

    assert!(matches!(result, Err(BatchError::Resource(_))));
    assert_eq!(status, JobStatus::Failed);
}

#[tokio::test(flavor = "multi_thread")]
async fn constraint_violation_rolls_back_the_whole_chunk() {
    let (pool, _db) = connect_temp_db().await;
    let input = write_input(&[
        "SYM01,101.50,2024-01-01",
        "SYM02,102.50,2024-01-02",
        "SYM03,103.50,2024-01-03",
        "SYM04,104.50,2024-01-04",
        "SYM05,105.50,2024-01-05",
        "SYM06,106.50,2024-01-06",
        "SYM01,999.99,2024-01-07",
    ]);
    let schema = unique_symbol_schema_script();
    let listener = RecordingListener::default();

    let (result, status) = run_import(&pool, input.path(), schema.path(), 5, &listener);

    assert!(result.is_err());
    assert_eq!(status, JobStatus::Failed);

    // The duplicate symbol sits in the second chunk: its rollback discards
    // SYM06 as well, while the first committed chunk survives.
    assert_eq!(fetch_rows(&pool).await.len(), 5);
    assert_eq!(*listener.after_counts.borrow(), vec![5]);
    assert_eq!(listener.error_count.get(), 1);
}
