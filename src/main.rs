use anyhow::Context;
use log::info;
use sqlx::SqlitePool;

use stock_batch::{
    config::JobConfig,
    core::{
        job::{Job, JobBuilder},
        listener::ItemCountListener,
        step::StepBuilder,
    },
    item::{
        flat_file::FlatFileItemReaderBuilder,
        rdbc::{SchemaInitializer, SqliteItemWriterBuilder},
    },
    stock::{LogStockProcessor, StockRecordBinder, StockRecordMapper},
};

/// Assembles the collaborators and runs the import job once.
///
/// A failed run returns `Err`, which makes the process exit with a non-zero
/// status; rows committed by earlier chunks remain persisted.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = JobConfig::from_env();

    let pool = SqlitePool::connect(&config.database_url)
        .await
        .with_context(|| format!("cannot connect to {}", config.database_url))?;

    let initializer = SchemaInitializer::new(&pool, &config.schema_path);

    let mapper = StockRecordMapper::default();
    let reader = FlatFileItemReaderBuilder::new()
        .delimiter(',')
        .names(&["symbol", "price", "date"])
        .mapper(&mapper)
        .from_path(&config.input_path);

    let processor = LogStockProcessor::default();

    let binder = StockRecordBinder::default();
    let writer = SqliteItemWriterBuilder::new()
        .pool(&pool)
        .table("STOCKPRICE")
        .add_column("symbol")
        .add_column("date")
        .add_column("price")
        .item_binder(&binder)
        .build();

    let listener = ItemCountListener::default();

    let step = StepBuilder::new()
        .name("import-stocks")
        .reader(&reader)
        .processor(&processor)
        .writer(&writer)
        .listener(&listener)
        .chunk(config.chunk_size)
        .build();

    let job = JobBuilder::new()
        .name("import-stock-prices")
        .initializer(&initializer)
        .start(&step)
        .build();

    let execution = job.run().context("job failed")?;

    let written: usize = execution
        .step_executions
        .iter()
        .map(|step_execution| step_execution.write_count)
        .sum();
    info!(
        "Job completed: run id {}, {} records written in {:?}",
        execution.run_id, written, execution.duration
    );

    Ok(())
}
