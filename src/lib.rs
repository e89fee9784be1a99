/*!
 # stock-batch

 A chunk-oriented batch job that imports stock price records from a
 delimited text file into a SQLite table.

 ## Core Concepts

 - **Job:** The entire batch process: an optional initializer followed by one
   or more `Step`s, with a `NotStarted → Initializing → Running →
   Completed | Failed` lifecycle and a run identifier that increments on
   every invocation.
 - **Step:** An independent phase of the job. The chunk-oriented step reads
   items one at a time, processes them, and writes them out in fixed-size
   chunks, each chunk committed as one atomic unit.
 - **ItemReader:** Retrieval of input, one item at a time. The flat-file
   reader tokenizes each line on a delimiter and binds the named tokens onto
   a typed record.
 - **ItemProcessor:** Business logic applied per item; returning `None`
   filters the item out of the chunk's write set.
 - **ItemWriter:** Output of a step, one chunk at a time. The SQLite writer
   turns a chunk into a single multi-row parameterized insert inside one
   transaction.
 - **ChunkListener:** Observer of chunk boundaries; the item-count listener
   logs the cumulative read count after each committed chunk.

 Every error is chunk-fatal and job-fatal: there is no skip, retry or
 resume-from-failure. Chunks committed before a failure remain persisted.

 ## Example

```rust,no_run
# use stock_batch::{
#     core::{
#         job::{Job, JobBuilder},
#         listener::ItemCountListener,
#         step::StepBuilder,
#     },
#     item::{
#         flat_file::FlatFileItemReaderBuilder,
#         rdbc::{SchemaInitializer, SqliteItemWriterBuilder},
#     },
#     stock::{LogStockProcessor, StockRecordBinder, StockRecordMapper},
# };
# use sqlx::SqlitePool;
# #[tokio::main]
# async fn main() -> anyhow::Result<()> {
let pool = SqlitePool::connect("sqlite://stockprice.db?mode=rwc").await?;

let initializer = SchemaInitializer::new(&pool, "data/schema-create.sql");

let mapper = StockRecordMapper::default();
let reader = FlatFileItemReaderBuilder::new()
    .delimiter(',')
    .names(&["symbol", "price", "date"])
    .mapper(&mapper)
    .from_path("data/stocks.txt");

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
    .chunk(5)
    .build();

let job = JobBuilder::new()
    .name("import-stock-prices")
    .initializer(&initializer)
    .start(&step)
    .build();

job.run()?;
# Ok(())
# }
```
*/

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Item readers and writers (flat file reader, SQLite writer)
pub mod item;

/// Stock price domain: record, mapper, processor, binder
pub mod stock;

/// Environment-driven job configuration
pub mod config;
