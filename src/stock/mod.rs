use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::{query_builder::Separated, Sqlite};

use crate::{
    core::item::{ItemProcessor, ItemProcessorResult},
    error::BatchError,
    item::{
        flat_file::{FieldSet, FieldSetMapper},
        rdbc::DatabaseItemBinder,
    },
};

/// One stock price observation, built from a single input line.
///
/// Well-formed only when all three fields parse from their source text; a
/// record lives for exactly one chunk and is never shared across chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRecord {
    pub symbol: String,
    pub price: f64,
    pub date: NaiveDate,
}

/// Binds the named tokens `symbol, price, date` onto a [`StockRecord`].
///
/// Rejects an empty symbol and a negative price as parse failures of the
/// line, so a non-conforming record fails its chunk like any malformed line.
#[derive(Default)]
pub struct StockRecordMapper {}

impl FieldSetMapper<StockRecord> for StockRecordMapper {
    fn map_field_set(&self, field_set: &FieldSet) -> Result<StockRecord, BatchError> {
        let symbol = field_set.read_string("symbol")?;
        if symbol.is_empty() {
            return Err(BatchError::Parse("symbol must not be empty".to_string()));
        }

        let price = field_set.read_f64("price")?;
        if price < 0.0 {
            return Err(BatchError::Parse(format!(
                "price must be non-negative: {}",
                price
            )));
        }

        let date = field_set.read_date("date")?;

        Ok(StockRecord {
            symbol: symbol.to_string(),
            price,
            date,
        })
    }
}

/// Pass-through processor that logs each record before handing it on.
#[derive(Default)]
pub struct LogStockProcessor {}

impl ItemProcessor<StockRecord, StockRecord> for LogStockProcessor {
    fn process(&self, item: &StockRecord) -> ItemProcessorResult<StockRecord> {
        info!("Processing {}, {}", item.symbol, item.price);
        Ok(Some(item.clone()))
    }
}

/// Binds a [`StockRecord`] to the insert parameters, column order
/// symbol, date, price.
#[derive(Default)]
pub struct StockRecordBinder {}

impl DatabaseItemBinder<StockRecord> for StockRecordBinder {
    fn bind(&self, item: &StockRecord, mut query_builder: Separated<Sqlite, &str>) {
        query_builder.push_bind(item.symbol.clone());
        query_builder.push_bind(item.date.format("%Y-%m-%d").to_string());
        query_builder.push_bind(item.price);
    }
}
