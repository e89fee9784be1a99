use std::{
    cell::RefCell,
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

/// Named string tokens produced by tokenizing one input line.
///
/// Accessors convert a token to the requested type by field name; a missing
/// name or a non-conforming value is a [`BatchError::Parse`].
#[derive(Debug)]
pub struct FieldSet {
    names: Vec<String>,
    values: Vec<String>,
}

impl FieldSet {
    pub fn read_string(&self, name: &str) -> Result<&str, BatchError> {
        let index = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| BatchError::Parse(format!("unknown field name: {}", name)))?;
        Ok(&self.values[index])
    }

    pub fn read_f64(&self, name: &str) -> Result<f64, BatchError> {
        let value = self.read_string(name)?;
        value.parse::<f64>().map_err(|_| {
            BatchError::Parse(format!("field {} is not a number: {}", name, value))
        })
    }

    /// Parses a calendar date in `%Y-%m-%d` format.
    pub fn read_date(&self, name: &str) -> Result<NaiveDate, BatchError> {
        let value = self.read_string(name)?;
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| BatchError::Parse(format!("field {} is not a date: {}", name, value)))
    }
}

/// Splits a delimited text line into named fields.
///
/// The token count must match the configured field names exactly; there is no
/// quoting or escaping support. Tokens are trimmed of surrounding whitespace.
pub struct DelimitedLineTokenizer {
    delimiter: char,
    names: Vec<String>,
}

impl DelimitedLineTokenizer {
    pub fn new(delimiter: char, names: &[&str]) -> Self {
        Self {
            delimiter,
            names: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn tokenize(&self, line: &str) -> Result<FieldSet, BatchError> {
        let values: Vec<String> = line
            .split(self.delimiter)
            .map(|token| token.trim().to_string())
            .collect();

        if values.len() != self.names.len() {
            return Err(BatchError::Parse(format!(
                "expected {} fields but found {} in line: {}",
                self.names.len(),
                values.len(),
                line
            )));
        }

        Ok(FieldSet {
            names: self.names.clone(),
            values,
        })
    }
}

/// Binds named string tokens onto a structured record's typed fields.
pub trait FieldSetMapper<T> {
    fn map_field_set(&self, field_set: &FieldSet) -> Result<T, BatchError>;
}

/// An item reader producing records from a delimited text file, one line per
/// record.
///
/// `open` acquires the file and `close` releases it; reopening restarts from
/// the first line. Each line is tokenized and mapped; a malformed line raises
/// a [`BatchError::Parse`] from `read`, which fails the enclosing chunk.
pub struct FlatFileItemReader<'a, T> {
    path: PathBuf,
    tokenizer: DelimitedLineTokenizer,
    mapper: &'a dyn FieldSetMapper<T>,
    lines: RefCell<Option<Lines<BufReader<File>>>>,
}

impl<T> ItemReader<T> for FlatFileItemReader<'_, T> {
    fn open(&self) -> Result<(), BatchError> {
        let file = File::open(&self.path).map_err(|err| {
            BatchError::Resource(format!(
                "cannot open input file {}: {}",
                self.path.display(),
                err
            ))
        })?;
        *self.lines.borrow_mut() = Some(BufReader::new(file).lines());
        Ok(())
    }

    fn read(&self) -> ItemReaderResult<T> {
        let mut guard = self.lines.borrow_mut();
        let lines = guard
            .as_mut()
            .ok_or_else(|| BatchError::Resource("reader is not open".to_string()))?;

        match lines.next() {
            None => Ok(None),
            Some(Err(err)) => Err(BatchError::Resource(format!(
                "cannot read from {}: {}",
                self.path.display(),
                err
            ))),
            Some(Ok(line)) => {
                let field_set = self.tokenizer.tokenize(&line)?;
                let item = self.mapper.map_field_set(&field_set)?;
                Ok(Some(item))
            }
        }
    }

    fn close(&self) -> Result<(), BatchError> {
        *self.lines.borrow_mut() = None;
        Ok(())
    }
}

/// A builder for configuring flat-file item reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Field names: none (must be set)
pub struct FlatFileItemReaderBuilder<'a, T> {
    delimiter: char,
    names: Vec<&'a str>,
    mapper: Option<&'a dyn FieldSetMapper<T>>,
}

impl<'a, T> Default for FlatFileItemReaderBuilder<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> FlatFileItemReaderBuilder<'a, T> {
    pub fn new() -> Self {
        Self {
            delimiter: ',',
            names: Vec::new(),
            mapper: None,
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the field names, matched positionally against each line's tokens.
    pub fn names(mut self, names: &[&'a str]) -> Self {
        self.names = names.to_vec();
        self
    }

    pub fn mapper(mut self, mapper: &'a dyn FieldSetMapper<T>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Creates a `FlatFileItemReader` reading from the given path.
    ///
    /// The file is not opened here; acquisition happens in
    /// [`ItemReader::open`] so a missing file surfaces as a step failure.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> FlatFileItemReader<'a, T> {
        FlatFileItemReader {
            path: path.as_ref().to_path_buf(),
            tokenizer: DelimitedLineTokenizer::new(self.delimiter, &self.names),
            mapper: self.mapper.expect("Mapper is required for building a reader"),
            lines: RefCell::new(None),
        }
    }
}
