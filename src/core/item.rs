use crate::error::BatchError;

/// Result of a single read attempt.
///
/// - `Ok(Some(item))` when an item was read
/// - `Ok(None)` when the input is exhausted
/// - `Err(BatchError)` when reading or parsing failed
pub type ItemReaderResult<R> = Result<Option<R>, BatchError>;

/// Result of processing a single item.
///
/// - `Ok(Some(item))` passes the item on to the writer
/// - `Ok(None)` filters the item out of the chunk's write set
/// - `Err(BatchError)` fails the chunk
pub type ItemProcessorResult<W> = Result<Option<W>, BatchError>;

/// Result of writing a chunk of items.
pub type ItemWriterResult = Result<(), BatchError>;

/// Retrieval of input for a step, one item at a time.
///
/// A reader produces a lazy, finite sequence. `open` acquires the underlying
/// resource and `close` releases it; reopening restarts the sequence from the
/// beginning. Readers are not restartable mid-stream within a single run.
pub trait ItemReader<R> {
    /// Acquires the input resource. Called once before the first `read`.
    fn open(&self) -> Result<(), BatchError> {
        Ok(())
    }

    /// Returns the next item, or `Ok(None)` when the sequence is exhausted.
    fn read(&self) -> ItemReaderResult<R>;

    /// Releases the input resource.
    fn close(&self) -> Result<(), BatchError> {
        Ok(())
    }
}

/// Business logic applied to each item between reading and writing.
pub trait ItemProcessor<R, W> {
    fn process(&self, item: &R) -> ItemProcessorResult<W>;
}

/// Output of a step, one chunk of items at a time.
pub trait ItemWriter<W> {
    /// Writes a whole chunk. Either all items are persisted or none are.
    fn write(&self, items: &[W]) -> ItemWriterResult;

    /// Prepares the output destination. Called once before the first chunk.
    fn open(&self) -> Result<(), BatchError> {
        Ok(())
    }

    fn flush(&self) -> Result<(), BatchError> {
        Ok(())
    }

    /// Releases the output destination.
    fn close(&self) -> Result<(), BatchError> {
        Ok(())
    }
}

/// Processor used when a step is built without an explicit one.
///
/// Clones each item through unchanged and never filters.
#[derive(Default)]
pub struct PassThroughProcessor {}

impl<R: Clone> ItemProcessor<R, R> for PassThroughProcessor {
    fn process(&self, item: &R) -> ItemProcessorResult<R> {
        Ok(Some(item.clone()))
    }
}
