use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter, PassThroughProcessor},
    listener::ChunkListener,
};

/// Outcome of a step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step has started but not yet finished
    Starting,
    /// The step completed successfully
    Success,
    /// The step failed while reading or parsing an item
    ReadError,
    /// The step failed while processing an item
    ProcessorError,
    /// The step failed while writing a chunk
    WriteError,
}

/// Execution details of a single step run.
///
/// The counters are cumulative over the whole step, so a listener observing a
/// chunk boundary sees the total number of items read so far.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Human-readable name of the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of items removed from the write set by the processor
    pub filter_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: Instant::now(),
            end_time: Instant::now(),
            duration: Duration::ZERO,
            read_count: 0,
            write_count: 0,
            filter_count: 0,
        }
    }
}

/// An independent, sequential phase of a batch job.
pub trait Step {
    /// Executes the step, recording details into the given execution.
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;

    fn name(&self) -> &str;
}

#[derive(Debug, PartialEq)]
enum ChunkStatus {
    /// The chunk reached the configured size; more input may follow
    Full,
    /// The reader is exhausted; this is the final (possibly partial) chunk
    Finished,
}

/// A step that reads, processes and writes items in fixed-size chunks.
///
/// Each chunk is read to capacity (or end of input), processed item by item,
/// written in a single writer call, then announced to the registered chunk
/// listeners. Any reader, processor or writer error fails the chunk and the
/// step; there is no skip or retry.
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    reader: &'a dyn ItemReader<I>,
    processor: &'a dyn ItemProcessor<I, O>,
    writer: &'a dyn ItemWriter<O>,
    listeners: Vec<&'a dyn ChunkListener>,
    chunk_size: usize,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        if let Err(error) = self.reader.open() {
            step_execution.status = StepStatus::ReadError;
            return Err(error);
        }

        if let Err(error) = self.writer.open() {
            step_execution.status = StepStatus::WriteError;
            Self::manage_error(self.reader.close());
            return Err(error);
        }

        let result = self.run_chunks(step_execution);

        Self::manage_error(self.reader.close());
        Self::manage_error(self.writer.close());

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        if result.is_ok() {
            step_execution.status = StepStatus::Success;
        }

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    /// Drives the chunk loop until the reader is exhausted or a chunk fails.
    fn run_chunks(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        loop {
            let (items, chunk_status) = match self.read_chunk(step_execution) {
                Ok(chunk) => chunk,
                Err(error) => {
                    step_execution.status = StepStatus::ReadError;
                    self.notify_chunk_error(step_execution);
                    return Err(error);
                }
            };

            // An empty tail is not a chunk: listeners are not notified and
            // nothing is written.
            if items.is_empty() {
                return Ok(());
            }

            for listener in &self.listeners {
                listener.before_chunk(step_execution);
            }

            let processed_items = match self.process_chunk(step_execution, &items) {
                Ok(processed_items) => processed_items,
                Err(error) => {
                    step_execution.status = StepStatus::ProcessorError;
                    self.notify_chunk_error(step_execution);
                    return Err(error);
                }
            };

            if let Err(error) = self.write_chunk(step_execution, &processed_items) {
                step_execution.status = StepStatus::WriteError;
                self.notify_chunk_error(step_execution);
                return Err(error);
            }

            for listener in &self.listeners {
                listener.after_chunk(step_execution);
            }

            if chunk_status == ChunkStatus::Finished {
                return Ok(());
            }
        }
    }

    /// Reads up to `chunk_size` items from the reader.
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut items = Vec::with_capacity(self.chunk_size);

        loop {
            match self.reader.read()? {
                Some(item) => {
                    items.push(item);
                    step_execution.read_count += 1;

                    if items.len() == self.chunk_size {
                        debug!("End reading chunk: full");
                        return Ok((items, ChunkStatus::Full));
                    }
                }
                None => {
                    debug!("End reading chunk: finished");
                    return Ok((items, ChunkStatus::Finished));
                }
            }
        }
    }

    /// Applies the processor to each item, dropping filtered ones.
    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", items.len());

        let mut processed_items = Vec::with_capacity(items.len());

        for item in items {
            match self.processor.process(item)? {
                Some(processed_item) => processed_items.push(processed_item),
                None => step_execution.filter_count += 1,
            }
        }

        Ok(processed_items)
    }

    /// Writes the processed items as one atomic chunk.
    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        if processed_items.is_empty() {
            debug!("No items to write, skipping write call");
            return Ok(());
        }

        debug!("Writing chunk of {} items", processed_items.len());

        self.writer.write(processed_items)?;
        self.writer.flush()?;
        step_execution.write_count += processed_items.len();

        Ok(())
    }

    fn notify_chunk_error(&self, step_execution: &StepExecution) {
        for listener in &self.listeners {
            listener.after_chunk_error(step_execution);
        }
    }

    /// Logs errors from operations that must not fail the step.
    fn manage_error(result: Result<(), BatchError>) {
        if let Err(error) = result {
            warn!("Non-fatal error: {}", error);
        }
    }
}

/// Builder for a [`ChunkOrientedStep`].
///
/// A reader and a writer are mandatory; when no processor is set, a
/// [`PassThroughProcessor`] is used. Listeners are invoked in registration
/// order.
pub struct StepBuilder<'a, I, O> {
    name: Option<String>,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    listeners: Vec<&'a dyn ChunkListener>,
    chunk_size: usize,
}

impl<'a, I, O> Default for StepBuilder<'a, I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, I, O> StepBuilder<'a, I, O> {
    pub fn new() -> Self {
        Self {
            name: None,
            reader: None,
            processor: None,
            writer: None,
            listeners: Vec::new(),
            chunk_size: 1,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn reader(mut self, reader: &'a dyn ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a dyn ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn listener(mut self, listener: &'a dyn ChunkListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Sets the commit interval: the number of items per chunk.
    pub fn chunk(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn build(self) -> ChunkOrientedStep<'a, I, O>
    where
        PassThroughProcessor: ItemProcessor<I, O>,
    {
        let default_processor = &PassThroughProcessor {};
        ChunkOrientedStep {
            name: self.name.unwrap_or_else(build_name),
            reader: self.reader.expect("Reader is required for building a step"),
            processor: self.processor.unwrap_or(default_processor),
            writer: self.writer.expect("Writer is required for building a step"),
            listeners: self.listeners,
            chunk_size: self.chunk_size,
        }
    }
}
