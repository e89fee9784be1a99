use log::info;

use super::step::StepExecution;

/// Observer of chunk completion boundaries.
///
/// Callbacks return `()` so a misbehaving listener can never abort the job.
/// All methods have empty default implementations; implementors override the
/// boundaries they care about.
pub trait ChunkListener {
    /// Invoked before a chunk starts reading.
    fn before_chunk(&self, _step_execution: &StepExecution) {}

    /// Invoked after a chunk has been written and committed.
    fn after_chunk(&self, _step_execution: &StepExecution) {}

    /// Invoked when a chunk fails in its read, process or write phase.
    fn after_chunk_error(&self, _step_execution: &StepExecution) {}
}

/// Listener that logs the cumulative read count after each chunk.
#[derive(Default)]
pub struct ItemCountListener {}

impl ChunkListener for ItemCountListener {
    fn after_chunk(&self, step_execution: &StepExecution) {
        info!("ItemCount: {}", step_execution.read_count);
    }
}
