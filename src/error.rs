use thiserror::Error;

/// Error type shared by every batch component.
///
/// The variants follow the failure taxonomy of the job: a `Resource` error
/// means an external dependency (input file, DDL script, database) could not
/// be acquired; a `Parse` error means an input line did not conform to the
/// expected record layout; a `Write` error means the store rejected a chunk.
/// All of them are chunk-fatal and job-fatal, there is no retry path.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("ResourceError: {0}")]
    Resource(String),

    #[error("ParseError: {0}")]
    Parse(String),

    #[error("WriteError: {0}")]
    Write(String),

    #[error("Step failed: {0}")]
    Step(String),
}
