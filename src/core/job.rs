use std::{
    cell::Cell,
    time::{Duration, Instant},
};

use log::{error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
type JobResult<T> = Result<T, BatchError>;

/// Lifecycle of a job run.
///
/// A run moves `NotStarted → Initializing → Running → Completed`, or ends in
/// `Failed` from either of the two active states. `Completed` and `Failed`
/// are terminal; there is no resume-from-failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    NotStarted,
    Initializing,
    Running,
    Completed,
    Failed,
}

/// One-time preparation executed before a job's first step.
///
/// Typical implementation: a schema initializer that runs a DDL script
/// against the destination store. A failure here is fatal and non-retryable;
/// no step runs afterwards.
pub trait JobInitializer {
    fn initialize(&self) -> Result<(), BatchError>;
}

/// Represents a job that can be executed.
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    fn run(&self) -> JobResult<JobExecution>;
}

/// Execution details of one job run.
#[derive(Debug)]
pub struct JobExecution {
    /// The run identifier of this invocation
    pub run_id: u64,
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// Execution details of every step, in execution order
    pub step_executions: Vec<StepExecution>,
}

/// A configured job: an optional initializer followed by a sequence of steps.
///
/// The run identifier increments on every invocation of [`Job::run`] so that
/// repeated runs of the same instance are distinguishable in the logs.
pub struct JobInstance<'a> {
    id: Uuid,
    name: String,
    initializer: Option<&'a dyn JobInitializer>,
    steps: Vec<&'a dyn Step>,
    run_id: Cell<u64>,
    status: Cell<JobStatus>,
}

impl JobInstance<'_> {
    pub fn get_status(&self) -> JobStatus {
        self.status.get()
    }

    pub fn get_run_id(&self) -> u64 {
        self.run_id.get()
    }
}

impl Job for JobInstance<'_> {
    /// Runs the initializer, then every step in order.
    ///
    /// The first failure moves the job to `Failed` and aborts the run; chunks
    /// committed by earlier, already-completed work remain persisted.
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        let run_id = self.run_id.get() + 1;
        self.run_id.set(run_id);

        info!(
            "Start of job: {}, id: {}, run id: {}",
            self.name, self.id, run_id
        );

        self.status.set(JobStatus::Initializing);

        if let Some(initializer) = self.initializer {
            if let Err(err) = initializer.initialize() {
                error!("Job initialization failed: {}", err);
                self.status.set(JobStatus::Failed);
                return Err(err);
            }
        }

        self.status.set(JobStatus::Running);

        let mut step_executions = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.name());
            let result = step.execute(&mut step_execution);
            step_executions.push(step_execution);

            if let Err(err) = result {
                error!("Step {} failed: {}", step.name(), err);
                self.status.set(JobStatus::Failed);
                return Err(BatchError::Step(format!("{}: {}", step.name(), err)));
            }
        }

        self.status.set(JobStatus::Completed);

        info!("End of job: {}, id: {}, run id: {}", self.name, self.id, run_id);

        Ok(JobExecution {
            run_id,
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            step_executions,
        })
    }
}

/// Builder for creating a job instance.
#[derive(Default)]
pub struct JobBuilder<'a> {
    name: Option<String>,
    initializer: Option<&'a dyn JobInitializer>,
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            initializer: None,
            steps: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> JobBuilder<'a> {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the initializer executed before the first step.
    pub fn initializer(mut self, initializer: &'a dyn JobInitializer) -> JobBuilder<'a> {
        self.initializer = Some(initializer);
        self
    }

    /// Sets the first step of the job.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a subsequent step; steps run in the order they were added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            initializer: self.initializer,
            steps: self.steps,
            run_id: Cell::new(0),
            status: Cell::new(JobStatus::NotStarted),
        }
    }
}
