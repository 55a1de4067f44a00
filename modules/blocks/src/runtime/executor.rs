/// A unit of block processing work submitted to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction for schedulers to run block processing jobs.
///
/// A block never owns threads; it submits input- and output-processing jobs
/// here and maintains the at-most-one-active-job invariant itself, so an
/// executor is free to run jobs inline, on a pool, or on an async runtime.
pub trait BlockExecutor: Send + Sync {
  /// Delegates a processing job to the scheduler.
  fn execute(&self, job: Job);
}
