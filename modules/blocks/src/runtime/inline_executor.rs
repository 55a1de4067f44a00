
use super::executor::{BlockExecutor, Job};

/// Simple executor that runs jobs immediately on the calling thread.
///
/// Useful for deterministic single-block tests. Jobs of linked block graphs
/// can nest arbitrarily deep on the calling stack; topologies that consume
/// through postponed offers should prefer [`super::TickExecutor`] or a
/// pooled executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl InlineExecutor {
  /// Returns an executor that runs jobs on the calling thread.
  #[must_use]
  pub const fn new() -> Self {
    Self
  }
}

impl BlockExecutor for InlineExecutor {
  fn execute(&self, job: Job) {
    job();
  }
}
