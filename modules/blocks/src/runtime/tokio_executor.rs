#[cfg(test)]
mod tests;

use tokio::runtime::{Handle, TryCurrentError};

use super::executor::{BlockExecutor, Job};

/// Executor that submits block jobs to a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
  handle: Handle,
}

impl TokioExecutor {
  /// Creates an executor from the provided Tokio [`Handle`].
  #[must_use]
  pub const fn from_handle(handle: Handle) -> Self {
    Self { handle }
  }

  /// Attempts to create an executor from the current Tokio runtime.
  ///
  /// # Errors
  ///
  /// Returns [`TryCurrentError`] when invoked outside of a running Tokio
  /// runtime.
  pub fn try_current() -> Result<Self, TryCurrentError> {
    Handle::try_current().map(Self::from_handle)
  }

  /// Returns the underlying runtime handle.
  #[must_use]
  pub const fn handle(&self) -> &Handle {
    &self.handle
  }
}

impl BlockExecutor for TokioExecutor {
  fn execute(&self, job: Job) {
    self.handle.spawn(async move {
      job();
    });
  }
}
