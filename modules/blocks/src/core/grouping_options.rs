#[cfg(test)]
mod tests;

use std::{fmt, sync::Arc};

use super::{bound::Bound, cancellation_token::CancellationToken};
use crate::runtime::{BlockExecutor, PoolExecutor};

/// Options controlling a grouping block.
///
/// Options are copied at block construction; mutating the caller's instance
/// afterwards has no effect on the block.
#[derive(Clone)]
pub struct GroupingOptions {
  greedy:                bool,
  bounded_capacity:      Bound,
  max_number_of_groups:  Bound,
  max_messages_per_task: Bound,
  cancellation_token:    CancellationToken,
  name_format:           String,
  executor:              Arc<dyn BlockExecutor>,
}

impl GroupingOptions {
  /// Creates options with the documented defaults.
  #[must_use]
  pub fn new() -> Self {
    Self {
      greedy:                true,
      bounded_capacity:      Bound::Unbounded,
      max_number_of_groups:  Bound::Unbounded,
      max_messages_per_task: Bound::Unbounded,
      cancellation_token:    CancellationToken::new(),
      name_format:           "{0} Id={1}".to_string(),
      executor:              PoolExecutor::shared(),
    }
  }

  /// Sets the acquisition mode; greedy blocks accept messages as they
  /// arrive, non-greedy blocks postpone until a whole group can be taken
  /// atomically.
  #[must_use]
  pub fn with_greedy(mut self, greedy: bool) -> Self {
    self.greedy = greedy;
    self
  }

  /// Caps the number of assembled groups pending in the output queue.
  #[must_use]
  pub fn with_bounded_capacity(mut self, capacity: Bound) -> Self {
    self.bounded_capacity = capacity;
    self
  }

  /// Caps the total number of groups the block will ever emit.
  #[must_use]
  pub fn with_max_number_of_groups(mut self, limit: Bound) -> Self {
    self.max_number_of_groups = limit;
    self
  }

  /// Caps the work performed by one processing job before it re-yields to
  /// the executor.
  #[must_use]
  pub fn with_max_messages_per_task(mut self, limit: Bound) -> Self {
    self.max_messages_per_task = limit;
    self
  }

  /// Attaches an external cancellation source.
  #[must_use]
  pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
    self.cancellation_token = token;
    self
  }

  /// Sets the debugging name template (`{0}` = block kind, `{1}` = id).
  #[must_use]
  pub fn with_name_format(mut self, format: impl Into<String>) -> Self {
    self.name_format = format.into();
    self
  }

  /// Sets the executor that runs the block's processing jobs.
  #[must_use]
  pub fn with_executor(mut self, executor: Arc<dyn BlockExecutor>) -> Self {
    self.executor = executor;
    self
  }

  /// Returns the acquisition mode.
  #[must_use]
  pub const fn greedy(&self) -> bool {
    self.greedy
  }

  /// Returns the pending-group capacity.
  #[must_use]
  pub const fn bounded_capacity(&self) -> Bound {
    self.bounded_capacity
  }

  /// Returns the lifetime group cap.
  #[must_use]
  pub const fn max_number_of_groups(&self) -> Bound {
    self.max_number_of_groups
  }

  /// Returns the per-job work budget.
  #[must_use]
  pub const fn max_messages_per_task(&self) -> Bound {
    self.max_messages_per_task
  }

  /// Returns the cancellation token.
  #[must_use]
  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancellation_token.clone()
  }

  /// Returns the name template.
  #[must_use]
  pub fn name_format(&self) -> &str {
    &self.name_format
  }

  /// Returns the configured executor.
  #[must_use]
  pub fn executor(&self) -> Arc<dyn BlockExecutor> {
    self.executor.clone()
  }
}

impl Default for GroupingOptions {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for GroupingOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GroupingOptions")
      .field("greedy", &self.greedy)
      .field("bounded_capacity", &self.bounded_capacity)
      .field("max_number_of_groups", &self.max_number_of_groups)
      .field("max_messages_per_task", &self.max_messages_per_task)
      .field("name_format", &self.name_format)
      .finish_non_exhaustive()
  }
}
