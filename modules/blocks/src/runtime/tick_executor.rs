
use std::{collections::VecDeque, sync::Mutex};

use super::executor::{BlockExecutor, Job};

/// Executor that queues jobs until `tick` is invoked.
///
/// The deterministic test executor: nothing runs until the test calls
/// [`TickExecutor::tick`], and jobs submitted while ticking are drained in
/// the same call.
#[derive(Default)]
pub struct TickExecutor {
  queue: Mutex<VecDeque<Job>>,
}

impl TickExecutor {
  /// Creates an empty tick-driven executor.
  #[must_use]
  pub fn new() -> Self {
    Self { queue: Mutex::new(VecDeque::new()) }
  }

  /// Drains all pending jobs, including jobs enqueued while draining.
  pub fn tick(&self) {
    loop {
      let job = {
        let mut queue = match self.queue.lock() {
          | Ok(guard) => guard,
          | Err(poisoned) => poisoned.into_inner(),
        };
        queue.pop_front()
      };
      match job {
        | Some(job) => job(),
        | None => break,
      }
    }
  }

  /// Returns the number of queued jobs (testing helper).
  #[must_use]
  pub fn pending_jobs(&self) -> usize {
    let queue = match self.queue.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    };
    queue.len()
  }
}

impl BlockExecutor for TickExecutor {
  fn execute(&self, job: Job) {
    let mut queue = match self.queue.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    };
    queue.push_back(job);
  }
}
