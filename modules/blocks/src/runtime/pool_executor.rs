
use std::{
  panic::{AssertUnwindSafe, catch_unwind},
  sync::{Arc, OnceLock},
  thread,
};

use crossbeam_channel::{Sender, unbounded};

use super::executor::{BlockExecutor, Job};

const MAX_WORKERS: usize = 8;

static SHARED: OnceLock<Arc<PoolExecutor>> = OnceLock::new();

/// Worker-pool executor backed by detached OS threads.
///
/// The process-wide instance returned by [`PoolExecutor::shared`] is the
/// default executor for blocks constructed without an explicit one.
pub struct PoolExecutor {
  sender: Sender<Job>,
}

impl PoolExecutor {
  /// Creates a pool with the requested number of worker threads (at least one).
  #[must_use]
  pub fn new(workers: usize) -> Self {
    let (sender, receiver) = unbounded::<Job>();
    for index in 0..workers.max(1) {
      let receiver = receiver.clone();
      thread::Builder::new()
        .name(format!("joinery-pool-{index}"))
        .spawn(move || {
          while let Ok(job) = receiver.recv() {
            // a panicking job must not take the worker down with it
            let _ = catch_unwind(AssertUnwindSafe(job));
          }
        })
        .ok();
    }
    Self { sender }
  }

  /// Returns the process-wide shared pool.
  pub fn shared() -> Arc<Self> {
    SHARED
      .get_or_init(|| {
        let workers = thread::available_parallelism().map_or(2, |n| n.get()).min(MAX_WORKERS);
        Arc::new(Self::new(workers))
      })
      .clone()
  }
}

impl BlockExecutor for PoolExecutor {
  fn execute(&self, job: Job) {
    let _ = self.sender.send(job);
  }
}
