#[cfg(test)]
mod tests;

use std::{
  sync::{Arc, Condvar, Mutex, MutexGuard},
  task::Waker,
  time::Duration,
};

use super::{block_outcome::BlockOutcome, completion_future::CompletionFuture};

type ResolvedCallback = Box<dyn FnOnce(&BlockOutcome) + Send>;

pub(crate) struct CompletionInner {
  state: Mutex<CompletionState>,
  ready: Condvar,
}

struct CompletionState {
  outcome:   Option<BlockOutcome>,
  wakers:    Vec<Waker>,
  callbacks: Vec<ResolvedCallback>,
}

impl CompletionInner {
  fn lock(&self) -> MutexGuard<'_, CompletionState> {
    match self.state.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }

  pub(crate) fn try_outcome(&self) -> Option<BlockOutcome> {
    self.lock().outcome.clone()
  }

  pub(crate) fn register_waker(&self, waker: &Waker) {
    let mut guard = self.lock();
    if guard.outcome.is_some() {
      return;
    }
    if !guard.wakers.iter().any(|known| known.will_wake(waker)) {
      guard.wakers.push(waker.clone());
    }
  }
}

/// Single-shot terminal state of a block.
///
/// Every clone observes the same resolution; the first resolution wins.
/// Supports non-blocking polling, blocking waits and `async` awaiting
/// through [`CompletionTask::completed`].
#[derive(Clone)]
pub struct CompletionTask {
  inner: Arc<CompletionInner>,
}

impl CompletionTask {
  pub(crate) fn new() -> Self {
    Self {
      inner: Arc::new(CompletionInner {
        state: Mutex::new(CompletionState { outcome: None, wakers: Vec::new(), callbacks: Vec::new() }),
        ready: Condvar::new(),
      }),
    }
  }

  /// Resolves the task; returns false when it was already resolved.
  pub(crate) fn resolve(&self, outcome: BlockOutcome) -> bool {
    let (wakers, callbacks) = {
      let mut guard = self.inner.lock();
      if guard.outcome.is_some() {
        return false;
      }
      guard.outcome = Some(outcome.clone());
      self.inner.ready.notify_all();
      (std::mem::take(&mut guard.wakers), std::mem::take(&mut guard.callbacks))
    };
    for waker in wakers {
      waker.wake();
    }
    for callback in callbacks {
      callback(&outcome);
    }
    true
  }

  /// Registers a callback invoked on resolution; runs immediately when the
  /// task is already resolved.
  pub(crate) fn on_resolved(&self, callback: impl FnOnce(&BlockOutcome) + Send + 'static) {
    let resolved = {
      let mut guard = self.inner.lock();
      match &guard.outcome {
        | Some(outcome) => outcome.clone(),
        | None => {
          guard.callbacks.push(Box::new(callback));
          return;
        },
      }
    };
    callback(&resolved);
  }

  /// Returns the outcome when the task has resolved.
  #[must_use]
  pub fn try_outcome(&self) -> Option<BlockOutcome> {
    self.inner.try_outcome()
  }

  /// Returns true once the task has resolved.
  #[must_use]
  pub fn is_resolved(&self) -> bool {
    self.try_outcome().is_some()
  }

  /// Blocks the calling thread until the task resolves.
  #[must_use]
  pub fn wait(&self) -> BlockOutcome {
    let mut guard = self.inner.lock();
    loop {
      if let Some(outcome) = &guard.outcome {
        return outcome.clone();
      }
      guard = match self.inner.ready.wait(guard) {
        | Ok(next) => next,
        | Err(poisoned) => poisoned.into_inner(),
      };
    }
  }

  /// Blocks until the task resolves or the timeout elapses.
  #[must_use]
  pub fn wait_timeout(&self, timeout: Duration) -> Option<BlockOutcome> {
    let guard = self.inner.lock();
    let (guard, _) = match self.inner.ready.wait_timeout_while(guard, timeout, |state| state.outcome.is_none()) {
      | Ok(result) => result,
      | Err(poisoned) => poisoned.into_inner(),
    };
    guard.outcome.clone()
  }

  /// Returns a future resolving with the block outcome.
  #[must_use]
  pub fn completed(&self) -> CompletionFuture {
    CompletionFuture::new(self.inner.clone())
  }
}

impl std::fmt::Debug for CompletionTask {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CompletionTask").field("outcome", &self.try_outcome()).finish()
  }
}
