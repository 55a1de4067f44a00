
use std::sync::{Arc, Mutex};

type CancelCallback = Box<dyn FnOnce() + Send>;

struct TokenState {
  cancelled: bool,
  callbacks: Vec<CancelCallback>,
}

/// Cooperative cancellation switch shared across block surfaces.
///
/// Clones share state: cancelling any clone cancels them all. Callbacks
/// registered through [`CancellationToken::on_cancel`] run exactly once, on
/// the cancelling thread; registering against an already-cancelled token runs
/// the callback immediately.
#[derive(Clone)]
pub struct CancellationToken {
  state: Arc<Mutex<TokenState>>,
}

impl CancellationToken {
  /// Creates a token in the not-cancelled state.
  #[must_use]
  pub fn new() -> Self {
    Self { state: Arc::new(Mutex::new(TokenState { cancelled: false, callbacks: Vec::new() })) }
  }

  /// Requests cancellation. Subsequent calls are no-ops.
  pub fn cancel(&self) {
    let callbacks = {
      let mut guard = match self.state.lock() {
        | Ok(guard) => guard,
        | Err(poisoned) => poisoned.into_inner(),
      };
      if guard.cancelled {
        return;
      }
      guard.cancelled = true;
      std::mem::take(&mut guard.callbacks)
    };
    for callback in callbacks {
      callback();
    }
  }

  /// Returns true once cancellation has been requested.
  #[must_use]
  pub fn is_cancelled(&self) -> bool {
    let guard = match self.state.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    };
    guard.cancelled
  }

  /// Registers a callback invoked when the token is cancelled.
  pub fn on_cancel(&self, callback: impl FnOnce() + Send + 'static) {
    {
      let mut guard = match self.state.lock() {
        | Ok(guard) => guard,
        | Err(poisoned) => poisoned.into_inner(),
      };
      if !guard.cancelled {
        guard.callbacks.push(Box::new(callback));
        return;
      }
    }
    callback();
  }
}

impl Default for CancellationToken {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for CancellationToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CancellationToken").field("cancelled", &self.is_cancelled()).finish()
  }
}
