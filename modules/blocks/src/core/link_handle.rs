use std::sync::Mutex;

type UnlinkFn = Box<dyn FnOnce() + Send>;

/// Handle for a registered source-to-target link.
///
/// Dropping the handle leaves the link in place; call
/// [`LinkHandle::unlink`] to remove it.
pub struct LinkHandle {
  unlink: Mutex<Option<UnlinkFn>>,
}

impl LinkHandle {
  pub(crate) fn new(unlink: UnlinkFn) -> Self {
    Self { unlink: Mutex::new(Some(unlink)) }
  }

  /// Returns a handle for a link that no longer exists.
  pub(crate) fn inert() -> Self {
    Self { unlink: Mutex::new(None) }
  }

  /// Removes the link. Subsequent calls are no-ops.
  pub fn unlink(&self) {
    let unlink = {
      let mut guard = match self.unlink.lock() {
        | Ok(guard) => guard,
        | Err(poisoned) => poisoned.into_inner(),
      };
      guard.take()
    };
    if let Some(unlink) = unlink {
      unlink();
    }
  }
}

impl std::fmt::Debug for LinkHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let linked = match self.unlink.lock() {
      | Ok(guard) => guard.is_some(),
      | Err(poisoned) => poisoned.into_inner().is_some(),
    };
    f.debug_struct("LinkHandle").field("linked", &linked).finish()
  }
}
