use std::{
  fmt,
  sync::atomic::{AtomicU64, Ordering},
};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a target endpoint.
///
/// Used by the reserve/consume/release protocol to match a reservation with
/// the requester that took it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId {
  value: u64,
}

impl TargetId {
  /// Allocates a fresh identity.
  #[must_use]
  pub fn next() -> Self {
    Self { value: NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed) }
  }

  /// Returns the raw id value.
  #[must_use]
  pub const fn value(&self) -> u64 {
    self.value
  }
}

impl fmt::Display for TargetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "t{}", self.value)
  }
}
