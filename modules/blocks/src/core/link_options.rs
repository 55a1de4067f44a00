use std::sync::Arc;

use super::bound::Bound;

/// Filter predicate applied to items offered through a link.
pub type LinkFilter<U> = Arc<dyn Fn(&U) -> bool + Send + Sync>;

/// Options controlling one source-to-target link.
#[derive(Clone)]
pub struct LinkOptions<U> {
  propagate_completion: bool,
  max_messages:         Bound,
  filter:               Option<LinkFilter<U>>,
}

impl<U> LinkOptions<U> {
  /// Creates options with defaults: no completion propagation, no message
  /// cap, no filter.
  #[must_use]
  pub fn new() -> Self {
    Self { propagate_completion: false, max_messages: Bound::Unbounded, filter: None }
  }

  /// Propagates the source's completion or fault to the linked target.
  #[must_use]
  pub fn with_propagate_completion(mut self, propagate: bool) -> Self {
    self.propagate_completion = propagate;
    self
  }

  /// Unlinks automatically after the given number of accepted messages.
  #[must_use]
  pub fn with_max_messages(mut self, limit: Bound) -> Self {
    self.max_messages = limit;
    self
  }

  /// Offers only items matching the predicate through this link.
  #[must_use]
  pub fn with_filter(mut self, filter: impl Fn(&U) -> bool + Send + Sync + 'static) -> Self {
    self.filter = Some(Arc::new(filter));
    self
  }

  /// Returns whether completion propagates through this link.
  #[must_use]
  pub const fn propagate_completion(&self) -> bool {
    self.propagate_completion
  }

  /// Returns the per-link message cap.
  #[must_use]
  pub const fn max_messages(&self) -> Bound {
    self.max_messages
  }

  /// Returns the configured filter, if any.
  #[must_use]
  pub fn filter(&self) -> Option<LinkFilter<U>> {
    self.filter.clone()
  }
}

impl<U> Default for LinkOptions<U> {
  fn default() -> Self {
    Self::new()
  }
}
