use super::block_error::BlockError;

/// Terminal state of a block, observed through its completion task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
  /// The block completed after draining all accepted input.
  Completed,
  /// The construction token fired before the block faulted.
  Cancelled,
  /// The block faulted; carries the flat set of buffered errors.
  Faulted(Vec<BlockError>),
}

impl BlockOutcome {
  /// Returns true for [`BlockOutcome::Completed`].
  #[must_use]
  pub const fn is_completed(&self) -> bool {
    matches!(self, Self::Completed)
  }

  /// Returns true for [`BlockOutcome::Cancelled`].
  #[must_use]
  pub const fn is_cancelled(&self) -> bool {
    matches!(self, Self::Cancelled)
  }

  /// Returns true for [`BlockOutcome::Faulted`].
  #[must_use]
  pub const fn is_faulted(&self) -> bool {
    matches!(self, Self::Faulted(_))
  }

  /// Returns the buffered errors of a faulted outcome.
  #[must_use]
  pub fn errors(&self) -> &[BlockError] {
    match self {
      | Self::Faulted(errors) => errors,
      | _ => &[],
    }
  }
}
