
use thiserror::Error;

/// Errors surfaced by grouping blocks.
///
/// Argument errors are returned synchronously from the offending call;
/// runtime errors raised inside processing jobs are buffered and surface
/// through the block's completion as [`super::BlockOutcome::Faulted`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
  /// A block needs at least one target.
  #[error("target count must be at least 1, got {count}")]
  InvalidTargetCount {
    /// Requested target count.
    count: usize,
  },
  /// A batched block needs a positive batch size.
  #[error("batch size must be at least 1, got {size}")]
  InvalidBatchSize {
    /// Requested batch size.
    size: usize,
  },
  /// A finite capacity must be positive.
  #[error("bounded capacity must be positive when finite, got {value}")]
  InvalidCapacity {
    /// Requested capacity.
    value: usize,
  },
  /// A finite group or message limit must be positive.
  #[error("limit must be positive when finite, got {value}")]
  InvalidLimit {
    /// Requested limit.
    value: usize,
  },
  /// The option is not supported by the constructed block kind.
  #[error("option {option} is not supported by this block")]
  UnsupportedOption {
    /// Name of the offending option.
    option: &'static str,
  },
  /// An offer carried the reserved "no header" value.
  #[error("message header {id} is not valid")]
  InvalidMessageHeader {
    /// Offending header id.
    id: u64,
  },
  /// `consume_to_accept` was requested without a producer to consume from.
  #[error("a producer is required when consume_to_accept is requested")]
  MissingProducer,
  /// An eager offer carried no payload.
  #[error("a payload is required when consume_to_accept is not requested")]
  MissingPayload,
  /// A reserved message could not be consumed; the producer broke its
  /// reservation guarantee.
  #[error("reserved message {id} could not be consumed")]
  ReservationLost {
    /// Header of the lost message.
    id: u64,
  },
  /// A release did not match the outstanding reservation.
  #[error("no matching reservation for message {id}")]
  ReservationMismatch {
    /// Header of the mismatched release.
    id: u64,
  },
  /// A producer call failed.
  #[error("producer failed: {reason}")]
  Producer {
    /// Producer-supplied failure description.
    reason: String,
  },
  /// The block was cancelled through its construction token.
  #[error("block was cancelled")]
  Cancelled,
  /// The operation is not supported on this surface.
  #[error("operation {operation} is not supported")]
  NotSupported {
    /// Name of the unsupported operation.
    operation: &'static str,
  },
  /// An error injected from outside the block, e.g. through `fault`.
  #[error("{reason}")]
  External {
    /// Caller-supplied description.
    reason: String,
  },
  /// Several buffered errors propagated together.
  #[error("aggregate failure of {} errors", .errors.len())]
  Aggregate {
    /// The flattened error set.
    errors: Vec<BlockError>,
  },
}

impl BlockError {
  /// Creates an [`BlockError::External`] error from a description.
  #[must_use]
  pub fn external(reason: impl Into<String>) -> Self {
    Self::External { reason: reason.into() }
  }

  /// Wraps a buffered error set, unwrapping singleton sets.
  #[must_use]
  pub fn aggregate(mut errors: Vec<BlockError>) -> Self {
    if errors.len() == 1 {
      errors.remove(0)
    } else {
      Self::Aggregate { errors }
    }
  }
}
