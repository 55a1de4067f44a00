use super::{block_error::BlockError, message_header::MessageHeader, target_id::TargetId};

/// Capability exposed by upstream producers towards consuming targets.
///
/// The three-step protocol transfers message ownership without copying:
/// `reserve_message` pins a message for the requester, `consume_message`
/// takes it, and `release_reservation` returns a pinned message to the
/// producer. Implementations must be non-blocking; blocking producers should
/// buffer internally.
pub trait SourceProducer<T>: Send + Sync {
  /// Reserves the message identified by `header` for `requester`.
  ///
  /// On `Ok(true)` the producer guarantees the message stays available until
  /// it is consumed or released by the same requester.
  ///
  /// # Errors
  ///
  /// Returns [`BlockError`] when the producer fails; the caller treats this
  /// as a fault condition.
  fn reserve_message(&self, header: MessageHeader, requester: TargetId) -> Result<bool, BlockError>;

  /// Consumes the message identified by `header`, transferring ownership.
  ///
  /// `Ok(None)` means the message was not transferred (already gone, or
  /// reserved for a different requester).
  ///
  /// # Errors
  ///
  /// Returns [`BlockError`] when the producer fails; the caller treats this
  /// as a fault condition.
  fn consume_message(&self, header: MessageHeader, requester: TargetId) -> Result<Option<T>, BlockError>;

  /// Releases a reservation previously taken by `requester`.
  ///
  /// # Errors
  ///
  /// Returns [`BlockError::ReservationMismatch`] when no matching
  /// reservation is outstanding.
  fn release_reservation(&self, header: MessageHeader, requester: TargetId) -> Result<(), BlockError>;
}
