use std::sync::Arc;

use super::{
  block_error::BlockError, message_header::MessageHeader, offer_decision::OfferDecision,
  source_producer::SourceProducer, target_id::TargetId,
};

/// Capability exposed by message consumers towards offering producers.
pub trait BlockTarget<T>: Send + Sync {
  /// Returns the identity used to match reservations taken by this target.
  fn target_id(&self) -> TargetId;

  /// Offers a message to the target.
  ///
  /// With `consume_to_accept` unset the payload must be supplied and
  /// acceptance takes it by value. With `consume_to_accept` set a producer
  /// must be supplied and the authoritative value is pulled through
  /// [`SourceProducer::consume_message`]; any eager payload is ignored. A
  /// target postpones only when a producer participates in the offer.
  ///
  /// # Errors
  ///
  /// Returns [`BlockError::InvalidMessageHeader`] for the reserved header
  /// value, [`BlockError::MissingProducer`] when `consume_to_accept` lacks a
  /// producer, and [`BlockError::MissingPayload`] when an eager offer lacks
  /// a payload.
  fn offer_message(
    &self,
    header: MessageHeader,
    payload: Option<T>,
    producer: Option<Arc<dyn SourceProducer<T>>>,
    consume_to_accept: bool,
  ) -> Result<OfferDecision, BlockError>;

  /// Signals that no further messages will be offered to this target.
  fn complete(&self);

  /// Reports an error and forces the owning block to decline further input.
  fn fault(&self, error: BlockError);
}
