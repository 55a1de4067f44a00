/// Outcome of offering a message to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferDecision {
  /// The target took ownership of the message.
  Accepted,
  /// The target declined and will not consume the message later.
  Declined,
  /// The target recorded the offer and may consume it later through the
  /// producer protocol.
  Postponed,
  /// The message was no longer available from its producer.
  NotAvailable,
}

impl OfferDecision {
  /// Returns true for [`OfferDecision::Accepted`].
  #[must_use]
  pub const fn is_accepted(&self) -> bool {
    matches!(self, Self::Accepted)
  }
}
