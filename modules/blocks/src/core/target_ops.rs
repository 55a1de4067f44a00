use std::sync::Arc;

use super::{
  block_error::BlockError, completion_task::CompletionTask, message_header::MessageHeader,
  offer_decision::OfferDecision, source_producer::SourceProducer, target_id::TargetId,
};

/// Coordinator surface used by target endpoints.
///
/// Erases the block's output type so a target handle only carries its
/// element type.
pub(crate) trait TargetOps<T>: Send + Sync {
  /// Runs the offer contract for the indexed target.
  fn offer(
    &self,
    index: usize,
    header: MessageHeader,
    payload: Option<T>,
    producer: Option<Arc<dyn SourceProducer<T>>>,
    consume_to_accept: bool,
  ) -> Result<OfferDecision, BlockError>;

  /// Marks the indexed target as declining further input.
  fn complete_target(&self, index: usize);

  /// Buffers an error and forces the whole block to decline.
  fn fault_block(&self, error: BlockError);

  /// Generates the next offer header for the indexed target.
  fn next_header(&self, index: usize) -> MessageHeader;

  /// Returns the reservation identity of the indexed target.
  fn target_key(&self, index: usize) -> TargetId;

  /// Returns the block's completion task.
  fn completion_task(&self) -> CompletionTask;
}
