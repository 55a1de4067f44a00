#[cfg(test)]
mod tests;

use std::sync::Arc;

use super::{
  block_error::BlockError, block_target::BlockTarget, completion_task::CompletionTask,
  message_header::MessageHeader, offer_decision::OfferDecision, send_async_source::SendAsyncSource,
  send_future::SendFuture, source_producer::SourceProducer, target_id::TargetId, target_ops::TargetOps,
};

/// One input port of a grouping block.
///
/// A cheap handle; clones address the same underlying target. Producers talk
/// to it through the [`BlockTarget`] contract, applications through
/// [`TargetEndpoint::post`] and [`TargetEndpoint::send_async`].
pub struct TargetEndpoint<T> {
  index: usize,
  id:    TargetId,
  ops:   Arc<dyn TargetOps<T>>,
}

impl<T: Send + 'static> TargetEndpoint<T> {
  pub(crate) fn new(index: usize, ops: Arc<dyn TargetOps<T>>) -> Self {
    let id = ops.target_key(index);
    Self { index, id, ops }
  }

  /// Returns this target's 0-based position within its block.
  #[must_use]
  pub const fn index(&self) -> usize {
    self.index
  }

  /// Offers a value synchronously; true when the block accepted it.
  pub fn post(&self, value: T) -> bool {
    let header = self.ops.next_header(self.index);
    matches!(self.ops.offer(self.index, header, Some(value), None, false), Ok(OfferDecision::Accepted))
  }

  /// Offers a value through the postponement protocol; the returned future
  /// settles once the block has consumed or refused it.
  pub fn send_async(&self, value: T) -> SendFuture<T> {
    let header = self.ops.next_header(self.index);
    let source = SendAsyncSource::create(header, value, self.index, Arc::downgrade(&self.ops));

    // a block that never consumes still settles the send at completion
    let settle = source.clone();
    self.ops.completion_task().on_resolved(move |_| settle.resolve(false));

    let producer: Arc<dyn SourceProducer<T>> = source.clone();
    match self.ops.offer(self.index, header, None, Some(producer), true) {
      | Ok(OfferDecision::Accepted | OfferDecision::Postponed) => {},
      | Ok(_) | Err(_) => source.resolve(false),
    }
    SendFuture::new(source)
  }

  /// Per-target completion is not observable on grouping blocks.
  ///
  /// # Errors
  ///
  /// Always returns [`BlockError::NotSupported`]; await the owning block's
  /// completion instead.
  pub fn completion(&self) -> Result<CompletionTask, BlockError> {
    Err(BlockError::NotSupported { operation: "per-target completion" })
  }
}

impl<T> Clone for TargetEndpoint<T> {
  fn clone(&self) -> Self {
    Self { index: self.index, id: self.id, ops: self.ops.clone() }
  }
}

impl<T: Send + 'static> BlockTarget<T> for TargetEndpoint<T> {
  fn target_id(&self) -> TargetId {
    self.id
  }

  fn offer_message(
    &self,
    header: MessageHeader,
    payload: Option<T>,
    producer: Option<Arc<dyn SourceProducer<T>>>,
    consume_to_accept: bool,
  ) -> Result<OfferDecision, BlockError> {
    self.ops.offer(self.index, header, payload, producer, consume_to_accept)
  }

  fn complete(&self) {
    self.ops.complete_target(self.index);
  }

  fn fault(&self, error: BlockError) {
    self.ops.fault_block(error);
  }
}

impl<T> std::fmt::Debug for TargetEndpoint<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TargetEndpoint").field("index", &self.index).field("id", &self.id).finish()
  }
}
