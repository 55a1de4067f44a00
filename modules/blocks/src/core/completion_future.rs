use std::{
  future::Future,
  pin::Pin,
  sync::Arc,
  task::{Context, Poll},
};

use super::{block_outcome::BlockOutcome, completion_task::CompletionInner};

/// Future adapter resolving with a block's [`BlockOutcome`].
///
/// Obtained through [`super::CompletionTask::completed`]; any number of
/// futures may await the same completion.
pub struct CompletionFuture {
  inner: Arc<CompletionInner>,
}

impl CompletionFuture {
  pub(crate) fn new(inner: Arc<CompletionInner>) -> Self {
    Self { inner }
  }
}

impl Future for CompletionFuture {
  type Output = BlockOutcome;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    if let Some(outcome) = self.inner.try_outcome() {
      return Poll::Ready(outcome);
    }
    self.inner.register_waker(cx.waker());
    // a resolution may have raced the registration
    match self.inner.try_outcome() {
      | Some(outcome) => Poll::Ready(outcome),
      | None => Poll::Pending,
    }
  }
}

impl Unpin for CompletionFuture {}
