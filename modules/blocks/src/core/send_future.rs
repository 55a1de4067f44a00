use std::{
  future::Future,
  pin::Pin,
  sync::Arc,
  task::{Context, Poll},
  time::Duration,
};

use super::send_async_source::SendAsyncSource;

/// Future returned by `send_async`, resolving to whether the block accepted
/// the value.
pub struct SendFuture<T> {
  source: Arc<SendAsyncSource<T>>,
}

impl<T: Send + 'static> SendFuture<T> {
  pub(crate) fn new(source: Arc<SendAsyncSource<T>>) -> Self {
    Self { source }
  }

  /// Returns the result when the send has settled.
  #[must_use]
  pub fn try_result(&self) -> Option<bool> {
    self.source.try_result()
  }

  /// Blocks until the send settles or the timeout elapses.
  #[must_use]
  pub fn wait_timeout(&self, timeout: Duration) -> Option<bool> {
    self.source.wait_timeout(timeout)
  }
}

impl<T: Send + 'static> Future for SendFuture<T> {
  type Output = bool;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    if let Some(result) = self.source.try_result() {
      return Poll::Ready(result);
    }
    self.source.register_waker(cx.waker());
    // a settlement may have raced the registration
    match self.source.try_result() {
      | Some(result) => Poll::Ready(result),
      | None => Poll::Pending,
    }
  }
}

impl<T: Send + 'static> Unpin for SendFuture<T> {}
