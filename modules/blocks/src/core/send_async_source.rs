
use std::{
  sync::{Arc, Condvar, Mutex, MutexGuard, Weak},
  task::Waker,
  time::Duration,
};

use super::{
  block_error::BlockError, message_header::MessageHeader, offer_decision::OfferDecision,
  source_producer::SourceProducer, target_id::TargetId, target_ops::TargetOps,
};

struct SendSlot<T> {
  value:    Option<T>,
  reserved: Option<TargetId>,
  result:   Option<bool>,
  wakers:   Vec<Waker>,
}

/// Single-message producer backing `send_async`.
///
/// Offers one value to one target through the postponement protocol and
/// settles with `true` when the target consumes it, `false` when the offer is
/// declined, the value is dropped, or the block completes without consuming.
pub(crate) struct SendAsyncSource<T> {
  header:    MessageHeader,
  index:     usize,
  target:    Weak<dyn TargetOps<T>>,
  slot:      Mutex<SendSlot<T>>,
  settled:   Condvar,
  weak_self: Weak<SendAsyncSource<T>>,
}

impl<T: Send + 'static> SendAsyncSource<T> {
  pub(crate) fn create(header: MessageHeader, value: T, index: usize, target: Weak<dyn TargetOps<T>>) -> Arc<Self> {
    Arc::new_cyclic(|weak_self| Self {
      header,
      index,
      target,
      slot: Mutex::new(SendSlot { value: Some(value), reserved: None, result: None, wakers: Vec::new() }),
      settled: Condvar::new(),
      weak_self: weak_self.clone(),
    })
  }

  fn lock(&self) -> MutexGuard<'_, SendSlot<T>> {
    match self.slot.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }

  /// Settles the send result; later settlements are ignored.
  pub(crate) fn resolve(&self, accepted: bool) {
    let wakers = {
      let mut guard = self.lock();
      if guard.result.is_some() {
        return;
      }
      guard.result = Some(accepted);
      if !accepted {
        guard.value = None;
        guard.reserved = None;
      }
      self.settled.notify_all();
      std::mem::take(&mut guard.wakers)
    };
    for waker in wakers {
      waker.wake();
    }
  }

  pub(crate) fn try_result(&self) -> Option<bool> {
    self.lock().result
  }

  pub(crate) fn register_waker(&self, waker: &Waker) {
    let mut guard = self.lock();
    if guard.result.is_some() {
      return;
    }
    if !guard.wakers.iter().any(|known| known.will_wake(waker)) {
      guard.wakers.push(waker.clone());
    }
  }

  pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<bool> {
    let guard = self.lock();
    let (guard, _) = match self.settled.wait_timeout_while(guard, timeout, |slot| slot.result.is_none()) {
      | Ok(result) => result,
      | Err(poisoned) => poisoned.into_inner(),
    };
    guard.result
  }
}

impl<T: Send + 'static> SourceProducer<T> for SendAsyncSource<T> {
  fn reserve_message(&self, header: MessageHeader, requester: TargetId) -> Result<bool, BlockError> {
    let mut guard = self.lock();
    if header != self.header || guard.value.is_none() {
      return Ok(false);
    }
    match guard.reserved {
      | None => {
        guard.reserved = Some(requester);
        Ok(true)
      },
      | Some(holder) => Ok(holder == requester),
    }
  }

  fn consume_message(&self, header: MessageHeader, requester: TargetId) -> Result<Option<T>, BlockError> {
    let value = {
      let mut guard = self.lock();
      if header != self.header {
        return Ok(None);
      }
      if guard.reserved.is_some_and(|holder| holder != requester) {
        return Ok(None);
      }
      guard.reserved = None;
      guard.value.take()
    };
    if value.is_some() {
      self.resolve(true);
    }
    Ok(value)
  }

  fn release_reservation(&self, header: MessageHeader, requester: TargetId) -> Result<(), BlockError> {
    {
      let mut guard = self.lock();
      if header != self.header || guard.reserved != Some(requester) {
        return Err(BlockError::ReservationMismatch { id: header.id() });
      }
      guard.reserved = None;
    }
    // re-offer so the target records the postponement again; without a live
    // target the value can never be consumed
    let offered = self.target.upgrade().and_then(|ops| {
      let producer: Arc<dyn SourceProducer<T>> = self.weak_self.upgrade()?;
      ops.offer(self.index, self.header, None, Some(producer), true).ok()
    });
    match offered {
      | Some(OfferDecision::Accepted | OfferDecision::Postponed) => {},
      | _ => self.resolve(false),
    }
    Ok(())
  }
}
