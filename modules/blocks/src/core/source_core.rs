
use std::{
  collections::VecDeque,
  sync::{Arc, Mutex, MutexGuard, Weak},
};

use super::{
  block_error::BlockError,
  block_outcome::BlockOutcome,
  block_target::BlockTarget,
  bound::Bound,
  completion_task::CompletionTask,
  link_handle::LinkHandle,
  link_options::{LinkFilter, LinkOptions},
  message_header::MessageHeader,
  offer_decision::OfferDecision,
  pump_cell::PumpCell,
  source_producer::SourceProducer,
  target_id::TargetId,
};
use crate::runtime::BlockExecutor;

type ItemsRemovedCallback = Arc<dyn Fn() + Send + Sync>;

struct LinkEntry<U> {
  id:                   u64,
  target:               Arc<dyn BlockTarget<U>>,
  propagate_completion: bool,
  remaining:            Option<usize>,
  filter:               Option<LinkFilter<U>>,
}

struct SourceState<U> {
  queue:           VecDeque<(MessageHeader, U)>,
  links:           Vec<LinkEntry<U>>,
  reservation:     Option<(MessageHeader, TargetId)>,
  completing:      bool,
  pending_outcome: Option<BlockOutcome>,
  done:            bool,
  // bumped on every observable change so an idling pump can tell a stuck
  // head apart from fresh work
  epoch:           u64,
  next_header_id:  u64,
  next_link_id:    u64,
}

/// Links and outcome captured while finishing, notified outside the lock.
struct FinishNotice<U> {
  outcome:   BlockOutcome,
  propagate: Vec<Arc<dyn BlockTarget<U>>>,
}

enum PumpRound<U> {
  Offer {
    header:     MessageHeader,
    candidates: Vec<(u64, Arc<dyn BlockTarget<U>>)>,
    epoch:      u64,
  },
  Finish(FinishNotice<U>),
  Idle(u64),
}

/// Output half of a grouping block.
///
/// Owns the queue of emitted groups, the downstream link registry and the
/// single outstanding reservation, and runs the output-processing job that
/// offers queue heads to linked targets in insertion order.
pub(crate) struct SourceCore<U> {
  state:         Mutex<SourceState<U>>,
  pump:          PumpCell,
  executor:      Arc<dyn BlockExecutor>,
  completion:    CompletionTask,
  max_per_task:  Bound,
  items_removed: Mutex<Option<ItemsRemovedCallback>>,
  weak_self:     Weak<SourceCore<U>>,
}

impl<U: Send + 'static> SourceCore<U> {
  pub(crate) fn new(executor: Arc<dyn BlockExecutor>, completion: CompletionTask, max_per_task: Bound) -> Arc<Self> {
    Arc::new_cyclic(|weak_self| Self {
      state: Mutex::new(SourceState {
        queue:           VecDeque::new(),
        links:           Vec::new(),
        reservation:     None,
        completing:      false,
        pending_outcome: None,
        done:            false,
        epoch:           0,
        next_header_id:  1,
        next_link_id:    1,
      }),
      pump: PumpCell::new(),
      executor,
      completion,
      max_per_task,
      items_removed: Mutex::new(None),
      weak_self: weak_self.clone(),
    })
  }

  fn lock(&self) -> MutexGuard<'_, SourceState<U>> {
    match self.state.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }

  /// Registers the callback notified whenever queued items are removed.
  pub(crate) fn set_items_removed(&self, callback: ItemsRemovedCallback) {
    let mut guard = match self.items_removed.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(callback);
  }

  pub(crate) fn completion(&self) -> CompletionTask {
    self.completion.clone()
  }

  pub(crate) fn output_count(&self) -> usize {
    self.lock().queue.len()
  }

  /// Enqueues an emitted group and restarts the output pump.
  pub(crate) fn push(&self, item: U) {
    let enqueued = {
      let mut guard = self.lock();
      if guard.done {
        false
      } else {
        let header = MessageHeader::new(guard.next_header_id);
        guard.next_header_id += 1;
        guard.queue.push_back((header, item));
        guard.epoch += 1;
        true
      }
    };
    if enqueued {
      self.kick();
    }
  }

  /// Moves the source towards the given terminal outcome.
  ///
  /// A completed source keeps offering until its queue drains; a faulted or
  /// cancelled source discards the queue and resolves immediately.
  pub(crate) fn complete(&self, outcome: BlockOutcome) {
    let notice = {
      let mut guard = self.lock();
      if guard.done {
        None
      } else if outcome.is_completed() {
        guard.completing = true;
        guard.pending_outcome = Some(outcome);
        guard.epoch += 1;
        Self::maybe_finish_locked(&mut guard)
      } else {
        Some(Self::finish_locked(&mut guard, outcome))
      }
    };
    match notice {
      | Some(notice) => self.execute_finish(notice),
      | None => self.kick(),
    }
  }

  /// Pops the head when it matches the filter and no reservation is
  /// outstanding.
  pub(crate) fn try_receive(&self, filter: Option<&dyn Fn(&U) -> bool>) -> Option<U> {
    let (value, notice) = {
      let mut guard = self.lock();
      if guard.done || guard.reservation.is_some() {
        return None;
      }
      let matches = match guard.queue.front() {
        | Some((_, value)) => filter.map_or(true, |accept| accept(value)),
        | None => return None,
      };
      if !matches {
        return None;
      }
      let (_, value) = guard.queue.pop_front()?;
      guard.epoch += 1;
      let notice = Self::maybe_finish_locked(&mut guard);
      (value, notice)
    };
    self.after_removal(notice);
    Some(value)
  }

  /// Atomically drains every queued item.
  pub(crate) fn try_receive_all(&self) -> Option<Vec<U>> {
    let (items, notice) = {
      let mut guard = self.lock();
      if guard.done || guard.reservation.is_some() || guard.queue.is_empty() {
        return None;
      }
      let items: Vec<U> = guard.queue.drain(..).map(|(_, value)| value).collect();
      guard.epoch += 1;
      let notice = Self::maybe_finish_locked(&mut guard);
      (items, notice)
    };
    self.after_removal(notice);
    Some(items)
  }

  /// Registers a downstream link.
  pub(crate) fn link_to(
    &self,
    target: Arc<dyn BlockTarget<U>>,
    options: &LinkOptions<U>,
  ) -> Result<LinkHandle, BlockError> {
    if let Bound::Finite(0) = options.max_messages() {
      return Err(BlockError::InvalidLimit { value: 0 });
    }
    let link_id = {
      let mut guard = self.lock();
      if guard.done {
        drop(guard);
        if options.propagate_completion() {
          if let Some(outcome) = self.completion.try_outcome() {
            Self::propagate_outcome(&outcome, &target);
          }
        }
        return Ok(LinkHandle::inert());
      }
      let link_id = guard.next_link_id;
      guard.next_link_id += 1;
      let remaining = match options.max_messages() {
        | Bound::Unbounded => None,
        | Bound::Finite(limit) => Some(limit),
      };
      guard.links.push(LinkEntry {
        id: link_id,
        target,
        propagate_completion: options.propagate_completion(),
        remaining,
        filter: options.filter(),
      });
      guard.epoch += 1;
      link_id
    };
    self.kick();

    let weak = self.weak_self.clone();
    Ok(LinkHandle::new(Box::new(move || {
      if let Some(source) = weak.upgrade() {
        let mut guard = source.lock();
        guard.links.retain(|link| link.id != link_id);
        guard.epoch += 1;
      }
    })))
  }

  /// Schedules the output-processing job unless one is already active.
  pub(crate) fn kick(&self) {
    let Some(this) = self.weak_self.upgrade() else {
      return;
    };
    if self.pump.try_begin() {
      self.executor.execute(Box::new(move || Self::drive(this)));
    }
  }

  fn drive(this: Arc<Self>) {
    let budget = this.max_per_task.limit_or_max();
    let mut transferred = 0_usize;
    loop {
      match this.next_round() {
        | PumpRound::Finish(notice) => {
          this.pump.finish();
          this.execute_finish(notice);
          return;
        },
        | PumpRound::Idle(seen_epoch) => {
          if !this.idle_resume(seen_epoch) {
            return;
          }
        },
        | PumpRound::Offer { header, candidates, epoch } => {
          if Self::offer_round(&this, header, candidates) {
            transferred += 1;
            if transferred >= budget {
              // re-yield to the executor so other work can interleave
              let resumed = this.clone();
              this.executor.execute(Box::new(move || Self::drive(resumed)));
              return;
            }
          } else if !this.idle_resume(epoch) {
            return;
          }
        },
      }
    }
  }

  fn next_round(&self) -> PumpRound<U> {
    let mut guard = self.lock();
    if guard.done || guard.reservation.is_some() {
      return PumpRound::Idle(guard.epoch);
    }
    match guard.queue.front() {
      | None => match Self::maybe_finish_locked(&mut guard) {
        | Some(notice) => PumpRound::Finish(notice),
        | None => PumpRound::Idle(guard.epoch),
      },
      | Some((header, value)) => {
        let header = *header;
        let candidates = guard
          .links
          .iter()
          .filter(|link| link.filter.as_ref().map_or(true, |accept| accept(value)))
          .map(|link| (link.id, link.target.clone()))
          .collect();
        PumpRound::Offer { header, candidates, epoch: guard.epoch }
      },
    }
  }

  /// Offers the head to the candidate links; true when a link accepted.
  fn offer_round(this: &Arc<Self>, header: MessageHeader, candidates: Vec<(u64, Arc<dyn BlockTarget<U>>)>) -> bool {
    for (link_id, target) in candidates {
      let producer: Arc<dyn SourceProducer<U>> = this.clone();
      match target.offer_message(header, None, Some(producer), true) {
        | Ok(OfferDecision::Accepted) => {
          let mut guard = this.lock();
          if matches!(guard.queue.front(), Some((head, _)) if *head == header) {
            // the target claimed acceptance without consuming; stop
            // offering this head rather than spin on it
            return false;
          }
          let mut unlink = false;
          if let Some(link) = guard.links.iter_mut().find(|link| link.id == link_id) {
            if let Some(remaining) = &mut link.remaining {
              *remaining = remaining.saturating_sub(1);
              unlink = *remaining == 0;
            }
          }
          if unlink {
            guard.links.retain(|link| link.id != link_id);
          }
          guard.epoch += 1;
          return true;
        },
        | Ok(_) | Err(_) => {},
      }
    }
    false
  }

  /// Idle-exit protocol: release the pump, then resume only when state
  /// changed since the round was captured.
  fn idle_resume(&self, seen_epoch: u64) -> bool {
    self.pump.finish();
    let changed = {
      let guard = self.lock();
      !guard.done && guard.epoch != seen_epoch
    };
    changed && self.pump.try_begin()
  }

  fn maybe_finish_locked(guard: &mut MutexGuard<'_, SourceState<U>>) -> Option<FinishNotice<U>> {
    if guard.done || !guard.completing || !guard.queue.is_empty() || guard.reservation.is_some() {
      return None;
    }
    let outcome = guard.pending_outcome.take().unwrap_or(BlockOutcome::Completed);
    Some(Self::finish_locked(guard, outcome))
  }

  fn finish_locked(guard: &mut MutexGuard<'_, SourceState<U>>, outcome: BlockOutcome) -> FinishNotice<U> {
    guard.done = true;
    guard.queue.clear();
    guard.reservation = None;
    guard.epoch += 1;
    let propagate = guard
      .links
      .drain(..)
      .filter(|link| link.propagate_completion)
      .map(|link| link.target)
      .collect();
    FinishNotice { outcome, propagate }
  }

  fn execute_finish(&self, notice: FinishNotice<U>) {
    tracing::debug!(outcome = ?notice.outcome, "source resolved");
    self.completion.resolve(notice.outcome.clone());
    for target in notice.propagate {
      Self::propagate_outcome(&notice.outcome, &target);
    }
  }

  fn propagate_outcome(outcome: &BlockOutcome, target: &Arc<dyn BlockTarget<U>>) {
    match outcome {
      | BlockOutcome::Completed | BlockOutcome::Cancelled => target.complete(),
      | BlockOutcome::Faulted(errors) => target.fault(BlockError::aggregate(errors.clone())),
    }
  }

  /// Post-removal duties: notify the bounding callback, resolve a drained
  /// completing source, restart the pump.
  fn after_removal(&self, notice: Option<FinishNotice<U>>) {
    let callback = {
      let guard = match self.items_removed.lock() {
        | Ok(guard) => guard,
        | Err(poisoned) => poisoned.into_inner(),
      };
      guard.clone()
    };
    if let Some(callback) = callback {
      callback();
    }
    match notice {
      | Some(notice) => self.execute_finish(notice),
      | None => self.kick(),
    }
  }
}

impl<U: Send + 'static> SourceProducer<U> for SourceCore<U> {
  fn reserve_message(&self, header: MessageHeader, requester: TargetId) -> Result<bool, BlockError> {
    let mut guard = self.lock();
    if guard.done || guard.reservation.is_some() {
      return Ok(false);
    }
    match guard.queue.front() {
      | Some((head, _)) if *head == header => {
        guard.reservation = Some((header, requester));
        Ok(true)
      },
      | _ => Ok(false),
    }
  }

  fn consume_message(&self, header: MessageHeader, requester: TargetId) -> Result<Option<U>, BlockError> {
    let (value, notice) = {
      let mut guard = self.lock();
      if guard.done {
        return Ok(None);
      }
      if let Some((reserved, holder)) = guard.reservation {
        if reserved != header || holder != requester {
          return Ok(None);
        }
        guard.reservation = None;
      }
      if !matches!(guard.queue.front(), Some((head, _)) if *head == header) {
        return Ok(None);
      }
      let Some((_, value)) = guard.queue.pop_front() else {
        return Ok(None);
      };
      guard.epoch += 1;
      let notice = Self::maybe_finish_locked(&mut guard);
      (value, notice)
    };
    self.after_removal(notice);
    Ok(Some(value))
  }

  fn release_reservation(&self, header: MessageHeader, requester: TargetId) -> Result<(), BlockError> {
    {
      let mut guard = self.lock();
      if guard.done {
        return Ok(());
      }
      match guard.reservation {
        | Some((reserved, holder)) if reserved == header && holder == requester => {
          guard.reservation = None;
          guard.epoch += 1;
        },
        | _ => return Err(BlockError::ReservationMismatch { id: header.id() }),
      }
    }
    self.kick();
    Ok(())
  }
}
