#[cfg(test)]
mod tests;

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::{
  block_error::BlockError,
  block_outcome::BlockOutcome,
  bound::Bound,
  completion_task::CompletionTask,
  group_assembler::{AssemblyStep, GroupAssembler},
  grouping_options::GroupingOptions,
  message_header::MessageHeader,
  offer_decision::OfferDecision,
  pump_cell::PumpCell,
  source_core::SourceCore,
  source_producer::SourceProducer,
  target_id::TargetId,
  target_ops::TargetOps,
  target_state::{CompletionReason, TargetState},
};
use crate::runtime::BlockExecutor;

type ReservedOffer<T> = (Arc<dyn SourceProducer<T>>, MessageHeader, TargetId);

struct CoordinatorState<T, U> {
  targets:               Vec<TargetState<T>>,
  assembler:             Box<dyn GroupAssembler<T, Output = U>>,
  declining_permanently: bool,
  cancelled:             bool,
  exceptions:            Vec<BlockError>,
  groups_created:        usize,
  finished:              bool,
  arrival_seq:           u64,
  // bumped on every observable change so an idling pump can tell stalled
  // input apart from fresh work
  epoch:                 u64,
}

/// Terminal transition captured under the lock, executed outside it.
struct FinishPlan<U> {
  residue: Option<U>,
  outcome: BlockOutcome,
}

enum StepAction<T, U> {
  /// A group was assembled and must be pushed to the source.
  Emit(U),
  /// Progress was made without an emission.
  Worked,
  /// A non-greedy round aborted; the reservations must be released in
  /// reverse order.
  Release(Vec<ReservedOffer<T>>),
  /// The block reached its terminal state.
  Finish(FinishPlan<U>),
  /// Nothing to do at the observed epoch.
  Idle(u64),
}

/// Shared input half of a grouping block.
///
/// Everything mutable lives behind one incoming lock: per-target queues and
/// postponed offers, the decline/cancel/exception flags and the assembler.
/// The input-processing job is serialized through a [`PumpCell`] and runs the
/// greedy or non-greedy acquisition loop.
pub(crate) struct GroupCoordinator<T, U> {
  state:            Mutex<CoordinatorState<T, U>>,
  pump:             PumpCell,
  source:           Arc<SourceCore<U>>,
  greedy:           bool,
  bounded_capacity: Bound,
  max_groups:       Bound,
  max_per_task:     Bound,
  executor:         Arc<dyn BlockExecutor>,
  block_id:         u64,
  weak_self:        Weak<GroupCoordinator<T, U>>,
}

impl<T, U> GroupCoordinator<T, U>
where
  T: Send + 'static,
  U: Send + 'static,
{
  pub(crate) fn create(
    target_count: usize,
    assembler: Box<dyn GroupAssembler<T, Output = U>>,
    options: &GroupingOptions,
    block_id: u64,
  ) -> Arc<Self> {
    let executor = options.executor();
    let completion = CompletionTask::new();
    let source = SourceCore::new(executor.clone(), completion, options.max_messages_per_task());

    let coordinator = Arc::new_cyclic(|weak_self| Self {
      state: Mutex::new(CoordinatorState {
        targets: (0..target_count).map(|_| TargetState::new()).collect(),
        assembler,
        declining_permanently: false,
        cancelled: false,
        exceptions: Vec::new(),
        groups_created: 0,
        finished: false,
        arrival_seq: 0,
        epoch: 0,
      }),
      pump: PumpCell::new(),
      source: source.clone(),
      greedy: options.greedy(),
      bounded_capacity: options.bounded_capacity(),
      max_groups: options.max_number_of_groups(),
      max_per_task: options.max_messages_per_task(),
      executor,
      block_id,
      weak_self: weak_self.clone(),
    });

    let weak = Arc::downgrade(&coordinator);
    source.set_items_removed(Arc::new(move || {
      if let Some(coordinator) = weak.upgrade() {
        coordinator.note_items_removed();
      }
    }));

    let token = options.cancellation_token();
    if token.is_cancelled() {
      coordinator.cancel();
    } else {
      let weak = Arc::downgrade(&coordinator);
      token.on_cancel(move || {
        if let Some(coordinator) = weak.upgrade() {
          coordinator.cancel();
        }
      });
    }

    coordinator
  }

  pub(crate) fn source(&self) -> &Arc<SourceCore<U>> {
    &self.source
  }

  fn lock(&self) -> MutexGuard<'_, CoordinatorState<T, U>> {
    match self.state.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }

  /// Schedules the input-processing job unless one is already active.
  pub(crate) fn kick(&self) {
    let Some(this) = self.weak_self.upgrade() else {
      return;
    };
    if self.pump.try_begin() {
      self.executor.execute(Box::new(move || Self::drive(this)));
    }
  }

  /// Output capacity freed up; postponed intake may resume.
  fn note_items_removed(&self) {
    {
      let mut guard = self.lock();
      if guard.finished {
        return;
      }
      guard.epoch += 1;
    }
    self.kick();
  }

  /// Cancellation observed through the construction token.
  pub(crate) fn cancel(&self) {
    {
      let mut guard = self.lock();
      if guard.finished || guard.cancelled {
        return;
      }
      guard.cancelled = true;
      guard.declining_permanently = true;
      guard.epoch += 1;
      for target in &mut guard.targets {
        target.declining = true;
        if target.completion_reason == CompletionReason::None {
          target.completion_reason = CompletionReason::Cancelled;
        }
      }
    }
    tracing::debug!(block_id = self.block_id, "block cancelled");
    self.kick();
  }

  fn buffer_exception(&self, error: BlockError) {
    let recorded = {
      let mut guard = self.lock();
      if guard.finished {
        false
      } else {
        guard.exceptions.push(error);
        guard.declining_permanently = true;
        guard.epoch += 1;
        for target in &mut guard.targets {
          target.declining = true;
          if target.completion_reason == CompletionReason::None {
            target.completion_reason = CompletionReason::Faulted;
          }
        }
        true
      }
    };
    if recorded {
      self.kick();
    }
  }

  fn drive(this: Arc<Self>) {
    let budget = this.max_per_task.limit_or_max();
    let mut steps = 0_usize;
    loop {
      match this.step() {
        | StepAction::Emit(group) => {
          this.source.push(group);
          steps += 1;
        },
        | StepAction::Worked => {
          steps += 1;
        },
        | StepAction::Release(reserved) => {
          // unwind in reverse acquisition order; producers re-offer on release
          for (producer, header, requester) in reserved.into_iter().rev() {
            if let Err(error) = producer.release_reservation(header, requester) {
              this.buffer_exception(error);
            }
          }
          steps += 1;
        },
        | StepAction::Finish(plan) => {
          this.pump.finish();
          this.run_finish(plan);
          return;
        },
        | StepAction::Idle(seen_epoch) => {
          if !this.idle_resume(seen_epoch) {
            return;
          }
        },
      }
      if steps >= budget {
        // re-yield to the executor so other work can interleave
        let resumed = this.clone();
        this.executor.execute(Box::new(move || Self::drive(resumed)));
        return;
      }
    }
  }

  /// Idle-exit protocol: release the pump, then resume only when state
  /// changed since the step observed it.
  fn idle_resume(&self, seen_epoch: u64) -> bool {
    self.pump.finish();
    let changed = {
      let guard = self.lock();
      !guard.finished && guard.epoch != seen_epoch
    };
    changed && self.pump.try_begin()
  }

  /// One unit of input processing under the incoming lock.
  fn step(&self) -> StepAction<T, U> {
    let mut guard = self.lock();
    if guard.finished {
      return StepAction::Idle(guard.epoch);
    }
    if let Some(plan) = self.finish_plan_locked(&mut guard) {
      guard.finished = true;
      return StepAction::Finish(plan);
    }

    let bounding_ok = self.bounded_capacity.allows(self.source.output_count());
    let groups_ok = self.max_groups.allows(guard.groups_created);
    if !bounding_ok || !groups_ok {
      return StepAction::Idle(guard.epoch);
    }

    if self.greedy {
      self.greedy_step(&mut guard)
    } else {
      self.non_greedy_step(&mut guard)
    }
  }

  fn greedy_step(&self, guard: &mut MutexGuard<'_, CoordinatorState<T, U>>) -> StepAction<T, U> {
    // migrate one postponed offer into its input queue first; postponed
    // entries only exist in greedy mode while bounding had paused intake
    for index in 0..guard.targets.len() {
      let requester = guard.targets[index].id;
      let Some((producer, header)) = guard.targets[index].postponed.pop_front() else {
        continue;
      };
      match producer.consume_message(header, requester) {
        | Ok(Some(payload)) => {
          let seq = guard.arrival_seq;
          guard.arrival_seq += 1;
          guard.targets[index].queue.push_back((seq, payload));
        },
        | Ok(None) => {},
        | Err(error) => {
          guard.exceptions.push(error);
          guard.declining_permanently = true;
        },
      }
      return StepAction::Worked;
    }

    self.assemble_step(guard)
  }

  fn non_greedy_step(&self, guard: &mut MutexGuard<'_, CoordinatorState<T, U>>) -> StepAction<T, U> {
    if guard.targets.iter().any(|target| target.postponed.is_empty()) {
      return StepAction::Idle(guard.epoch);
    }

    // phase 1: reserve the oldest postponed offer of every target, popping
    // stale entries whose producer no longer honours them
    let mut reserved: Vec<ReservedOffer<T>> = Vec::with_capacity(guard.targets.len());
    for index in 0..guard.targets.len() {
      let requester = guard.targets[index].id;
      let mut taken = None;
      while let Some((producer, header)) = guard.targets[index].postponed.pop_front() {
        match producer.reserve_message(header, requester) {
          | Ok(true) => {
            taken = Some((producer, header, requester));
            break;
          },
          | Ok(false) => {},
          | Err(error) => {
            guard.exceptions.push(error);
            guard.declining_permanently = true;
            return StepAction::Release(reserved);
          },
        }
      }
      match taken {
        | Some(offer) => reserved.push(offer),
        | None => return StepAction::Release(reserved),
      }
    }

    // phase 2: consume every reservation; a lost reservation is a producer
    // contract violation and faults the block
    for position in 0..reserved.len() {
      let (producer, header, requester) = &reserved[position];
      let consumed = match producer.consume_message(*header, *requester) {
        | Ok(consumed) => consumed,
        | Err(error) => {
          guard.exceptions.push(error);
          guard.declining_permanently = true;
          return StepAction::Release(reserved[position + 1..].to_vec());
        },
      };
      match consumed {
        | Some(payload) => {
          let seq = guard.arrival_seq;
          guard.arrival_seq += 1;
          guard.targets[position].queue.push_back((seq, payload));
        },
        | None => {
          guard.exceptions.push(BlockError::ReservationLost { id: header.id() });
          guard.declining_permanently = true;
          return StepAction::Release(reserved[position + 1..].to_vec());
        },
      }
    }

    self.assemble_step(guard)
  }

  fn assemble_step(&self, guard: &mut MutexGuard<'_, CoordinatorState<T, U>>) -> StepAction<T, U> {
    let state = &mut **guard;
    match state.assembler.try_assemble(&mut state.targets) {
      | AssemblyStep::Emitted(group) => {
        state.groups_created += 1;
        tracing::trace!(block_id = self.block_id, groups_created = state.groups_created, "group assembled");
        if !self.max_groups.allows(state.groups_created) {
          state.declining_permanently = true;
        }
        StepAction::Emit(group)
      },
      | AssemblyStep::Consumed => StepAction::Worked,
      | AssemblyStep::Idle => StepAction::Idle(state.epoch),
    }
  }

  fn finish_plan_locked(&self, guard: &mut MutexGuard<'_, CoordinatorState<T, U>>) -> Option<FinishPlan<U>> {
    let state = &mut **guard;
    let forced = state.cancelled || !state.exceptions.is_empty() || state.declining_permanently;
    if !forced && !state.assembler.input_exhausted(&state.targets) {
      return None;
    }

    state.declining_permanently = true;
    for target in &mut state.targets {
      target.declining = true;
      if target.completion_reason == CompletionReason::None {
        target.completion_reason = CompletionReason::CompletedNormally;
      }
      // nothing is reserved between rounds; producers keep their messages
      target.postponed.clear();
      target.queue.clear();
    }

    let outcome = if state.exceptions.is_empty() {
      if state.cancelled {
        BlockOutcome::Cancelled
      } else {
        BlockOutcome::Completed
      }
    } else {
      BlockOutcome::Faulted(std::mem::take(&mut state.exceptions))
    };

    let residue = if outcome.is_completed() && self.max_groups.allows(state.groups_created) {
      let residue = state.assembler.flush();
      if residue.is_some() {
        state.groups_created += 1;
      }
      residue
    } else {
      None
    };

    Some(FinishPlan { residue, outcome })
  }

  fn run_finish(&self, plan: FinishPlan<U>) {
    tracing::debug!(block_id = self.block_id, outcome = ?plan.outcome, "block finishing");
    if let Some(residue) = plan.residue {
      self.source.push(residue);
    }
    self.source.complete(plan.outcome);
  }
}

impl<T, U> TargetOps<T> for GroupCoordinator<T, U>
where
  T: Send + 'static,
  U: Send + 'static,
{
  fn offer(
    &self,
    index: usize,
    header: MessageHeader,
    payload: Option<T>,
    producer: Option<Arc<dyn SourceProducer<T>>>,
    consume_to_accept: bool,
  ) -> Result<OfferDecision, BlockError> {
    if !header.is_valid() {
      return Err(BlockError::InvalidMessageHeader { id: header.id() });
    }
    if consume_to_accept && producer.is_none() {
      return Err(BlockError::MissingProducer);
    }
    if !consume_to_accept && payload.is_none() {
      return Err(BlockError::MissingPayload);
    }

    let (decision, kick) = {
      let mut guard = self.lock();
      if guard.finished || guard.declining_permanently || guard.targets[index].declining {
        (OfferDecision::Declined, false)
      } else {
        let bounding_ok = self.bounded_capacity.allows(self.source.output_count());
        if self.greedy && bounding_ok {
          if consume_to_accept {
            match producer {
              | Some(producer) => {
                let requester = guard.targets[index].id;
                match producer.consume_message(header, requester) {
                  | Ok(Some(payload)) => {
                    let seq = guard.arrival_seq;
                    guard.arrival_seq += 1;
                    guard.targets[index].queue.push_back((seq, payload));
                    guard.epoch += 1;
                    (OfferDecision::Accepted, true)
                  },
                  | Ok(None) => (OfferDecision::NotAvailable, false),
                  | Err(error) => {
                    guard.exceptions.push(error);
                    guard.declining_permanently = true;
                    guard.epoch += 1;
                    (OfferDecision::NotAvailable, true)
                  },
                }
              },
              | None => return Err(BlockError::MissingProducer),
            }
          } else {
            match payload {
              | Some(payload) => {
                let seq = guard.arrival_seq;
                guard.arrival_seq += 1;
                guard.targets[index].queue.push_back((seq, payload));
                guard.epoch += 1;
                (OfferDecision::Accepted, true)
              },
              | None => return Err(BlockError::MissingPayload),
            }
          }
        } else if let Some(producer) = producer {
          guard.targets[index].postpone(producer, header);
          guard.epoch += 1;
          (OfferDecision::Postponed, true)
        } else {
          (OfferDecision::Declined, false)
        }
      }
    };
    if kick {
      self.kick();
    }
    Ok(decision)
  }

  fn complete_target(&self, index: usize) {
    {
      let mut guard = self.lock();
      if guard.finished {
        return;
      }
      let target = &mut guard.targets[index];
      if target.declining {
        return;
      }
      target.declining = true;
      if target.completion_reason == CompletionReason::None {
        target.completion_reason = CompletionReason::CompletedNormally;
      }
      guard.epoch += 1;
    }
    self.kick();
  }

  fn fault_block(&self, error: BlockError) {
    tracing::debug!(block_id = self.block_id, %error, "block faulted");
    self.buffer_exception(error);
  }

  fn next_header(&self, index: usize) -> MessageHeader {
    let mut guard = self.lock();
    guard.targets[index].next_header()
  }

  fn target_key(&self, index: usize) -> TargetId {
    let guard = self.lock();
    guard.targets[index].id
  }

  fn completion_task(&self) -> CompletionTask {
    self.source.completion()
  }
}
