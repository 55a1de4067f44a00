#[cfg(test)]
mod tests;

use super::{
  group_assembler::{AssemblyStep, GroupAssembler},
  target_state::TargetState,
};

/// Accumulating policy: moves payloads into per-target sequences in arrival
/// order and emits the tuple once the combined count reaches the batch size.
pub(crate) struct BatchedJoinAssembler<T> {
  batch_size:   usize,
  target_count: usize,
  accumulators: Vec<Vec<T>>,
  total:        usize,
}

impl<T> BatchedJoinAssembler<T> {
  pub(crate) fn new(batch_size: usize, target_count: usize) -> Self {
    Self {
      batch_size,
      target_count,
      accumulators: (0..target_count).map(|_| Vec::new()).collect(),
      total: 0,
    }
  }

  fn take_batch(&mut self) -> Vec<Vec<T>> {
    self.total = 0;
    std::mem::replace(&mut self.accumulators, (0..self.target_count).map(|_| Vec::new()).collect())
  }

  /// Index of the target whose queued head arrived earliest.
  fn earliest_target(targets: &[TargetState<T>]) -> Option<usize> {
    targets
      .iter()
      .enumerate()
      .filter_map(|(index, target)| target.queue.front().map(|(seq, _)| (*seq, index)))
      .min()
      .map(|(_, index)| index)
  }
}

impl<T: Send> GroupAssembler<T> for BatchedJoinAssembler<T> {
  type Output = Vec<Vec<T>>;

  fn try_assemble(&mut self, targets: &mut [TargetState<T>]) -> AssemblyStep<Self::Output> {
    let Some(index) = Self::earliest_target(targets) else {
      return AssemblyStep::Idle;
    };
    let Some((_, payload)) = targets[index].queue.pop_front() else {
      return AssemblyStep::Idle;
    };
    self.accumulators[index].push(payload);
    self.total += 1;
    if self.total == self.batch_size {
      AssemblyStep::Emitted(self.take_batch())
    } else {
      AssemblyStep::Consumed
    }
  }

  fn input_exhausted(&self, targets: &[TargetState<T>]) -> bool {
    // a batch can keep filling from any live target
    targets.iter().all(|target| target.declining && target.is_idle())
  }

  fn flush(&mut self) -> Option<Self::Output> {
    if self.total == 0 {
      return None;
    }
    Some(self.take_batch())
  }
}
