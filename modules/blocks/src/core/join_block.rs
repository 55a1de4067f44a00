
use std::{fmt, sync::Arc};

use super::{
  block_error::BlockError,
  block_name::BlockName,
  block_target::BlockTarget,
  bound::Bound,
  completion_task::CompletionTask,
  group_coordinator::GroupCoordinator,
  grouping_options::GroupingOptions,
  join_assembler::JoinAssembler,
  link_handle::LinkHandle,
  link_options::LinkOptions,
  source_producer::SourceProducer,
  target_endpoint::TargetEndpoint,
  target_ops::TargetOps,
};

/// Grouping block that synchronizes one message per input target.
///
/// Every emitted group is a `Vec<T>` of length `target_count` holding, in
/// target-index order, the k-th message accepted on each target.
pub struct JoinBlock<T> {
  name:        BlockName,
  coordinator: Arc<GroupCoordinator<T, Vec<T>>>,
  targets:     Vec<TargetEndpoint<T>>,
}

impl<T: Send + 'static> JoinBlock<T> {
  /// Creates a join block with default options.
  ///
  /// # Errors
  ///
  /// Returns [`BlockError::InvalidTargetCount`] when `target_count` is zero.
  pub fn new(target_count: usize) -> Result<Self, BlockError> {
    Self::with_options(target_count, GroupingOptions::new())
  }

  /// Creates a join block with the provided options.
  ///
  /// # Errors
  ///
  /// Returns [`BlockError::InvalidTargetCount`] when `target_count` is zero,
  /// and [`BlockError::InvalidCapacity`] / [`BlockError::InvalidLimit`] for
  /// finite zero bounds.
  pub fn with_options(target_count: usize, options: GroupingOptions) -> Result<Self, BlockError> {
    if target_count < 1 {
      return Err(BlockError::InvalidTargetCount { count: target_count });
    }
    validate_common(&options)?;

    let name = BlockName::new("JoinBlock", options.name_format().to_string());
    let coordinator = GroupCoordinator::create(target_count, Box::new(JoinAssembler::new()), &options, name.id());
    let ops: Arc<dyn TargetOps<T>> = coordinator.clone();
    let targets = (0..target_count).map(|index| TargetEndpoint::new(index, ops.clone())).collect();
    tracing::trace!(block_id = name.id(), target_count, greedy = options.greedy(), "join block created");
    Ok(Self { name, coordinator, targets })
  }

  /// Returns the number of input targets.
  #[must_use]
  pub fn target_count(&self) -> usize {
    self.targets.len()
  }

  /// Returns the input targets in index order.
  #[must_use]
  pub fn targets(&self) -> &[TargetEndpoint<T>] {
    &self.targets
  }

  /// Returns the target at `index`.
  #[must_use]
  pub fn target(&self, index: usize) -> Option<&TargetEndpoint<T>> {
    self.targets.get(index)
  }

  /// Posts a value to the target at `index`; true when accepted.
  pub fn post(&self, index: usize, value: T) -> bool {
    self.targets.get(index).is_some_and(|target| target.post(value))
  }

  /// Links the block's output to a downstream target.
  ///
  /// # Errors
  ///
  /// Returns [`BlockError::InvalidLimit`] for a finite zero message cap.
  pub fn link_to(
    &self,
    target: Arc<dyn BlockTarget<Vec<T>>>,
    options: &LinkOptions<Vec<T>>,
  ) -> Result<LinkHandle, BlockError> {
    self.coordinator.source().link_to(target, options)
  }

  /// Pops the next emitted group, if any.
  #[must_use]
  pub fn try_receive(&self) -> Option<Vec<T>> {
    self.coordinator.source().try_receive(None)
  }

  /// Pops the next emitted group when it matches the filter.
  #[must_use]
  pub fn try_receive_if(&self, filter: impl Fn(&Vec<T>) -> bool) -> Option<Vec<T>> {
    self.coordinator.source().try_receive(Some(&filter))
  }

  /// Atomically drains every emitted group.
  #[must_use]
  pub fn try_receive_all(&self) -> Option<Vec<Vec<T>>> {
    self.coordinator.source().try_receive_all()
  }

  /// Returns the number of emitted groups waiting to be consumed.
  #[must_use]
  pub fn output_count(&self) -> usize {
    self.coordinator.source().output_count()
  }

  /// Returns the block's completion task.
  #[must_use]
  pub fn completion(&self) -> CompletionTask {
    self.coordinator.source().completion()
  }

  /// Marks every target as declining; the block completes once buffered
  /// input can no longer form groups and the output drains.
  pub fn complete(&self) {
    for target in &self.targets {
      target.complete();
    }
  }

  /// Faults the block with the provided error.
  pub fn fault(&self, error: BlockError) {
    self.coordinator.fault_block(error);
  }

  /// Returns the producer surface downstream grouping blocks consume from.
  #[must_use]
  pub fn as_producer(&self) -> Arc<dyn SourceProducer<Vec<T>>> {
    self.coordinator.source().clone()
  }
}

pub(crate) fn validate_common(options: &GroupingOptions) -> Result<(), BlockError> {
  if let Bound::Finite(0) = options.bounded_capacity() {
    return Err(BlockError::InvalidCapacity { value: 0 });
  }
  if let Bound::Finite(0) = options.max_number_of_groups() {
    return Err(BlockError::InvalidLimit { value: 0 });
  }
  if let Bound::Finite(0) = options.max_messages_per_task() {
    return Err(BlockError::InvalidLimit { value: 0 });
  }
  Ok(())
}

impl<T> fmt::Display for JoinBlock<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.name.fmt(f)
  }
}

impl<T> fmt::Debug for JoinBlock<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("JoinBlock").field("name", &self.name).field("targets", &self.targets.len()).finish()
  }
}
