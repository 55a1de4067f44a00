
use std::{fmt, sync::Arc};

use super::{
  batched_join_assembler::BatchedJoinAssembler,
  block_error::BlockError,
  block_name::BlockName,
  block_target::BlockTarget,
  bound::Bound,
  completion_task::CompletionTask,
  group_coordinator::GroupCoordinator,
  grouping_options::GroupingOptions,
  join_block::validate_common,
  link_handle::LinkHandle,
  link_options::LinkOptions,
  source_producer::SourceProducer,
  target_endpoint::TargetEndpoint,
  target_ops::TargetOps,
};

/// Grouping block that accumulates independently arriving messages until a
/// batch size is reached.
///
/// Every emitted group is a `Vec<Vec<T>>` of length `target_count`; the sum
/// of the inner lengths equals the batch size, except for the final residue
/// emitted at completion.
pub struct BatchedJoinBlock<T> {
  name:        BlockName,
  batch_size:  usize,
  coordinator: Arc<GroupCoordinator<T, Vec<Vec<T>>>>,
  targets:     Vec<TargetEndpoint<T>>,
}

impl<T: Send + 'static> BatchedJoinBlock<T> {
  /// Creates a batched join block with default options.
  ///
  /// # Errors
  ///
  /// Returns [`BlockError::InvalidBatchSize`] when `batch_size` is zero and
  /// [`BlockError::InvalidTargetCount`] when `target_count` is zero.
  pub fn new(batch_size: usize, target_count: usize) -> Result<Self, BlockError> {
    Self::with_options(batch_size, target_count, GroupingOptions::new())
  }

  /// Creates a batched join block with the provided options.
  ///
  /// # Errors
  ///
  /// Beyond the [`BatchedJoinBlock::new`] argument errors, returns
  /// [`BlockError::UnsupportedOption`] for non-greedy mode or a finite
  /// bounded capacity, neither of which batched joining supports.
  pub fn with_options(batch_size: usize, target_count: usize, options: GroupingOptions) -> Result<Self, BlockError> {
    if batch_size < 1 {
      return Err(BlockError::InvalidBatchSize { size: batch_size });
    }
    if target_count < 1 {
      return Err(BlockError::InvalidTargetCount { count: target_count });
    }
    if !options.greedy() {
      return Err(BlockError::UnsupportedOption { option: "greedy" });
    }
    if let Bound::Finite(_) = options.bounded_capacity() {
      return Err(BlockError::UnsupportedOption { option: "bounded_capacity" });
    }
    validate_common(&options)?;

    let name = BlockName::new("BatchedJoinBlock", options.name_format().to_string());
    let assembler = Box::new(BatchedJoinAssembler::new(batch_size, target_count));
    let coordinator = GroupCoordinator::create(target_count, assembler, &options, name.id());
    let ops: Arc<dyn TargetOps<T>> = coordinator.clone();
    let targets = (0..target_count).map(|index| TargetEndpoint::new(index, ops.clone())).collect();
    tracing::trace!(block_id = name.id(), batch_size, target_count, "batched join block created");
    Ok(Self { name, batch_size, coordinator, targets })
  }

  /// Returns the configured batch size.
  #[must_use]
  pub const fn batch_size(&self) -> usize {
    self.batch_size
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
    target: Arc<dyn BlockTarget<Vec<Vec<T>>>>,
    options: &LinkOptions<Vec<Vec<T>>>,
  ) -> Result<LinkHandle, BlockError> {
    self.coordinator.source().link_to(target, options)
  }

  /// Pops the next emitted batch, if any.
  #[must_use]
  pub fn try_receive(&self) -> Option<Vec<Vec<T>>> {
    self.coordinator.source().try_receive(None)
  }

  /// Pops the next emitted batch when it matches the filter.
  #[must_use]
  pub fn try_receive_if(&self, filter: impl Fn(&Vec<Vec<T>>) -> bool) -> Option<Vec<Vec<T>>> {
    self.coordinator.source().try_receive(Some(&filter))
  }

  /// Atomically drains every emitted batch.
  #[must_use]
  pub fn try_receive_all(&self) -> Option<Vec<Vec<Vec<T>>>> {
    self.coordinator.source().try_receive_all()
  }

  /// Returns the number of emitted batches waiting to be consumed.
  #[must_use]
  pub fn output_count(&self) -> usize {
    self.coordinator.source().output_count()
  }

  /// Returns the block's completion task.
  #[must_use]
  pub fn completion(&self) -> CompletionTask {
    self.coordinator.source().completion()
  }

  /// Marks every target as declining; once all targets are drained the
  /// residue batch (if any) is emitted and the block completes.
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
  pub fn as_producer(&self) -> Arc<dyn SourceProducer<Vec<Vec<T>>>> {
    self.coordinator.source().clone()
  }
}

impl<T> fmt::Display for BatchedJoinBlock<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.name.fmt(f)
  }
}

impl<T> fmt::Debug for BatchedJoinBlock<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BatchedJoinBlock")
      .field("name", &self.name)
      .field("batch_size", &self.batch_size)
      .field("targets", &self.targets.len())
      .finish()
  }
}
