use super::target_state::TargetState;

/// Result of asking an assembler for one unit of progress.
pub(crate) enum AssemblyStep<U> {
  /// A group was completed and must be pushed to the source.
  Emitted(U),
  /// Input was moved into the assembler without completing a group.
  Consumed,
  /// No progress was possible.
  Idle,
}

/// Policy deciding when buffered inputs form an emittable group.
///
/// The coordinator calls [`GroupAssembler::try_assemble`] repeatedly under
/// its incoming lock and flushes any residue when the block stops declining
/// temporarily and becomes terminal.
pub(crate) trait GroupAssembler<T>: Send {
  /// The emitted group type.
  type Output;

  /// Performs one unit of assembly over the targets' input queues.
  fn try_assemble(&mut self, targets: &mut [TargetState<T>]) -> AssemblyStep<Self::Output>;

  /// Returns true when declining targets make further groups impossible.
  fn input_exhausted(&self, targets: &[TargetState<T>]) -> bool;

  /// Emits the final (possibly short) group held back by the policy.
  fn flush(&mut self) -> Option<Self::Output>;
}
