use super::BatchedJoinAssembler;
use crate::core::{
  group_assembler::{AssemblyStep, GroupAssembler},
  target_state::TargetState,
};

fn empty_targets(count: usize) -> Vec<TargetState<i32>> {
  (0..count).map(|_| TargetState::new()).collect()
}

#[test]
fn emits_once_the_combined_count_reaches_the_batch_size() {
  let mut assembler = BatchedJoinAssembler::new(3, 2);
  let mut targets = empty_targets(2);
  targets[0].queue.push_back((0, 1));
  targets[1].queue.push_back((1, 2));
  targets[0].queue.push_back((2, 3));

  assert!(matches!(assembler.try_assemble(&mut targets), AssemblyStep::Consumed));
  assert!(matches!(assembler.try_assemble(&mut targets), AssemblyStep::Consumed));
  match assembler.try_assemble(&mut targets) {
    | AssemblyStep::Emitted(batch) => assert_eq!(batch, vec![vec![1, 3], vec![2]]),
    | _ => panic!("expected emission"),
  }
  assert!(matches!(assembler.try_assemble(&mut targets), AssemblyStep::Idle));
}

#[test]
fn consumes_in_arrival_order_across_targets() {
  let mut assembler = BatchedJoinAssembler::new(4, 2);
  let mut targets = empty_targets(2);
  // arrival order alternates between the targets
  targets[1].queue.push_back((0, 10));
  targets[0].queue.push_back((1, 20));
  targets[1].queue.push_back((2, 30));
  targets[0].queue.push_back((3, 40));

  for _ in 0..3 {
    assert!(matches!(assembler.try_assemble(&mut targets), AssemblyStep::Consumed));
  }
  match assembler.try_assemble(&mut targets) {
    | AssemblyStep::Emitted(batch) => assert_eq!(batch, vec![vec![20, 40], vec![10, 30]]),
    | _ => panic!("expected emission"),
  }
}

#[test]
fn flush_emits_the_residue_and_resets() {
  let mut assembler = BatchedJoinAssembler::new(5, 2);
  let mut targets = empty_targets(2);
  targets[0].queue.push_back((0, 7));
  assert!(matches!(assembler.try_assemble(&mut targets), AssemblyStep::Consumed));

  assert_eq!(assembler.flush(), Some(vec![vec![7], vec![]]));
  assert_eq!(assembler.flush(), None);
}
