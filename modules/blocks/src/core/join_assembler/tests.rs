use super::JoinAssembler;
use crate::core::{
  group_assembler::{AssemblyStep, GroupAssembler},
  target_state::TargetState,
};

fn targets_with(rows: &[&[i32]]) -> Vec<TargetState<i32>> {
  rows
    .iter()
    .map(|row| {
      let mut target = TargetState::new();
      for (seq, value) in row.iter().enumerate() {
        target.queue.push_back((seq as u64, *value));
      }
      target
    })
    .collect()
}

#[test]
fn idle_until_every_target_has_input() {
  let mut assembler = JoinAssembler::new();
  let mut targets = targets_with(&[&[1], &[]]);
  assert!(matches!(assembler.try_assemble(&mut targets), AssemblyStep::Idle));
  assert_eq!(targets[0].queue.len(), 1);
}

#[test]
fn emits_one_payload_per_target_in_index_order() {
  let mut assembler = JoinAssembler::new();
  let mut targets = targets_with(&[&[1, 10], &[2, 20], &[3, 30]]);
  match assembler.try_assemble(&mut targets) {
    | AssemblyStep::Emitted(group) => assert_eq!(group, vec![1, 2, 3]),
    | _ => panic!("expected emission"),
  }
  match assembler.try_assemble(&mut targets) {
    | AssemblyStep::Emitted(group) => assert_eq!(group, vec![10, 20, 30]),
    | _ => panic!("expected emission"),
  }
  assert!(matches!(assembler.try_assemble(&mut targets), AssemblyStep::Idle));
}

#[test]
fn flush_never_produces_a_partial_tuple() {
  let mut assembler = JoinAssembler::new();
  assert!(GroupAssembler::<i32>::flush(&mut assembler).is_none());
}
