use std::sync::Arc;

use crate::{
  core::{BlockError, BlockTarget, GroupingOptions, JoinBlock, MessageHeader},
  runtime::InlineExecutor,
};

fn inline_block(targets: usize) -> JoinBlock<i32> {
  JoinBlock::with_options(targets, GroupingOptions::new().with_executor(Arc::new(InlineExecutor::new()))).unwrap()
}

#[test]
fn per_target_completion_is_not_observable() {
  let block = inline_block(2);
  let result = block.target(0).unwrap().completion();
  assert!(matches!(result, Err(BlockError::NotSupported { .. })));
}

#[test]
fn post_accepts_into_a_greedy_target() {
  let block = inline_block(2);
  assert!(block.target(0).unwrap().post(1));
  assert!(block.target(1).unwrap().post(2));
  assert_eq!(block.try_receive(), Some(vec![1, 2]));
}

#[test]
fn offers_with_the_reserved_header_value_are_rejected() {
  let block = inline_block(1);
  let result = block.target(0).unwrap().offer_message(MessageHeader::NONE, Some(1), None, false);
  assert_eq!(result, Err(BlockError::InvalidMessageHeader { id: 0 }));
}

#[test]
fn consume_to_accept_requires_a_producer() {
  let block = inline_block(1);
  let result = block.target(0).unwrap().offer_message(MessageHeader::new(1), Some(1), None, true);
  assert_eq!(result, Err(BlockError::MissingProducer));
}

#[test]
fn eager_offers_require_a_payload() {
  let block = inline_block(1);
  let result = block.target(0).unwrap().offer_message(MessageHeader::new(1), None, None, false);
  assert_eq!(result, Err(BlockError::MissingPayload));
}

#[test]
fn clones_address_the_same_target() {
  let block = inline_block(2);
  let target = block.target(0).unwrap().clone();
  assert_eq!(target.index(), 0);
  assert_eq!(target.target_id(), block.target(0).unwrap().target_id());
  assert!(target.post(1));
  assert!(block.target(1).unwrap().post(2));
  assert_eq!(block.try_receive(), Some(vec![1, 2]));
}

#[test]
fn fault_through_a_target_faults_the_whole_block() {
  let block = inline_block(2);
  block.target(1).unwrap().fault(BlockError::external("bad format"));

  let outcome = block.completion().try_outcome().expect("resolved");
  assert_eq!(outcome.errors(), &[BlockError::external("bad format")]);
  assert!(!block.post(0, 1));
}
