use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use crate::{
  core::{
    BlockError, BlockOutcome, BlockTarget, Bound, GroupingOptions, JoinBlock, MessageHeader, OfferDecision,
    SourceProducer, TargetId,
  },
  runtime::InlineExecutor,
};

#[derive(Default)]
struct ScriptedProducer {
  values:            Mutex<HashMap<u64, i32>>,
  reserve_refusals:  AtomicUsize,
  vanish_on_consume: AtomicBool,
  error_on_consume:  AtomicBool,
  consumed:          AtomicUsize,
  released:          AtomicUsize,
}

impl ScriptedProducer {
  fn with_value(header: u64, value: i32) -> Arc<Self> {
    let producer = Arc::new(Self::default());
    producer.values.lock().unwrap().insert(header, value);
    producer
  }

  fn refuse_next_reserves(&self, count: usize) {
    self.reserve_refusals.store(count, Ordering::SeqCst);
  }
}

impl SourceProducer<i32> for ScriptedProducer {
  fn reserve_message(&self, header: MessageHeader, _requester: TargetId) -> Result<bool, BlockError> {
    if self.reserve_refusals.load(Ordering::SeqCst) > 0 {
      self.reserve_refusals.fetch_sub(1, Ordering::SeqCst);
      return Ok(false);
    }
    Ok(self.values.lock().unwrap().contains_key(&header.id()))
  }

  fn consume_message(&self, header: MessageHeader, _requester: TargetId) -> Result<Option<i32>, BlockError> {
    if self.error_on_consume.load(Ordering::SeqCst) {
      return Err(BlockError::Producer { reason: "consume failed".to_string() });
    }
    if self.vanish_on_consume.load(Ordering::SeqCst) {
      return Ok(None);
    }
    let value = self.values.lock().unwrap().remove(&header.id());
    if value.is_some() {
      self.consumed.fetch_add(1, Ordering::SeqCst);
    }
    Ok(value)
  }

  fn release_reservation(&self, _header: MessageHeader, _requester: TargetId) -> Result<(), BlockError> {
    self.released.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

fn inline_options() -> GroupingOptions {
  GroupingOptions::new().with_executor(Arc::new(InlineExecutor::new()))
}

fn offer(block: &JoinBlock<i32>, index: usize, producer: &Arc<ScriptedProducer>, header: u64) -> OfferDecision {
  let producer: Arc<dyn SourceProducer<i32>> = producer.clone();
  block
    .target(index)
    .unwrap()
    .offer_message(MessageHeader::new(header), None, Some(producer), true)
    .unwrap()
}

#[test]
fn non_greedy_round_consumes_one_offer_per_target_atomically() {
  let block = JoinBlock::<i32>::with_options(2, inline_options().with_greedy(false)).unwrap();
  let left = ScriptedProducer::with_value(1, 10);
  let right = ScriptedProducer::with_value(1, 20);

  assert_eq!(offer(&block, 0, &left, 1), OfferDecision::Postponed);
  assert_eq!(block.output_count(), 0);
  assert_eq!(offer(&block, 1, &right, 1), OfferDecision::Postponed);

  assert_eq!(block.try_receive(), Some(vec![10, 20]));
  assert_eq!(left.consumed.load(Ordering::SeqCst), 1);
  assert_eq!(right.consumed.load(Ordering::SeqCst), 1);
  assert_eq!(left.released.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_reserve_releases_the_taken_reservations() {
  let block = JoinBlock::<i32>::with_options(2, inline_options().with_greedy(false)).unwrap();
  let left = ScriptedProducer::with_value(1, 10);
  let right = ScriptedProducer::with_value(1, 20);
  right.refuse_next_reserves(1);

  assert_eq!(offer(&block, 0, &left, 1), OfferDecision::Postponed);
  assert_eq!(offer(&block, 1, &right, 1), OfferDecision::Postponed);

  // the round reserved left, failed on right, and unwound
  assert_eq!(block.output_count(), 0);
  assert_eq!(left.released.load(Ordering::SeqCst), 1);
  assert_eq!(left.consumed.load(Ordering::SeqCst), 0);
  assert_eq!(right.consumed.load(Ordering::SeqCst), 0);

  // both producers re-offer and the join goes through
  assert_eq!(offer(&block, 0, &left, 1), OfferDecision::Postponed);
  assert_eq!(offer(&block, 1, &right, 1), OfferDecision::Postponed);
  assert_eq!(block.try_receive(), Some(vec![10, 20]));
}

#[test]
fn lost_reservation_faults_the_block() {
  let block = JoinBlock::<i32>::with_options(2, inline_options().with_greedy(false)).unwrap();
  let left = ScriptedProducer::with_value(1, 10);
  let right = ScriptedProducer::with_value(1, 20);
  right.vanish_on_consume.store(true, Ordering::SeqCst);

  offer(&block, 0, &left, 1);
  offer(&block, 1, &right, 1);

  match block.completion().try_outcome() {
    | Some(BlockOutcome::Faulted(errors)) => {
      assert!(errors.iter().any(|error| matches!(error, BlockError::ReservationLost { .. })));
    },
    | other => panic!("expected faulted completion, got {other:?}"),
  }
  assert!(!block.post(0, 1));
}

#[test]
fn producer_error_faults_the_block() {
  let block = JoinBlock::<i32>::with_options(2, inline_options().with_greedy(false)).unwrap();
  let left = ScriptedProducer::with_value(1, 10);
  let right = ScriptedProducer::with_value(1, 20);
  right.error_on_consume.store(true, Ordering::SeqCst);

  offer(&block, 0, &left, 1);
  offer(&block, 1, &right, 1);

  match block.completion().try_outcome() {
    | Some(BlockOutcome::Faulted(errors)) => {
      assert!(errors.iter().any(|error| matches!(error, BlockError::Producer { .. })));
    },
    | other => panic!("expected faulted completion, got {other:?}"),
  }
}

#[test]
fn bounded_greedy_block_postpones_and_resumes_on_capacity() {
  let options = inline_options().with_bounded_capacity(Bound::Finite(1));
  let block = JoinBlock::<i32>::with_options(1, options).unwrap();

  // first group fills the bounded output queue
  assert!(block.post(0, 1));
  assert_eq!(block.output_count(), 1);

  // a plain post cannot be postponed and declines while full
  assert!(!block.post(0, 2));

  // an offer backed by a producer is postponed instead
  let producer = ScriptedProducer::with_value(9, 3);
  assert_eq!(offer(&block, 0, &producer, 9), OfferDecision::Postponed);
  assert_eq!(producer.consumed.load(Ordering::SeqCst), 0);

  // receiving frees capacity; the postponed offer is consumed greedily
  assert_eq!(block.try_receive(), Some(vec![1]));
  assert_eq!(producer.consumed.load(Ordering::SeqCst), 1);
  assert_eq!(block.try_receive(), Some(vec![3]));
}

#[test]
fn stale_postponed_offer_is_dropped_in_greedy_migration() {
  let options = inline_options().with_bounded_capacity(Bound::Finite(1));
  let block = JoinBlock::<i32>::with_options(1, options).unwrap();
  assert!(block.post(0, 1));

  let producer = ScriptedProducer::with_value(9, 3);
  assert_eq!(offer(&block, 0, &producer, 9), OfferDecision::Postponed);
  // the producer withdraws the message before capacity frees
  producer.values.lock().unwrap().clear();

  assert_eq!(block.try_receive(), Some(vec![1]));
  assert_eq!(producer.consumed.load(Ordering::SeqCst), 0);
  assert_eq!(block.output_count(), 0);
}

#[test]
fn a_repeated_offer_replaces_the_producers_postponed_entry() {
  let block = JoinBlock::<i32>::with_options(2, inline_options().with_greedy(false)).unwrap();
  let left = ScriptedProducer::with_value(2, 11);
  let right = ScriptedProducer::with_value(1, 20);

  // first offer becomes stale, the second replaces it in place
  assert_eq!(offer(&block, 0, &left, 1), OfferDecision::Postponed);
  assert_eq!(offer(&block, 0, &left, 2), OfferDecision::Postponed);
  assert_eq!(offer(&block, 1, &right, 1), OfferDecision::Postponed);

  assert_eq!(block.try_receive(), Some(vec![11, 20]));
}
