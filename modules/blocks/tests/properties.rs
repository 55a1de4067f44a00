use std::sync::Arc;

use joinery_blocks_rs::{
  core::{BatchedJoinBlock, GroupingOptions, JoinBlock},
  runtime::InlineExecutor,
};
use proptest::prelude::*;

fn inline_options() -> GroupingOptions {
  GroupingOptions::new().with_executor(Arc::new(InlineExecutor::new()))
}

proptest! {
  /// The k-th emitted tuple carries the k-th message accepted on each
  /// target, for any interleaving of posts.
  #[test]
  fn join_tuples_pair_per_target_sequences(posts in proptest::collection::vec((0_usize..3, any::<i32>()), 0..60)) {
    let block = JoinBlock::<i32>::with_options(3, inline_options()).unwrap();
    let mut sequences: [Vec<i32>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (target, value) in posts {
      prop_assert!(block.post(target, value));
      sequences[target].push(value);
    }

    let expected = sequences.iter().map(Vec::len).min().unwrap();
    let mut received = Vec::new();
    while let Some(tuple) = block.try_receive() {
      received.push(tuple);
    }
    prop_assert_eq!(received.len(), expected);
    for (k, tuple) in received.iter().enumerate() {
      prop_assert_eq!(tuple, &vec![sequences[0][k], sequences[1][k], sequences[2][k]]);
    }
  }

  /// Every non-final batch sums to exactly the batch size; at most one
  /// residue batch is shorter; nothing is lost or duplicated.
  #[test]
  fn batched_join_counts_add_up(
    batch_size in 1_usize..6,
    posts in proptest::collection::vec((0_usize..2, any::<i32>()), 0..60),
  ) {
    let block = BatchedJoinBlock::<i32>::with_options(batch_size, 2, inline_options()).unwrap();
    let mut accepted = 0_usize;
    for (target, value) in &posts {
      prop_assert!(block.post(*target, *value));
      accepted += 1;
    }
    block.complete();

    let mut sizes = Vec::new();
    while let Some(batch) = block.try_receive() {
      sizes.push(batch.iter().map(Vec::len).sum::<usize>());
    }
    let total: usize = sizes.iter().sum();
    prop_assert_eq!(total, accepted);
    if let Some((last, full)) = sizes.split_last() {
      for size in full {
        prop_assert_eq!(*size, batch_size);
      }
      prop_assert!(*last <= batch_size);
      prop_assert!(*last > 0);
    }
  }

  /// Per-target acceptance order is preserved inside batch sequences.
  #[test]
  fn batched_join_preserves_per_target_order(posts in proptest::collection::vec((0_usize..2, any::<i32>()), 0..40)) {
    let block = BatchedJoinBlock::<i32>::with_options(3, 2, inline_options()).unwrap();
    let mut sequences: [Vec<i32>; 2] = [Vec::new(), Vec::new()];
    for (target, value) in posts {
      prop_assert!(block.post(target, value));
      sequences[target].push(value);
    }
    block.complete();

    let mut rebuilt: [Vec<i32>; 2] = [Vec::new(), Vec::new()];
    while let Some(batch) = block.try_receive() {
      for (target, values) in batch.into_iter().enumerate() {
        rebuilt[target].extend(values);
      }
    }
    prop_assert_eq!(rebuilt, sequences);
  }
}
