use std::sync::Arc;

use super::GroupingOptions;
use crate::{core::Bound, runtime::InlineExecutor};

#[test]
fn defaults_match_the_documented_table() {
  let options = GroupingOptions::new();
  assert!(options.greedy());
  assert_eq!(options.bounded_capacity(), Bound::Unbounded);
  assert_eq!(options.max_number_of_groups(), Bound::Unbounded);
  assert_eq!(options.max_messages_per_task(), Bound::Unbounded);
  assert!(!options.cancellation_token().is_cancelled());
  assert_eq!(options.name_format(), "{0} Id={1}");
}

#[test]
fn builders_override_single_fields() {
  let options = GroupingOptions::new()
    .with_greedy(false)
    .with_bounded_capacity(Bound::Finite(4))
    .with_max_number_of_groups(Bound::Finite(2))
    .with_max_messages_per_task(Bound::Finite(16))
    .with_name_format("{0}")
    .with_executor(Arc::new(InlineExecutor::new()));
  assert!(!options.greedy());
  assert_eq!(options.bounded_capacity(), Bound::Finite(4));
  assert_eq!(options.max_number_of_groups(), Bound::Finite(2));
  assert_eq!(options.max_messages_per_task(), Bound::Finite(16));
  assert_eq!(options.name_format(), "{0}");
}
