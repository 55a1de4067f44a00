use std::time::Duration;

use super::CompletionTask;
use crate::core::{BlockError, BlockOutcome};

#[test]
fn first_resolution_wins() {
  let task = CompletionTask::new();
  assert!(task.try_outcome().is_none());
  assert!(task.resolve(BlockOutcome::Completed));
  assert!(!task.resolve(BlockOutcome::Cancelled));
  assert_eq!(task.try_outcome(), Some(BlockOutcome::Completed));
}

#[test]
fn clones_observe_the_same_resolution() {
  let task = CompletionTask::new();
  let clone = task.clone();
  task.resolve(BlockOutcome::Faulted(vec![BlockError::Cancelled]));
  assert_eq!(clone.try_outcome(), Some(BlockOutcome::Faulted(vec![BlockError::Cancelled])));
}

#[test]
fn wait_timeout_returns_none_while_pending() {
  let task = CompletionTask::new();
  assert!(task.wait_timeout(Duration::from_millis(10)).is_none());
  task.resolve(BlockOutcome::Completed);
  assert_eq!(task.wait_timeout(Duration::from_millis(10)), Some(BlockOutcome::Completed));
}

#[test]
fn wait_unblocks_on_resolution_from_another_thread() {
  let task = CompletionTask::new();
  let resolver = task.clone();
  let handle = std::thread::spawn(move || {
    std::thread::sleep(Duration::from_millis(20));
    resolver.resolve(BlockOutcome::Cancelled);
  });
  assert_eq!(task.wait(), BlockOutcome::Cancelled);
  handle.join().unwrap();
}

#[test]
fn on_resolved_runs_immediately_when_already_resolved() {
  let task = CompletionTask::new();
  task.resolve(BlockOutcome::Completed);
  let mut seen = None;
  let (sender, receiver) = std::sync::mpsc::channel();
  task.on_resolved(move |outcome| {
    sender.send(outcome.clone()).unwrap();
  });
  if let Ok(outcome) = receiver.try_recv() {
    seen = Some(outcome);
  }
  assert_eq!(seen, Some(BlockOutcome::Completed));
}

#[tokio::test]
async fn completed_future_resolves_for_every_awaiter() {
  let task = CompletionTask::new();
  let first = task.completed();
  let second = task.completed();
  let resolver = task.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(10)).await;
    resolver.resolve(BlockOutcome::Completed);
  });
  assert_eq!(first.await, BlockOutcome::Completed);
  assert_eq!(second.await, BlockOutcome::Completed);
}
