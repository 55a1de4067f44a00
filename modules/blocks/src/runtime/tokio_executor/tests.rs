use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use super::TokioExecutor;
use crate::runtime::BlockExecutor;

#[test]
fn try_current_fails_outside_a_runtime() {
  assert!(TokioExecutor::try_current().is_err());
}

#[tokio::test]
async fn executor_runs_jobs_on_the_runtime() {
  let executor = TokioExecutor::try_current().expect("runtime");
  let counter = Arc::new(AtomicUsize::new(0));
  let seen = counter.clone();
  executor.execute(Box::new(move || {
    seen.fetch_add(1, Ordering::SeqCst);
  }));
  for _ in 0..100 {
    if counter.load(Ordering::SeqCst) == 1 {
      return;
    }
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
  }
  panic!("job never ran");
}

#[test]
fn from_handle_uses_the_provided_runtime() {
  let runtime = tokio::runtime::Runtime::new().expect("runtime");
  let executor = TokioExecutor::from_handle(runtime.handle().clone());
  let counter = Arc::new(AtomicUsize::new(0));
  let seen = counter.clone();
  executor.execute(Box::new(move || {
    seen.fetch_add(1, Ordering::SeqCst);
  }));
  runtime.block_on(async {
    for _ in 0..100 {
      if counter.load(Ordering::SeqCst) == 1 {
        return;
      }
      tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }
    panic!("job never ran");
  });
}
