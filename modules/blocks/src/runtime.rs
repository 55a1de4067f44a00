//! Executor abstractions for driving block processing jobs.

/// Executor trait and job type.
mod executor;
/// Run-on-caller executor.
mod inline_executor;
/// Shared worker-pool executor.
mod pool_executor;
/// Queue-until-tick executor for deterministic tests.
mod tick_executor;
/// Tokio-backed executor.
mod tokio_executor;

pub use executor::{BlockExecutor, Job};
pub use inline_executor::InlineExecutor;
pub use pool_executor::PoolExecutor;
pub use tick_executor::TickExecutor;
pub use tokio_executor::TokioExecutor;
