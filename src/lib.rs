#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::missing_safety_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::print_stdout)]
#![deny(clippy::dbg_macro)]
#![deny(unreachable_pub)]

//! Entry point crate for the joinery dataflow-block workspace.
//!
//! Re-exports the grouping-block engine living in `joinery-blocks-rs` so that
//! applications can depend on a single crate. The engine provides two blocks:
//! [`JoinBlock`] synchronizes one message per input target into an ordered
//! tuple, and [`BatchedJoinBlock`] accumulates independently arriving
//! messages into per-target sequences cut at a configured batch size.

pub use joinery_blocks_rs as blocks;
pub use joinery_blocks_rs::core::{
  BatchedJoinBlock, BlockError, BlockOutcome, BlockTarget, Bound, CancellationToken, CompletionFuture,
  CompletionTask, GroupingOptions, JoinBlock, LinkHandle, LinkOptions, MessageHeader, OfferDecision, SendFuture,
  SourceProducer, TargetEndpoint, TargetId,
};
pub use joinery_blocks_rs::runtime::{BlockExecutor, InlineExecutor, PoolExecutor, TickExecutor, TokioExecutor};
