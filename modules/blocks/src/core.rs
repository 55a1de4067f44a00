//! The grouping-block engine.

/// Batched accumulation policy.
mod batched_join_assembler;
/// Batched join block.
mod batched_join_block;
/// Block error kinds.
mod block_error;
/// Debugging name formatting.
mod block_name;
/// Terminal outcome type.
mod block_outcome;
/// Target capability trait.
mod block_target;
/// Limit strategy type.
mod bound;
/// Cooperative cancellation switch.
mod cancellation_token;
/// Completion future adapter.
mod completion_future;
/// Single-shot completion primitive.
mod completion_task;
/// Assembly policy trait.
mod group_assembler;
/// Shared input coordinator.
mod group_coordinator;
/// Block options.
mod grouping_options;
/// One-tuple-per-group policy.
mod join_assembler;
/// Join block.
mod join_block;
/// Link registration handle.
mod link_handle;
/// Per-link options.
mod link_options;
/// Message identity type.
mod message_header;
/// Offer decision codes.
mod offer_decision;
/// Job scheduling cell.
mod pump_cell;
/// Single-message producer behind `send_async`.
mod send_async_source;
/// Future returned by `send_async`.
mod send_future;
/// Output queue and link registry.
mod source_core;
/// Producer capability trait.
mod source_producer;
/// Target endpoint handle.
mod target_endpoint;
/// Target identity type.
mod target_id;
/// Coordinator surface for target endpoints.
mod target_ops;
/// Per-target coordinator state.
mod target_state;

pub use batched_join_block::BatchedJoinBlock;
pub use block_error::BlockError;
pub use block_outcome::BlockOutcome;
pub use block_target::BlockTarget;
pub use bound::Bound;
pub use cancellation_token::CancellationToken;
pub use completion_future::CompletionFuture;
pub use completion_task::CompletionTask;
pub use grouping_options::GroupingOptions;
pub use join_block::JoinBlock;
pub use link_handle::LinkHandle;
pub use link_options::{LinkFilter, LinkOptions};
pub use message_header::MessageHeader;
pub use offer_decision::OfferDecision;
pub use send_future::SendFuture;
pub use source_producer::SourceProducer;
pub use target_endpoint::TargetEndpoint;
pub use target_id::TargetId;
