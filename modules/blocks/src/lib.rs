#![deny(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::missing_safety_doc)]
#![deny(clippy::redundant_field_names)]
#![deny(clippy::redundant_pattern)]
#![deny(clippy::redundant_static_lifetimes)]
#![deny(clippy::unnecessary_to_owned)]
#![deny(clippy::needless_borrow)]
#![deny(clippy::manual_ok_or)]
#![deny(clippy::manual_map)]
#![deny(clippy::manual_let_else)]
#![deny(clippy::unused_async)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::print_stdout)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::clone_on_copy)]
#![deny(clippy::len_without_is_empty)]
#![deny(clippy::from_over_into)]
#![deny(clippy::bool_comparison)]
#![deny(clippy::needless_bool)]
#![deny(clippy::match_like_matches_macro)]
#![deny(unreachable_pub)]

//! Grouping dataflow blocks.
//!
//! A block owns N input targets of the same element type and one output
//! source. [`core::JoinBlock`] emits an ordered length-N tuple once every
//! target has supplied a message; [`core::BatchedJoinBlock`] accepts messages
//! independently on every target and emits a length-N tuple of per-target
//! sequences whenever the combined count reaches the configured batch size.
//!
//! The engine underneath is a target/source coordination core: an
//! offer/reserve/consume protocol with upstream producers, greedy and
//! non-greedy (atomic multi-source) acquisition, a completion/fault/
//! cancellation state machine, bounded-capacity backpressure, and serialized
//! input- and output-processing jobs scheduled on a pluggable executor.

pub mod core;
pub mod runtime;
