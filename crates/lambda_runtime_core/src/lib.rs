//! Shared runtime protocol primitives.
//!
//! This crate owns the invocation request/response contract, the outcome type
//! used for every control-plane call, and per-exchange response aggregation.
//! It intentionally excludes HTTP transport and poll-loop concerns.

pub mod aggregator;
pub mod invocation;
pub mod outcome;
