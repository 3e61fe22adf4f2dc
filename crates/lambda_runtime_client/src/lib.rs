//! Control-plane integration for the custom runtime client.
//!
//! This crate owns runtime integration details (blocking HTTP transport, the
//! protocol client for the three control-plane operations, and the poll loop
//! that drives a user handler) on top of the contract primitives in
//! `lambda_runtime_core`.

pub mod client;
pub mod logging;
pub mod poll_loop;
pub mod transport;
