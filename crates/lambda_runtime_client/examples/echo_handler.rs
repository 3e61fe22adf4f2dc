//! Minimal custom runtime: echo every invocation payload back as JSON.
//!
//! Expects `AWS_LAMBDA_RUNTIME_API` to name the control plane `host:port`.

use lambda_runtime_client::poll_loop::run_handler;
use lambda_runtime_core::invocation::{InvocationRequest, InvocationResponse};

fn main() {
    let result = run_handler(|request: &InvocationRequest| {
        if let Some(remaining) = request.time_remaining() {
            eprintln!(
                "handling {} with {}ms remaining",
                request.request_id,
                remaining.num_milliseconds()
            );
        }
        InvocationResponse::success(request.payload.clone(), "application/json")
    });

    if let Err(error) = result {
        eprintln!("runtime not started: {error}");
        std::process::exit(1);
    }
}
