use serde_json::json;

use lambda_runtime_core::invocation::{InvocationRequest, InvocationResponse};

use crate::client::RuntimeClient;
use crate::logging::{log_error, log_info};
use crate::transport::Transport;

/// Environment variable naming the control plane `host:port`.
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

const MAX_POLL_RETRIES: usize = 3;
const COMPONENT: &str = "poll_loop";

/// Configuration failure raised before the poll loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Drives poll, invoke, report against one `RuntimeClient` until either the
/// poll retry ceiling is exhausted or a result post fails.
///
/// Everything runs on the calling thread; the only state carried across
/// cycles is the retry counter.
pub struct PollLoop<'a, T: Transport, F> {
    client: &'a RuntimeClient<T>,
    handler: F,
    retries: usize,
}

impl<'a, T, F> PollLoop<'a, T, F>
where
    T: Transport,
    F: FnMut(&InvocationRequest) -> InvocationResponse,
{
    pub fn new(client: &'a RuntimeClient<T>, handler: F) -> Self {
        Self {
            client,
            handler,
            retries: 0,
        }
    }

    /// Run until termination. Returning means "give up"; restarting the
    /// process is the caller's decision.
    pub fn run(mut self) {
        while self.retries < MAX_POLL_RETRIES {
            let next = self.client.get_next();
            if !next.is_success() {
                // Connectivity and HTTP failures feed the same counter, with
                // no delay between attempts.
                self.retries += 1;
                continue;
            }
            self.retries = 0;

            let request = next.into_result();
            log_info(
                COMPONENT,
                "invocation_received",
                json!({ "request_id": request.request_id }),
            );

            let response = (self.handler)(&request);
            let posted = if response.is_success() {
                self.client.post_success(&request.request_id, &response)
            } else {
                self.client.post_failure(&request.request_id, &response)
            };

            if !posted.is_success() {
                // A failed result post ends the loop outright; result posts
                // are never retried.
                log_error(
                    COMPONENT,
                    "result_post_failed",
                    json!({
                        "request_id": request.request_id,
                        "error": posted.error().to_string(),
                    }),
                );
                return;
            }
        }

        log_error(
            COMPONENT,
            "retry_ceiling_reached",
            json!({ "retries": self.retries, "max_retries": MAX_POLL_RETRIES }),
        );
    }
}

/// Run `handler` against the control plane named by `AWS_LAMBDA_RUNTIME_API`.
///
/// A missing address is a fatal misconfiguration and prevents the loop from
/// starting. A normal return means the loop gave up, either by exhausting
/// the poll retry ceiling or by failing a result post; the two are not
/// distinguished to the caller.
pub fn run_handler<F>(handler: F) -> Result<(), ConfigError>
where
    F: FnMut(&InvocationRequest) -> InvocationResponse,
{
    let address = std::env::var(RUNTIME_API_ENV)
        .map_err(|_| ConfigError::new(format!("{RUNTIME_API_ENV} must be configured")))?;
    run_handler_at(&address, handler);
    Ok(())
}

/// Address-injected form of [`run_handler`].
pub fn run_handler_at<F>(address: &str, handler: F)
where
    F: FnMut(&InvocationRequest) -> InvocationResponse,
{
    let client = RuntimeClient::new(address);
    log_info(COMPONENT, "poll_loop_started", json!({ "endpoint": address }));
    PollLoop::new(&client, handler).run();
}
