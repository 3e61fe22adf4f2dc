#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use lambda_runtime_client::transport::{Transport, TransportError, TransportRequest};
use lambda_runtime_core::aggregator::ResponseAggregator;

/// One canned control-plane reply.
#[derive(Debug, Clone)]
pub struct FakeExchange {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl FakeExchange {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// A well-formed invocation/next reply carrying a request id.
    pub fn next_invocation(request_id: &str, payload: &str) -> Self {
        Self::with_status(200)
            .header("Lambda-Runtime-Aws-Request-Id", request_id)
            .body(payload)
    }

    /// A bare 2xx acknowledgement, as returned for result posts.
    pub fn accepted() -> Self {
        Self::with_status(202)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

/// Scripted step: serve a canned reply or fail the exchange entirely.
#[derive(Debug, Clone)]
pub enum ScriptedResult {
    Respond(FakeExchange),
    Unreachable,
}

/// Everything the client handed to the transport for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: Option<String>,
    pub content_type: Option<String>,
}

/// Transport fake that replays a fixed script and records every request.
/// The protocol is single-threaded, so interior mutability is enough.
pub struct ScriptedTransport {
    script: RefCell<VecDeque<ScriptedResult>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<ScriptedResult>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn exchange_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn exchange(
        &self,
        request: &TransportRequest<'_>,
        aggregator: &mut ResponseAggregator,
    ) -> Result<(), TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: request.url.to_string(),
            body: request.body.map(str::to_string),
            content_type: request.content_type.map(str::to_string),
        });

        let step = self
            .script
            .borrow_mut()
            .pop_front()
            .expect("transport script exhausted");

        match step {
            ScriptedResult::Unreachable => Err(TransportError::new("connection refused")),
            ScriptedResult::Respond(exchange) => {
                for (name, value) in &exchange.headers {
                    aggregator.insert_header(name, value);
                }
                aggregator.append_body(&exchange.body);
                aggregator.complete(exchange.status);
                Ok(())
            }
        }
    }
}
