use serde_json::json;

use lambda_runtime_core::aggregator::ResponseAggregator;
use lambda_runtime_core::invocation::{parse_deadline, InvocationRequest, InvocationResponse};
use lambda_runtime_core::outcome::Outcome;

use crate::logging::log_error;
use crate::transport::{HttpTransport, Transport, TransportRequest};

pub const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
pub const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
pub const CLIENT_CONTEXT_HEADER: &str = "lambda-runtime-client-context";
pub const COGNITO_IDENTITY_HEADER: &str = "lambda-runtime-cognito-identity";
pub const FUNCTION_ARN_HEADER: &str = "lambda-runtime-invoked-function-arn";
pub const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";

const RUNTIME_API_VERSION: &str = "2018-06-01";
const DEFAULT_SUCCESS_CONTENT_TYPE: &str = "text/html";
const COMPONENT: &str = "runtime_client";

/// Failure detail for one control-plane call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientError {
    /// No exchange completed at all, or a 2xx reply broke the protocol
    /// contract (missing request id).
    RequestNotMade,
    /// The exchange completed with a status outside the 2xx range.
    Http(u16),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::RequestNotMade => f.write_str("request not made"),
            ClientError::Http(status) => write!(f, "http status {status}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// The three control-plane endpoints, derived once from the configured
/// `host:port` address.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoints {
    next: String,
    result: String,
    init_error: String,
}

impl Endpoints {
    fn from_address(address: &str) -> Self {
        let base = format!(
            "http://{}/{RUNTIME_API_VERSION}/runtime",
            address.trim_end_matches('/')
        );
        Self {
            next: format!("{base}/invocation/next"),
            result: format!("{base}/invocation"),
            init_error: format!("{base}/init/error"),
        }
    }

    fn response_url(&self, request_id: &str) -> String {
        format!("{}/{request_id}/response", self.result)
    }

    fn error_url(&self, request_id: &str) -> String {
        format!("{}/{request_id}/error", self.result)
    }
}

/// Blocking client for the three control-plane operations. Effectively
/// immutable after construction and shared for the process lifetime.
#[derive(Debug, Clone)]
pub struct RuntimeClient<T: Transport = HttpTransport> {
    transport: T,
    endpoints: Endpoints,
}

impl RuntimeClient<HttpTransport> {
    /// Build a client for the control plane at `address` (`host:port`).
    pub fn new(address: &str) -> Self {
        Self::with_transport(address, HttpTransport::new())
    }
}

impl<T: Transport> RuntimeClient<T> {
    pub fn with_transport(address: &str, transport: T) -> Self {
        Self {
            transport,
            endpoints: Endpoints::from_address(address),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Block until the control plane hands out the next invocation.
    ///
    /// The connection may be parked indefinitely while the control plane
    /// waits for work; only connection setup is time-bounded.
    pub fn get_next(&self) -> Outcome<InvocationRequest, ClientError> {
        let mut aggregator = ResponseAggregator::new();
        let request = TransportRequest::get(&self.endpoints.next);

        if let Err(error) = self.transport.exchange(&request, &mut aggregator) {
            log_error(
                COMPONENT,
                "next_request_not_made",
                json!({ "error": error.message() }),
            );
            return Outcome::failure(ClientError::RequestNotMade);
        }

        let status = match aggregator.status() {
            Some(status) => status,
            None => return Outcome::failure(ClientError::RequestNotMade),
        };
        if !is_2xx(status) {
            log_error(COMPONENT, "next_http_error", json!({ "status": status }));
            return Outcome::failure(ClientError::Http(status));
        }

        let request_id = match aggregator.header(REQUEST_ID_HEADER) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                // 2xx without the request id header is a protocol violation;
                // it feeds the same retry path as a missing exchange.
                log_error(
                    COMPONENT,
                    "next_missing_request_id",
                    json!({ "status": status }),
                );
                return Outcome::failure(ClientError::RequestNotMade);
            }
        };

        let xray_trace_id = optional_header(&aggregator, TRACE_ID_HEADER);
        let client_context = optional_header(&aggregator, CLIENT_CONTEXT_HEADER);
        let cognito_identity = optional_header(&aggregator, COGNITO_IDENTITY_HEADER);
        let function_arn = optional_header(&aggregator, FUNCTION_ARN_HEADER);
        let deadline = aggregator.header(DEADLINE_HEADER).map(parse_deadline);

        Outcome::success(InvocationRequest {
            request_id,
            xray_trace_id,
            client_context,
            cognito_identity,
            function_arn,
            deadline,
            payload: aggregator.into_body(),
        })
    }

    /// Report a successful invocation result back to the control plane.
    pub fn post_success(
        &self,
        request_id: &str,
        response: &InvocationResponse,
    ) -> Outcome<(), ClientError> {
        let content_type = if response.content_type().is_empty() {
            DEFAULT_SUCCESS_CONTENT_TYPE
        } else {
            response.content_type()
        };
        self.post_result(
            &self.endpoints.response_url(request_id),
            response.payload(),
            content_type,
        )
    }

    /// Report a failed invocation result back to the control plane.
    pub fn post_failure(
        &self,
        request_id: &str,
        response: &InvocationResponse,
    ) -> Outcome<(), ClientError> {
        self.post_result(
            &self.endpoints.error_url(request_id),
            response.payload(),
            response.content_type(),
        )
    }

    /// Report an initialization failure. Never called by the poll loop
    /// itself; available to the hosting process before the loop starts.
    pub fn post_init_error(&self, response: &InvocationResponse) -> Outcome<(), ClientError> {
        self.post_result(
            &self.endpoints.init_error,
            response.payload(),
            response.content_type(),
        )
    }

    fn post_result(&self, url: &str, body: &str, content_type: &str) -> Outcome<(), ClientError> {
        let mut aggregator = ResponseAggregator::new();
        let request = TransportRequest::post(url, body, content_type);

        if let Err(error) = self.transport.exchange(&request, &mut aggregator) {
            log_error(
                COMPONENT,
                "result_request_not_made",
                json!({ "url": url, "error": error.message() }),
            );
            return Outcome::failure(ClientError::RequestNotMade);
        }

        match aggregator.status() {
            Some(status) if is_2xx(status) => Outcome::success(()),
            Some(status) => {
                log_error(
                    COMPONENT,
                    "result_http_error",
                    json!({ "url": url, "status": status }),
                );
                Outcome::failure(ClientError::Http(status))
            }
            None => Outcome::failure(ClientError::RequestNotMade),
        }
    }
}

fn is_2xx(status: u16) -> bool {
    (200..300).contains(&status)
}

fn optional_header(aggregator: &ResponseAggregator, name: &str) -> String {
    aggregator.header(name).unwrap_or_default().to_string()
}
