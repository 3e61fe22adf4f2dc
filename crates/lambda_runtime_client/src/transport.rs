use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;

use lambda_runtime_core::aggregator::ResponseAggregator;

/// Connection setup is the only time-bounded part of an exchange; waiting for
/// the control plane to hand out work is intentionally unbounded.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

const USER_AGENT_PRODUCT: &str = "lambda-runtime-client";

/// Fixed product/version user agent, computed once and reused for every call.
pub fn user_agent() -> &'static str {
    static USER_AGENT: OnceLock<String> = OnceLock::new();
    USER_AGENT.get_or_init(|| format!("{USER_AGENT_PRODUCT}/{}", env!("CARGO_PKG_VERSION")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One outbound control-plane request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    pub method: HttpMethod,
    pub url: &'a str,
    pub body: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

impl<'a> TransportRequest<'a> {
    pub fn get(url: &'a str) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            body: None,
            content_type: None,
        }
    }

    pub fn post(url: &'a str, body: &'a str, content_type: &'a str) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            body: Some(body),
            content_type: Some(content_type),
        }
    }
}

/// Raised when no HTTP exchange completed at all.
#[derive(Debug)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::new(error.to_string())
    }
}

/// Blocking request/response exchange with the control plane.
///
/// Implementations stream headers, body chunks, and the final status code
/// into the aggregator; an `Err` means no exchange completed.
pub trait Transport {
    fn exchange(
        &self,
        request: &TransportRequest<'_>,
        aggregator: &mut ResponseAggregator,
    ) -> Result<(), TransportError>;
}

/// Production transport built on `reqwest`'s blocking client.
///
/// The read timeout is disabled because the control plane parks the
/// invocation/next connection while awaiting work; only connection setup is
/// bounded. The declared content length is sent as-is, with no
/// `Expect: 100-continue` negotiation.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None)
            .user_agent(user_agent())
            .build()
            .expect("failed to build runtime http client");
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn exchange(
        &self,
        request: &TransportRequest<'_>,
        aggregator: &mut ResponseAggregator,
    ) -> Result<(), TransportError> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => {
                let mut builder = self.client.post(request.url);
                if let Some(content_type) = request.content_type {
                    builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
                }
                if let Some(body) = request.body {
                    builder = builder.body(body.to_string());
                }
                builder
            }
        };

        let response = builder.send()?;

        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                aggregator.insert_header(name.as_str(), value);
            }
        }
        let status = response.status().as_u16();
        let body = response.text().map_err(TransportError::from)?;
        aggregator.append_body(&body);
        aggregator.complete(status);

        Ok(())
    }
}
