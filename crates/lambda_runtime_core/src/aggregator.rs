use std::collections::BTreeMap;

/// Accumulates headers, body, and the final status code for one transport
/// exchange. Scoped to a single exchange; a fresh aggregator is created per
/// call.
#[derive(Debug, Default, Clone)]
pub struct ResponseAggregator {
    headers: BTreeMap<String, String>,
    body: String,
    status: Option<u16>,
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one header. Lookup keys are ASCII-lowercased; the value keeps
    /// its original form.
    pub fn insert_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn append_body(&mut self, chunk: &str) {
        self.body.push_str(chunk);
    }

    /// Record the final status code. Each exchange completes exactly once.
    pub fn complete(&mut self, status: u16) {
        assert!(
            self.status.is_none(),
            "exchange already completed with status {:?}",
            self.status
        );
        self.status = Some(status);
    }

    /// Status code of the completed exchange, `None` while still in flight.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Case-insensitive header lookup returning the original value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}
