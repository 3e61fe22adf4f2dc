use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const JSON_CONTENT_TYPE: &str = "application/json";

const DEADLINE_SECONDS_DIGITS: usize = 10;

/// One unit of work handed out by the control plane.
///
/// The request id is always non-empty on a successfully returned request;
/// the remaining metadata fields are copied verbatim from their headers when
/// present and left empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub payload: String,
    pub request_id: String,
    pub xray_trace_id: String,
    pub client_context: String,
    pub cognito_identity: String,
    pub function_arn: String,
    pub deadline: Option<DateTime<Utc>>,
}

impl InvocationRequest {
    /// Time left before the platform deadline; negative once past due.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.time_remaining_at(Utc::now())
    }

    pub fn time_remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline.map(|deadline| deadline - now)
    }
}

/// Body shape the control plane expects for a failed invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error_message: String,
    pub error_type: String,
    pub stack_trace: Vec<String>,
}

/// Result produced by the user handler for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    payload: String,
    content_type: String,
    success: bool,
}

impl InvocationResponse {
    /// Successful handler result. An empty content type falls back to
    /// `text/html` when the result is posted.
    pub fn success(payload: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            content_type: content_type.into(),
            success: true,
        }
    }

    /// Failed handler result. The body is the control plane's JSON error
    /// shape and the content type is always `application/json`.
    pub fn failure(error_message: impl Into<String>, error_type: impl Into<String>) -> Self {
        let body = ErrorPayload {
            error_message: error_message.into(),
            error_type: error_type.into(),
            stack_trace: Vec::new(),
        };
        Self {
            payload: serde_json::to_string(&body)
                .expect("serialization of error payload should not fail"),
            content_type: JSON_CONTENT_TYPE.to_string(),
            success: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Parse the split-format deadline header: the first ten digits are whole
/// seconds since the epoch, any remaining digits are the decimal fraction of
/// the final second.
///
/// The header is part of the control-plane contract; a malformed or
/// out-of-range value is an unrecoverable protocol violation and aborts.
pub fn parse_deadline(header: &str) -> DateTime<Utc> {
    let digits = header.trim();
    assert!(
        digits.len() >= DEADLINE_SECONDS_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()),
        "deadline header must be a digit string of at least {DEADLINE_SECONDS_DIGITS} digits, got {header:?}"
    );

    let (seconds, fraction) = digits.split_at(DEADLINE_SECONDS_DIGITS);
    let seconds: i64 = seconds
        .parse()
        .expect("deadline seconds exceed the representable range");
    let fraction_ms = if fraction.is_empty() {
        0
    } else {
        let raw: i64 = fraction
            .parse()
            .expect("deadline fraction exceeds the representable range");
        raw.checked_mul(1_000)
            .expect("deadline fraction exceeds the representable range")
            / 10_i64.pow(fraction.len() as u32)
    };

    let deadline_ms = seconds
        .checked_mul(1_000)
        .and_then(|ms| ms.checked_add(fraction_ms))
        .expect("deadline exceeds the representable range");
    assert!(deadline_ms > 0, "deadline must be after the epoch, got {header:?}");

    DateTime::from_timestamp_millis(deadline_ms).expect("deadline exceeds the representable range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_response_body_matches_control_plane_shape() {
        let response = InvocationResponse::failure("boom", "Error");

        let parsed: serde_json::Value =
            serde_json::from_str(response.payload()).expect("failure payload should be JSON");
        assert_eq!(
            parsed,
            json!({
                "errorMessage": "boom",
                "errorType": "Error",
                "stackTrace": [],
            })
        );
        assert_eq!(response.content_type(), "application/json");
        assert!(!response.is_success());
    }

    #[test]
    fn success_response_keeps_caller_content_type() {
        let response = InvocationResponse::success("<p>ok</p>", "text/html; charset=utf-8");

        assert!(response.is_success());
        assert_eq!(response.payload(), "<p>ok</p>");
        assert_eq!(response.content_type(), "text/html; charset=utf-8");
    }

    #[test]
    fn deadline_splits_seconds_and_fraction() {
        let deadline = parse_deadline("15990000009990");
        assert_eq!(deadline.timestamp(), 1_599_000_000);
        assert_eq!(deadline.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn deadline_accepts_millisecond_fraction() {
        let deadline = parse_deadline("1599000000123");
        assert_eq!(deadline.timestamp(), 1_599_000_000);
        assert_eq!(deadline.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn deadline_accepts_bare_seconds() {
        let deadline = parse_deadline("1599000000");
        assert_eq!(deadline.timestamp(), 1_599_000_000);
        assert_eq!(deadline.timestamp_subsec_millis(), 0);
    }

    #[test]
    #[should_panic(expected = "digit string")]
    fn deadline_rejects_non_digit_input() {
        parse_deadline("15990000x9990");
    }

    #[test]
    #[should_panic(expected = "after the epoch")]
    fn deadline_rejects_epoch_zero() {
        parse_deadline("0000000000");
    }

    #[test]
    fn time_remaining_goes_negative_past_the_deadline() {
        let request = InvocationRequest {
            payload: String::new(),
            request_id: "req-1".to_string(),
            xray_trace_id: String::new(),
            client_context: String::new(),
            cognito_identity: String::new(),
            function_arn: String::new(),
            deadline: Some(parse_deadline("15990000009990")),
        };

        let later = DateTime::from_timestamp_millis(1_599_000_001_999)
            .expect("fixed timestamp should be representable");
        let remaining = request
            .time_remaining_at(later)
            .expect("deadline should be present");
        assert_eq!(remaining.num_milliseconds(), -1_000);
    }

    #[test]
    fn time_remaining_is_absent_without_a_deadline() {
        let request = InvocationRequest {
            payload: String::new(),
            request_id: "req-1".to_string(),
            xray_trace_id: String::new(),
            client_context: String::new(),
            cognito_identity: String::new(),
            function_arn: String::new(),
            deadline: None,
        };

        assert_eq!(request.time_remaining(), None);
    }
}
