//! Tests for the domain error payload and its serialisation contract.

use super::*;
use crate::domain::TraceId;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn base_error() -> Error {
    Error::bad_request("bad")
}

#[rstest]
#[case(Error::bad_request("bad"), ErrorCode::BadRequest)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::timeout("slow"), ErrorCode::Timeout)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn only_timeouts_are_retryable() {
    assert!(ErrorCode::Timeout.is_retryable());
    assert!(!ErrorCode::BadRequest.is_retryable());
    assert!(!ErrorCode::NotFound.is_retryable());
    assert!(!ErrorCode::InternalError.is_retryable());
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::BadRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_codes_in_snake_case(expected_trace_id: String) {
    let error = Error::timeout("aggregation timed out")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"timeoutMs": 2000}));

    let value = serde_json::to_value(&error).expect("error serialises");
    assert_eq!(
        value,
        json!({
            "code": "timeout",
            "message": "aggregation timed out",
            "traceId": TRACE_ID,
            "details": {"timeoutMs": 2000},
        })
    );
}

#[rstest]
fn omits_absent_optional_fields() {
    let value = serde_json::to_value(Error::bad_request("bad")).expect("error serialises");
    assert_eq!(value, json!({"code": "bad_request", "message": "bad"}));
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({"code": "not_found", "message": "  "}));
    assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn deserialisation_does_not_inherit_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error: Error = TraceId::scope(trace_id, async move {
        serde_json::from_value(json!({"code": "bad_request", "message": "bad"}))
            .expect("valid payload")
    })
    .await;

    assert!(error.trace_id().is_none());
}
