//! Tests for error construction, trace capture and serialisation.

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
    Error::conflict("Рецепт уже в избранном.")
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::conflict("twice"), ErrorCode::Conflict)]
#[case(Error::empty_resource("nothing"), ErrorCode::EmptyResource)]
#[case(Error::forbidden("nope"), ErrorCode::Forbidden)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
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
fn invalid_field_names_field_and_code() {
    let error = Error::invalid_field("ingredients", "duplicate", "Ингредиенты не должны повторяться.");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details(),
        Some(&json!({"field": "ingredients", "code": "duplicate"}))
    );
}

#[rstest]
fn serialises_snake_case_code_and_camel_case_fields(
    base_error: Error,
    expected_trace_id: String,
) {
    let value = serde_json::to_value(base_error.with_trace_id(expected_trace_id))
        .expect("error serialises");
    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "Рецепт уже в избранном.",
            "traceId": TRACE_ID,
        })
    );
}

#[rstest]
fn deserialising_rejects_blank_messages() {
    let payload = json!({"code": "not_found", "message": " "});
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
