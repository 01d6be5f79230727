//! Assertions for problem+json error responses.
//!
//! Kept independent of backend types so the contract is checked from the
//! outside.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Wire shape of an error response.
#[derive(Debug, Deserialize)]
pub struct ProblemDetailsLike {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Check status, code and trace id parity, then hand back the parsed body
/// for further assertions.
///
/// - HTTP status and body `status` match `expected_status`
/// - `x-trace-id` header is present and equals the body `trace_id`
/// - body `code` equals `expected_code`
pub async fn assert_problem_details(
    resp: ServiceResponse<BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
) -> ProblemDetailsLike {
    assert_eq!(resp.status(), expected_status);

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));

    let trace_id_header = resp
        .headers()
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8")
        .to_string();

    let body = actix_web::test::read_body(resp).await;
    let problem: ProblemDetailsLike =
        serde_json::from_slice(&body).expect("body should be problem details JSON");

    assert_eq!(
        problem.trace_id, trace_id_header,
        "trace_id in body should match x-trace-id header"
    );
    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());

    problem
}
