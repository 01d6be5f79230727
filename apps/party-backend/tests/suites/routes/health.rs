use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use crate::support::app_builder::create_test_app;
use crate::support::fixtures::memory_state;

#[actix_web::test]
async fn health_reports_store_ok() {
    let (_store, state) = memory_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-trace-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
    assert!(body.get("store_error").is_none());
    assert!(body.get("store_generation").is_none());
}

#[actix_web::test]
async fn health_reports_store_outage() {
    let (store, state) = memory_state().await;
    let app = create_test_app(state).await;
    store.set_available(false);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"], "error");
    assert!(body["store_error"].is_string());
}
