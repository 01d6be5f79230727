use actix_web::http::StatusCode;
use actix_web::test;
use party_test_support::problem_details::assert_problem_details;
use serde_json::Value;

use crate::support::app_builder::create_test_app;
use crate::support::fixtures::memory_state;

#[actix_web::test]
async fn create_then_view_party() {
    let (_store, state) = memory_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::post().uri("/api/parties/Alice").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "group_1");
    assert_eq!(body["leader"], "Alice");
    assert_eq!(body["members"], serde_json::json!(["Alice"]));

    let req = test::TestRequest::get().uri("/api/parties/Alice").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn create_when_already_in_party_conflicts() {
    let (_store, state) = memory_state().await;
    state.parties.create_party("Alice").await.unwrap();
    let app = create_test_app(state).await;

    let req = test::TestRequest::post().uri("/api/parties/Alice").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "ALREADY_IN_PARTY", StatusCode::CONFLICT).await;
}

#[actix_web::test]
async fn view_without_party_is_not_found() {
    let (_store, state) = memory_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::get().uri("/api/parties/Nobody").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "PARTY_NOT_FOUND", StatusCode::NOT_FOUND).await;
}

#[actix_web::test]
async fn invalid_player_name_is_rejected() {
    let (_store, state) = memory_state().await;
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/parties/bad%20name")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "INVALID_PLAYER_NAME", StatusCode::BAD_REQUEST).await;
}

#[actix_web::test]
async fn invite_creates_sender_party() {
    let (store, state) = memory_state().await;
    let app = create_test_app(state.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/parties/Alice/invites/Bob")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    assert!(state.parties.is_player_leader("Alice").await.unwrap());
    assert_eq!(
        store.snapshot("pending_invites:Bob").get("sender:Alice").map(String::as_str),
        Some("true")
    );
}

#[actix_web::test]
async fn invite_conflicts() {
    let (_store, state) = memory_state().await;
    state.parties.create_party("Carol").await.unwrap();
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/parties/Alice/invites/Alice")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "SELF_INVITE", StatusCode::CONFLICT).await;

    let req = test::TestRequest::post()
        .uri("/api/parties/Alice/invites/Carol")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "ALREADY_IN_PARTY", StatusCode::CONFLICT).await;
}

#[actix_web::test]
async fn leader_only_actions_are_forbidden_to_members() {
    let (_store, state) = memory_state().await;
    state.parties.create_party("Alice").await.unwrap();
    state.parties.invite_player("Alice", "Bob").await.unwrap();
    state.parties.accept_invite("Alice", "Bob").await.unwrap();
    let app = create_test_app(state.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/parties/Bob/exclude/Alice")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "NOT_PARTY_LEADER", StatusCode::FORBIDDEN).await;

    let req = test::TestRequest::delete().uri("/api/parties/Bob").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "NOT_PARTY_LEADER", StatusCode::FORBIDDEN).await;

    assert_eq!(
        state.parties.get_party_members("Alice").await.unwrap(),
        vec!["Alice", "Bob"]
    );
}

#[actix_web::test]
async fn leader_excludes_then_disbands() {
    let (store, state) = memory_state().await;
    state.parties.create_party("Alice").await.unwrap();
    for member in ["Bob", "Carol"] {
        state.parties.invite_player("Alice", member).await.unwrap();
        state.parties.accept_invite("Alice", member).await.unwrap();
    }
    let app = create_test_app(state.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/parties/Alice/exclude/Bob")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(!state.parties.is_player_in_party("Bob").await.unwrap());

    let req = test::TestRequest::delete().uri("/api/parties/Alice").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(store.snapshot("group:group_1").is_empty());
}

#[actix_web::test]
async fn leave_is_always_no_content() {
    let (_store, state) = memory_state().await;
    state.parties.create_party("Alice").await.unwrap();
    let app = create_test_app(state.clone()).await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/parties/Alice/leave")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
    assert!(!state.parties.is_player_in_party("Alice").await.unwrap());
}
