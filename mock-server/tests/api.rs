use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, User, AUTH_TOKEN};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization-token", token)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- user ---

#[tokio::test]
async fn user_is_served_on_both_paths() {
    for uri in ["/user", "/api/user"] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let user: User = body_json(resp).await;
        assert_eq!(user.id, 123);
        assert_eq!(user.first_name, "Wilder");
    }
}

// --- resource ---

#[tokio::test]
async fn resource_without_token_is_401() {
    let resp = app().oneshot(get("/api/resource")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Not Authenticated");
}

#[tokio::test]
async fn resource_with_token_is_200() {
    let resp = app()
        .oneshot(authed("GET", "/api/resource", AUTH_TOKEN, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["resource"], "the resource");
}

// --- greetings ---

#[tokio::test]
async fn greetings_echoes_json_body() {
    let resp = app()
        .oneshot(authed("POST", "/api/greetings", "", r#"{"name":"John Doe"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["body"]["name"], "John Doe");
}

// --- pets ---

#[tokio::test]
async fn pet_for_user_one_succeeds() {
    let resp = app()
        .oneshot(authed("POST", "/api/user/1/pet", AUTH_TOKEN, r#"{"name":"ばつ"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["userId"], 1);
}

#[tokio::test]
async fn pet_for_other_user_is_400() {
    let resp = app()
        .oneshot(authed("POST", "/api/user/2/pet", AUTH_TOKEN, "null"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Bad user id");
}

#[tokio::test]
async fn pet_with_wrong_token_is_401() {
    let resp = app()
        .oneshot(authed("POST", "/api/user/2/pet", "Bearer 123", "null"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- wait ---

#[tokio::test]
async fn wait_answers_after_delay() {
    let resp = app().oneshot(get("/api/wait?time=5")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "the end");
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_the_request() {
    let resp = app()
        .oneshot(authed("PATCH", "/api/echo?a=1&a=2", AUTH_TOKEN, "raw text"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.query.as_deref(), Some("a=1&a=2"));
    assert_eq!(echo.body, "raw text");
    assert!(echo
        .headers
        .iter()
        .any(|(name, value)| name == "authorization-token" && value == AUTH_TOKEN));
}
