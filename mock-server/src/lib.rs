use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Header and value the protected routes expect.
pub const AUTH_HEADER: &str = "Authorization-token";
pub const AUTH_TOKEN: &str = "Bearer token";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct WaitParams {
    #[serde(default)]
    pub time: u64,
}

/// What `/api/echo` saw, so tests can assert on the wire request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/user", get(get_user))
        .route("/api/user", get(get_user))
        .route("/api/resource", get(get_resource))
        .route("/api/wait", get(wait))
        .route("/api/greetings", post(greetings))
        .route("/api/user/{user_id}/pet", post(create_pet))
        .route("/api/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| token == AUTH_TOKEN)
}

fn not_authenticated() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Not Authenticated" })),
    )
}

async fn get_user() -> Json<User> {
    Json(User {
        id: 123,
        first_name: "Wilder".to_string(),
        last_name: "Trujillo".to_string(),
    })
}

async fn get_resource(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return not_authenticated();
    }
    (StatusCode::OK, Json(json!({ "resource": "the resource" })))
}

async fn wait(Query(params): Query<WaitParams>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(params.time)).await;
    Json(json!({ "message": "the end" }))
}

async fn greetings(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "body": body }))
}

async fn create_pet(headers: HeaderMap, Path(user_id): Path<String>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return not_authenticated();
    }
    match user_id.parse::<u32>() {
        Ok(1) => (StatusCode::OK, Json(json!({ "userId": 1 }))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Bad user id" })),
        ),
    }
}

async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
