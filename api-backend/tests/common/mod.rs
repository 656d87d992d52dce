// Not every helper is used in every test, so we allow dead code
#![allow(dead_code)]

use std::time::Duration;

use api_backend::{
    server,
    types::{AppError, Environment, ErrorRecord, ResourceId, ValidatedJson},
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use validator::Validate;

/// Setup test environment variables and tracing
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 2, message = "Name is too short"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Greeting {
    pub text: String,
}

async fn raise(Json(record): Json<ErrorRecord>) -> Result<(), AppError> {
    Err(record.into())
}

async fn get_user(ResourceId(id): ResourceId) -> Json<Value> {
    Json(json!({ "id": id.to_string() }))
}

async fn create_user(ValidatedJson(user): ValidatedJson<NewUser>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({ "email": user.email, "name": user.name })),
    )
}

async fn greet(Json(greeting): Json<Greeting>) -> String {
    greeting.text
}

async fn explode() -> StatusCode {
    panic!("handler exploded");
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(3)).await;
    StatusCode::OK
}

/// Router with handlers that raise every kind of error the service handles
pub fn get_test_router() -> Router {
    setup_test_env();

    let routes = Router::new()
        .route("/errors", post(raise))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/greetings", post(greet))
        .route("/explode", get(explode))
        .route("/slow", get(slow));

    server::with_error_handling(routes, &Environment::Development)
}

/// Send a request through the router and return the status and JSON body
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response = router.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).expect("Response body is not JSON");
    (status, body)
}

/// Build a JSON POST request
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// Build a GET request
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}
