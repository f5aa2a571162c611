#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use inventory_api::{app, cli::ensure_admin, config::AppConfig, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// Router over a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::in_memory(AppConfig::development()).expect("test state");
        Self {
            router: app(state.clone()),
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        TestResponse { status, body }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register a regular user, returning (user id, token)
    pub async fn register(&self, email: &str) -> (String, String) {
        let res = self
            .post(
                "/api/users/register",
                None,
                json!({
                    "firstName": "Test",
                    "lastName": "User",
                    "email": email,
                    "password": PASSWORD
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {:?}", res.body);
        session(&res)
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/users/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Seed an administrator and sign in, returning (user id, token)
    pub async fn admin(&self) -> (String, String) {
        ensure_admin(&self.state.store, "Root", "Admin", "admin@example.com", PASSWORD)
            .await
            .expect("seed admin");
        let res = self.login("admin@example.com", PASSWORD).await;
        assert_eq!(res.status, StatusCode::OK);
        session(&res)
    }
}

fn session(res: &TestResponse) -> (String, String) {
    let id = res.data()["user"]["id"].as_str().expect("user id").to_string();
    let token = res.data()["token"].as_str().expect("token").to_string();
    (id, token)
}

pub fn widget(name: &str) -> Value {
    json!({
        "name": name,
        "category": "Tools",
        "price": 12.5,
        "stock": 7,
        "description": "A sturdy widget",
        "supplier": "Acme"
    })
}

/// Fails when any password material leaked into a response body
pub fn assert_no_password(body: &Value) {
    let text = body.to_string();
    assert!(!text.contains("password"), "password field in {}", text);
    assert!(!text.contains("$argon2"), "hash in {}", text);
}
