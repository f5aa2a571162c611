mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use common::{assert_no_password, TestApp, PASSWORD};
use inventory_api::auth::{Claims, TokenService};
use inventory_api::types::Role;

#[tokio::test]
async fn health_endpoint_responds() {
    let app = TestApp::new();
    let res = app.get("/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["status"], "ok");
    assert_eq!(res.data()["database"], "memory");
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let app = TestApp::new();
    let res = app.get("/api/nowhere", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["status"], "fail");
    assert_eq!(res.message(), "Route Not Found");
}

#[tokio::test]
async fn register_returns_token_and_hides_password() {
    let app = TestApp::new();
    let res = app
        .post(
            "/api/users/register",
            None,
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "Ada@Example.com",
                "password": PASSWORD,
                "role": "admin"
            }),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["tokenType"], "Bearer");
    assert!(res.data()["expiresIn"].as_i64().unwrap() > 0);
    assert_eq!(res.data()["user"]["email"], "ada@example.com");
    // Self-registration never grants admin
    assert_eq!(res.data()["user"]["role"], "user");
    assert_no_password(&res.body);
}

#[tokio::test]
async fn register_reports_every_invalid_field() {
    let app = TestApp::new();
    let res = app
        .post(
            "/api/users/register",
            None,
            json!({ "firstName": "A", "email": "not-an-email", "password": "short" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = res.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["firstName", "lastName", "email", "password"]);
}

#[tokio::test]
async fn duplicate_email_differing_in_case_conflicts() {
    let app = TestApp::new();
    app.register("grace@example.com").await;

    let res = app
        .post(
            "/api/users/register",
            None,
            json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "GRACE@example.com",
                "password": PASSWORD
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(res.message().contains("email"));
}

#[tokio::test]
async fn login_succeeds_with_correct_password() {
    let app = TestApp::new();
    let (id, _) = app.register("linus@example.com").await;

    let res = app.login("LINUS@example.com", PASSWORD).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["user"]["id"], id.as_str());
    assert_no_password(&res.body);
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let app = TestApp::new();
    app.register("known@example.com").await;

    let wrong_password = app.login("known@example.com", "not-the-password").await;
    let unknown_email = app.login("nobody@example.com", PASSWORD).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.message(), "Invalid email or password");
}

#[tokio::test]
async fn me_requires_and_honors_a_token() {
    let app = TestApp::new();
    let anonymous = app.get("/api/users/me", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let (id, token) = app.register("me@example.com").await;
    let res = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["id"], id.as_str());
    assert_no_password(&res.body);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = TestApp::new();
    let (id, _) = app.register("late@example.com").await;

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::parse_str(&id).unwrap(),
        role: Role::User,
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = app.state.tokens.sign(&claims).unwrap();

    let res = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.message(), "Token has expired");
}

#[tokio::test]
async fn token_signed_with_another_key_is_rejected() {
    let app = TestApp::new();
    let (id, _) = app.register("forged@example.com").await;

    let foreign = TokenService::new("a-completely-different-signing-secret", 1).unwrap();
    let token = foreign
        .issue(Uuid::parse_str(&id).unwrap(), Role::Admin)
        .unwrap()
        .token;

    let res = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.message(), "Invalid token");
}

#[tokio::test]
async fn invalid_token_fails_even_on_public_routes() {
    let app = TestApp::new();
    let res = app.get("/api/inventory", Some("garbage")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.message(), "Authorization header must use Bearer token format");
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let app = TestApp::new();
    let (id, token) = app.register("gone@example.com").await;

    let res = app.delete(&format!("/api/users/{}", id), Some(&token)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let res = app.send(request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
}
