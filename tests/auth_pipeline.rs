// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end behaviour of the auth gate through the real router.

mod common;

use axum::{body::Body, http::StatusCode};
use common::*;
use jsonwebtoken::Algorithm;
use serde_json::json;

fn is_request_id(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[tokio::test]
async fn api_key_alone_resolves_api_token_caller() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("x-api-key", API_SECRET)
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["kind"], "api_token_caller");
    assert!(body["identity"].get("subject").is_none());
    assert!(body["identity"].get("groups").is_none());
}

#[tokio::test]
async fn wrong_api_key_rejected_even_with_valid_bearer() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("x-api-key", "guess")
        .header("authorization", format!("Bearer {}", user_token("user_123", &[])))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "API key is invalid");
}

#[tokio::test]
async fn wrong_api_key_rejected_on_public_route() {
    let app = TestApp::new();
    let request = get("/health").header("x-api-key", "guess").body(Body::empty()).unwrap();

    let (status, _) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_by_second_key_is_accepted() {
    let app = TestApp::new();
    let token = sign(
        Algorithm::RS512,
        SECONDARY_PRIVATE,
        json!({ "sub": "user_456", "groups": ["staff"] }),
    );
    let request = get("/v1/whoami")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["kind"], "registered_user");
    assert_eq!(body["identity"]["subject"], "user_456");
    assert_eq!(body["identity"]["groups"], json!(["staff"]));
}

#[tokio::test]
async fn empty_subject_is_unauthorized() {
    let app = TestApp::new();
    let token = sign(Algorithm::RS256, PRIMARY_PRIVATE, json!({ "sub": "", "groups": ["admin"] }));
    let request = get("/health")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");
}

#[tokio::test]
async fn admin_group_without_elevation_header_is_registered_user() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("authorization", format!("Bearer {}", user_token("root", &["admin"])))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["kind"], "registered_user");
}

#[tokio::test]
async fn admin_group_with_elevation_header_is_admin() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("authorization", format!("Bearer {}", user_token("root", &["admin"])))
        .header(ELEVATION_HEADER, "available")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["kind"], "admin");
    assert_eq!(body["identity"]["subject"], "root");
}

#[tokio::test]
async fn valid_request_id_is_preserved() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("x-request-id", "1a2b3c4d")
        .header("x-api-key", API_SECRET)
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.headers()["x-request-id"], "1a2b3c4d");
}

#[tokio::test]
async fn invalid_request_id_is_replaced() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("x-request-id", "not-hex!")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request_id = body["requestid"].as_str().unwrap();
    assert_ne!(request_id, "not-hex!");
    assert!(is_request_id(request_id));
}

#[tokio::test]
async fn rejection_body_is_correlated() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("x-request-id", "0badc0de")
        .header("authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-request-id"], "0badc0de");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["requestid"], "0badc0de");
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn cookie_token_is_used_without_authorization_header() {
    let app = TestApp::new();
    let request = get("/v1/whoami")
        .header("cookie", format!("{COOKIE_NAME}={}", user_token("user_123", &[])))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["subject"], "user_123");
}

#[tokio::test]
async fn cookie_value_is_verified_as_bearer() {
    let app = TestApp::new();
    let request = get("/health")
        .header("cookie", format!("{COOKIE_NAME}=abc123"))
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");
}

#[tokio::test]
async fn bearer_without_token_segment_is_unauthorized() {
    let app = TestApp::new();
    let request = get("/health").header("authorization", "Bearer").body(Body::empty()).unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is malformed");
}

#[tokio::test]
async fn anonymous_allowed_on_health() {
    let app = TestApp::new();
    let (status, body) = app.send_json(get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["keys"], 2);
}

#[tokio::test]
async fn anonymous_rejected_on_authenticated_route() {
    let app = TestApp::new();
    let (status, body) = app.send_json(get("/v1/whoami").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is missing");
}

#[tokio::test]
async fn token_from_unknown_key_is_unauthorized() {
    let app = TestApp::new();
    let token = sign(Algorithm::RS384, PRIMARY_PRIVATE, json!({ "sub": "user_123" }));
    let request = get("/v1/whoami")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let (status, _) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_edited_groups_is_unauthorized() {
    let app = TestApp::new();
    let forged = tamper_payload(
        &user_token("user_123", &[]),
        json!({ "sub": "user_123", "groups": ["admin"], "iss": "test" }),
    );
    let request = get("/v1/whoami")
        .header("authorization", format!("Bearer {forged}"))
        .header(ELEVATION_HEADER, "available")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");
}

#[tokio::test]
async fn unsigned_token_is_unauthorized() {
    let app = TestApp::new();
    let token = unsigned_token(json!({ "sub": "root", "groups": ["admin"] }));
    let request = get("/v1/whoami")
        .header("authorization", format!("Bearer {token}"))
        .header(ELEVATION_HEADER, "available")
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");
}
