// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{HeaderName, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use payment_gateway::{
    api::router,
    auth::{AuthPolicy, CredentialSources, IdentityResolver, KeyRing},
    downstream::{Attendee, InMemoryAttendeeService, InMemoryPaymentAdapter},
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const PRIMARY_PUBLIC: &[u8] = include_bytes!("../fixtures/primary_public.pem");
pub const PRIMARY_PRIVATE: &[u8] = include_bytes!("../fixtures/primary_private.pem");
pub const SECONDARY_PUBLIC: &[u8] = include_bytes!("../fixtures/secondary_public.pem");
pub const SECONDARY_PRIVATE: &[u8] = include_bytes!("../fixtures/secondary_private.pem");

pub const API_SECRET: &str = "s3cr3t";
pub const COOKIE_NAME: &str = "session";
pub const ELEVATION_HEADER: &str = "x-admin-request";

/// Sign `claims` with one of the fixture private keys.
pub fn sign(alg: Algorithm, private_pem: &[u8], claims: Value) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem).expect("fixture key");
    encode(&Header::new(alg), &claims, &key).expect("sign token")
}

pub fn user_token(subject: &str, groups: &[&str]) -> String {
    sign(
        Algorithm::RS256,
        PRIMARY_PRIVATE,
        serde_json::json!({ "sub": subject, "groups": groups, "iss": "test" }),
    )
}

/// Replace the payload of a signed token while keeping its header and
/// signature.
pub fn tamper_payload(token: &str, claims: Value) -> String {
    let mut parts = token.split('.');
    let header = parts.next().unwrap_or_default();
    let signature = parts.nth(1).unwrap_or_default();
    format!("{header}.{}.{signature}", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

/// An `alg: none` token with an empty signature segment.
pub fn unsigned_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    format!("{header}.{}.", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

pub fn attendee(subject: &str, id: &str) -> Attendee {
    Attendee {
        id: id.to_string(),
        subject: subject.to_string(),
        display_name: None,
    }
}

/// Test application with a two-key ring and in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub payments: Arc<InMemoryPaymentAdapter>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_attendees(
            InMemoryAttendeeService::new()
                .with_attendee(attendee("user_123", "att_123"))
                .with_attendee(attendee("root", "att_root")),
        )
    }

    pub fn with_attendees(attendees: InMemoryAttendeeService) -> Self {
        let keyring = KeyRing::from_pems(&[PRIMARY_PUBLIC, SECONDARY_PUBLIC]).expect("keyring");
        let resolver = IdentityResolver::new(
            Arc::new(keyring),
            AuthPolicy {
                api_key_secret: Some(API_SECRET.to_string()),
                admin_group: "admin".to_string(),
                elevation_header: HeaderName::from_static(ELEVATION_HEADER),
                elevation_value: "available".to_string(),
            },
        );
        let sources = CredentialSources {
            cookie_name: COOKIE_NAME.to_string(),
            ..CredentialSources::default()
        };
        let payments = Arc::new(InMemoryPaymentAdapter::new());
        let state = AppState::new(resolver, sources, payments.clone(), Arc::new(attendees));

        Self {
            router: router(state),
            payments,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("infallible")
    }

    /// Send and decode the JSON body.
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

pub fn post(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
}
