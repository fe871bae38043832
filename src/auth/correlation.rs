// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request correlation identifiers.
//!
//! Every request gets an 8-character lowercase hex identifier. A well-formed
//! inbound `X-Request-Id` is reused verbatim, anything else is replaced by a
//! freshly generated one. The id is only ever used for logs and error bodies.

use std::fmt;

use axum::http::HeaderValue;
use ring::error::Unspecified;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;

/// Inbound and outbound correlation header.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Used when the system random source is unavailable.
const FALLBACK_REQUEST_ID: &str = "ffffffff";

const REQUEST_ID_LEN: usize = 8;

/// Short request correlation identifier (`^[0-9a-f]{8}$`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Reuse the inbound header value if it is well-formed, otherwise generate.
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse)
            .unwrap_or_else(Self::generate)
    }

    /// Accept exactly eight lowercase hex characters.
    pub fn parse(candidate: &str) -> Option<Self> {
        let well_formed = candidate.len() == REQUEST_ID_LEN
            && candidate
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

        well_formed.then(|| Self(candidate.to_string()))
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        Self::generate_with(|buf| rng.fill(buf))
    }

    fn generate_with<F>(fill: F) -> Self
    where
        F: FnOnce(&mut [u8]) -> Result<(), Unspecified>,
    {
        let mut bytes = [0u8; REQUEST_ID_LEN / 2];
        match fill(&mut bytes) {
            Ok(()) => Self(format!("{:08x}", u32::from_be_bytes(bytes))),
            Err(_) => {
                tracing::warn!("random source unavailable, using fallback request id");
                Self(FALLBACK_REQUEST_ID.to_string())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
