// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration service client.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::{endpoint, DownstreamError};

const SERVICE: &str = "registration service";

/// Registered attendee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendee {
    /// Registration-side identifier, used as the payer reference.
    pub id: String,
    /// Token subject the attendee registered with.
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Looks up attendees by token subject.
#[async_trait]
pub trait AttendeeService: Send + Sync {
    async fn lookup(&self, subject: &str) -> Result<Attendee, DownstreamError>;
}

/// Live adapter: `GET {base}/attendees/{subject}`.
pub struct HttpAttendeeService {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpAttendeeService {
    pub fn new(base_url: Url, client: reqwest::Client) -> Self {
        Self { base_url, client }
    }
}

#[async_trait]
impl AttendeeService for HttpAttendeeService {
    async fn lookup(&self, subject: &str) -> Result<Attendee, DownstreamError> {
        let url = endpoint(SERVICE, &self.base_url, &["attendees", subject])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DownstreamError::NotFound {
                service: SERVICE,
                what: "attendee".to_string(),
            }),
            status if !status.is_success() => Err(DownstreamError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            }),
            _ => response
                .json()
                .await
                .map_err(|source| DownstreamError::Transport {
                    service: SERVICE,
                    source,
                }),
        }
    }
}

/// In-memory double keyed by subject.
#[derive(Debug, Default)]
pub struct InMemoryAttendeeService {
    attendees: HashMap<String, Attendee>,
}

impl InMemoryAttendeeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.insert(attendee.subject.clone(), attendee);
        self
    }
}

#[async_trait]
impl AttendeeService for InMemoryAttendeeService {
    async fn lookup(&self, subject: &str) -> Result<Attendee, DownstreamError> {
        self.attendees
            .get(subject)
            .cloned()
            .ok_or_else(|| DownstreamError::NotFound {
                service: SERVICE,
                what: "attendee".to_string(),
            })
    }
}
