// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment Gateway - Authenticated Transaction Gateway Service
//!
//! This crate gates access to payment-transaction operations behind a
//! request authentication and role-resolution pipeline.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication and authorization (API key + multi-key RSA JWT)
//! - `downstream` - Payment provider and registration service adapters
//! - `server` - Server start/shutdown with an explicit handle

pub mod api;
pub mod auth;
pub mod config;
pub mod downstream;
pub mod error;
pub mod models;
pub mod server;
pub mod state;
