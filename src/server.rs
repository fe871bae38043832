// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server lifecycle.
//!
//! [`start`] returns a [`ServerHandle`] once the listener is bound; the same
//! handle is passed to [`shutdown`]. There is no process-wide server state.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio::task::JoinHandle;

use crate::config::TlsPaths;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to load TLS certificate or key: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("server stopped before it started listening")]
    NotListening,

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Running server.
pub struct ServerHandle {
    handle: Handle<SocketAddr>,
    task: JoinHandle<std::io::Result<()>>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Bind `addr` and serve `app` until [`shutdown`] is called.
///
/// Serves HTTPS when `tls` is given, plain HTTP otherwise.
pub async fn start(
    addr: SocketAddr,
    tls: Option<&TlsPaths>,
    app: Router,
) -> Result<ServerHandle, ServerError> {
    let handle = Handle::new();
    let service = app.into_make_service();

    let task = match tls {
        Some(paths) => {
            // Already installed is fine
            let _ = rustls::crypto::ring::default_provider().install_default();

            let config = RustlsConfig::from_pem_file(&paths.cert_path, &paths.key_path)
                .await
                .map_err(ServerError::Tls)?;
            tokio::spawn(
                axum_server::bind_rustls(addr, config)
                    .handle(handle.clone())
                    .serve(service),
            )
        }
        None => tokio::spawn(axum_server::bind(addr).handle(handle.clone()).serve(service)),
    };

    match handle.listening().await {
        Some(local_addr) => Ok(ServerHandle {
            handle,
            task,
            local_addr,
        }),
        None => match task.await? {
            Ok(()) => Err(ServerError::NotListening),
            Err(e) => Err(ServerError::Serve(e)),
        },
    }
}

/// Stop accepting connections and wait up to `grace` for in-flight requests.
pub async fn shutdown(server: ServerHandle, grace: Duration) -> Result<(), ServerError> {
    tracing::info!(addr = %server.local_addr, grace_secs = grace.as_secs(), "shutting down");
    server.handle.graceful_shutdown(Some(grace));
    server.task.await?.map_err(ServerError::Serve)
}
