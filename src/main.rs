// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use payment_gateway::{
    api::router,
    auth::IdentityResolver,
    config::{AppConfig, LogFormat},
    downstream::{self, HttpAttendeeService, HttpPaymentAdapter},
    server,
    state::AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "payment gateway stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // A bad key must stop startup rather than run with a degraded ring
    let keyring = config.load_keyring()?;
    tracing::info!(
        keys = keyring.len(),
        cookie_fallback = !config.credential_sources.cookie_name.is_empty(),
        api_key_enabled = config.policy.api_key_secret.is_some(),
        "Loaded bearer verification keys"
    );

    let client = downstream::http_client(config.downstream_timeout)?;
    let payments = Arc::new(HttpPaymentAdapter::new(
        config.payment_service_url.clone(),
        client.clone(),
    ));
    let attendees = Arc::new(HttpAttendeeService::new(
        config.attendee_service_url.clone(),
        client,
    ));

    let state = AppState::new(
        IdentityResolver::new(Arc::new(keyring), config.policy.clone()),
        config.credential_sources.clone(),
        payments,
        attendees,
    );

    let handle = server::start(config.bind_addr, config.tls.as_ref(), router(state)).await?;
    tracing::info!(
        addr = %handle.local_addr(),
        tls = config.tls.is_some(),
        "Payment gateway listening (docs at /docs)"
    );

    shutdown_signal().await;
    server::shutdown(handle, config.shutdown_grace).await?;
    tracing::info!("Payment gateway stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
