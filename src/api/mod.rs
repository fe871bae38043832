// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{auth_gate, Identity},
    downstream::{PaymentReceipt, PaymentStatus},
    models::{CreateTransactionRequest, HealthResponse, WhoAmIResponse},
    state::AppState,
};

pub mod health;
pub mod transactions;
pub mod whoami;

/// Build the application router. Every route sits behind the auth gate.
pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/whoami", get(whoami::whoami))
        .route("/transactions", post(transactions::create_transaction))
        .route("/transactions/{reference}", get(transactions::get_transaction))
        .route(
            "/transactions/{reference}/refund",
            post(transactions::refund_transaction),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        whoami::whoami,
        transactions::create_transaction,
        transactions::get_transaction,
        transactions::refund_transaction
    ),
    components(
        schemas(
            HealthResponse,
            WhoAmIResponse,
            Identity,
            CreateTransactionRequest,
            PaymentReceipt,
            PaymentStatus
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Identity", description = "Caller identity"),
        (name = "Transactions", description = "Payment transactions")
    )
)]
struct ApiDoc;
