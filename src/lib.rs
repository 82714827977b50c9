use axum::routing::{get, post};
use axum::Router;

pub mod config;
pub mod domain {
    pub mod payment;
}
pub mod error;
pub mod http {
    pub mod handlers {
        pub mod docs;
        pub mod payments;
    }
}
pub mod provider;
pub mod repo;
pub mod service {
    pub mod payment_service;
}

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
}

/// Builds the full router. Factored out of `main` so the same app can be
/// served by the long-running binary or mounted inside another host.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::payments::health))
        .route("/api-docs", get(http::handlers::docs::swagger_ui))
        .route("/api-docs/openapi.json", get(http::handlers::docs::openapi_spec))
        .route(
            "/api/v1/payments",
            post(http::handlers::payments::create_payment)
                .get(http::handlers::payments::list_payments),
        )
        .route(
            "/api/v1/payments/:payment_id",
            get(http::handlers::payments::get_payment),
        )
        .with_state(state)
}
