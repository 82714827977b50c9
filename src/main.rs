use payments_api::config::AppConfig;
use payments_api::provider::stub::StubProvider;
use payments_api::repo::payments_repo::PaymentsRepo;
use payments_api::service::payment_service::PaymentService;
use payments_api::{app, AppState};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let payment_service = PaymentService {
        store: Arc::new(PaymentsRepo { pool }),
        provider: Arc::new(StubProvider),
    };
    let state = AppState { payment_service };

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    tracing::info!("swagger ui at http://{}/api-docs", cfg.bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
