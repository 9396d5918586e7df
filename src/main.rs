use axum::routing::{get, post};
use axum::Router;
use payments_checkout::config::AppConfig;
use payments_checkout::gateways::mercadopago::MercadoPagoGateway;
use payments_checkout::repo::payments_repo::PgPaymentStore;
use payments_checkout::service::notification_service::NotificationService;
use payments_checkout::service::payment_service::PaymentService;
use payments_checkout::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    // Missing credentials are fatal here, before the first request.
    let gateway = Arc::new(MercadoPagoGateway::from_config(
        &cfg.mercado_pago,
        reqwest::Client::new(),
    )?);

    let store = Arc::new(PgPaymentStore { pool: pool.clone() });

    let payment_service = PaymentService {
        store: store.clone(),
        gateway: gateway.clone(),
    };
    let notification_service = NotificationService {
        store,
        gateway,
    };

    let state = AppState {
        payment_service,
        notification_service,
        pool,
    };

    let app = Router::new()
        .route("/health", get(payments_checkout::http::handlers::payments::health))
        .route(
            "/api/payment",
            post(payments_checkout::http::handlers::payments::create_payment)
                .get(payments_checkout::http::handlers::payments::list_payments),
        )
        .route(
            "/api/payment/:id",
            get(payments_checkout::http::handlers::payments::get_payment)
                .put(payments_checkout::http::handlers::payments::update_payment),
        )
        .route(
            "/api/webhooks/mercadopago/notification",
            post(payments_checkout::http::handlers::webhooks::notification),
        )
        .route(
            "/api/webhooks/mercadopago/success",
            get(payments_checkout::http::handlers::returns::success),
        )
        .route(
            "/api/webhooks/mercadopago/failure",
            get(payments_checkout::http::handlers::returns::failure),
        )
        .route(
            "/api/webhooks/mercadopago/pending",
            get(payments_checkout::http::handlers::returns::pending),
        )
        .route("/ops/readiness", get(payments_checkout::http::handlers::ops::readiness))
        .route("/ops/liveness", get(payments_checkout::http::handlers::ops::liveness))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
