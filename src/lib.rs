pub mod config;
pub mod domain {
    pub mod cpf;
    pub mod payment;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
        pub mod returns;
        pub mod webhooks;
    }
}
pub mod reconcile {
    pub mod notification;
    pub mod outcome;
}
pub mod repo {
    pub mod memory;
    pub mod payments_repo;
}
pub mod service {
    pub mod notification_service;
    pub mod payment_service;
}

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub notification_service: service::notification_service::NotificationService,
    pub pool: sqlx::PgPool,
}
