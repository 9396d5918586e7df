use payments_checkout::domain::payment::{CreatePaymentRequest, PaymentMethod, PaymentStatus};
use payments_checkout::gateways::mock::MockCheckoutGateway;
use payments_checkout::gateways::{
    CheckoutPreference, GatewayMerchantOrder, GatewayPaymentDetails, OrderPaymentAttempt,
};
use payments_checkout::repo::memory::InMemoryPaymentStore;
use payments_checkout::repo::payments_repo::PaymentStore;
use payments_checkout::service::notification_service::NotificationService;
use payments_checkout::service::payment_service::PaymentService;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const VALID_CPF: &str = "52998224725";

async fn create_pix_payment(store: Arc<InMemoryPaymentStore>) -> payments_checkout::domain::payment::Payment {
    let service = PaymentService {
        store,
        gateway: Arc::new(MockCheckoutGateway::default()),
    };
    service
        .create(CreatePaymentRequest {
            cpf: VALID_CPF.to_string(),
            description: "test order".to_string(),
            amount: dec!(100),
            payment_method: PaymentMethod::Pix,
            payer_email: None,
        })
        .await
        .unwrap()
}

fn details(
    gateway_payment_id: &str,
    status: &str,
    external_reference: Option<&str>,
    preference_id: Option<&str>,
) -> GatewayPaymentDetails {
    GatewayPaymentDetails {
        id: Some(gateway_payment_id.to_string()),
        status: Some(status.to_string()),
        external_reference: external_reference.map(str::to_string),
        preference_id: preference_id.map(str::to_string),
    }
}

fn notification_service(
    store: Arc<InMemoryPaymentStore>,
    gateway: MockCheckoutGateway,
) -> NotificationService {
    NotificationService {
        store,
        gateway: Arc::new(gateway),
    }
}

#[tokio::test]
async fn end_to_end_approved_payment_becomes_paid() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;
    assert_eq!(payment.status, PaymentStatus::Pending);

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-1".to_string(),
        details("gw-1", "approved", Some(&payment.external_reference), None),
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-1"}}))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
    assert_eq!(stored.gateway_payment_id.as_deref(), Some("gw-1"));
}

#[tokio::test]
async fn duplicate_approved_delivery_is_a_noop() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-1".to_string(),
        details("gw-1", "approved", Some(&payment.external_reference), None),
    );

    let service = notification_service(store.clone(), gateway);
    let body = json!({"topic": "payment", "data": {"id": "gw-1"}});
    service.handle(body.clone()).await;
    let after_first = store.find_by_id(payment.id).await.unwrap().unwrap();

    service.handle(body).await;
    let after_second = store.find_by_id(payment.id).await.unwrap().unwrap();

    assert_eq!(after_first.status, PaymentStatus::Paid);
    assert_eq!(after_second.status, PaymentStatus::Paid);
    assert_eq!(after_first.updated_at, after_second.updated_at);
}

#[tokio::test]
async fn stale_pending_never_downgrades_a_paid_payment() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-approved".to_string(),
        details("gw-approved", "approved", Some(&payment.external_reference), None),
    );
    gateway.payments.insert(
        "gw-stale".to_string(),
        details("gw-stale", "pending", Some(&payment.external_reference), None),
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-approved"}}))
        .await;
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-stale"}}))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
}

#[tokio::test]
async fn conflicting_terminal_signal_does_not_overwrite() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-approved".to_string(),
        details("gw-approved", "approved", Some(&payment.external_reference), None),
    );
    gateway.payments.insert(
        "gw-rejected".to_string(),
        details("gw-rejected", "rejected", Some(&payment.external_reference), None),
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-approved"}}))
        .await;
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-rejected"}}))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
}

#[tokio::test]
async fn rejected_payment_becomes_fail() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-1".to_string(),
        details("gw-1", "rejected", Some(&payment.external_reference), None),
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({"topic": "payment", "resource": "gw-1"}))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Fail);
}

#[tokio::test]
async fn external_reference_outranks_preference_id() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment_a = create_pix_payment(store.clone()).await;
    let mut payment_b = create_pix_payment(store.clone()).await;
    payment_b.gateway_preference_id = Some("pref-b".to_string());
    store.save(&payment_b).await.unwrap();

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-1".to_string(),
        details(
            "gw-1",
            "approved",
            Some(&payment_a.external_reference),
            Some("pref-b"),
        ),
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-1"}}))
        .await;

    let a = store.find_by_id(payment_a.id).await.unwrap().unwrap();
    let b = store.find_by_id(payment_b.id).await.unwrap().unwrap();
    assert_eq!(a.status, PaymentStatus::Paid);
    assert_eq!(b.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn preference_id_is_used_when_external_reference_misses() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let mut payment = create_pix_payment(store.clone()).await;
    payment.gateway_preference_id = Some("pref-1".to_string());
    store.save(&payment).await.unwrap();

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-1".to_string(),
        details("gw-1", "approved", None, Some("pref-1")),
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-1"}}))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
}

#[tokio::test]
async fn unmatched_notification_is_dropped() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.payments.insert(
        "gw-1".to_string(),
        details("gw-1", "approved", Some(&Uuid::new_v4().to_string()), None),
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-1"}}))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn merchant_order_without_attempts_is_marked_pending_only() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.merchant_orders.insert(
        "4242".to_string(),
        GatewayMerchantOrder {
            preference_id: Some("pref-1".to_string()),
            payments: vec![],
        },
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({
            "topic": "merchant_order",
            "resource": "https://api.mercadopago.com/merchant_orders/4242"
        }))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
    assert_eq!(store.pending_orders().await, vec!["4242".to_string()]);
    assert!(store.processed_orders().await.is_empty());
}

#[tokio::test]
async fn merchant_order_with_approved_attempt_applies_paid() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.merchant_orders.insert(
        "4242".to_string(),
        GatewayMerchantOrder {
            preference_id: None,
            payments: vec![
                OrderPaymentAttempt {
                    status: Some("rejected".to_string()),
                    external_reference: Some(payment.external_reference.clone()),
                },
                OrderPaymentAttempt {
                    status: Some("approved".to_string()),
                    external_reference: Some(payment.external_reference.clone()),
                },
            ],
        },
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({
            "topic": "merchant_order",
            "resource": "https://api.mercadopago.com/merchant_orders/4242"
        }))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
    assert_eq!(store.processed_orders().await, vec!["4242".to_string()]);
}

#[tokio::test]
async fn merchant_order_without_approved_attempt_only_marks_processed() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let mut gateway = MockCheckoutGateway::default();
    gateway.merchant_orders.insert(
        "4242".to_string(),
        GatewayMerchantOrder {
            preference_id: None,
            payments: vec![OrderPaymentAttempt {
                status: Some("rejected".to_string()),
                external_reference: Some(payment.external_reference.clone()),
            }],
        },
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({
            "topic": "merchant_order",
            "resource": "https://api.mercadopago.com/merchant_orders/4242"
        }))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
    assert_eq!(store.processed_orders().await, vec!["4242".to_string()]);
}

#[tokio::test]
async fn merchant_order_resolves_via_order_level_preference_id() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let mut payment = create_pix_payment(store.clone()).await;
    payment.gateway_preference_id = Some("pref-1".to_string());
    store.save(&payment).await.unwrap();

    let mut gateway = MockCheckoutGateway::default();
    gateway.merchant_orders.insert(
        "4242".to_string(),
        GatewayMerchantOrder {
            preference_id: Some("pref-1".to_string()),
            payments: vec![OrderPaymentAttempt {
                status: Some("approved".to_string()),
                external_reference: None,
            }],
        },
    );

    let service = notification_service(store.clone(), gateway);
    service
        .handle(json!({
            "topic": "merchant_order",
            "resource": "https://api.mercadopago.com/merchant_orders/4242"
        }))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
}

#[tokio::test]
async fn notification_without_identifier_is_ignored() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    let service = notification_service(store.clone(), MockCheckoutGateway::default());
    service.handle(json!({"topic": "payment", "data": {}})).await;
    service.handle(json!({"action": "payment.updated"})).await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn gateway_fetch_failure_drops_the_event() {
    let store = Arc::new(InMemoryPaymentStore::new());
    let payment = create_pix_payment(store.clone()).await;

    // Mock holds no payment details, so the fetch fails.
    let service = notification_service(store.clone(), MockCheckoutGateway::default());
    service
        .handle(json!({"topic": "payment", "data": {"id": "gw-unknown"}}))
        .await;

    let stored = store.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
}
