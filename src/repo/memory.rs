use crate::domain::payment::{Payment, PaymentFilter, PaymentStatus};
use crate::repo::payments_repo::{NewPayment, PaymentStore, StatusWrite};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store backed by process memory. Used by the test suite and by local runs
/// without Postgres; implements the same stickiness rules as the Pg store.
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
    pending_orders: Arc<RwLock<Vec<String>>>,
    processed_orders: Arc<RwLock<Vec<String>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pending_orders(&self) -> Vec<String> {
        self.pending_orders.read().await.clone()
    }

    pub async fn processed_orders(&self) -> Vec<String> {
        self.processed_orders.read().await.clone()
    }
}

#[async_trait::async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, input: NewPayment) -> Result<Payment> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let payment = Payment {
            id,
            cpf: input.cpf,
            description: input.description,
            amount: input.amount,
            payment_method: input.payment_method,
            status: PaymentStatus::Pending,
            external_reference: id.to_string(),
            gateway_preference_id: None,
            gateway_payment_id: None,
            checkout_url: None,
            payer_email: input.payer_email,
            created_at: now,
            updated_at: now,
        };
        self.payments.write().await.insert(id, payment.clone());
        Ok(payment)
    }

    async fn save(&self, payment: &Payment) -> Result<Payment> {
        let mut saved = payment.clone();
        saved.updated_at = chrono::Utc::now();
        self.payments.write().await.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_by_preference_id(&self, preference_id: &str) -> Result<Option<Payment>> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|p| p.gateway_preference_id.as_deref() == Some(preference_id))
            .cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        gateway_payment_id: Option<&str>,
    ) -> Result<StatusWrite> {
        let mut payments = self.payments.write().await;
        let Some(payment) = payments.get_mut(&id) else {
            return Ok(StatusWrite::NotFound);
        };

        if payment.status == status {
            return Ok(StatusWrite::AlreadySet);
        }
        if payment.status.is_terminal() {
            return Ok(StatusWrite::Conflict);
        }

        payment.status = status;
        if let Some(gw) = gateway_payment_id {
            payment.gateway_payment_id = Some(gw.to_string());
        }
        payment.updated_at = chrono::Utc::now();
        Ok(StatusWrite::Applied)
    }

    async fn find_all(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| filter.cpf.as_deref().map_or(true, |cpf| p.cpf == cpf))
            .filter(|p| {
                filter
                    .payment_method
                    .map_or(true, |method| p.payment_method == method)
            })
            .cloned()
            .collect())
    }

    async fn mark_merchant_order_pending(
        &self,
        order_id: &str,
        _payload: &serde_json::Value,
    ) -> Result<()> {
        self.pending_orders.write().await.push(order_id.to_string());
        Ok(())
    }

    async fn mark_merchant_order_processed(
        &self,
        order_id: &str,
        _payload: &serde_json::Value,
    ) -> Result<()> {
        self.processed_orders.write().await.push(order_id.to_string());
        Ok(())
    }
}
