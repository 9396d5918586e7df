use crate::domain::payment::{Payment, PaymentStatus};
use crate::gateways::{CheckoutGateway, GatewayMerchantOrder};
use crate::reconcile::notification::{self, Notification};
use crate::reconcile::outcome::outcome_for;
use crate::repo::payments_repo::{PaymentStore, StatusWrite};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct NotificationService {
    pub store: Arc<dyn PaymentStore>,
    pub gateway: Arc<dyn CheckoutGateway>,
}

impl NotificationService {
    /// Entry point for webhook deliveries. The gateway expects nothing but
    /// an acknowledgement, so every failure is logged and swallowed here;
    /// redelivery is the gateway's job.
    pub async fn handle(&self, body: serde_json::Value) {
        let Some(notification) = notification::parse(&body) else {
            tracing::warn!("notification without usable identifier ignored: {}", body);
            return;
        };

        let result = match notification {
            Notification::Payment { gateway_payment_id } => {
                self.handle_payment(&gateway_payment_id).await
            }
            Notification::MerchantOrder { order_id } => {
                match self.gateway.get_merchant_order(&order_id).await {
                    Ok(order) => self.reconcile_merchant_order(&order_id, order).await,
                    Err(e) => Err(e),
                }
            }
        };

        if let Err(e) = result {
            tracing::warn!("notification dropped: {}", e);
        }
    }

    async fn handle_payment(&self, gateway_payment_id: &str) -> Result<()> {
        let details = self.gateway.get_payment(gateway_payment_id).await?;

        let payment = self
            .resolve_payment(
                details.external_reference.as_deref(),
                details.preference_id.as_deref(),
            )
            .await?;

        let Some(payment) = payment else {
            tracing::warn!(
                "no internal payment found for gateway payment {}",
                gateway_payment_id
            );
            return Ok(());
        };

        let Some(status) = details.status.as_deref().and_then(outcome_for) else {
            return Ok(());
        };

        self.apply_transition(&payment, status, details.id.as_deref().or(Some(gateway_payment_id)))
            .await
    }

    /// Two-tier matching. The external reference was assigned by us at
    /// creation and is authoritative; the preference id is a gateway-side
    /// correlation key consulted only when the stronger key yields nothing.
    async fn resolve_payment(
        &self,
        external_reference: Option<&str>,
        preference_id: Option<&str>,
    ) -> Result<Option<Payment>> {
        if let Some(reference) = external_reference {
            if let Ok(id) = Uuid::parse_str(reference) {
                if let Some(payment) = self.store.find_by_id(id).await? {
                    return Ok(Some(payment));
                }
            }
        }

        if let Some(preference_id) = preference_id {
            if let Some(payment) = self.store.find_by_preference_id(preference_id).await? {
                tracing::info!("payment located via preference id {}", preference_id);
                return Ok(Some(payment));
            }
        }

        Ok(None)
    }

    async fn apply_transition(
        &self,
        payment: &Payment,
        status: PaymentStatus,
        gateway_payment_id: Option<&str>,
    ) -> Result<()> {
        match self
            .store
            .update_status(payment.id, status, gateway_payment_id)
            .await?
        {
            StatusWrite::Applied => {
                tracing::info!("payment {} updated to {}", payment.id, status.as_str());
            }
            StatusWrite::AlreadySet => {
                tracing::debug!(
                    "payment {} already {}, duplicate delivery ignored",
                    payment.id,
                    status.as_str()
                );
            }
            StatusWrite::Conflict => {
                tracing::warn!(
                    "payment {} already terminal, conflicting {} signal dropped",
                    payment.id,
                    status.as_str()
                );
            }
            StatusWrite::NotFound => {
                tracing::warn!("payment {} vanished before status write", payment.id);
            }
        }
        Ok(())
    }

    /// Merchant orders arrive before, during and after the payment attempts
    /// they aggregate. With no attempts yet there is nothing to reconcile;
    /// otherwise the first approved attempt, in delivered order, decides.
    pub async fn reconcile_merchant_order(
        &self,
        order_id: &str,
        order: GatewayMerchantOrder,
    ) -> Result<()> {
        let payload = serde_json::to_value(&order)?;

        if order.payments.is_empty() {
            self.store
                .mark_merchant_order_pending(order_id, &payload)
                .await?;
            return Ok(());
        }

        let approved = order
            .payments
            .iter()
            .find(|attempt| attempt.status.as_deref() == Some("approved"));

        if let Some(attempt) = approved {
            let payment = self
                .resolve_payment(
                    attempt.external_reference.as_deref(),
                    order.preference_id.as_deref(),
                )
                .await?;

            match payment {
                Some(payment) => {
                    self.apply_transition(&payment, PaymentStatus::Paid, None).await?;
                }
                None => {
                    tracing::warn!(
                        "no internal payment found for merchant order {}",
                        order_id
                    );
                }
            }
        }

        self.store
            .mark_merchant_order_processed(order_id, &payload)
            .await
    }
}
