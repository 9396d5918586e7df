use crate::gateways::{
    CheckoutGateway, CheckoutPreference, GatewayMerchantOrder, GatewayPaymentDetails,
    PreferenceRequest,
};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned gateway used by tests and local runs without credentials.
#[derive(Default)]
pub struct MockCheckoutGateway {
    pub preference: Option<CheckoutPreference>,
    pub payments: HashMap<String, GatewayPaymentDetails>,
    pub merchant_orders: HashMap<String, GatewayMerchantOrder>,
    pub preference_calls: Mutex<Vec<PreferenceRequest>>,
}

impl MockCheckoutGateway {
    pub fn with_preference(preference: CheckoutPreference) -> Self {
        Self {
            preference: Some(preference),
            ..Default::default()
        }
    }

    pub fn preference_call_count(&self) -> usize {
        self.preference_calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for MockCheckoutGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_preference(&self, request: &PreferenceRequest) -> Result<CheckoutPreference> {
        self.preference_calls.lock().unwrap().push(request.clone());
        self.preference
            .clone()
            .ok_or_else(|| anyhow!("mock preference failure"))
    }

    async fn get_payment(&self, gateway_payment_id: &str) -> Result<GatewayPaymentDetails> {
        self.payments
            .get(gateway_payment_id)
            .cloned()
            .ok_or_else(|| anyhow!("mock gateway has no payment {}", gateway_payment_id))
    }

    async fn get_merchant_order(&self, order_id: &str) -> Result<GatewayMerchantOrder> {
        self.merchant_orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| anyhow!("mock gateway has no merchant order {}", order_id))
    }
}
