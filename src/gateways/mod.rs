use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod mercadopago;
pub mod mock;

#[derive(Debug, Clone)]
pub struct PreferenceRequest {
    pub external_reference: String,
    pub description: String,
    pub amount: Decimal,
    pub cpf: String,
    pub payer_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPreference {
    pub id: String,
    pub init_point: String,
    pub sandbox_init_point: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayPaymentDetails {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub preference_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayMerchantOrder {
    #[serde(default)]
    pub preference_id: Option<String>,
    #[serde(default)]
    pub payments: Vec<OrderPaymentAttempt>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPaymentAttempt {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
}

#[async_trait::async_trait]
pub trait CheckoutGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_preference(&self, request: &PreferenceRequest) -> Result<CheckoutPreference>;

    async fn get_payment(&self, gateway_payment_id: &str) -> Result<GatewayPaymentDetails>;

    async fn get_merchant_order(&self, order_id: &str) -> Result<GatewayMerchantOrder>;
}
