use crate::config::MercadoPagoConfig;
use crate::gateways::{
    CheckoutGateway, CheckoutPreference, GatewayMerchantOrder, GatewayPaymentDetails,
    PreferenceRequest,
};
use anyhow::{bail, Context, Result};
use serde_json::json;

pub struct MercadoPagoGateway {
    pub base_url: String,
    pub access_token: String,
    pub timeout_ms: u64,
    pub success_url: Option<String>,
    pub failure_url: Option<String>,
    pub pending_url: Option<String>,
    pub notification_url: Option<String>,
    pub client: reqwest::Client,
}

impl MercadoPagoGateway {
    pub fn from_config(cfg: &MercadoPagoConfig, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            base_url: cfg.base_url.clone(),
            access_token: cfg.resolve_token()?,
            timeout_ms: cfg.timeout_ms,
            success_url: cfg.success_url.clone(),
            failure_url: cfg.failure_url.clone(),
            pending_url: cfg.pending_url.clone(),
            notification_url: cfg.notification_url.clone(),
            client,
        })
    }

    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    async fn get_json(&self, url: String) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout())
            .send()
            .await
            .with_context(|| format!("gateway GET {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "gateway GET {} returned {}: {}",
                url,
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            );
        }

        Ok(resp.json().await?)
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for MercadoPagoGateway {
    fn name(&self) -> &'static str {
        "mercadopago"
    }

    async fn create_preference(&self, request: &PreferenceRequest) -> Result<CheckoutPreference> {
        let url = format!("{}/checkout/preferences", self.base_url);
        let body = json!({
            "items": [{
                "id": request.external_reference,
                "title": request.description,
                "quantity": 1,
                "unit_price": request.amount,
                "currency_id": "BRL"
            }],
            "external_reference": request.external_reference,
            "payer": {
                "email": request.payer_email,
                "identification": { "type": "CPF", "number": request.cpf }
            },
            "payment_methods": {
                "excluded_payment_types": [{ "id": "ticket" }],
                "installments": 12
            },
            "back_urls": {
                "success": self.success_url,
                "failure": self.failure_url,
                "pending": self.pending_url
            },
            "auto_return": "approved",
            "notification_url": self.notification_url
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .context("preference creation request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "preference creation returned {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            );
        }

        let preference: CheckoutPreference = resp.json().await?;
        tracing::info!("preference created: {}", preference.id);
        Ok(preference)
    }

    async fn get_payment(&self, gateway_payment_id: &str) -> Result<GatewayPaymentDetails> {
        let url = format!("{}/v1/payments/{}", self.base_url, gateway_payment_id);
        let v = self.get_json(url).await?;

        // The payment id comes back numeric; everything else is optional.
        Ok(GatewayPaymentDetails {
            id: v.get("id").map(|id| match id {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            status: v.get("status").and_then(|s| s.as_str()).map(str::to_string),
            external_reference: v
                .get("external_reference")
                .and_then(|s| s.as_str())
                .map(str::to_string),
            preference_id: v
                .get("preference_id")
                .and_then(|s| s.as_str())
                .map(str::to_string),
        })
    }

    async fn get_merchant_order(&self, order_id: &str) -> Result<GatewayMerchantOrder> {
        let url = format!("{}/merchant_orders/{}", self.base_url, order_id);
        let v = self.get_json(url).await?;
        Ok(serde_json::from_value(v)?)
    }
}
