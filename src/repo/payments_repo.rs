use crate::domain::payment::{Payment, PaymentFilter, PaymentMethod, PaymentStatus};
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct NewPayment {
    pub cpf: String,
    pub description: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payer_email: Option<String>,
}

/// Result of a status write. Terminal states are sticky: the first terminal
/// write wins, re-applying the same status is a no-op, and a conflicting
/// terminal write is reported without overwriting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    Applied,
    AlreadySet,
    Conflict,
    NotFound,
}

#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, input: NewPayment) -> Result<Payment>;

    async fn save(&self, payment: &Payment) -> Result<Payment>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;

    async fn find_by_preference_id(&self, preference_id: &str) -> Result<Option<Payment>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        gateway_payment_id: Option<&str>,
    ) -> Result<StatusWrite>;

    async fn find_all(&self, filter: &PaymentFilter) -> Result<Vec<Payment>>;

    async fn mark_merchant_order_pending(
        &self,
        order_id: &str,
        payload: &serde_json::Value,
    ) -> Result<()>;

    async fn mark_merchant_order_processed(
        &self,
        order_id: &str,
        payload: &serde_json::Value,
    ) -> Result<()>;
}

#[derive(Clone)]
pub struct PgPaymentStore {
    pub pool: PgPool,
}

impl PgPaymentStore {
    async fn record_merchant_order(
        &self,
        order_id: &str,
        state: &str,
        payload: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO merchant_order_events (order_id, state, payload_json) VALUES ($1, $2, $3)",
        )
        .bind(order_id)
        .bind(state)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_payment(row: &PgRow) -> Result<Payment> {
    let method: String = row.get("payment_method");
    let status: String = row.get("status");
    Ok(Payment {
        id: row.get("id"),
        cpf: row.get("cpf"),
        description: row.get("description"),
        amount: row.get("amount"),
        payment_method: PaymentMethod::parse(&method)
            .ok_or_else(|| anyhow!("unknown payment_method in store: {}", method))?,
        status: PaymentStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown status in store: {}", status))?,
        external_reference: row.get("external_reference"),
        gateway_preference_id: row.get("gateway_preference_id"),
        gateway_payment_id: row.get("gateway_payment_id"),
        checkout_url: row.get("checkout_url"),
        payer_email: row.get("payer_email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const PAYMENT_COLUMNS: &str = "id, cpf, description, amount, payment_method, status, \
     external_reference, gateway_preference_id, gateway_payment_id, checkout_url, payer_email, \
     created_at, updated_at";

#[async_trait::async_trait]
impl PaymentStore for PgPaymentStore {
    async fn create(&self, input: NewPayment) -> Result<Payment> {
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (id, cpf, description, amount, payment_method, status, external_reference, payer_email)
            VALUES ($1, $2, $3, $4, $5, 'PENDING', $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.cpf)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.payment_method.as_str())
        .bind(id.to_string())
        .bind(&input.payer_email)
        .fetch_one(&self.pool)
        .await?;

        row_to_payment(&row)
    }

    async fn save(&self, payment: &Payment) -> Result<Payment> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (id, cpf, description, amount, payment_method, status, external_reference,
                                  gateway_preference_id, gateway_payment_id, checkout_url, payer_email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                cpf = EXCLUDED.cpf,
                description = EXCLUDED.description,
                amount = EXCLUDED.amount,
                payment_method = EXCLUDED.payment_method,
                status = EXCLUDED.status,
                external_reference = EXCLUDED.external_reference,
                gateway_preference_id = EXCLUDED.gateway_preference_id,
                gateway_payment_id = EXCLUDED.gateway_payment_id,
                checkout_url = EXCLUDED.checkout_url,
                payer_email = EXCLUDED.payer_email,
                updated_at = now()
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(payment.id)
        .bind(&payment.cpf)
        .bind(&payment.description)
        .bind(payment.amount)
        .bind(payment.payment_method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.external_reference)
        .bind(&payment.gateway_preference_id)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.checkout_url)
        .bind(&payment.payer_email)
        .bind(payment.created_at)
        .fetch_one(&self.pool)
        .await?;

        row_to_payment(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    async fn find_by_preference_id(&self, preference_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE gateway_preference_id = $1"
        ))
        .bind(preference_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_payment).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        gateway_payment_id: Option<&str>,
    ) -> Result<StatusWrite> {
        let applied = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, gateway_payment_id = COALESCE($3, gateway_payment_id), updated_at = now()
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(gateway_payment_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if applied == 1 {
            return Ok(StatusWrite::Applied);
        }

        let current = sqlx::query("SELECT status FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match current {
            None => StatusWrite::NotFound,
            Some(row) => {
                let stored: String = row.get("status");
                if stored == status.as_str() {
                    StatusWrite::AlreadySet
                } else {
                    StatusWrite::Conflict
                }
            }
        })
    }

    async fn find_all(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS} FROM payments
            WHERE ($1::text IS NULL OR cpf = $1)
              AND ($2::text IS NULL OR payment_method = $2)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(&filter.cpf)
        .bind(filter.payment_method.map(|m| m.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    async fn mark_merchant_order_pending(
        &self,
        order_id: &str,
        payload: &serde_json::Value,
    ) -> Result<()> {
        tracing::warn!("merchant order {} has no payment attempts yet", order_id);
        self.record_merchant_order(order_id, "PENDING", payload).await
    }

    async fn mark_merchant_order_processed(
        &self,
        order_id: &str,
        payload: &serde_json::Value,
    ) -> Result<()> {
        tracing::info!("merchant order {} processed", order_id);
        self.record_merchant_order(order_id, "PROCESSED", payload).await
    }
}
