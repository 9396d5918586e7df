use crate::domain::cpf;
use crate::domain::payment::{
    CreatePaymentRequest, ErrorEnvelope, ErrorPayload, Payment, PaymentFilter, PaymentMethod,
    UpdatePaymentRequest,
};
use crate::gateways::{CheckoutGateway, PreferenceRequest};
use crate::repo::payments_repo::{NewPayment, PaymentStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;
use validator::ValidateEmail;

#[derive(Clone)]
pub struct PaymentService {
    pub store: Arc<dyn PaymentStore>,
    pub gateway: Arc<dyn CheckoutGateway>,
}

type ServiceError = (axum::http::StatusCode, ErrorEnvelope);

impl PaymentService {
    pub async fn create(&self, req: CreatePaymentRequest) -> Result<Payment, ServiceError> {
        let normalized_cpf = cpf::normalize(&req.cpf);
        if normalized_cpf.len() != 11 {
            return Err(bad_request("INVALID_CPF", "CPF must contain exactly 11 digits"));
        }
        if !cpf::is_valid(&normalized_cpf) {
            return Err(bad_request("INVALID_CPF", "CPF check digits do not match"));
        }
        if req.amount <= Decimal::ZERO {
            return Err(bad_request("INVALID_AMOUNT", "amount must be greater than 0"));
        }
        if req.amount.normalize().scale() > 2 {
            return Err(bad_request(
                "INVALID_AMOUNT",
                "amount supports at most 2 decimal places",
            ));
        }
        if req.description.trim().is_empty() {
            return Err(bad_request("INVALID_DESCRIPTION", "description is required"));
        }
        if let Some(email) = &req.payer_email {
            if !email.validate_email() {
                return Err(bad_request("INVALID_EMAIL", "payer e-mail is not valid"));
            }
        }

        let payment = self
            .store
            .create(NewPayment {
                cpf: normalized_cpf.clone(),
                description: req.description.clone(),
                amount: req.amount,
                payment_method: req.payment_method,
                payer_email: req.payer_email.clone(),
            })
            .await
            .map_err(internal)?;

        match req.payment_method {
            PaymentMethod::Pix => {
                tracing::info!("PIX payment {} created, status PENDING", payment.id);
                Ok(payment)
            }
            PaymentMethod::CreditCard => {
                // The record is already persisted; a failed preference call
                // leaves it PENDING with no preference attached.
                let preference = self
                    .gateway
                    .create_preference(&PreferenceRequest {
                        external_reference: payment.external_reference.clone(),
                        description: req.description.trim().to_string(),
                        amount: req.amount,
                        cpf: normalized_cpf,
                        payer_email: req.payer_email,
                    })
                    .await
                    .map_err(|e| {
                        tracing::error!("preference creation for {} failed: {}", payment.id, e);
                        (
                            axum::http::StatusCode::BAD_GATEWAY,
                            err("GATEWAY_ERROR", &e.to_string()),
                        )
                    })?;

                let mut payment = payment;
                payment.checkout_url = Some(
                    preference
                        .sandbox_init_point
                        .clone()
                        .unwrap_or_else(|| preference.init_point.clone()),
                );
                payment.gateway_preference_id = Some(preference.id.clone());

                let payment = self.store.save(&payment).await.map_err(internal)?;
                tracing::info!(
                    "preference {} created for payment {}",
                    preference.id,
                    payment.id
                );
                Ok(payment)
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Payment, ServiceError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, ServiceError> {
        self.store.find_all(&filter).await.map_err(internal)
    }

    pub async fn update(&self, id: Uuid, req: UpdatePaymentRequest) -> Result<Payment, ServiceError> {
        let mut payment = self
            .store
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| not_found(id))?;

        if let Some(status) = req.status {
            payment.status = status;
        }
        if let Some(description) = req.description {
            let trimmed = description.trim();
            if trimmed.len() < 3 {
                return Err(bad_request(
                    "INVALID_DESCRIPTION",
                    "description must be at least 3 characters",
                ));
            }
            payment.description = trimmed.to_string();
        }

        self.store.save(&payment).await.map_err(internal)
    }
}

fn not_found(id: Uuid) -> ServiceError {
    (
        axum::http::StatusCode::NOT_FOUND,
        err("PAYMENT_NOT_FOUND", &format!("payment {} not found", id)),
    )
}

fn bad_request(code: &str, message: &str) -> ServiceError {
    (axum::http::StatusCode::BAD_REQUEST, err(code, message))
}

fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

fn internal(e: anyhow::Error) -> ServiceError {
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        err("INTERNAL_ERROR", &e.to_string()),
    )
}
