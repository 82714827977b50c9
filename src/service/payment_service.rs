use anyhow::anyhow;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::payment::{CreatePaymentCommand, ListFilter, Payment};
use crate::error::ApiError;
use crate::provider::{InitiateRequest, PaymentProvider};
use crate::repo::{NewPayment, PaymentStore, StoreError};

#[derive(Clone)]
pub struct PaymentService {
    pub store: Arc<dyn PaymentStore>,
    pub provider: Arc<dyn PaymentProvider>,
}

impl PaymentService {
    /// Idempotent creation. Returns the record plus `is_new`: `true` for a
    /// fresh insert (201 at the boundary), `false` for a replay of the same
    /// key with the same payload (200). Reusing a key with a different
    /// `amount_kopeks` or `provider` is a conflict.
    pub async fn create(
        &self,
        idempotency_key: &str,
        cmd: CreatePaymentCommand,
    ) -> Result<(Payment, bool), ApiError> {
        if let Some(existing) = self.store.find_by_idempotency_key(idempotency_key).await? {
            return replay_or_conflict(existing, &cmd).map(|p| (p, false));
        }

        let initiated = self
            .provider
            .initiate(InitiateRequest {
                idempotency_key: idempotency_key.to_string(),
                return_url: cmd.return_url.clone(),
            })
            .await
            .map_err(ApiError::Provider)?;

        let new = NewPayment {
            amount_kopeks: cmd.amount_kopeks,
            currency: cmd.currency,
            provider: cmd.provider,
            provider_payment_id: initiated.provider_payment_id,
            status: initiated.status,
            idempotency_key: idempotency_key.to_string(),
            description: cmd.description.clone(),
            return_url: cmd.return_url.clone(),
            metadata: initiated
                .pay_url
                .map(|url| serde_json::json!({ "payUrl": url })),
        };

        match self.store.insert(new).await {
            Ok(payment) => Ok((payment, true)),
            // Lost an insert race on the unique idempotency_key index: a
            // concurrent request with the same key won. Re-fetch and apply
            // the same replay-or-conflict decision as the pre-check.
            Err(StoreError::DuplicateIdempotencyKey) => {
                let existing = self
                    .store
                    .find_by_idempotency_key(idempotency_key)
                    .await?
                    .ok_or_else(|| {
                        ApiError::Internal(anyhow!(
                            "payment missing after duplicate-key insert failure"
                        ))
                    })?;
                replay_or_conflict(existing, &cmd).map(|p| (p, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Payment, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("payment", id))
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Payment>, ApiError> {
        Ok(self.store.list(filter).await?)
    }
}

fn replay_or_conflict(existing: Payment, cmd: &CreatePaymentCommand) -> Result<Payment, ApiError> {
    if existing.amount_kopeks == cmd.amount_kopeks && existing.provider == cmd.provider {
        Ok(existing)
    } else {
        Err(ApiError::IdempotencyConflict)
    }
}
