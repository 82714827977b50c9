use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::payment::{Currency, ListFilter, Payment, PaymentStatus, Provider};

pub mod memory;
pub mod payments_repo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("idempotency key already exists")]
    DuplicateIdempotencyKey,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount_kopeks: i64,
    pub currency: Currency,
    pub provider: Provider,
    pub provider_payment_id: String,
    pub status: PaymentStatus,
    pub idempotency_key: String,
    pub description: Option<String>,
    pub return_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Persistence port for payment records. The store owns id generation and
/// timestamps, and enforces idempotency-key uniqueness; a raced insert
/// surfaces as `StoreError::DuplicateIdempotencyKey`.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, StoreError>;

    async fn insert(&self, new: NewPayment) -> Result<Payment, StoreError>;

    /// Newest first, at most `filter.limit` rows.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Payment>, StoreError>;
}
