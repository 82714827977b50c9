use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::payment::{ListFilter, Payment};
use crate::repo::{NewPayment, PaymentStore, StoreError};

/// Thread-safe in-memory store. Backs the test suite; enforces the same
/// idempotency-key uniqueness as the Postgres schema.
#[derive(Default, Clone)]
pub struct MemoryStore {
    payments: Arc<RwLock<Vec<Payment>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, StoreError> {
        let payments = self.payments.read().await;
        Ok(payments.iter().find(|p| p.idempotency_key == key).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        let payments = self.payments.read().await;
        Ok(payments.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, new: NewPayment) -> Result<Payment, StoreError> {
        let mut payments = self.payments.write().await;
        if payments
            .iter()
            .any(|p| p.idempotency_key == new.idempotency_key)
        {
            return Err(StoreError::DuplicateIdempotencyKey);
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            amount_kopeks: new.amount_kopeks,
            currency: new.currency,
            provider: new.provider,
            provider_payment_id: new.provider_payment_id,
            status: new.status,
            idempotency_key: new.idempotency_key,
            description: new.description,
            return_url: new.return_url,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        };
        payments.push(payment.clone());
        Ok(payment)
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Payment>, StoreError> {
        let payments = self.payments.read().await;
        let mut items: Vec<Payment> = payments
            .iter()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(filter.limit as usize);
        Ok(items)
    }
}
