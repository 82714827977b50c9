use anyhow::Result;
use async_trait::async_trait;

use crate::domain::payment::PaymentStatus;

pub mod stub;

#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub idempotency_key: String,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InitiatedPayment {
    pub provider_payment_id: String,
    pub status: PaymentStatus,
    pub pay_url: Option<String>,
}

/// Seam for the external payment gateway. A real YooKassa / T-Bank / Sber
/// adapter slots in here; failures map to a provider error upstream and
/// nothing is persisted.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initiate(&self, request: InitiateRequest) -> Result<InitiatedPayment>;
}
