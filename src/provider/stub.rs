use anyhow::Result;
use async_trait::async_trait;

use crate::domain::payment::PaymentStatus;
use crate::provider::{InitiateRequest, InitiatedPayment, PaymentProvider};

/// Instantaneous stand-in for a real gateway: always accepts, leaves the
/// payment pending, and derives a pay URL from the return URL when given.
#[derive(Debug, Default, Clone)]
pub struct StubProvider;

#[async_trait]
impl PaymentProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn initiate(&self, request: InitiateRequest) -> Result<InitiatedPayment> {
        let key_prefix: String = request.idempotency_key.chars().take(8).collect();
        let provider_payment_id = format!(
            "stub_{}_{}",
            key_prefix,
            chrono::Utc::now().timestamp_millis()
        );
        let pay_url = request
            .return_url
            .as_ref()
            .map(|url| format!("{url}?payment={provider_payment_id}"));

        Ok(InitiatedPayment {
            provider_payment_id,
            status: PaymentStatus::Pending,
            pay_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initiated_payment_is_pending_with_stub_id() {
        let initiated = StubProvider
            .initiate(InitiateRequest {
                idempotency_key: "order-2024-0001".to_string(),
                return_url: None,
            })
            .await
            .unwrap();

        assert_eq!(initiated.status, PaymentStatus::Pending);
        assert!(initiated.provider_payment_id.starts_with("stub_order-20_"));
        assert!(initiated.pay_url.is_none());
    }

    #[tokio::test]
    async fn pay_url_is_derived_from_return_url() {
        let initiated = StubProvider
            .initiate(InitiateRequest {
                idempotency_key: "abc".to_string(),
                return_url: Some("https://example.com/return".to_string()),
            })
            .await
            .unwrap();

        let pay_url = initiated.pay_url.unwrap();
        assert!(pay_url.starts_with("https://example.com/return?payment=stub_abc_"));
        assert!(pay_url.contains(&initiated.provider_payment_id));
    }
}
