use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ApiError;

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 50;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Yookassa,
    Tbank,
    Sber,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Yookassa => "yookassa",
            Provider::Tbank => "tbank",
            Provider::Sber => "sber",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yookassa" => Some(Provider::Yookassa),
            "tbank" => Some(Provider::Tbank),
            "sber" => Some(Provider::Sber),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "RUB")]
    Rub,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RUB" => Some(Currency::Rub),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "succeeded" => Some(PaymentStatus::Succeeded),
            "failed" => Some(PaymentStatus::Failed),
            "cancelled" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub amount_kopeks: i64,
    pub currency: Currency,
    pub provider: Provider,
    pub provider_payment_id: String,
    pub status: PaymentStatus,
    // not echoed back in API responses
    #[serde(skip_serializing)]
    pub idempotency_key: String,
    pub description: Option<String>,
    pub return_url: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `POST /api/v1/payments` body. Fields stay loosely typed so that
/// every violation can be reported with field-level detail instead of a
/// deserializer rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePaymentBody {
    pub amount_kopeks: Option<i64>,
    pub currency: Option<String>,
    pub provider: Option<String>,
    pub description: Option<String>,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub amount_kopeks: i64,
    pub currency: Currency,
    pub provider: Provider,
    pub description: Option<String>,
    pub return_url: Option<String>,
}

impl CreatePaymentBody {
    pub fn validate(self) -> Result<CreatePaymentCommand, ApiError> {
        let mut field_errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

        let amount_kopeks = match self.amount_kopeks {
            Some(v) if v > 0 => v,
            Some(_) => {
                field_errors
                    .entry("amountKopeks")
                    .or_default()
                    .push("must be a positive integer".to_string());
                0
            }
            None => {
                field_errors
                    .entry("amountKopeks")
                    .or_default()
                    .push("is required".to_string());
                0
            }
        };

        let currency = match self.currency.as_deref() {
            None => Currency::default(),
            Some(s) => match Currency::parse(s) {
                Some(c) => c,
                None => {
                    field_errors
                        .entry("currency")
                        .or_default()
                        .push("only RUB is supported".to_string());
                    Currency::default()
                }
            },
        };

        let provider = match self.provider.as_deref() {
            None => {
                field_errors
                    .entry("provider")
                    .or_default()
                    .push("is required".to_string());
                None
            }
            Some(s) => {
                let parsed = Provider::parse(s);
                if parsed.is_none() {
                    field_errors
                        .entry("provider")
                        .or_default()
                        .push("must be one of yookassa, tbank, sber".to_string());
                }
                parsed
            }
        };

        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_CHARS {
                field_errors
                    .entry("description")
                    .or_default()
                    .push(format!("must be at most {MAX_DESCRIPTION_CHARS} characters"));
            }
        }

        if let Some(return_url) = &self.return_url {
            if url::Url::parse(return_url).is_err() {
                field_errors
                    .entry("returnUrl")
                    .or_default()
                    .push("must be a valid URL".to_string());
            }
        }

        match (field_errors.is_empty(), provider) {
            (true, Some(provider)) => Ok(CreatePaymentCommand {
                amount_kopeks,
                currency,
                provider,
                description: self.description,
                return_url: self.return_url,
            }),
            _ => Err(ApiError::Validation {
                message: "invalid request body".to_string(),
                details: Some(serde_json::json!({ "fieldErrors": field_errors })),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListFilter {
    pub status: Option<PaymentStatus>,
    pub limit: i64,
}

impl ListQuery {
    pub fn validate(self) -> Result<ListFilter, ApiError> {
        let mut field_errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

        let limit = match self.limit {
            None => DEFAULT_LIST_LIMIT,
            Some(v) if (1..=MAX_LIST_LIMIT).contains(&v) => v,
            Some(_) => {
                field_errors
                    .entry("limit")
                    .or_default()
                    .push(format!("must be between 1 and {MAX_LIST_LIMIT}"));
                DEFAULT_LIST_LIMIT
            }
        };

        let status = match self.status.as_deref() {
            None => None,
            Some(s) => {
                let parsed = PaymentStatus::parse(s);
                if parsed.is_none() {
                    field_errors
                        .entry("status")
                        .or_default()
                        .push("must be one of pending, succeeded, failed, cancelled".to_string());
                }
                parsed
            }
        };

        if field_errors.is_empty() {
            Ok(ListFilter { status, limit })
        } else {
            Err(ApiError::Validation {
                message: "invalid query parameters".to_string(),
                details: Some(serde_json::json!({ "fieldErrors": field_errors })),
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListPaymentsResponse {
    pub items: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(amount: Option<i64>, provider: Option<&str>) -> CreatePaymentBody {
        CreatePaymentBody {
            amount_kopeks: amount,
            currency: None,
            provider: provider.map(str::to_string),
            description: None,
            return_url: None,
        }
    }

    fn field_errors(err: ApiError) -> Value {
        match err {
            ApiError::Validation { details, .. } => details.expect("details")["fieldErrors"].clone(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_body_defaults_currency_to_rub() {
        let cmd = body(Some(29900), Some("yookassa")).validate().unwrap();
        assert_eq!(cmd.amount_kopeks, 29900);
        assert_eq!(cmd.currency, Currency::Rub);
        assert_eq!(cmd.provider, Provider::Yookassa);
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected_with_field_detail() {
        for amount in [0, -500] {
            let errors = field_errors(body(Some(amount), Some("sber")).validate().unwrap_err());
            assert!(errors["amountKopeks"][0]
                .as_str()
                .unwrap()
                .contains("positive"));
        }
    }

    #[test]
    fn missing_amount_is_rejected() {
        let errors = field_errors(body(None, Some("sber")).validate().unwrap_err());
        assert_eq!(errors["amountKopeks"][0], "is required");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let errors = field_errors(body(Some(100), Some("paypal")).validate().unwrap_err());
        assert!(errors["provider"][0].as_str().unwrap().contains("yookassa"));
    }

    #[test]
    fn unsupported_currency_is_rejected() {
        let mut b = body(Some(100), Some("tbank"));
        b.currency = Some("USD".to_string());
        let errors = field_errors(b.validate().unwrap_err());
        assert_eq!(errors["currency"][0], "only RUB is supported");
    }

    #[test]
    fn oversized_description_is_rejected() {
        let mut b = body(Some(100), Some("tbank"));
        b.description = Some("x".repeat(MAX_DESCRIPTION_CHARS + 1));
        let errors = field_errors(b.validate().unwrap_err());
        assert!(errors["description"][0].as_str().unwrap().contains("500"));
    }

    #[test]
    fn invalid_return_url_is_rejected() {
        let mut b = body(Some(100), Some("tbank"));
        b.return_url = Some("string".to_string());
        let errors = field_errors(b.validate().unwrap_err());
        assert_eq!(errors["returnUrl"][0], "must be a valid URL");
    }

    #[test]
    fn violations_are_collected_across_fields() {
        let mut b = body(Some(-1), Some("paypal"));
        b.return_url = Some("not a url".to_string());
        let errors = field_errors(b.validate().unwrap_err());
        assert!(errors.get("amountKopeks").is_some());
        assert!(errors.get("provider").is_some());
        assert!(errors.get("returnUrl").is_some());
    }

    #[test]
    fn list_query_defaults_and_bounds() {
        let filter = ListQuery::default().validate().unwrap();
        assert_eq!(filter.limit, DEFAULT_LIST_LIMIT);
        assert!(filter.status.is_none());

        for limit in [0, 51, -3] {
            let query = ListQuery {
                limit: Some(limit),
                status: None,
            };
            assert!(query.validate().is_err());
        }

        let query = ListQuery {
            limit: Some(50),
            status: Some("succeeded".to_string()),
        };
        let filter = query.validate().unwrap();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.status, Some(PaymentStatus::Succeeded));
    }

    #[test]
    fn list_query_rejects_unknown_status() {
        let query = ListQuery {
            limit: None,
            status: Some("charged_back".to_string()),
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn idempotency_key_is_not_serialized() {
        let payment = Payment {
            id: Uuid::new_v4(),
            amount_kopeks: 100,
            currency: Currency::Rub,
            provider: Provider::Sber,
            provider_payment_id: "stub_abc_1".to_string(),
            status: PaymentStatus::Pending,
            idempotency_key: "secret-key".to_string(),
            description: None,
            return_url: None,
            metadata: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&payment).unwrap();
        assert!(json.get("idempotencyKey").is_none());
        assert_eq!(json["amountKopeks"], 100);
        assert_eq!(json["currency"], "RUB");
        assert_eq!(json["provider"], "sber");
        assert_eq!(json["status"], "pending");
    }
}
