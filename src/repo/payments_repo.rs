use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::payment::{Currency, ListFilter, Payment, PaymentStatus, Provider};
use crate::repo::{NewPayment, PaymentStore, StoreError};

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

fn payment_from_row(row: &PgRow) -> Result<Payment, StoreError> {
    let currency: String = row.get("currency");
    let provider: String = row.get("provider");
    let status: String = row.get("status");

    Ok(Payment {
        id: row.get("id"),
        amount_kopeks: row.get("amount_kopeks"),
        currency: Currency::parse(&currency)
            .ok_or_else(|| anyhow!("unrecognized currency in payments row: {currency}"))?,
        provider: Provider::parse(&provider)
            .ok_or_else(|| anyhow!("unrecognized provider in payments row: {provider}"))?,
        provider_payment_id: row.get("provider_payment_id"),
        status: PaymentStatus::parse(&status)
            .ok_or_else(|| anyhow!("unrecognized status in payments row: {status}"))?,
        idempotency_key: row.get("idempotency_key"),
        description: row.get("description"),
        return_url: row.get("return_url"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl PaymentStore for PaymentsRepo {
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, amount_kopeks, currency, provider, provider_payment_id, status,
                   idempotency_key, description, return_url, metadata, created_at, updated_at
            FROM payments
            WHERE idempotency_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .context("loading payment by idempotency key")?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, amount_kopeks, currency, provider, provider_payment_id, status,
                   idempotency_key, description, return_url, metadata, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("loading payment by id")?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn insert(&self, new: NewPayment) -> Result<Payment, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO payments (
                id, amount_kopeks, currency, provider, provider_payment_id,
                status, idempotency_key, description, return_url, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, amount_kopeks, currency, provider, provider_payment_id, status,
                      idempotency_key, description, return_url, metadata, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.amount_kopeks)
        .bind(new.currency.as_str())
        .bind(new.provider.as_str())
        .bind(new.provider_payment_id)
        .bind(new.status.as_str())
        .bind(new.idempotency_key)
        .bind(new.description)
        .bind(new.return_url)
        .bind(new.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::DuplicateIdempotencyKey,
            _ => StoreError::Other(anyhow::Error::new(e).context("inserting payment")),
        })?;

        payment_from_row(&row)
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Payment>, StoreError> {
        let rows = match filter.status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, amount_kopeks, currency, provider, provider_payment_id, status,
                           idempotency_key, description, return_url, metadata, created_at, updated_at
                    FROM payments
                    WHERE status = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#,
                )
                .bind(status.as_str())
                .bind(filter.limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, amount_kopeks, currency, provider, provider_payment_id, status,
                           idempotency_key, description, return_url, metadata, created_at, updated_at
                    FROM payments
                    ORDER BY created_at DESC
                    LIMIT $1
                    "#,
                )
                .bind(filter.limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("listing payments")?;

        rows.iter().map(payment_from_row).collect()
    }
}
