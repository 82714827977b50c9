use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::domain::payment::{CreatePaymentBody, ListPaymentsResponse, ListQuery};
use crate::error::ApiError;
use crate::AppState;

pub async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreatePaymentBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // The header is checked before the body so a missing key is reported
    // even when the body is unreadable.
    let idempotency_key = idempotency_key_from(&headers)?;
    let Json(body) = body.map_err(|e| ApiError::validation(e.body_text()))?;
    let cmd = body.validate()?;

    let (payment, is_new) = state.payment_service.create(&idempotency_key, cmd).await?;
    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(payment)))
}

pub async fn list_payments(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let filter = query.validate()?;
    let items = state.payment_service.list(&filter).await?;
    Ok(Json(ListPaymentsResponse { items }))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Ids are opaque to clients; anything that is not one of ours is a 404.
    let id = payment_id
        .parse::<Uuid>()
        .map_err(|_| ApiError::not_found("payment", &payment_id))?;
    let payment = state.payment_service.get(id).await?;
    Ok(Json(payment))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn idempotency_key_from(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("Idempotency-Key")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingIdempotencyKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_key_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("Idempotency-Key", "  order-1  ".parse().unwrap());
        assert_eq!(idempotency_key_from(&headers).unwrap(), "order-1");
    }

    #[test]
    fn blank_or_absent_key_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            idempotency_key_from(&headers),
            Err(ApiError::MissingIdempotencyKey)
        ));

        let mut headers = HeaderMap::new();
        headers.insert("Idempotency-Key", "   ".parse().unwrap());
        assert!(matches!(
            idempotency_key_from(&headers),
            Err(ApiError::MissingIdempotencyKey)
        ));
    }
}
