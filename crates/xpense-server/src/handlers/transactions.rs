//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::Engine;
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use super::reports::FilterQuery;
use crate::{AppError, AppState, SessionContext, SuccessResponse};
use xpense_core::{
    ledger::{parse_amount, ImageFormat},
    models::{
        Category, NewTransaction, ReceiptChange, Transaction, TransactionKind, TransactionUpdate,
    },
    LedgerService,
};

/// An amount typed either as a JSON number or as text with thousands separators
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(i64),
    Text(String),
}

impl AmountInput {
    fn resolve(&self) -> Result<i64, AppError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => Ok(parse_amount(s)?),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: AmountInput,
    pub note: Option<String>,
    /// Base64 image, optionally as a data: URL
    pub receipt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: Category,
    pub amount: AmountInput,
    pub note: Option<String>,
    /// New receipt image (base64); replaces the stored one
    pub receipt: Option<String>,
    /// Drop the stored receipt (ignored when a new one is sent)
    #[serde(default)]
    pub remove_receipt: bool,
}

/// Decode a base64 image payload, accepting `data:image/...;base64,` prefixes
pub(crate) fn decode_image(payload: &str) -> Result<Vec<u8>, AppError> {
    let data = match payload.trim().split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload.trim(),
    };
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|_| AppError::bad_request("Image must be base64 encoded"))
}

/// Raw image response with a content type sniffed from the bytes
pub(crate) fn image_response(bytes: Vec<u8>, etag: Option<String>) -> Response {
    let mime = ImageFormat::detect(&bytes)
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");

    match etag {
        Some(tag) => (
            [
                (header::CONTENT_TYPE, mime.to_string()),
                (header::ETAG, format!("\"{}\"", tag)),
            ],
            bytes,
        )
            .into_response(),
        None => ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response(),
    }
}

/// GET /api/transactions - History, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let filter = params.to_filter()?;
    let transactions = LedgerService::new(&state.db).list(&session.username, &filter)?;
    Ok(Json(transactions))
}

/// POST /api/transactions - Record an income or expense
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<Json<Transaction>, AppError> {
    let receipt = req.receipt.as_deref().map(decode_image).transpose()?;
    let new_tx = NewTransaction {
        date: req.date.unwrap_or_else(|| Local::now().date_naive()),
        kind: req.kind,
        category: req.category,
        amount: req.amount.resolve()?,
        note: req.note,
        receipt,
    };

    let tx = LedgerService::new(&state.db).record(&session.username, new_tx)?;

    state.db.log_audit(
        &session.username,
        "create",
        Some("transaction"),
        Some(tx.id),
        Some(&format!("{} {} {}", tx.kind, tx.category, tx.amount)),
    )?;

    Ok(Json(tx))
}

/// GET /api/transactions/:id
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let tx = LedgerService::new(&state.db).get(&session.username, id)?;
    Ok(Json(tx))
}

/// PUT /api/transactions/:id - Replace a transaction's fields
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, AppError> {
    let receipt = match req.receipt.as_deref() {
        Some(payload) => ReceiptChange::Replace(decode_image(payload)?),
        None if req.remove_receipt => ReceiptChange::Remove,
        None => ReceiptChange::Keep,
    };
    let update = TransactionUpdate {
        date: req.date,
        kind: req.kind,
        category: req.category,
        amount: req.amount.resolve()?,
        note: req.note,
        receipt,
    };

    let tx = LedgerService::new(&state.db).update(&session.username, id, update)?;

    state.db.log_audit(
        &session.username,
        "update",
        Some("transaction"),
        Some(id),
        Some(&format!("{} {} {}", tx.kind, tx.category, tx.amount)),
    )?;

    Ok(Json(tx))
}

/// DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    LedgerService::new(&state.db).delete(&session.username, id)?;

    state
        .db
        .log_audit(&session.username, "delete", Some("transaction"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/transactions/:id/receipt - The receipt image bytes
pub async fn get_receipt(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let receipt = LedgerService::new(&state.db).receipt(&session.username, id)?;
    Ok(image_response(receipt.image, Some(receipt.content_hash)))
}
