//! HTTP handlers for business record endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    CreateRecordInput, CreditStatusFilter, MakePaymentInput, Pagination, RecordKind, RecordPatch,
    RecordView,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::records::{
    CreditSalesListing, PaymentReceipt, QuickRecordInput, RecordDetail, RecordFilter,
    RecordLedger, RecordListing,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    #[serde(rename = "type")]
    pub kind: Option<RecordKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub credit_only: Option<bool>,
    pub with_debt: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreditSalesQuery {
    pub payment_status: Option<CreditStatusFilter>,
}

/// List records with filters and totals
pub async fn list_records(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RecordQuery>,
) -> AppResult<Json<RecordListing>> {
    let service = RecordLedger::new(state.db);
    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = RecordFilter {
        kind: query.kind,
        start_date: query.start_date,
        end_date: query.end_date,
        search: query.search,
        credit_only: query.credit_only.unwrap_or(false),
        with_debt: query.with_debt.unwrap_or(false),
    };
    let listing = service
        .list(&current_user.actor(), filter, pagination)
        .await?;
    Ok(Json(listing))
}

/// Create a sale, purchase or expense
pub async fn create_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateRecordInput>,
) -> AppResult<Json<RecordView>> {
    let service = RecordLedger::new(state.db);
    let record = service.create(&current_user.actor(), input).await?;
    Ok(Json(record))
}

pub async fn get_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<RecordDetail>> {
    let service = RecordLedger::new(state.db);
    let detail = service.get(&current_user.actor(), record_id).await?;
    Ok(Json(detail))
}

pub async fn update_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(record_id): Path<Uuid>,
    Json(patch): Json<RecordPatch>,
) -> AppResult<Json<RecordView>> {
    let service = RecordLedger::new(state.db);
    let record = service
        .update(&current_user.actor(), record_id, patch)
        .await?;
    Ok(Json(record))
}

/// Delete a record, reversing its stock effect
pub async fn delete_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = RecordLedger::new(state.db);
    service.delete(&current_user.actor(), record_id).await?;
    Ok(Json(()))
}

/// Pay towards a credit sale
pub async fn make_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(record_id): Path<Uuid>,
    Json(input): Json<MakePaymentInput>,
) -> AppResult<Json<PaymentReceipt>> {
    let service = RecordLedger::new(state.db);
    let receipt = service
        .make_payment(&current_user.actor(), record_id, input)
        .await?;
    Ok(Json(receipt))
}

pub async fn credit_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<CreditSalesQuery>,
) -> AppResult<Json<CreditSalesListing>> {
    let service = RecordLedger::new(state.db);
    let listing = service
        .credit_sales(&current_user.actor(), query.payment_status)
        .await?;
    Ok(Json(listing))
}

/// Records created together under one client transaction id
pub async fn records_by_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<String>,
) -> AppResult<Json<Vec<RecordView>>> {
    let service = RecordLedger::new(state.db);
    let records = service
        .by_transaction(&current_user.actor(), &transaction_id)
        .await?;
    Ok(Json(records))
}

async fn quick_record(
    state: AppState,
    current_user: CurrentUser,
    kind: RecordKind,
    input: QuickRecordInput,
) -> AppResult<Json<RecordView>> {
    input.validate()?;
    let input = input.into_record(kind, Utc::now().date_naive());
    let service = RecordLedger::new(state.db);
    let record = service.create(&current_user.actor(), input).await?;
    Ok(Json(record))
}

pub async fn quick_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<QuickRecordInput>,
) -> AppResult<Json<RecordView>> {
    quick_record(state, current_user, RecordKind::Sale, input).await
}

pub async fn quick_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<QuickRecordInput>,
) -> AppResult<Json<RecordView>> {
    quick_record(state, current_user, RecordKind::Purchase, input).await
}

pub async fn quick_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<QuickRecordInput>,
) -> AppResult<Json<RecordView>> {
    quick_record(state, current_user, RecordKind::Expense, input).await
}
