//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::{
    CreateProductInput, InventoryItemView, PaginatedResponse, Pagination, ProductPatch,
    StockMovement, StockStatus,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{
    AdjustStockInput, ProductFilter, ProductListing, SetStockInput, StockLedger, StockUpdate,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub stock_status: Option<StockStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List products with filters and inventory totals
pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ProductListing>> {
    let service = StockLedger::new(state.db);
    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = ProductFilter {
        search: query.search,
        category: query.category,
        stock_status: query.stock_status,
    };
    let listing = service
        .list_products(&current_user.actor(), filter, pagination)
        .await?;
    Ok(Json(listing))
}

/// Add a product with its opening stock
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<InventoryItemView>> {
    let service = StockLedger::new(state.db);
    let item = service.create_product(&current_user.actor(), input).await?;
    Ok(Json(item))
}

pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<InventoryItemView>> {
    let service = StockLedger::new(state.db);
    let item = service.get_product(&current_user.actor(), item_id).await?;
    Ok(Json(item))
}

pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> AppResult<Json<InventoryItemView>> {
    let service = StockLedger::new(state.db);
    let item = service
        .update_product(&current_user.actor(), item_id, patch)
        .await?;
    Ok(Json(item))
}

/// Soft delete a product (owner/admin)
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = StockLedger::new(state.db);
    service.delete_product(&current_user.actor(), item_id).await?;
    Ok(Json(()))
}

/// Set the stock level to an absolute count
pub async fn set_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<SetStockInput>,
) -> AppResult<Json<StockUpdate>> {
    let service = StockLedger::new(state.db);
    let update = service
        .set_stock(&current_user.actor(), item_id, input)
        .await?;
    Ok(Json(update))
}

/// Move the stock level by a signed amount
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<StockUpdate>> {
    let service = StockLedger::new(state.db);
    let update = service
        .adjust_stock(&current_user.actor(), item_id, input)
        .await?;
    Ok(Json(update))
}

pub async fn low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<InventoryItemView>>> {
    let service = StockLedger::new(state.db);
    let items = service.low_stock(&current_user.actor()).await?;
    Ok(Json(items))
}

pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<String>>> {
    let service = StockLedger::new(state.db);
    let categories = service.categories(&current_user.actor()).await?;
    Ok(Json(categories))
}

/// Movement history of one product, newest first
pub async fn stock_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<StockMovement>>> {
    let service = StockLedger::new(state.db);
    let movements = service
        .stock_movements(
            &current_user.actor(),
            item_id,
            Pagination::from_query(query.page, query.per_page),
        )
        .await?;
    Ok(Json(movements))
}

/// Movement history across all products (owner/admin)
pub async fn all_stock_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<StockMovement>>> {
    let service = StockLedger::new(state.db);
    let movements = service
        .all_stock_movements(
            &current_user.actor(),
            Pagination::from_query(query.page, query.per_page),
        )
        .await?;
    Ok(Json(movements))
}
