//! Stock ledger: products, stock levels and the stock movement trail
//!
//! `current_stock` is only ever written by [`StockLedger::apply_change`], which
//! also appends the matching movement. Callers lock the item row first and
//! pass the same connection, so the update and the movement share a
//! transaction with whatever caused them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    merge_categories, search_pattern, Actor, CreateProductInput, InventoryItem, InventoryItemView,
    InventorySummary, LedgerError, MovementKind, PaginatedResponse, Pagination, ProductPatch,
    StockChange, StockMovement, StockStatus, DEFAULT_UNIT,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::require_manager;

/// Stock ledger service
#[derive(Clone)]
pub struct StockLedger {
    db: PgPool,
}

/// Row for inventory_items
#[derive(Debug, FromRow)]
pub(crate) struct InventoryRow {
    id: Uuid,
    business_id: Uuid,
    user_id: Uuid,
    name: String,
    category: Option<String>,
    unit: String,
    buying_price: Decimal,
    selling_price: Decimal,
    wholesale_price: Option<Decimal>,
    retail_price: Option<Decimal>,
    current_stock: i32,
    minimum_stock: i32,
    description: Option<String>,
    barcode: Option<String>,
    sku: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            id: row.id,
            business_id: row.business_id,
            user_id: row.user_id,
            name: row.name,
            category: row.category,
            unit: row.unit,
            buying_price: row.buying_price,
            selling_price: row.selling_price,
            wholesale_price: row.wholesale_price,
            retail_price: row.retail_price,
            current_stock: row.current_stock,
            minimum_stock: row.minimum_stock,
            description: row.description,
            barcode: row.barcode,
            sku: row.sku,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Row for stock_movements
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    inventory_item_id: Uuid,
    user_id: Uuid,
    movement_type: String,
    quantity_before: i32,
    quantity_after: i32,
    quantity_changed: i32,
    reason: Option<String>,
    reference_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = LedgerError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind =
            MovementKind::parse(&row.movement_type).ok_or_else(|| LedgerError::UnknownValue {
                field: "movement_type",
                value: row.movement_type.clone(),
            })?;
        Ok(StockMovement {
            id: row.id,
            inventory_item_id: row.inventory_item_id,
            user_id: row.user_id,
            kind,
            quantity_before: row.quantity_before,
            quantity_after: row.quantity_after,
            quantity_changed: row.quantity_changed,
            reason: row.reason,
            reference_id: row.reference_id,
            created_at: row.created_at,
        })
    }
}

/// Item state after a stock change, with the movement that recorded it
#[derive(Debug, Clone, Serialize)]
pub struct StockUpdate {
    pub item: InventoryItemView,
    pub movement: StockMovement,
}

/// Input for a relative stock adjustment
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockInput {
    pub quantity_change: i32,
    #[validate(length(max = 255))]
    pub reason: Option<String>,
}

/// Input for setting an absolute stock level
#[derive(Debug, Deserialize, Validate)]
pub struct SetStockInput {
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(length(max = 255))]
    pub reason: Option<String>,
}

/// Filters for product listings
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub stock_status: Option<StockStatus>,
}

/// A page of products with totals for the whole inventory
#[derive(Debug, Serialize)]
pub struct ProductListing {
    #[serde(flatten)]
    pub page: PaginatedResponse<InventoryItemView>,
    pub summary: InventorySummary,
}

fn stock_status_str(status: StockStatus) -> &'static str {
    match status {
        StockStatus::LowStock => "low_stock",
        StockStatus::OutOfStock => "out_of_stock",
    }
}

impl StockLedger {
    /// Create a new StockLedger instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Transaction building blocks
    // ========================================================================

    /// Lock an item row of the actor's business, including soft-deleted ones
    pub(crate) async fn lock_item(
        conn: &mut PgConnection,
        business_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT * FROM inventory_items
            WHERE id = $1 AND business_id = $2
            FOR UPDATE
            "#,
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Lock a live (not soft-deleted) item of the actor's business
    pub(crate) async fn lock_live_item(
        conn: &mut PgConnection,
        business_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<InventoryItem> {
        let item = Self::lock_item(conn, business_id, item_id).await?;
        if item.deleted_at.is_some() {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(item)
    }

    /// Write a stock change to a locked item and append its movement
    pub(crate) async fn apply_change(
        conn: &mut PgConnection,
        item: &InventoryItem,
        change: StockChange,
        kind: MovementKind,
        reason: &str,
        user_id: Uuid,
        reference_id: Option<Uuid>,
    ) -> AppResult<StockUpdate> {
        if change.was_clamped() {
            tracing::warn!(
                item_id = %item.id,
                before = change.quantity_before,
                requested = change.quantity_changed,
                "stock adjustment clamped at zero"
            );
        }

        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            UPDATE inventory_items
            SET current_stock = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(change.quantity_after)
        .bind(item.id)
        .fetch_one(&mut *conn)
        .await?;

        let movement = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO stock_movements (
                inventory_item_id, user_id, movement_type, quantity_before,
                quantity_after, quantity_changed, reason, reference_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(change.quantity_before)
        .bind(change.quantity_after)
        .bind(change.quantity_changed)
        .bind(reason)
        .bind(reference_id)
        .fetch_one(&mut *conn)
        .await?;

        tracing::info!(
            item_id = %item.id,
            kind = kind.as_str(),
            before = change.quantity_before,
            after = change.quantity_after,
            "stock movement recorded"
        );

        let item: InventoryItem = row.into();
        Ok(StockUpdate {
            item: item.view(),
            movement: movement.try_into()?,
        })
    }

    /// Relative adjustment on a locked item, clamped at zero
    pub(crate) async fn adjust_locked(
        conn: &mut PgConnection,
        item: &InventoryItem,
        delta: i32,
        kind: MovementKind,
        reason: &str,
        user_id: Uuid,
        reference_id: Option<Uuid>,
    ) -> AppResult<StockUpdate> {
        let change = StockChange::adjust(item.current_stock, delta)?;
        Self::apply_change(conn, item, change, kind, reason, user_id, reference_id).await
    }

    // ========================================================================
    // Stock operations
    // ========================================================================

    /// Add or remove units; over-subtraction clamps at zero
    pub async fn adjust_stock(
        &self,
        actor: &Actor,
        item_id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<StockUpdate> {
        input.validate()?;
        if input.quantity_change == 0 {
            return Err(AppError::Validation {
                field: "quantity_change".to_string(),
                message: "Quantity change cannot be zero".to_string(),
                message_sw: "Mabadiliko ya idadi hayawezi kuwa sifuri".to_string(),
            });
        }

        let reason = input
            .reason
            .unwrap_or_else(|| "Stock adjustment".to_string());

        let mut tx = self.db.begin().await?;
        let item = Self::lock_live_item(&mut *tx, actor.business_id, item_id).await?;
        let update = Self::adjust_locked(
            &mut *tx,
            &item,
            input.quantity_change,
            MovementKind::Adjustment,
            &reason,
            actor.user_id,
            None,
        )
        .await?;
        tx.commit().await?;

        Ok(update)
    }

    /// Set an absolute stock level; negative targets clamp to zero
    pub async fn set_stock(
        &self,
        actor: &Actor,
        item_id: Uuid,
        input: SetStockInput,
    ) -> AppResult<StockUpdate> {
        input.validate()?;
        let reason = input.reason.unwrap_or_else(|| "Stock count".to_string());

        let mut tx = self.db.begin().await?;
        let item = Self::lock_live_item(&mut *tx, actor.business_id, item_id).await?;
        let change = StockChange::set(item.current_stock, input.quantity);
        let update = Self::apply_change(
            &mut *tx,
            &item,
            change,
            MovementKind::Manual,
            &reason,
            actor.user_id,
            None,
        )
        .await?;
        tx.commit().await?;

        Ok(update)
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Add a product together with its initial stock movement
    pub async fn create_product(
        &self,
        actor: &Actor,
        input: CreateProductInput,
    ) -> AppResult<InventoryItemView> {
        input.validate()?;
        input.validate_prices()?;

        let unit = input.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string());

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            INSERT INTO inventory_items (
                business_id, user_id, name, category, unit, buying_price, selling_price,
                wholesale_price, retail_price, current_stock, minimum_stock,
                description, barcode, sku
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(actor.business_id)
        .bind(actor.user_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(&unit)
        .bind(input.buying_price)
        .bind(input.selling_price)
        .bind(input.wholesale_price)
        .bind(input.retail_price)
        .bind(input.minimum_stock)
        .bind(&input.description)
        .bind(&input.barcode)
        .bind(&input.sku)
        .fetch_one(&mut *tx)
        .await?;

        let item: InventoryItem = row.into();
        let update = Self::apply_change(
            &mut *tx,
            &item,
            StockChange::initial(input.current_stock),
            MovementKind::Manual,
            "Initial stock entry",
            actor.user_id,
            None,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(item_id = %item.id, business_id = %actor.business_id, "product created");
        Ok(update.item)
    }

    /// Patch non-stock fields; a changed `current_stock` becomes a manual set
    pub async fn update_product(
        &self,
        actor: &Actor,
        item_id: Uuid,
        patch: ProductPatch,
    ) -> AppResult<InventoryItemView> {
        patch.validate()?;

        let mut tx = self.db.begin().await?;
        let item = Self::lock_live_item(&mut *tx, actor.business_id, item_id).await?;
        let next = patch.apply_to(&item)?;

        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            UPDATE inventory_items
            SET name = $1, category = $2, unit = $3, buying_price = $4, selling_price = $5,
                wholesale_price = $6, retail_price = $7, minimum_stock = $8,
                description = $9, barcode = $10, sku = $11, is_active = $12,
                updated_at = NOW()
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(&next.name)
        .bind(&next.category)
        .bind(&next.unit)
        .bind(next.buying_price)
        .bind(next.selling_price)
        .bind(next.wholesale_price)
        .bind(next.retail_price)
        .bind(next.minimum_stock)
        .bind(&next.description)
        .bind(&next.barcode)
        .bind(&next.sku)
        .bind(next.is_active)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut updated: InventoryItem = row.into();
        if let Some(target) = patch.stock_target(updated.current_stock) {
            let change = StockChange::set(updated.current_stock, target);
            let update = Self::apply_change(
                &mut *tx,
                &updated,
                change,
                MovementKind::Manual,
                "Stock updated via API",
                actor.user_id,
                None,
            )
            .await?;
            updated = update.item.item;
        }

        tx.commit().await?;

        Ok(updated.view())
    }

    /// Soft delete a product; its movements and linked records stay
    pub async fn delete_product(&self, actor: &Actor, item_id: Uuid) -> AppResult<()> {
        require_manager(actor)?;

        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND business_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(item_id)
        .bind(actor.business_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        tracing::info!(item_id = %item_id, business_id = %actor.business_id, "product deleted");
        Ok(())
    }

    /// Get a live product of the actor's business
    pub async fn get_product(&self, actor: &Actor, item_id: Uuid) -> AppResult<InventoryItemView> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT * FROM inventory_items
            WHERE id = $1 AND business_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(item_id)
        .bind(actor.business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(InventoryItem::from(row).view())
    }

    /// Active products matching `filter`, with inventory-wide totals
    pub async fn list_products(
        &self,
        actor: &Actor,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> AppResult<ProductListing> {
        let pattern = search_pattern(filter.search.as_deref());
        let status = filter.stock_status.map(stock_status_str);

        tracing::debug!(business_id = %actor.business_id, ?pattern, ?status, "listing products");

        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT * FROM inventory_items
            WHERE business_id = $1 AND deleted_at IS NULL AND is_active = TRUE
              AND ($2::text IS NULL OR name ILIKE $2 OR category ILIKE $2
                   OR description ILIKE $2 OR barcode ILIKE $2 OR sku ILIKE $2)
              AND ($3::text IS NULL OR category = $3)
              AND ($4::text IS NULL
                   OR ($4 = 'low_stock' AND current_stock > 0 AND current_stock <= minimum_stock)
                   OR ($4 = 'out_of_stock' AND current_stock <= 0))
            ORDER BY name ASC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(actor.business_id)
        .bind(&pattern)
        .bind(&filter.category)
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM inventory_items
            WHERE business_id = $1 AND deleted_at IS NULL AND is_active = TRUE
              AND ($2::text IS NULL OR name ILIKE $2 OR category ILIKE $2
                   OR description ILIKE $2 OR barcode ILIKE $2 OR sku ILIKE $2)
              AND ($3::text IS NULL OR category = $3)
              AND ($4::text IS NULL
                   OR ($4 = 'low_stock' AND current_stock > 0 AND current_stock <= minimum_stock)
                   OR ($4 = 'out_of_stock' AND current_stock <= 0))
            "#,
        )
        .bind(actor.business_id)
        .bind(&pattern)
        .bind(&filter.category)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let all_active = self.active_items(actor.business_id).await?;
        let views = rows
            .into_iter()
            .map(|row| InventoryItem::from(row).view())
            .collect();

        Ok(ProductListing {
            page: PaginatedResponse::new(views, &pagination, total.max(0) as u64),
            summary: InventorySummary::from_items(&all_active),
        })
    }

    async fn active_items(&self, business_id: Uuid) -> AppResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT * FROM inventory_items
            WHERE business_id = $1 AND deleted_at IS NULL AND is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    /// Active products at or below their reorder threshold, emptiest first
    pub async fn low_stock(&self, actor: &Actor) -> AppResult<Vec<InventoryItemView>> {
        let mut items: Vec<InventoryItem> = self
            .active_items(actor.business_id)
            .await?
            .into_iter()
            .filter(|item| item.is_low_stock())
            .collect();
        items.sort_by_key(|item| item.current_stock);
        Ok(items.iter().map(InventoryItem::view).collect())
    }

    /// Default categories followed by the business's own
    pub async fn categories(&self, actor: &Actor) -> AppResult<Vec<String>> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category FROM inventory_items
            WHERE business_id = $1 AND deleted_at IS NULL AND category IS NOT NULL
            ORDER BY category
            "#,
        )
        .bind(actor.business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(merge_categories(stored))
    }

    /// Movements of one product, newest first
    pub async fn stock_movements(
        &self,
        actor: &Actor,
        item_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE id = $1 AND business_id = $2)",
        )
        .bind(item_id)
        .bind(actor.business_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT * FROM stock_movements
            WHERE inventory_item_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(item_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_movements WHERE inventory_item_id = $1",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        let movements = rows
            .into_iter()
            .map(StockMovement::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResponse::new(
            movements,
            &pagination,
            total.max(0) as u64,
        ))
    }

    /// Movements across every product of the business, newest first
    pub async fn all_stock_movements(
        &self,
        actor: &Actor,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        require_manager(actor)?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT m.* FROM stock_movements m
            JOIN inventory_items i ON i.id = m.inventory_item_id
            WHERE i.business_id = $1
            ORDER BY m.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(actor.business_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM stock_movements m
            JOIN inventory_items i ON i.id = m.inventory_item_id
            WHERE i.business_id = $1
            "#,
        )
        .bind(actor.business_id)
        .fetch_one(&self.db)
        .await?;

        let movements = rows
            .into_iter()
            .map(StockMovement::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResponse::new(
            movements,
            &pagination,
            total.max(0) as u64,
        ))
    }

    /// Products by id for read-side lookups, including soft-deleted ones
    pub(crate) async fn items_by_ids(
        &self,
        business_id: Uuid,
        ids: &[Uuid],
    ) -> AppResult<Vec<InventoryItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, InventoryRow>(
            "SELECT * FROM inventory_items WHERE business_id = $1 AND id = ANY($2)",
        )
        .bind(business_id)
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    /// Every product of the business, including soft-deleted ones
    pub(crate) async fn all_items(&self, business_id: Uuid) -> AppResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            "SELECT * FROM inventory_items WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }
}
