//! Inventory items, stock movements and the stock conservation rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{LedgerError, LedgerResult};

/// Categories offered to every business before it has stored any of its own
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Chakula na Vinywaji",
    "Nguo na Vazi",
    "Elektroniki",
    "Nyumbani na Bustani",
    "Afya na Urembo",
    "Michezo na Burudani",
    "Vitabu na Elimu",
    "Gari na Usafiri",
    "Nyingine",
];

/// Unit label used when a product is created without one
pub const DEFAULT_UNIT: &str = "bidhaa";

/// A stocked product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub business_id: Uuid,
    /// User who added the product
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub buying_price: Decimal,
    pub selling_price: Decimal,
    pub wholesale_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    pub current_stock: i32,
    pub minimum_stock: i32,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Price tier a sale is made at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    Wholesale,
    Retail,
    Discount,
}

impl SaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleType::Wholesale => "wholesale",
            SaleType::Retail => "retail",
            SaleType::Discount => "discount",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wholesale" => Some(SaleType::Wholesale),
            "retail" => Some(SaleType::Retail),
            "discount" => Some(SaleType::Discount),
            _ => None,
        }
    }
}

/// At or below the reorder threshold but not yet empty
pub fn is_low_stock_level(current_stock: i32, minimum_stock: i32) -> bool {
    current_stock > 0 && current_stock <= minimum_stock
}

pub fn is_out_of_stock_level(current_stock: i32) -> bool {
    current_stock <= 0
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        is_low_stock_level(self.current_stock, self.minimum_stock)
    }

    pub fn is_out_of_stock(&self) -> bool {
        is_out_of_stock_level(self.current_stock)
    }

    /// Active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Stock valued at cost
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.current_stock) * self.buying_price
    }

    pub fn wholesale_stock_value(&self) -> Decimal {
        Decimal::from(self.current_stock) * self.price_for(SaleType::Wholesale)
    }

    pub fn retail_stock_value(&self) -> Decimal {
        Decimal::from(self.current_stock) * self.price_for(SaleType::Retail)
    }

    /// Unit price for a sale tier, falling back to the selling price
    pub fn price_for(&self, sale_type: SaleType) -> Decimal {
        match sale_type {
            SaleType::Wholesale => self.wholesale_price.unwrap_or(self.selling_price),
            SaleType::Retail => self.retail_price.unwrap_or(self.selling_price),
            SaleType::Discount => self.selling_price,
        }
    }

    pub fn profit_margin_wholesale(&self) -> Decimal {
        margin_percent(self.price_for(SaleType::Wholesale), self.buying_price)
    }

    pub fn profit_margin_retail(&self) -> Decimal {
        margin_percent(self.price_for(SaleType::Retail), self.buying_price)
    }

    /// Cost of `quantity` units at the current buying price
    pub fn cost_of(&self, quantity: i32) -> Decimal {
        self.buying_price * Decimal::from(quantity)
    }

    /// Item together with the values derived from it
    pub fn view(&self) -> InventoryItemView {
        InventoryItemView {
            item: self.clone(),
            is_low_stock: self.is_low_stock(),
            is_out_of_stock: self.is_out_of_stock(),
            stock_value: self.stock_value(),
            wholesale_stock_value: self.wholesale_stock_value(),
            retail_stock_value: self.retail_stock_value(),
            profit_margin_wholesale: self.profit_margin_wholesale(),
            profit_margin_retail: self.profit_margin_retail(),
        }
    }
}

fn margin_percent(price: Decimal, cost: Decimal) -> Decimal {
    if price <= Decimal::ZERO || cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((price - cost) / price * Decimal::ONE_HUNDRED).round_dp(2)
}

/// An inventory item as returned to clients, with derived values computed on read
#[derive(Debug, Clone, Serialize)]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub is_low_stock: bool,
    pub is_out_of_stock: bool,
    pub stock_value: Decimal,
    pub wholesale_stock_value: Decimal,
    pub retail_stock_value: Decimal,
    pub profit_margin_wholesale: Decimal,
    pub profit_margin_retail: Decimal,
}

/// What caused a stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Sale,
    Purchase,
    Adjustment,
    Manual,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Sale => "sale",
            MovementKind::Purchase => "purchase",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(MovementKind::Sale),
            "purchase" => Some(MovementKind::Purchase),
            "adjustment" => Some(MovementKind::Adjustment),
            "manual" => Some(MovementKind::Manual),
            _ => None,
        }
    }
}

/// Immutable audit entry for one change of an item's stock level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    pub user_id: Uuid,
    pub kind: MovementKind,
    pub quantity_before: i32,
    pub quantity_after: i32,
    pub quantity_changed: i32,
    pub reason: Option<String>,
    /// Record that caused the movement, if any
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The numbers a stock movement records.
///
/// Invariant: `quantity_after == max(0, quantity_before + quantity_changed)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockChange {
    pub quantity_before: i32,
    pub quantity_after: i32,
    pub quantity_changed: i32,
}

impl StockChange {
    /// Apply a signed delta, clamping the result at zero.
    ///
    /// The requested delta is what gets recorded, so a clamped subtraction
    /// still shows how much was asked for. A level past `i32::MAX` is
    /// rejected rather than capped, so reversing the delta stays exact.
    pub fn adjust(before: i32, delta: i32) -> LedgerResult<Self> {
        let after = before.checked_add(delta).ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "stock of {} cannot change by {}",
                before, delta
            ))
        })?;
        Ok(Self {
            quantity_before: before,
            quantity_after: after.max(0),
            quantity_changed: delta,
        })
    }

    /// Set an absolute level, clamping at zero; the recorded delta is the
    /// resulting difference.
    pub fn set(before: i32, absolute: i32) -> Self {
        let after = absolute.max(0);
        Self {
            quantity_before: before,
            quantity_after: after,
            quantity_changed: after.saturating_sub(before),
        }
    }

    /// First movement of a newly added product
    pub fn initial(stock: i32) -> Self {
        Self::set(0, stock)
    }

    pub fn was_clamped(&self) -> bool {
        self.quantity_before.saturating_add(self.quantity_changed) < 0
    }
}

/// Reject a sale that would need more units than are on hand.
///
/// Sale creation calls this before adjusting, so sales never rely on the
/// clamp in [`StockChange::adjust`].
pub fn ensure_available(current_stock: i32, requested: i32) -> LedgerResult<()> {
    if current_stock < requested {
        return Err(LedgerError::InsufficientStock {
            available: current_stock,
            requested,
        });
    }
    Ok(())
}

/// Input for adding a product
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub unit: Option<String>,
    pub buying_price: Decimal,
    pub selling_price: Decimal,
    pub wholesale_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub current_stock: i32,
    #[validate(range(min = 0))]
    pub minimum_stock: i32,
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub barcode: Option<String>,
    #[validate(length(max = 255))]
    pub sku: Option<String>,
}

impl CreateProductInput {
    /// Price rules checked on creation: non-negative cost and tier prices,
    /// and a selling price strictly above cost
    pub fn validate_prices(&self) -> LedgerResult<()> {
        crate::validation::validate_product_prices(
            self.buying_price,
            self.selling_price,
            self.wholesale_price,
            self.retail_price,
        )?;
        if self.selling_price <= self.buying_price {
            return Err(LedgerError::InvalidPrice(
                "selling price must be greater than buying price".to_string(),
            ));
        }
        Ok(())
    }
}

/// Allow-listed edit of a product.
///
/// `current_stock` is not written directly; the backend routes it through a
/// `manual` set-stock movement.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub unit: Option<String>,
    pub buying_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub current_stock: Option<i32>,
    #[validate(range(min = 0))]
    pub minimum_stock: Option<i32>,
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub barcode: Option<String>,
    #[validate(length(max = 255))]
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    /// Merge the non-stock fields into `item`, leaving `current_stock` as is
    pub fn apply_to(&self, item: &InventoryItem) -> LedgerResult<InventoryItem> {
        let mut next = item.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if self.category.is_some() {
            next.category = self.category.clone();
        }
        if let Some(unit) = &self.unit {
            next.unit = unit.clone();
        }
        if let Some(price) = self.buying_price {
            next.buying_price = price;
        }
        if let Some(price) = self.selling_price {
            next.selling_price = price;
        }
        if self.wholesale_price.is_some() {
            next.wholesale_price = self.wholesale_price;
        }
        if self.retail_price.is_some() {
            next.retail_price = self.retail_price;
        }
        if let Some(min) = self.minimum_stock {
            next.minimum_stock = min;
        }
        if self.description.is_some() {
            next.description = self.description.clone();
        }
        if self.barcode.is_some() {
            next.barcode = self.barcode.clone();
        }
        if self.sku.is_some() {
            next.sku = self.sku.clone();
        }
        if let Some(active) = self.is_active {
            next.is_active = active;
        }

        crate::validation::validate_product_prices(
            next.buying_price,
            next.selling_price,
            next.wholesale_price,
            next.retail_price,
        )?;
        Ok(next)
    }

    /// New stock level requested by the patch, if it differs from `current`
    pub fn stock_target(&self, current: i32) -> Option<i32> {
        self.current_stock.filter(|target| *target != current)
    }
}

/// Stock status filter for product listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    LowStock,
    OutOfStock,
}

/// Inventory totals shown next to product listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventorySummary {
    pub total_items: i64,
    pub low_stock_items: i64,
    pub out_of_stock_items: i64,
    pub total_stock_value: Decimal,
}

impl InventorySummary {
    /// Summarise the available items in `items`
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Self {
        items
            .into_iter()
            .filter(|item| item.is_available())
            .fold(Self::default(), |mut acc, item| {
                acc.total_items += 1;
                if item.is_low_stock() {
                    acc.low_stock_items += 1;
                }
                if item.is_out_of_stock() {
                    acc.out_of_stock_items += 1;
                }
                acc.total_stock_value += item.stock_value();
                acc
            })
    }
}

/// Stored categories merged after the default list, without duplicates or blanks
pub fn merge_categories(stored: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut all: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    for category in stored {
        let category = category.trim().to_string();
        if !category.is_empty() && !all.contains(&category) {
            all.push(category);
        }
    }
    all
}
