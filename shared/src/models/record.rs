//! Business records (sales, purchases, expenses), credit terms and payments
//!
//! The credit fields of a record are only ever produced by [`CreditTerms`],
//! which keeps `amount_paid + debt_amount == total_amount` for credit sales
//! and `debt_amount == 0` for everything else.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::inventory::{InventoryItem, MovementKind, SaleType};
use crate::error::{LedgerError, LedgerResult};
use crate::validation::{validate_money_scale, validate_quantity};

/// Kind of ledger transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Sale,
    Purchase,
    Expense,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Sale => "sale",
            RecordKind::Purchase => "purchase",
            RecordKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(RecordKind::Sale),
            "purchase" => Some(RecordKind::Purchase),
            "expense" => Some(RecordKind::Expense),
            _ => None,
        }
    }
}

/// Where the money for a purchase came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    /// Paid out of business takings; counts against net profit
    Revenue,
    /// Paid from the owner's own pocket; excluded from business profit
    Personal,
}

impl FundingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingSource::Revenue => "revenue",
            FundingSource::Personal => "personal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "revenue" => Some(FundingSource::Revenue),
            "personal" => Some(FundingSource::Personal),
            _ => None,
        }
    }
}

/// Settlement state of a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "partial" => Some(PaymentStatus::Partial),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }

    /// Status as a pure function of what was paid against what is owed
    pub fn derive(amount_paid: Decimal, total_amount: Decimal) -> Self {
        let debt = (total_amount - amount_paid).max(Decimal::ZERO);
        if debt <= Decimal::ZERO {
            PaymentStatus::Paid
        } else if amount_paid > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        }
    }
}

/// The money fields of a record, always produced together
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreditTerms {
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub debt_amount: Decimal,
    pub payment_status: PaymentStatus,
}

impl CreditTerms {
    /// Settled in full at the time of the transaction
    pub fn cash(amount: Decimal) -> Self {
        Self {
            total_amount: amount,
            amount_paid: amount,
            debt_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Paid,
        }
    }

    /// Terms of a new credit sale
    pub fn credit(total_amount: Decimal, amount_paid: Decimal) -> LedgerResult<Self> {
        if total_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidCreditSaleInput(
                "total amount is required for credit sales".to_string(),
            ));
        }
        if amount_paid < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(
                "amount paid cannot be negative".to_string(),
            ));
        }
        validate_money_scale(total_amount, "total amount")?;
        validate_money_scale(amount_paid, "amount paid")?;
        if amount_paid > total_amount {
            return Err(LedgerError::InvalidCreditSaleInput(
                "amount paid cannot exceed total amount".to_string(),
            ));
        }
        Ok(Self::settle(total_amount, amount_paid))
    }

    fn settle(total_amount: Decimal, amount_paid: Decimal) -> Self {
        Self {
            total_amount,
            amount_paid,
            debt_amount: (total_amount - amount_paid).max(Decimal::ZERO),
            payment_status: PaymentStatus::derive(amount_paid, total_amount),
        }
    }

    /// Terms after receiving `amount`; `self` is left untouched on error
    pub fn apply_payment(&self, amount: Decimal) -> LedgerResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(
                "payment amount must be greater than zero".to_string(),
            ));
        }
        validate_money_scale(amount, "payment amount")?;
        if amount > self.debt_amount {
            return Err(LedgerError::Overpayment {
                amount,
                outstanding: self.debt_amount,
            });
        }
        Ok(Self::settle(self.total_amount, self.amount_paid + amount))
    }

    /// `amount_paid + debt_amount == total_amount`
    pub fn is_balanced(&self) -> bool {
        self.amount_paid + self.debt_amount == self.total_amount
    }
}

/// One ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessRecord {
    pub id: Uuid,
    pub business_id: Uuid,
    /// Author of the record
    pub user_id: Uuid,
    /// Client-side grouping key for multi-line transactions
    pub transaction_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub description: String,
    /// Income recognised so far; for sales this is the cash actually received
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
    pub supplier_name: Option<String>,
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub cost_of_goods_sold: Option<Decimal>,
    pub funding_source: Option<FundingSource>,
    pub sale_type: Option<SaleType>,
    pub is_credit_sale: bool,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub debt_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    pub reference_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A stock adjustment implied by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockEffect {
    pub product_id: Uuid,
    pub delta: i32,
    pub kind: MovementKind,
}

/// Stock adjustment caused by creating a record of `kind`
pub fn stock_effect(
    kind: RecordKind,
    product_id: Option<Uuid>,
    quantity: Option<i32>,
) -> Option<StockEffect> {
    let product_id = product_id?;
    let quantity = quantity.filter(|q| *q > 0)?;
    match kind {
        RecordKind::Sale => Some(StockEffect {
            product_id,
            delta: -quantity,
            kind: MovementKind::Sale,
        }),
        RecordKind::Purchase => Some(StockEffect {
            product_id,
            delta: quantity,
            kind: MovementKind::Purchase,
        }),
        RecordKind::Expense => None,
    }
}

impl BusinessRecord {
    pub fn is_credit(&self) -> bool {
        self.kind == RecordKind::Sale && self.is_credit_sale
    }

    pub fn has_debt(&self) -> bool {
        self.debt_amount > Decimal::ZERO
    }

    pub fn is_paid_in_full(&self) -> bool {
        !self.has_debt()
    }

    pub fn remaining_debt(&self) -> Decimal {
        self.debt_amount
    }

    pub fn paid_amount(&self) -> Decimal {
        self.amount_paid
    }

    /// Full price of the sale, paid or not
    pub fn sale_total(&self) -> Decimal {
        self.total_amount
    }

    pub fn is_revenue_funded_purchase(&self) -> bool {
        self.kind == RecordKind::Purchase && self.funding_source == Some(FundingSource::Revenue)
    }

    pub fn is_personal_funded_purchase(&self) -> bool {
        self.kind == RecordKind::Purchase && self.funding_source == Some(FundingSource::Personal)
    }

    pub fn credit_terms(&self) -> CreditTerms {
        CreditTerms {
            total_amount: self.total_amount,
            amount_paid: self.amount_paid,
            debt_amount: self.debt_amount,
            payment_status: self.payment_status,
        }
    }

    /// Label shown to users for the settlement state of a sale
    pub fn payment_status_label(&self) -> &'static str {
        if self.kind != RecordKind::Sale {
            "N/A"
        } else if !self.is_credit() {
            "Fedha Taslimu"
        } else if self.is_paid_in_full() {
            "Amelipa Kamili"
        } else if self.paid_amount() > Decimal::ZERO {
            "Amelipa Sehemu"
        } else {
            "Hajalipa"
        }
    }

    /// Cost basis of a sale: the stored COGS, else the linked product's
    /// buying price times quantity, else zero. A stored zero counts as unset.
    pub fn cogs(&self, product: Option<&InventoryItem>) -> Decimal {
        if self.kind != RecordKind::Sale {
            return Decimal::ZERO;
        }
        if let Some(cogs) = self.cost_of_goods_sold.filter(|c| !c.is_zero()) {
            return cogs;
        }
        match (self.product_id, product, self.quantity) {
            (Some(pid), Some(product), Some(quantity)) if product.id == pid => {
                product.cost_of(quantity)
            }
            _ => Decimal::ZERO,
        }
    }

    /// Profit of the whole sale, regardless of how much has been collected
    pub fn gross_profit(&self, product: Option<&InventoryItem>) -> Decimal {
        if self.kind != RecordKind::Sale {
            return Decimal::ZERO;
        }
        self.sale_total() - self.cogs(product)
    }

    /// Profit recognised so far.
    ///
    /// Cash sales book their full profit. Credit sales first recover cost:
    /// nothing is booked until payments exceed COGS, and the booked amount
    /// never exceeds the full-sale profit.
    pub fn recognized_gross_profit(&self, product: Option<&InventoryItem>) -> Decimal {
        if self.kind != RecordKind::Sale {
            return Decimal::ZERO;
        }
        let cogs = self.cogs(product);
        if !self.is_credit() {
            return self.sale_total() - cogs;
        }
        recognized_credit_profit(self.paid_amount(), self.sale_total(), cogs)
    }

    /// Cash sale, or credit sale collected in full
    pub fn is_fully_recognized(&self) -> bool {
        self.kind == RecordKind::Sale && (!self.is_credit() || self.is_paid_in_full())
    }

    pub fn stock_effect(&self) -> Option<StockEffect> {
        stock_effect(self.kind, self.product_id, self.quantity)
    }

    /// Compensating adjustment issued when this record is deleted
    pub fn reversal(&self) -> Option<StockEffect> {
        self.stock_effect().map(|effect| StockEffect {
            product_id: effect.product_id,
            delta: -effect.delta,
            kind: MovementKind::Adjustment,
        })
    }

    /// Movement reason written when the record is created
    pub fn stock_reason(&self) -> String {
        match self.kind {
            RecordKind::Sale => format!("Sale: {}", self.description),
            RecordKind::Purchase => format!("Purchase: {}", self.description),
            RecordKind::Expense => format!("Expense: {}", self.description),
        }
    }

    /// Movement reason written when the record is deleted
    pub fn reversal_reason(&self) -> String {
        format!("Reversed {}: {}", self.kind.as_str(), self.description)
    }

    /// Terms after a payment against this record
    pub fn apply_payment(&self, amount: Decimal) -> LedgerResult<CreditTerms> {
        if !self.is_credit() {
            return Err(LedgerError::NotCreditSale);
        }
        self.credit_terms().apply_payment(amount)
    }

    /// Record together with the values derived from it
    pub fn view(&self, product: Option<&InventoryItem>) -> RecordView {
        RecordView {
            record: self.clone(),
            product_name: product.map(|p| p.name.clone()),
            is_credit: self.is_credit(),
            has_debt: self.has_debt(),
            is_paid_in_full: self.is_paid_in_full(),
            remaining_debt: self.remaining_debt(),
            paid_amount: self.paid_amount(),
            sale_total: self.sale_total(),
            payment_status_label: self.payment_status_label(),
            gross_profit: self.gross_profit(product),
        }
    }
}

/// Profit recognised on a credit sale given what has been collected
pub fn recognized_credit_profit(amount_paid: Decimal, total_amount: Decimal, cogs: Decimal) -> Decimal {
    if amount_paid > cogs {
        (amount_paid - cogs).min(total_amount - cogs)
    } else {
        Decimal::ZERO
    }
}

/// A record as returned to clients, with derived values computed on read
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: BusinessRecord,
    pub product_name: Option<String>,
    pub is_credit: bool,
    pub has_debt: bool,
    pub is_paid_in_full: bool,
    pub remaining_debt: Decimal,
    pub paid_amount: Decimal,
    pub sale_total: Decimal,
    pub payment_status_label: &'static str,
    pub gross_profit: Decimal,
}

/// Receipt for one payment against a credit sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub business_record_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub payment_method: String,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a record
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecordInput {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[validate(length(max = 255))]
    pub category: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 255))]
    pub customer_name: Option<String>,
    #[validate(length(max = 255))]
    pub supplier_name: Option<String>,
    pub product_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub cost_of_goods_sold: Option<Decimal>,
    pub funding_source: Option<FundingSource>,
    #[serde(default)]
    pub is_credit_sale: bool,
    pub sale_type: Option<SaleType>,
    pub total_amount: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub transaction_id: Option<String>,
    #[validate(length(max = 255))]
    pub reference_number: Option<String>,
}

/// A fully derived record ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub transaction_id: Option<String>,
    pub kind: RecordKind,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
    pub supplier_name: Option<String>,
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub cost_of_goods_sold: Option<Decimal>,
    pub funding_source: Option<FundingSource>,
    pub sale_type: Option<SaleType>,
    pub is_credit_sale: bool,
    pub terms: CreditTerms,
    pub due_date: Option<NaiveDate>,
    pub reference_number: Option<String>,
}

impl NewRecord {
    pub fn stock_effect(&self) -> Option<StockEffect> {
        stock_effect(self.kind, self.product_id, self.quantity)
    }

    pub fn stock_reason(&self) -> String {
        match self.kind {
            RecordKind::Sale => format!("Sale: {}", self.description),
            RecordKind::Purchase => format!("Purchase: {}", self.description),
            RecordKind::Expense => format!("Expense: {}", self.description),
        }
    }
}

fn money_field(value: Option<Decimal>, what: &str) -> LedgerResult<()> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(LedgerError::InvalidAmount(format!(
            "{} cannot be negative",
            what
        ))),
        Some(v) => validate_money_scale(v, what),
        None => Ok(()),
    }
}

impl CreateRecordInput {
    /// Apply the kind-specific rules and derive the credit fields
    pub fn prepare(self) -> LedgerResult<NewRecord> {
        money_field(Some(self.amount), "amount")?;
        money_field(self.unit_price, "unit price")?;
        money_field(self.cost_of_goods_sold, "cost of goods sold")?;
        money_field(self.total_amount, "total amount")?;
        money_field(self.amount_paid, "amount paid")?;
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }

        if let Some(due) = self.due_date {
            if due <= self.date {
                return Err(LedgerError::InvalidDate(
                    "due date must be after the record date".to_string(),
                ));
            }
        }

        let is_credit_sale = self.kind == RecordKind::Sale && self.is_credit_sale;
        let (amount, terms) = if is_credit_sale {
            let has_customer = self
                .customer_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty());
            if !has_customer {
                return Err(LedgerError::InvalidCreditSaleInput(
                    "customer name is required for credit sales".to_string(),
                ));
            }
            let total = self.total_amount.ok_or_else(|| {
                LedgerError::InvalidCreditSaleInput(
                    "total amount is required for credit sales".to_string(),
                )
            })?;
            let terms = CreditTerms::credit(total, self.amount_paid.unwrap_or(Decimal::ZERO))?;
            (terms.amount_paid, terms)
        } else {
            (self.amount, CreditTerms::cash(self.amount))
        };

        let funding_source = match self.kind {
            RecordKind::Purchase => Some(self.funding_source.unwrap_or(FundingSource::Revenue)),
            RecordKind::Sale | RecordKind::Expense => None,
        };
        let sale_type = match self.kind {
            RecordKind::Sale => self.sale_type,
            RecordKind::Purchase | RecordKind::Expense => None,
        };

        Ok(NewRecord {
            transaction_id: self.transaction_id,
            kind: self.kind,
            description: self.description,
            amount,
            date: self.date,
            category: self.category,
            notes: self.notes,
            customer_name: self.customer_name,
            supplier_name: self.supplier_name,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            cost_of_goods_sold: self.cost_of_goods_sold,
            funding_source,
            sale_type,
            is_credit_sale,
            terms,
            due_date: self.due_date,
            reference_number: self.reference_number,
        })
    }
}

/// Allow-listed edit of a record.
///
/// Only descriptive fields and the cash amount can change; credit and stock
/// fields are never re-derived by an edit.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RecordPatch {
    #[validate(length(min = 1, max = 255))]
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub category: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 255))]
    pub customer_name: Option<String>,
    #[validate(length(max = 255))]
    pub supplier_name: Option<String>,
}

impl RecordPatch {
    pub fn apply_to(&self, record: &BusinessRecord) -> LedgerResult<BusinessRecord> {
        let mut next = record.clone();
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(amount) = self.amount.filter(|a| *a != record.amount) {
            if amount < Decimal::ZERO {
                return Err(LedgerError::InvalidAmount(
                    "amount cannot be negative".to_string(),
                ));
            }
            validate_money_scale(amount, "amount")?;
            if record.is_credit() {
                return Err(LedgerError::InvalidAmount(
                    "the amount of a credit sale follows its payments".to_string(),
                ));
            }
            let terms = CreditTerms::cash(amount);
            next.amount = amount;
            next.total_amount = terms.total_amount;
            next.amount_paid = terms.amount_paid;
            next.debt_amount = terms.debt_amount;
            next.payment_status = terms.payment_status;
        }
        if let Some(date) = self.date {
            next.date = date;
        }
        if self.category.is_some() {
            next.category = self.category.clone();
        }
        if self.notes.is_some() {
            next.notes = self.notes.clone();
        }
        if self.customer_name.is_some() {
            next.customer_name = self.customer_name.clone();
        }
        if self.supplier_name.is_some() {
            next.supplier_name = self.supplier_name.clone();
        }
        Ok(next)
    }
}

/// Input for recording a payment against a credit sale
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MakePaymentInput {
    pub amount: Decimal,
    #[validate(length(max = 255))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: Option<String>,
    #[validate(length(max = 255))]
    pub reference_number: Option<String>,
}

/// Filter for credit-sale listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatusFilter {
    Unpaid,
    Partial,
    Paid,
}

impl CreditStatusFilter {
    pub fn matches(&self, record: &BusinessRecord) -> bool {
        match self {
            CreditStatusFilter::Unpaid => record.amount_paid.is_zero(),
            CreditStatusFilter::Partial => {
                record.amount_paid > Decimal::ZERO && record.debt_amount > Decimal::ZERO
            }
            CreditStatusFilter::Paid => record.debt_amount <= Decimal::ZERO,
        }
    }
}

/// Totals over a business's credit sales
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreditSalesSummary {
    pub total_credit_sales: Decimal,
    pub total_paid: Decimal,
    pub total_debt: Decimal,
}

impl CreditSalesSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BusinessRecord>) -> Self {
        records
            .into_iter()
            .filter(|r| r.is_credit() && r.deleted_at.is_none())
            .fold(Self::default(), |mut acc, r| {
                acc.total_credit_sales += r.total_amount;
                acc.total_paid += r.amount_paid;
                acc.total_debt += r.debt_amount;
                acc
            })
    }
}

/// Totals shown next to record listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordsSummary {
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub total_expenses: Decimal,
    pub total_records: i64,
}
