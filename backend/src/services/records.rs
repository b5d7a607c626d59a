//! Record ledger: sales, purchases and expenses with their stock side effects
//!
//! Every mutation runs in one transaction: the record row is locked or
//! inserted, the linked product is locked through the stock ledger, and both
//! commit together or not at all.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    ensure_available, normalize_payment_method, search_pattern, validate_payment_amount, Actor,
    BusinessRecord, CreateRecordInput, CreditSalesSummary, CreditStatusFilter, FundingSource,
    InventoryItem, LedgerError, MakePaymentInput, PaginatedResponse, Pagination, MONEY_SCALE,
    Payment, PaymentStatus, RecordKind, RecordPatch, RecordView, RecordsSummary, SaleType,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockLedger;

/// Record ledger service
#[derive(Clone)]
pub struct RecordLedger {
    db: PgPool,
}

/// Row for business_records
#[derive(Debug, FromRow)]
pub(crate) struct RecordRow {
    id: Uuid,
    business_id: Uuid,
    user_id: Uuid,
    transaction_id: Option<String>,
    record_type: String,
    description: String,
    amount: Decimal,
    record_date: NaiveDate,
    category: Option<String>,
    notes: Option<String>,
    customer_name: Option<String>,
    supplier_name: Option<String>,
    product_id: Option<Uuid>,
    quantity: Option<i32>,
    unit_price: Option<Decimal>,
    cost_of_goods_sold: Option<Decimal>,
    funding_source: Option<String>,
    sale_type: Option<String>,
    is_credit_sale: bool,
    total_amount: Decimal,
    amount_paid: Decimal,
    debt_amount: Decimal,
    payment_status: String,
    due_date: Option<NaiveDate>,
    reference_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn unknown(field: &'static str, value: &str) -> LedgerError {
    LedgerError::UnknownValue {
        field,
        value: value.to_string(),
    }
}

impl TryFrom<RecordRow> for BusinessRecord {
    type Error = LedgerError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let kind = RecordKind::parse(&row.record_type)
            .ok_or_else(|| unknown("record_type", &row.record_type))?;
        let payment_status = PaymentStatus::parse(&row.payment_status)
            .ok_or_else(|| unknown("payment_status", &row.payment_status))?;
        let funding_source = row
            .funding_source
            .as_deref()
            .map(|s| FundingSource::parse(s).ok_or_else(|| unknown("funding_source", s)))
            .transpose()?;
        let sale_type = row
            .sale_type
            .as_deref()
            .map(|s| SaleType::parse(s).ok_or_else(|| unknown("sale_type", s)))
            .transpose()?;

        Ok(BusinessRecord {
            id: row.id,
            business_id: row.business_id,
            user_id: row.user_id,
            transaction_id: row.transaction_id,
            kind,
            description: row.description,
            amount: row.amount,
            date: row.record_date,
            category: row.category,
            notes: row.notes,
            customer_name: row.customer_name,
            supplier_name: row.supplier_name,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            cost_of_goods_sold: row.cost_of_goods_sold,
            funding_source,
            sale_type,
            is_credit_sale: row.is_credit_sale,
            total_amount: row.total_amount,
            amount_paid: row.amount_paid,
            debt_amount: row.debt_amount,
            payment_status,
            due_date: row.due_date,
            reference_number: row.reference_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn into_records(rows: Vec<RecordRow>) -> Result<Vec<BusinessRecord>, LedgerError> {
    rows.into_iter().map(BusinessRecord::try_from).collect()
}

/// Filters for record listings
#[derive(Debug, Default)]
pub struct RecordFilter {
    pub kind: Option<RecordKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub credit_only: bool,
    pub with_debt: bool,
}

/// A page of records with totals over the same date scope
#[derive(Debug, Serialize)]
pub struct RecordListing {
    #[serde(flatten)]
    pub page: PaginatedResponse<RecordView>,
    pub summary: RecordsSummary,
}

/// A record with its payment history
#[derive(Debug, Serialize)]
pub struct RecordDetail {
    pub record: RecordView,
    pub payments: Vec<Payment>,
}

/// Credit sales with totals over all of them
#[derive(Debug, Serialize)]
pub struct CreditSalesListing {
    pub data: Vec<RecordView>,
    pub summary: CreditSalesSummary,
}

/// Result of a payment against a credit sale
#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub record: RecordView,
    pub payment: Payment,
}

/// Short form used by the quick-entry screens
#[derive(Debug, Deserialize, Validate)]
pub struct QuickRecordInput {
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
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
    pub funding_source: Option<FundingSource>,
    pub sale_type: Option<SaleType>,
}

impl QuickRecordInput {
    /// Full record input of `kind`, dated `today` unless a date was given
    pub fn into_record(self, kind: RecordKind, today: NaiveDate) -> CreateRecordInput {
        let unit_price = match self.quantity {
            Some(q) if q > 0 => Some((self.amount / Decimal::from(q)).round_dp(MONEY_SCALE)),
            _ => None,
        };
        CreateRecordInput {
            kind,
            description: self.description,
            amount: self.amount,
            date: self.date.unwrap_or(today),
            category: self.category,
            notes: self.notes,
            customer_name: self.customer_name,
            supplier_name: self.supplier_name,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price,
            cost_of_goods_sold: None,
            funding_source: self.funding_source,
            is_credit_sale: false,
            sale_type: self.sale_type,
            total_amount: None,
            amount_paid: None,
            due_date: None,
            transaction_id: None,
            reference_number: None,
        }
    }
}

/// Row for payments
#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    business_record_id: Uuid,
    user_id: Uuid,
    amount: Decimal,
    payment_date: DateTime<Utc>,
    payment_method: String,
    reference_number: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: row.id,
            business_record_id: row.business_record_id,
            user_id: row.user_id,
            amount: row.amount,
            payment_date: row.payment_date,
            payment_method: row.payment_method,
            reference_number: row.reference_number,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

impl RecordLedger {
    /// Create a new RecordLedger instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn stock(&self) -> StockLedger {
        StockLedger::new(self.db.clone())
    }

    /// Lock a live record visible to `actor`
    async fn lock_record(
        conn: &mut PgConnection,
        actor: &Actor,
        record_id: Uuid,
    ) -> AppResult<BusinessRecord> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT * FROM business_records
            WHERE id = $1 AND business_id = $2 AND deleted_at IS NULL
              AND ($3::uuid IS NULL OR user_id = $3)
            FOR UPDATE
            "#,
        )
        .bind(record_id)
        .bind(actor.business_id)
        .bind(actor.record_scope())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Record".to_string()))?;

        Ok(row.try_into()?)
    }

    async fn product_for(
        &self,
        actor: &Actor,
        product_id: Option<Uuid>,
    ) -> AppResult<Option<InventoryItem>> {
        match product_id {
            Some(id) => Ok(self
                .stock()
                .items_by_ids(actor.business_id, &[id])
                .await?
                .into_iter()
                .next()),
            None => Ok(None),
        }
    }

    async fn views(&self, actor: &Actor, records: &[BusinessRecord]) -> AppResult<Vec<RecordView>> {
        let mut ids: Vec<Uuid> = records.iter().filter_map(|r| r.product_id).collect();
        ids.sort();
        ids.dedup();
        let products: HashMap<Uuid, InventoryItem> = self
            .stock()
            .items_by_ids(actor.business_id, &ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        Ok(records
            .iter()
            .map(|r| r.view(r.product_id.and_then(|id| products.get(&id))))
            .collect())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Persist a record and apply its stock effect atomically
    pub async fn create(&self, actor: &Actor, input: CreateRecordInput) -> AppResult<RecordView> {
        input.validate()?;
        let new = input.prepare()?;

        let mut tx = self.db.begin().await?;

        let effect = new.stock_effect();
        let product = match (effect, new.product_id) {
            (Some(effect), _) => {
                let item =
                    StockLedger::lock_live_item(&mut *tx, actor.business_id, effect.product_id)
                        .await?;
                if new.kind == RecordKind::Sale {
                    if let Err(e) = ensure_available(item.current_stock, -effect.delta) {
                        tracing::warn!(
                            item_id = %item.id,
                            available = item.current_stock,
                            requested = -effect.delta,
                            "sale rejected for insufficient stock"
                        );
                        return Err(e.into());
                    }
                }
                Some(item)
            }
            (None, Some(product_id)) => Some(
                StockLedger::lock_live_item(&mut *tx, actor.business_id, product_id).await?,
            ),
            (None, None) => None,
        };

        let terms = new.terms;
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO business_records (
                business_id, user_id, transaction_id, record_type, description, amount,
                record_date, category, notes, customer_name, supplier_name, product_id,
                quantity, unit_price, cost_of_goods_sold, funding_source, sale_type,
                is_credit_sale, total_amount, amount_paid, debt_amount, payment_status,
                due_date, reference_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24)
            RETURNING *
            "#,
        )
        .bind(actor.business_id)
        .bind(actor.user_id)
        .bind(&new.transaction_id)
        .bind(new.kind.as_str())
        .bind(&new.description)
        .bind(new.amount)
        .bind(new.date)
        .bind(&new.category)
        .bind(&new.notes)
        .bind(&new.customer_name)
        .bind(&new.supplier_name)
        .bind(new.product_id)
        .bind(new.quantity)
        .bind(new.unit_price)
        .bind(new.cost_of_goods_sold)
        .bind(new.funding_source.map(|f| f.as_str()))
        .bind(new.sale_type.map(|s| s.as_str()))
        .bind(new.is_credit_sale)
        .bind(terms.total_amount)
        .bind(terms.amount_paid)
        .bind(terms.debt_amount)
        .bind(terms.payment_status.as_str())
        .bind(new.due_date)
        .bind(&new.reference_number)
        .fetch_one(&mut *tx)
        .await?;

        let record: BusinessRecord = row.try_into()?;

        let product = match (effect, product) {
            (Some(effect), Some(item)) => {
                let update = StockLedger::adjust_locked(
                    &mut *tx,
                    &item,
                    effect.delta,
                    effect.kind,
                    &new.stock_reason(),
                    actor.user_id,
                    Some(record.id),
                )
                .await?;
                Some(update.item.item)
            }
            (_, product) => product,
        };

        tx.commit().await?;

        tracing::info!(
            record_id = %record.id,
            kind = record.kind.as_str(),
            amount = %record.amount,
            credit = record.is_credit_sale,
            "record created"
        );

        Ok(record.view(product.as_ref()))
    }

    /// Apply an allow-listed patch; stock and credit fields are left alone
    pub async fn update(
        &self,
        actor: &Actor,
        record_id: Uuid,
        patch: RecordPatch,
    ) -> AppResult<RecordView> {
        patch.validate()?;

        let mut tx = self.db.begin().await?;
        let record = Self::lock_record(&mut *tx, actor, record_id).await?;
        let next = patch.apply_to(&record)?;

        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE business_records
            SET description = $1, amount = $2, record_date = $3, category = $4, notes = $5,
                customer_name = $6, supplier_name = $7, total_amount = $8, amount_paid = $9,
                debt_amount = $10, payment_status = $11, updated_at = NOW()
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&next.description)
        .bind(next.amount)
        .bind(next.date)
        .bind(&next.category)
        .bind(&next.notes)
        .bind(&next.customer_name)
        .bind(&next.supplier_name)
        .bind(next.total_amount)
        .bind(next.amount_paid)
        .bind(next.debt_amount)
        .bind(next.payment_status.as_str())
        .bind(record_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let record: BusinessRecord = row.try_into()?;
        let product = self.product_for(actor, record.product_id).await?;
        Ok(record.view(product.as_ref()))
    }

    /// Reverse the record's stock effect and soft delete it
    pub async fn delete(&self, actor: &Actor, record_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        let record = Self::lock_record(&mut *tx, actor, record_id).await?;

        if let Some(reversal) = record.reversal() {
            // Reversals go through even if the product was deleted since
            let item =
                StockLedger::lock_item(&mut *tx, actor.business_id, reversal.product_id).await?;
            StockLedger::adjust_locked(
                &mut *tx,
                &item,
                reversal.delta,
                reversal.kind,
                &record.reversal_reason(),
                actor.user_id,
                Some(record.id),
            )
            .await?;
        }

        sqlx::query(
            "UPDATE business_records SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(record_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(record_id = %record_id, kind = record.kind.as_str(), "record deleted");
        Ok(())
    }

    /// Record a payment against a credit sale
    pub async fn make_payment(
        &self,
        actor: &Actor,
        record_id: Uuid,
        input: MakePaymentInput,
    ) -> AppResult<PaymentReceipt> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let record = Self::lock_record(&mut *tx, actor, record_id).await?;

        let terms = match validate_payment(&record, input.amount) {
            Ok(terms) => terms,
            Err(e) => {
                tracing::warn!(record_id = %record_id, error = %e, "payment rejected");
                return Err(e.into());
            }
        };

        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE business_records
            SET amount_paid = $1, debt_amount = $2, amount = $1, payment_status = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(terms.amount_paid)
        .bind(terms.debt_amount)
        .bind(terms.payment_status.as_str())
        .bind(record_id)
        .fetch_one(&mut *tx)
        .await?;

        let payment = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments (
                business_record_id, user_id, amount, payment_method, reference_number, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(record_id)
        .bind(actor.user_id)
        .bind(input.amount)
        .bind(normalize_payment_method(input.payment_method.as_deref()))
        .bind(&input.reference_number)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            record_id = %record_id,
            amount = %input.amount,
            status = terms.payment_status.as_str(),
            "payment recorded"
        );

        let record: BusinessRecord = row.try_into()?;
        let product = self.product_for(actor, record.product_id).await?;
        Ok(PaymentReceipt {
            record: record.view(product.as_ref()),
            payment: payment.into(),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Records matching `filter`, newest first, with totals
    pub async fn list(
        &self,
        actor: &Actor,
        filter: RecordFilter,
        pagination: Pagination,
    ) -> AppResult<RecordListing> {
        let pattern = search_pattern(filter.search.as_deref());
        let kind = filter.kind.map(|k| k.as_str());
        let scope = actor.record_scope();

        tracing::debug!(business_id = %actor.business_id, ?scope, ?kind, "listing records");

        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT * FROM business_records
            WHERE business_id = $1 AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::text IS NULL OR record_type = $3)
              AND ($4::date IS NULL OR record_date >= $4)
              AND ($5::date IS NULL OR record_date <= $5)
              AND ($6::text IS NULL OR description ILIKE $6 OR customer_name ILIKE $6
                   OR supplier_name ILIKE $6 OR reference_number ILIKE $6 OR notes ILIKE $6)
              AND (NOT $7 OR (record_type = 'sale' AND is_credit_sale))
              AND (NOT $8 OR debt_amount > 0)
            ORDER BY record_date DESC, created_at DESC
            LIMIT $9 OFFSET $10
            "#,
        )
        .bind(actor.business_id)
        .bind(scope)
        .bind(kind)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(&pattern)
        .bind(filter.credit_only)
        .bind(filter.with_debt)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM business_records
            WHERE business_id = $1 AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::text IS NULL OR record_type = $3)
              AND ($4::date IS NULL OR record_date >= $4)
              AND ($5::date IS NULL OR record_date <= $5)
              AND ($6::text IS NULL OR description ILIKE $6 OR customer_name ILIKE $6
                   OR supplier_name ILIKE $6 OR reference_number ILIKE $6 OR notes ILIKE $6)
              AND (NOT $7 OR (record_type = 'sale' AND is_credit_sale))
              AND (NOT $8 OR debt_amount > 0)
            "#,
        )
        .bind(actor.business_id)
        .bind(scope)
        .bind(kind)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(&pattern)
        .bind(filter.credit_only)
        .bind(filter.with_debt)
        .fetch_one(&self.db)
        .await?;

        let summary = sqlx::query_as::<_, (Decimal, Decimal, Decimal, i64)>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE record_type = 'sale'), 0),
                COALESCE(SUM(amount) FILTER (WHERE record_type = 'purchase'), 0),
                COALESCE(SUM(amount) FILTER (WHERE record_type = 'expense'), 0),
                COUNT(*)
            FROM business_records
            WHERE business_id = $1 AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::date IS NULL OR record_date >= $3)
              AND ($4::date IS NULL OR record_date <= $4)
            "#,
        )
        .bind(actor.business_id)
        .bind(scope)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let records = into_records(rows)?;
        let views = self.views(actor, &records).await?;

        Ok(RecordListing {
            page: PaginatedResponse::new(views, &pagination, total.max(0) as u64),
            summary: RecordsSummary {
                total_sales: summary.0,
                total_purchases: summary.1,
                total_expenses: summary.2,
                total_records: summary.3,
            },
        })
    }

    /// One record with its payments
    pub async fn get(&self, actor: &Actor, record_id: Uuid) -> AppResult<RecordDetail> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT * FROM business_records
            WHERE id = $1 AND business_id = $2 AND deleted_at IS NULL
              AND ($3::uuid IS NULL OR user_id = $3)
            "#,
        )
        .bind(record_id)
        .bind(actor.business_id)
        .bind(actor.record_scope())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Record".to_string()))?;

        let record: BusinessRecord = row.try_into()?;

        let payments = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT * FROM payments
            WHERE business_record_id = $1
            ORDER BY payment_date ASC
            "#,
        )
        .bind(record_id)
        .fetch_all(&self.db)
        .await?;

        let product = self.product_for(actor, record.product_id).await?;
        Ok(RecordDetail {
            record: record.view(product.as_ref()),
            payments: payments.into_iter().map(Payment::from).collect(),
        })
    }

    /// Credit sales, optionally narrowed by settlement state
    pub async fn credit_sales(
        &self,
        actor: &Actor,
        status: Option<CreditStatusFilter>,
    ) -> AppResult<CreditSalesListing> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT * FROM business_records
            WHERE business_id = $1 AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR user_id = $2)
              AND record_type = 'sale' AND is_credit_sale
            ORDER BY record_date DESC, created_at DESC
            "#,
        )
        .bind(actor.business_id)
        .bind(actor.record_scope())
        .fetch_all(&self.db)
        .await?;

        let records = into_records(rows)?;
        let summary = CreditSalesSummary::from_records(&records);
        let selected: Vec<BusinessRecord> = records
            .into_iter()
            .filter(|r| status.map_or(true, |s| s.matches(r)))
            .collect();

        Ok(CreditSalesListing {
            data: self.views(actor, &selected).await?,
            summary,
        })
    }

    /// Records sharing a client transaction id, oldest first
    pub async fn by_transaction(
        &self,
        actor: &Actor,
        transaction_id: &str,
    ) -> AppResult<Vec<RecordView>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT * FROM business_records
            WHERE business_id = $1 AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR user_id = $2)
              AND transaction_id = $3
            ORDER BY created_at ASC
            "#,
        )
        .bind(actor.business_id)
        .bind(actor.record_scope())
        .bind(transaction_id)
        .fetch_all(&self.db)
        .await?;

        let records = into_records(rows)?;
        self.views(actor, &records).await
    }

    /// Live records visible to `actor`, for analytics
    pub(crate) async fn visible_records(&self, actor: &Actor) -> AppResult<Vec<BusinessRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT * FROM business_records
            WHERE business_id = $1 AND deleted_at IS NULL
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY record_date ASC, created_at ASC
            "#,
        )
        .bind(actor.business_id)
        .bind(actor.record_scope())
        .fetch_all(&self.db)
        .await?;

        Ok(into_records(rows)?)
    }
}

/// Terms after paying `amount` against `record`, checked in the order
/// credit sale, minimum amount, outstanding debt
pub fn validate_payment(
    record: &BusinessRecord,
    amount: Decimal,
) -> Result<shared::CreditTerms, LedgerError> {
    if !record.is_credit() {
        return Err(LedgerError::NotCreditSale);
    }
    validate_payment_amount(amount, record.remaining_debt())?;
    record.apply_payment(amount)
}
