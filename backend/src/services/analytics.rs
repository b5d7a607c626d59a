//! Analytics service for dashboard metrics and data export
//!
//! Loads the records and products visible to an actor into a
//! [`LedgerSnapshot`] and derives every figure from it.

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    Activity, Actor, BusinessHealth, BusinessMetrics, DashboardLimits, DashboardSummary,
    ExpenseCategory, LedgerSnapshot, LowStockAlert, Period, QuickStats, TopProduct, TrendPoint,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::records::RecordLedger;
use crate::services::stock::StockLedger;

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Records visible to `actor` plus every product of the business
    pub async fn snapshot(&self, actor: &Actor) -> AppResult<LedgerSnapshot> {
        let records = RecordLedger::new(self.db.clone())
            .visible_records(actor)
            .await?;
        let products = StockLedger::new(self.db.clone())
            .all_items(actor.business_id)
            .await?;

        tracing::debug!(
            business_id = %actor.business_id,
            records = records.len(),
            products = products.len(),
            "analytics snapshot loaded"
        );

        Ok(LedgerSnapshot::new(records, products))
    }

    /// Profit, inventory and credit figures for `period`
    pub async fn business_metrics(
        &self,
        actor: &Actor,
        period: Period,
        today: NaiveDate,
    ) -> AppResult<BusinessMetrics> {
        Ok(self.snapshot(actor).await?.business_metrics(period, today))
    }

    /// Health score with per-factor breakdown
    pub async fn business_health(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> AppResult<BusinessHealth> {
        Ok(self.snapshot(actor).await?.business_health(today))
    }

    /// Daily sales over the trend window of `period`
    pub async fn sales_trends(
        &self,
        actor: &Actor,
        period: Period,
        today: NaiveDate,
    ) -> AppResult<Vec<TrendPoint>> {
        Ok(self
            .snapshot(actor)
            .await?
            .sales_trend(period.trend_days(), today))
    }

    pub async fn top_products(
        &self,
        actor: &Actor,
        period: Period,
        limit: usize,
        today: NaiveDate,
    ) -> AppResult<Vec<TopProduct>> {
        Ok(self
            .snapshot(actor)
            .await?
            .top_products(period.window(today), limit))
    }

    pub async fn expense_breakdown(
        &self,
        actor: &Actor,
        period: Period,
        today: NaiveDate,
    ) -> AppResult<Vec<ExpenseCategory>> {
        Ok(self
            .snapshot(actor)
            .await?
            .expense_breakdown(period.window(today)))
    }

    pub async fn recent_activities(&self, actor: &Actor, limit: usize) -> AppResult<Vec<Activity>> {
        Ok(self.snapshot(actor).await?.recent_activities(limit))
    }

    pub async fn low_stock_alerts(
        &self,
        actor: &Actor,
        limit: usize,
    ) -> AppResult<Vec<LowStockAlert>> {
        Ok(self.snapshot(actor).await?.low_stock_alerts(limit))
    }

    pub async fn quick_stats(&self, actor: &Actor, today: NaiveDate) -> AppResult<QuickStats> {
        Ok(self.snapshot(actor).await?.quick_stats(today))
    }

    /// Everything the dashboard home screen needs in one call
    pub async fn dashboard_summary(
        &self,
        actor: &Actor,
        today: NaiveDate,
        limits: DashboardLimits,
    ) -> AppResult<DashboardSummary> {
        Ok(self.snapshot(actor).await?.dashboard_summary(today, limits))
    }

    /// Export report rows as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for row in data {
            wtr.serialize(row)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
