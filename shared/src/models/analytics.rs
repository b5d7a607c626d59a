//! Read-only analytics over a tenant-scoped ledger snapshot
//!
//! Nothing here touches storage. The backend loads the records and products
//! an actor may see into a [`LedgerSnapshot`] and every metric is computed
//! from it, relative to an explicit `today`.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inventory::InventoryItem;
use super::record::{BusinessRecord, RecordKind};
use crate::types::DateRange;

/// Reporting period for dashboard queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Period::Day),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "year" => Some(Period::Year),
            _ => None,
        }
    }

    /// First day of the period containing `today`; weeks start on Monday
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => today,
            Period::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            Period::Month => month_start(today),
            Period::Year => today - Duration::days(i64::from(today.ordinal0())),
        }
    }

    /// Period start through `today`, inclusive
    pub fn window(&self, today: NaiveDate) -> DateRange {
        DateRange {
            start: self.start_date(today),
            end: today,
        }
    }

    /// Number of daily buckets in a sales trend
    pub fn trend_days(&self) -> u32 {
        match self {
            Period::Day | Period::Week => 7,
            Period::Month => 30,
            Period::Year => 365,
        }
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn previous_month(today: NaiveDate) -> DateRange {
    let this_month = month_start(today);
    let end = this_month - Duration::days(1);
    DateRange {
        start: month_start(end),
        end,
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Records and products visible to one actor
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    records: Vec<BusinessRecord>,
    products: Vec<InventoryItem>,
    by_id: HashMap<Uuid, usize>,
}

impl LedgerSnapshot {
    /// Soft-deleted records are dropped; soft-deleted products are kept for
    /// cost lookups but excluded from inventory statistics.
    pub fn new(records: Vec<BusinessRecord>, products: Vec<InventoryItem>) -> Self {
        let records = records
            .into_iter()
            .filter(|r| r.deleted_at.is_none())
            .collect();
        let by_id = products
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id, index))
            .collect();
        Self {
            records,
            products,
            by_id,
        }
    }

    pub fn records(&self) -> &[BusinessRecord] {
        &self.records
    }

    pub fn product(&self, id: Option<Uuid>) -> Option<&InventoryItem> {
        id.and_then(|id| self.by_id.get(&id))
            .and_then(|index| self.products.get(*index))
    }

    /// Products that are active and not deleted
    pub fn active_products(&self) -> impl Iterator<Item = &InventoryItem> {
        self.products.iter().filter(|item| item.is_available())
    }

    fn sales(&self) -> impl Iterator<Item = &BusinessRecord> {
        self.records.iter().filter(|r| r.kind == RecordKind::Sale)
    }

    fn in_range(&self, range: DateRange) -> impl Iterator<Item = &BusinessRecord> {
        self.records.iter().filter(move |r| range.contains(r.date))
    }

    /// Cost basis of a sale using the snapshot's products
    pub fn cogs(&self, record: &BusinessRecord) -> Decimal {
        record.cogs(self.product(record.product_id))
    }

    pub fn recognized_gross_profit(&self, record: &BusinessRecord) -> Decimal {
        record.recognized_gross_profit(self.product(record.product_id))
    }

    // ------------------------------------------------------------------
    // Profit
    // ------------------------------------------------------------------

    pub fn profit_summary<'a>(
        &self,
        records: impl IntoIterator<Item = &'a BusinessRecord>,
    ) -> ProfitSummary {
        let mut summary = ProfitSummary::default();
        for record in records {
            match record.kind {
                RecordKind::Sale => {
                    summary.revenue += sale_revenue(record);
                    summary.gross_profit += self.recognized_gross_profit(record);
                    if record.is_fully_recognized() {
                        summary.cost_of_goods_sold += self.cogs(record);
                    }
                }
                RecordKind::Expense => summary.expenses += record.amount,
                RecordKind::Purchase => {
                    if record.is_revenue_funded_purchase() {
                        summary.purchases_revenue_funded += record.amount;
                    }
                }
            }
        }
        summary.net_profit =
            summary.gross_profit - summary.expenses - summary.purchases_revenue_funded;
        summary
    }

    pub fn business_metrics(&self, period: Period, today: NaiveDate) -> BusinessMetrics {
        let window = period.window(today);
        let today_range = Period::Day.window(today);

        let inventory = InventoryStats::from_items(self.active_products());
        let credit = CreditStats::from_records(&self.records);

        let personal = |range: Option<DateRange>| -> Decimal {
            self.records
                .iter()
                .filter(|r| r.is_personal_funded_purchase())
                .filter(|r| range.map_or(true, |range| range.contains(r.date)))
                .map(|r| r.amount)
                .sum()
        };

        BusinessMetrics {
            period,
            date_range: window,
            total: self.profit_summary(&self.records),
            period_totals: self.profit_summary(self.in_range(window)),
            today: self.profit_summary(self.in_range(today_range)),
            inventory,
            credit,
            total_purchases_personal_funded: personal(None),
            period_purchases_personal_funded: personal(Some(window)),
        }
    }

    // ------------------------------------------------------------------
    // Health
    // ------------------------------------------------------------------

    pub fn business_health(&self, today: NaiveDate) -> BusinessHealth {
        let revenue: Decimal = self.sales().map(sale_revenue).sum();
        let expenses: Decimal = self
            .records
            .iter()
            .filter(|r| r.kind == RecordKind::Expense)
            .map(|r| r.amount)
            .sum();

        let active = self.active_products().count();
        let low = self.active_products().filter(|p| p.is_low_stock()).count();

        let this_month = Period::Month.window(today);
        let last_month = previous_month(today);
        let sales_in = |range: DateRange| -> Decimal {
            self.sales()
                .filter(|r| range.contains(r.date))
                .map(sale_revenue)
                .sum()
        };

        let credit = CreditStats::from_records(&self.records);

        let factors = HealthFactors {
            profit_margin: profit_margin_factor(revenue, expenses),
            stock_management: stock_factor(active as u64, low as u64),
            revenue_growth: growth_factor(sales_in(this_month), sales_in(last_month)),
            debt_management: debt_factor(credit.total_debt, credit.total_credit_sales),
        };
        BusinessHealth::from_factors(factors)
    }

    // ------------------------------------------------------------------
    // Trends and breakdowns
    // ------------------------------------------------------------------

    /// Daily sales for the last `days` days ending today, zero-filled
    pub fn sales_trend(&self, days: u32, today: NaiveDate) -> Vec<TrendPoint> {
        let mut by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
        for record in self.sales() {
            *by_day.entry(record.date).or_default() += record.amount;
        }
        (0..days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(i64::from(offset));
                TrendPoint {
                    date,
                    sales: by_day.get(&date).copied().unwrap_or_default(),
                    day_name: date.format("%a").to_string(),
                }
            })
            .collect()
    }

    /// Products ranked by sales amount within `range`
    pub fn top_products(&self, range: DateRange, limit: usize) -> Vec<TopProduct> {
        let mut grouped: HashMap<Uuid, (i64, Decimal)> = HashMap::new();
        for record in self.sales().filter(|r| range.contains(r.date)) {
            if let Some(product_id) = record.product_id {
                let entry = grouped.entry(product_id).or_default();
                entry.0 += i64::from(record.quantity.unwrap_or(0));
                entry.1 += record.amount;
            }
        }

        let mut ranked: Vec<TopProduct> = grouped
            .into_iter()
            .map(|(product_id, (total_quantity, total_sales))| {
                let product = self.product(Some(product_id));
                TopProduct {
                    product_id,
                    name: product.map(|p| p.name.clone()),
                    category: product.and_then(|p| p.category.clone()),
                    selling_price: product.map(|p| p.selling_price),
                    total_quantity,
                    total_sales,
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.total_sales
                .cmp(&a.total_sales)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Expenses in `range` grouped by category, largest first
    pub fn expense_breakdown(&self, range: DateRange) -> Vec<ExpenseCategory> {
        let mut grouped: HashMap<Option<String>, (Decimal, i64)> = HashMap::new();
        for record in self
            .in_range(range)
            .filter(|r| r.kind == RecordKind::Expense)
        {
            let entry = grouped.entry(record.category.clone()).or_default();
            entry.0 += record.amount;
            entry.1 += 1;
        }
        let mut breakdown: Vec<ExpenseCategory> = grouped
            .into_iter()
            .map(|(category, (total_amount, count))| ExpenseCategory {
                category,
                total_amount,
                count,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.category.cmp(&b.category))
        });
        breakdown
    }

    /// Newest records first
    pub fn recent_activities(&self, limit: usize) -> Vec<Activity> {
        let mut records: Vec<&BusinessRecord> = self.records.iter().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
            .into_iter()
            .take(limit)
            .map(|record| Activity {
                id: record.id,
                kind: record.kind,
                description: record.description.clone(),
                amount: record.amount,
                date: record.date,
                created_at: record.created_at,
                customer_name: record.customer_name.clone(),
                supplier_name: record.supplier_name.clone(),
                product_name: self.product(record.product_id).map(|p| p.name.clone()),
                is_credit: record.is_credit(),
                payment_status: record.payment_status_label(),
            })
            .collect()
    }

    /// Low stock products, emptiest first
    pub fn low_stock_alerts(&self, limit: usize) -> Vec<LowStockAlert> {
        let mut alerts: Vec<LowStockAlert> = self
            .active_products()
            .filter(|item| item.is_low_stock())
            .map(|item| LowStockAlert {
                id: item.id,
                name: item.name.clone(),
                current_stock: item.current_stock,
                minimum_stock: item.minimum_stock,
                category: item.category.clone(),
            })
            .collect();
        alerts.sort_by(|a, b| {
            a.current_stock
                .cmp(&b.current_stock)
                .then_with(|| a.name.cmp(&b.name))
        });
        alerts.truncate(limit);
        alerts
    }

    pub fn quick_stats(&self, today: NaiveDate) -> QuickStats {
        let count_today = |kind: RecordKind| -> i64 {
            self.records
                .iter()
                .filter(|r| r.kind == kind && r.date == today)
                .count() as i64
        };
        let customers: BTreeSet<&str> = self
            .sales()
            .filter_map(|r| r.customer_name.as_deref())
            .collect();
        QuickStats {
            today_sales_count: count_today(RecordKind::Sale),
            today_purchases_count: count_today(RecordKind::Purchase),
            today_expenses_count: count_today(RecordKind::Expense),
            pending_debts_count: self
                .records
                .iter()
                .filter(|r| r.is_credit() && r.has_debt())
                .count() as i64,
            low_stock_count: self.active_products().filter(|p| p.is_low_stock()).count() as i64,
            total_customers: customers.len() as i64,
        }
    }
}

/// Cash sales count their amount, credit sales what has been collected
fn sale_revenue(record: &BusinessRecord) -> Decimal {
    if record.is_credit() {
        record.paid_amount()
    } else {
        record.amount
    }
}

/// Money figures for one window
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfitSummary {
    pub revenue: Decimal,
    /// Cost of cash sales and fully collected credit sales
    pub cost_of_goods_sold: Decimal,
    /// Recognised gross profit
    pub gross_profit: Decimal,
    pub expenses: Decimal,
    pub purchases_revenue_funded: Decimal,
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryStats {
    pub total_products: i64,
    pub low_stock_items: i64,
    pub out_of_stock_items: i64,
    pub total_stock_value: Decimal,
}

impl InventoryStats {
    fn from_items<'a>(items: impl Iterator<Item = &'a InventoryItem>) -> Self {
        items.fold(Self::default(), |mut acc, item| {
            acc.total_products += 1;
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

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreditStats {
    pub total_credit_sales: Decimal,
    pub total_debt: Decimal,
    pub customers_with_debt: i64,
}

impl CreditStats {
    fn from_records(records: &[BusinessRecord]) -> Self {
        let mut stats = Self::default();
        let mut debtors = BTreeSet::new();
        for record in records.iter().filter(|r| r.is_credit()) {
            stats.total_credit_sales += record.total_amount;
            stats.total_debt += record.debt_amount;
            if record.has_debt() {
                if let Some(name) = record.customer_name.as_deref() {
                    debtors.insert(name);
                }
            }
        }
        stats.customers_with_debt = debtors.len() as i64;
        stats
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessMetrics {
    pub period: Period,
    pub date_range: DateRange,
    pub total: ProfitSummary,
    pub period_totals: ProfitSummary,
    pub today: ProfitSummary,
    pub inventory: InventoryStats,
    pub credit: CreditStats,
    pub total_purchases_personal_funded: Decimal,
    pub period_purchases_personal_funded: Decimal,
}

/// Rating of a single health factor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FactorStatus {
    Good,
    Average,
    Poor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthFactor {
    pub score: u32,
    /// Margin, stock ratio, growth rate or debt ratio, as a percentage
    pub value: Decimal,
    pub status: FactorStatus,
}

/// Factors that applied; a factor without data is `None` and scores nothing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthFactors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margin: Option<HealthFactor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_management: Option<HealthFactor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_growth: Option<HealthFactor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_management: Option<HealthFactor>,
}

impl HealthFactors {
    pub fn score(&self) -> u32 {
        [
            &self.profit_margin,
            &self.stock_management,
            &self.revenue_growth,
            &self.debt_management,
        ]
        .into_iter()
        .flatten()
        .map(|f| f.score)
        .sum()
    }

    /// Advice for every factor that is not rated good
    pub fn recommendations(&self) -> Vec<String> {
        let needs_work = |factor: &Option<HealthFactor>| {
            factor
                .as_ref()
                .is_some_and(|f| f.status != FactorStatus::Good)
        };
        let mut advice = Vec::new();
        if needs_work(&self.profit_margin) {
            advice.push("Ongeza bei za mauzo au punguza gharama za biashara".to_string());
        }
        if needs_work(&self.stock_management) {
            advice.push("Ongeza hifadhi ya bidhaa zinazokwisha haraka".to_string());
        }
        if needs_work(&self.revenue_growth) {
            advice.push("Tafuta njia za kuongeza mauzo kwa mfano uuzaji mkubwa".to_string());
        }
        if needs_work(&self.debt_management) {
            advice.push("Fuatilia madeni ya wateja na uwahimize kulipa mapema".to_string());
        }
        if advice.is_empty() {
            advice.push(
                "Endelea kufanya vizuri! Fuatilia takwimu za biashara yako kila siku".to_string(),
            );
        }
        advice
    }
}

/// Margin of revenue over expenses, worth up to 30 points
pub fn profit_margin_factor(revenue: Decimal, expenses: Decimal) -> Option<HealthFactor> {
    if revenue <= Decimal::ZERO {
        return None;
    }
    let margin = (revenue - expenses) / revenue * Decimal::ONE_HUNDRED;
    let score = if margin >= Decimal::from(30) {
        30
    } else if margin >= Decimal::from(20) {
        25
    } else if margin >= Decimal::from(10) {
        20
    } else if margin >= Decimal::ZERO {
        10
    } else {
        0
    };
    let status = if margin >= Decimal::from(20) {
        FactorStatus::Good
    } else if margin >= Decimal::from(10) {
        FactorStatus::Average
    } else {
        FactorStatus::Poor
    };
    Some(HealthFactor {
        score,
        value: round2(margin),
        status,
    })
}

/// Share of active products not running low, worth up to 25 points
pub fn stock_factor(active_products: u64, low_stock: u64) -> Option<HealthFactor> {
    if active_products == 0 {
        return None;
    }
    let healthy = active_products.saturating_sub(low_stock);
    let ratio = Decimal::from(healthy) / Decimal::from(active_products);
    let score = (Decimal::from(25) * ratio)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);
    let status = if ratio >= Decimal::new(9, 1) {
        FactorStatus::Good
    } else if ratio >= Decimal::new(7, 1) {
        FactorStatus::Average
    } else {
        FactorStatus::Poor
    };
    Some(HealthFactor {
        score,
        value: round2(ratio * Decimal::ONE_HUNDRED),
        status,
    })
}

/// Month-over-month sales growth, worth up to 25 points
pub fn growth_factor(this_month: Decimal, last_month: Decimal) -> Option<HealthFactor> {
    if last_month <= Decimal::ZERO {
        return None;
    }
    let growth = (this_month - last_month) / last_month * Decimal::ONE_HUNDRED;
    let score = if growth >= Decimal::from(20) {
        25
    } else if growth >= Decimal::from(10) {
        20
    } else if growth >= Decimal::ZERO {
        15
    } else {
        5
    };
    let status = if growth >= Decimal::from(10) {
        FactorStatus::Good
    } else if growth >= Decimal::ZERO {
        FactorStatus::Average
    } else {
        FactorStatus::Poor
    };
    Some(HealthFactor {
        score,
        value: round2(growth),
        status,
    })
}

/// Outstanding debt against credit sold, worth up to 20 points
pub fn debt_factor(total_debt: Decimal, total_credit_sales: Decimal) -> Option<HealthFactor> {
    if total_credit_sales <= Decimal::ZERO {
        return None;
    }
    let ratio = total_debt / total_credit_sales;
    let score = if ratio <= Decimal::new(1, 1) {
        20
    } else if ratio <= Decimal::new(3, 1) {
        15
    } else if ratio <= Decimal::new(5, 1) {
        10
    } else {
        5
    };
    let status = if ratio <= Decimal::new(2, 1) {
        FactorStatus::Good
    } else if ratio <= Decimal::new(4, 1) {
        FactorStatus::Average
    } else {
        FactorStatus::Poor
    };
    Some(HealthFactor {
        score,
        value: round2(ratio * Decimal::ONE_HUNDRED),
        status,
    })
}

/// Overall rating from the summed score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Average,
    Poor,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => HealthStatus::Excellent,
            60..=79 => HealthStatus::Good,
            40..=59 => HealthStatus::Average,
            _ => HealthStatus::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Average => "average",
            HealthStatus::Poor => "poor",
        }
    }

    /// Label shown to users
    pub fn text(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Biashara Ina Afya Nzuri Sana",
            HealthStatus::Good => "Biashara Ina Afya Nzuri",
            HealthStatus::Average => "Biashara Ina Afya ya Wastani",
            HealthStatus::Poor => "Biashara Inahitaji Uboreshaji",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessHealth {
    pub score: u32,
    pub status: HealthStatus,
    pub status_text: String,
    pub factors: HealthFactors,
    pub recommendations: Vec<String>,
}

impl BusinessHealth {
    pub fn from_factors(factors: HealthFactors) -> Self {
        let score = factors.score();
        let status = HealthStatus::from_score(score);
        Self {
            score,
            status,
            status_text: status.text().to_string(),
            recommendations: factors.recommendations(),
            factors,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub day_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: Option<String>,
    pub category: Option<String>,
    pub selling_price: Option<Decimal>,
    pub total_quantity: i64,
    pub total_sales: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategory {
    pub category: Option<String>,
    pub total_amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Activity {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub supplier_name: Option<String>,
    pub product_name: Option<String>,
    pub is_credit: bool,
    pub payment_status: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockAlert {
    pub id: Uuid,
    pub name: String,
    pub current_stock: i32,
    pub minimum_stock: i32,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuickStats {
    pub today_sales_count: i64,
    pub today_purchases_count: i64,
    pub today_expenses_count: i64,
    pub pending_debts_count: i64,
    pub low_stock_count: i64,
    pub total_customers: i64,
}

/// Everything the dashboard home screen shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub business_metrics: BusinessMetrics,
    pub business_health: BusinessHealth,
    pub sales_trends: Vec<TrendPoint>,
    pub top_products: Vec<TopProduct>,
    pub recent_activities: Vec<Activity>,
    pub low_stock_alerts: Vec<LowStockAlert>,
    pub quick_stats: QuickStats,
    pub total_inventory_items: i64,
    pub total_business_records: i64,
}

/// Limits applied when building a [`DashboardSummary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    pub recent_activities: usize,
    pub top_products: usize,
    pub low_stock_alerts: usize,
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self {
            recent_activities: 20,
            top_products: 10,
            low_stock_alerts: 5,
        }
    }
}

impl LedgerSnapshot {
    pub fn dashboard_summary(&self, today: NaiveDate, limits: DashboardLimits) -> DashboardSummary {
        DashboardSummary {
            business_metrics: self.business_metrics(Period::Month, today),
            business_health: self.business_health(today),
            sales_trends: self.sales_trend(Period::Week.trend_days(), today),
            top_products: self.top_products(Period::Month.window(today), limits.top_products),
            recent_activities: self.recent_activities(limits.recent_activities),
            low_stock_alerts: self.low_stock_alerts(limits.low_stock_alerts),
            quick_stats: self.quick_stats(today),
            total_inventory_items: self.products.iter().filter(|p| p.deleted_at.is_none()).count()
                as i64,
            total_business_records: self.records.len() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_start_dates() {
        // 2024-05-15 is a Wednesday
        let today = date(2024, 5, 15);
        assert_eq!(Period::Day.start_date(today), today);
        assert_eq!(Period::Week.start_date(today), date(2024, 5, 13));
        assert_eq!(Period::Month.start_date(today), date(2024, 5, 1));
        assert_eq!(Period::Year.start_date(today), date(2024, 1, 1));
    }

    #[test]
    fn previous_month_crosses_year_boundary() {
        let range = previous_month(date(2024, 1, 20));
        assert_eq!(range.start, date(2023, 12, 1));
        assert_eq!(range.end, date(2023, 12, 31));
    }

    #[test]
    fn factor_bands() {
        let margin = profit_margin_factor(Decimal::from(100), Decimal::from(75)).unwrap();
        assert_eq!(margin.score, 25);
        assert_eq!(margin.status, FactorStatus::Good);
        assert!(profit_margin_factor(Decimal::ZERO, Decimal::from(5)).is_none());

        let stock = stock_factor(8, 1).unwrap();
        // 25 * 7/8 = 21.875
        assert_eq!(stock.score, 22);
        assert_eq!(stock.status, FactorStatus::Poor);

        let growth = growth_factor(Decimal::from(90), Decimal::from(100)).unwrap();
        assert_eq!(growth.score, 5);
        assert_eq!(growth.status, FactorStatus::Poor);

        let debt = debt_factor(Decimal::from(25), Decimal::from(100)).unwrap();
        assert_eq!(debt.score, 15);
        assert_eq!(debt.status, FactorStatus::Average);
    }

    #[test]
    fn stock_score_rounds_half_away_from_zero() {
        // 25 * 1/2 = 12.5
        assert_eq!(stock_factor(2, 1).unwrap().score, 13);
    }

    #[test]
    fn health_status_thresholds() {
        assert_eq!(HealthStatus::from_score(80), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(79), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(40), HealthStatus::Average);
        assert_eq!(HealthStatus::from_score(39), HealthStatus::Poor);
    }

    #[test]
    fn empty_business_gets_encouragement() {
        let health = LedgerSnapshot::default().business_health(date(2024, 5, 15));
        assert_eq!(health.score, 0);
        assert_eq!(health.status, HealthStatus::Poor);
        assert_eq!(health.recommendations.len(), 1);
    }
}
