//! Analytics tests
//!
//! Covers the dashboard figures computed from a ledger snapshot:
//! - Profit with cost-first recognition of credit sales
//! - Business health factor bands and overall status
//! - Period windows, sales trends and rankings

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::*;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Friday
fn today() -> NaiveDate {
    date(2024, 3, 15)
}

fn record(kind: RecordKind, amount: &str, on: NaiveDate) -> BusinessRecord {
    let now = Utc::now();
    let terms = CreditTerms::cash(dec(amount));
    BusinessRecord {
        id: Uuid::new_v4(),
        business_id: Uuid::nil(),
        user_id: Uuid::nil(),
        transaction_id: None,
        kind,
        description: format!("{} {}", kind.as_str(), amount),
        amount: dec(amount),
        date: on,
        category: None,
        notes: None,
        customer_name: None,
        supplier_name: None,
        product_id: None,
        quantity: None,
        unit_price: None,
        cost_of_goods_sold: None,
        funding_source: if kind == RecordKind::Purchase {
            Some(FundingSource::Revenue)
        } else {
            None
        },
        sale_type: None,
        is_credit_sale: false,
        total_amount: terms.total_amount,
        amount_paid: terms.amount_paid,
        debt_amount: terms.debt_amount,
        payment_status: terms.payment_status,
        due_date: None,
        reference_number: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn credit_sale(total: &str, paid: &str, customer: &str, on: NaiveDate) -> BusinessRecord {
    let terms = CreditTerms::credit(dec(total), dec(paid)).unwrap();
    BusinessRecord {
        is_credit_sale: true,
        customer_name: Some(customer.to_string()),
        amount: terms.amount_paid,
        total_amount: terms.total_amount,
        amount_paid: terms.amount_paid,
        debt_amount: terms.debt_amount,
        payment_status: terms.payment_status,
        ..record(RecordKind::Sale, "0", on)
    }
}

fn product(name: &str, buying: &str, stock: i32, minimum: i32) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
        id: Uuid::new_v4(),
        business_id: Uuid::nil(),
        user_id: Uuid::nil(),
        name: name.to_string(),
        category: Some("Nyingine".to_string()),
        unit: DEFAULT_UNIT.to_string(),
        buying_price: dec(buying),
        selling_price: dec(buying) * Decimal::TWO,
        wholesale_price: None,
        retail_price: None,
        current_stock: stock,
        minimum_stock: minimum,
        description: None,
        barcode: None,
        sku: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn sale_of(item: &InventoryItem, quantity: i32, amount: &str, on: NaiveDate) -> BusinessRecord {
    BusinessRecord {
        product_id: Some(item.id),
        quantity: Some(quantity),
        ..record(RecordKind::Sale, amount, on)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_period_start_dates() {
        assert_eq!(Period::Day.start_date(today()), today());
        // Weeks start on Monday
        assert_eq!(Period::Week.start_date(today()), date(2024, 3, 11));
        assert_eq!(Period::Week.start_date(date(2024, 3, 11)), date(2024, 3, 11));
        assert_eq!(Period::Month.start_date(today()), date(2024, 3, 1));
        assert_eq!(Period::Year.start_date(today()), date(2024, 1, 1));
    }

    #[test]
    fn test_trend_days_per_period() {
        assert_eq!(Period::Day.trend_days(), 7);
        assert_eq!(Period::Week.trend_days(), 7);
        assert_eq!(Period::Month.trend_days(), 30);
        assert_eq!(Period::Year.trend_days(), 365);
        assert_eq!(Period::default(), Period::Month);
    }

    #[test]
    fn test_profit_summary_cash_sale() {
        let unga = product("Unga", "60", 50, 5);
        let records = vec![
            sale_of(&unga, 10, "1000", today()),
            record(RecordKind::Expense, "100", today()),
            record(RecordKind::Purchase, "200", today()),
            BusinessRecord {
                funding_source: Some(FundingSource::Personal),
                ..record(RecordKind::Purchase, "500", today())
            },
        ];
        let snapshot = LedgerSnapshot::new(records, vec![unga]);
        let summary = snapshot.profit_summary(snapshot.records());

        assert_eq!(summary.revenue, dec("1000"));
        assert_eq!(summary.cost_of_goods_sold, dec("600"));
        assert_eq!(summary.gross_profit, dec("400"));
        assert_eq!(summary.expenses, dec("100"));
        assert_eq!(summary.purchases_revenue_funded, dec("200"));
        assert_eq!(summary.net_profit, dec("100"));
    }

    #[test]
    fn test_partly_paid_credit_sale_recognises_profit_after_cost() {
        let sale = BusinessRecord {
            cost_of_goods_sold: Some(dec("600")),
            ..credit_sale("1000", "700", "Juma", today())
        };
        let snapshot = LedgerSnapshot::new(vec![sale], vec![]);
        let summary = snapshot.profit_summary(snapshot.records());

        assert_eq!(summary.revenue, dec("700"));
        assert_eq!(summary.gross_profit, dec("100"));
        // Cost is only booked once the sale is fully collected
        assert_eq!(summary.cost_of_goods_sold, Decimal::ZERO);
    }

    #[test]
    fn test_metrics_windows() {
        let records = vec![
            record(RecordKind::Sale, "100", today()),
            record(RecordKind::Sale, "200", date(2024, 3, 12)),
            record(RecordKind::Sale, "400", date(2024, 3, 2)),
            record(RecordKind::Sale, "800", date(2024, 2, 20)),
        ];
        let snapshot = LedgerSnapshot::new(records, vec![]);

        let week = snapshot.business_metrics(Period::Week, today());
        assert_eq!(week.total.revenue, dec("1500"));
        assert_eq!(week.period_totals.revenue, dec("300"));
        assert_eq!(week.today.revenue, dec("100"));
        assert_eq!(week.date_range.start, date(2024, 3, 11));

        let month = snapshot.business_metrics(Period::Month, today());
        assert_eq!(month.period_totals.revenue, dec("700"));
    }

    #[test]
    fn test_metrics_credit_and_inventory_stats() {
        let records = vec![
            credit_sale("1000", "400", "Juma", today()),
            credit_sale("500", "100", "Juma", today()),
            credit_sale("300", "300", "Asha", today()),
        ];
        let mut deleted = product("Zamani", "10", 1, 5);
        deleted.deleted_at = Some(Utc::now());
        let products = vec![
            product("Sabuni", "10", 2, 5),
            product("Chumvi", "10", 0, 5),
            product("Mafuta", "10", 20, 5),
            deleted,
        ];
        let metrics = LedgerSnapshot::new(records, products).business_metrics(Period::Month, today());

        assert_eq!(metrics.credit.total_credit_sales, dec("1800"));
        assert_eq!(metrics.credit.total_debt, dec("1000"));
        assert_eq!(metrics.credit.customers_with_debt, 1);

        assert_eq!(metrics.inventory.total_products, 3);
        assert_eq!(metrics.inventory.low_stock_items, 1);
        assert_eq!(metrics.inventory.out_of_stock_items, 1);
        assert_eq!(metrics.inventory.total_stock_value, dec("220"));
    }

    #[test]
    fn test_deleted_records_ignored() {
        let mut deleted = record(RecordKind::Sale, "999", today());
        deleted.deleted_at = Some(Utc::now());
        let snapshot = LedgerSnapshot::new(
            vec![deleted, record(RecordKind::Sale, "1", today())],
            vec![],
        );
        assert_eq!(snapshot.records().len(), 1);
        assert_eq!(snapshot.quick_stats(today()).today_sales_count, 1);
    }

    #[test]
    fn test_profit_margin_bands() {
        let good = profit_margin_factor(dec("100"), dec("70")).unwrap();
        assert_eq!(good.score, 30);
        assert_eq!(good.status, FactorStatus::Good);

        let average = profit_margin_factor(dec("100"), dec("85")).unwrap();
        assert_eq!(average.score, 20);
        assert_eq!(average.status, FactorStatus::Average);

        let loss = profit_margin_factor(dec("100"), dec("150")).unwrap();
        assert_eq!(loss.score, 0);
        assert_eq!(loss.status, FactorStatus::Poor);
        assert_eq!(loss.value, dec("-50"));

        assert!(profit_margin_factor(Decimal::ZERO, dec("10")).is_none());
    }

    #[test]
    fn test_stock_factor_rounds_half_away_from_zero() {
        // 9 of 10 healthy: 22.5 points
        let good = stock_factor(10, 1).unwrap();
        assert_eq!(good.score, 23);
        assert_eq!(good.status, FactorStatus::Good);

        // 3 of 4 healthy: 18.75 points
        let average = stock_factor(4, 1).unwrap();
        assert_eq!(average.score, 19);
        assert_eq!(average.status, FactorStatus::Average);

        assert!(stock_factor(0, 0).is_none());
    }

    #[test]
    fn test_growth_bands() {
        let strong = growth_factor(dec("120"), dec("100")).unwrap();
        assert_eq!(strong.score, 25);
        assert_eq!(strong.status, FactorStatus::Good);

        let flat = growth_factor(dec("100"), dec("100")).unwrap();
        assert_eq!(flat.score, 15);
        assert_eq!(flat.status, FactorStatus::Average);

        let falling = growth_factor(dec("90"), dec("100")).unwrap();
        assert_eq!(falling.score, 5);
        assert_eq!(falling.status, FactorStatus::Poor);

        assert!(growth_factor(dec("100"), Decimal::ZERO).is_none());
    }

    #[test]
    fn test_debt_bands() {
        let low = debt_factor(dec("10"), dec("100")).unwrap();
        assert_eq!(low.score, 20);
        assert_eq!(low.status, FactorStatus::Good);

        let medium = debt_factor(dec("35"), dec("100")).unwrap();
        assert_eq!(medium.score, 10);
        assert_eq!(medium.status, FactorStatus::Average);

        let high = debt_factor(dec("60"), dec("100")).unwrap();
        assert_eq!(high.score, 5);
        assert_eq!(high.status, FactorStatus::Poor);

        assert!(debt_factor(Decimal::ZERO, Decimal::ZERO).is_none());
    }

    #[test]
    fn test_health_status_thresholds() {
        assert_eq!(HealthStatus::from_score(80), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(79), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(60), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(59), HealthStatus::Average);
        assert_eq!(HealthStatus::from_score(40), HealthStatus::Average);
        assert_eq!(HealthStatus::from_score(39), HealthStatus::Poor);
    }

    #[test]
    fn test_health_without_data() {
        let health = LedgerSnapshot::default().business_health(today());
        assert_eq!(health.score, 0);
        assert_eq!(health.status, HealthStatus::Poor);
        assert_eq!(health.status_text, "Biashara Inahitaji Uboreshaji");
        assert_eq!(health.recommendations.len(), 1);
    }

    #[test]
    fn test_health_without_revenue_scores_other_factors() {
        let products: Vec<InventoryItem> = (0..4)
            .map(|i| product(&format!("Bidhaa {}", i), "10", 20, 5))
            .collect();
        let records = vec![
            credit_sale("500", "0", "Juma", today()),
            record(RecordKind::Expense, "300", today()),
        ];
        let health = LedgerSnapshot::new(records, products).business_health(today());

        // no revenue: margin and growth are left out rather than scored 0
        assert!(health.factors.profit_margin.is_none());
        assert!(health.factors.revenue_growth.is_none());
        assert_eq!(health.factors.stock_management.as_ref().map(|f| f.score), Some(25));
        assert_eq!(health.factors.debt_management.as_ref().map(|f| f.score), Some(5));
        assert_eq!(health.score, 30);
        assert_eq!(health.status, HealthStatus::Poor);
    }

    #[test]
    fn test_health_of_growing_business() {
        let products: Vec<InventoryItem> = (0..10)
            .map(|i| product(&format!("Bidhaa {}", i), "10", 20, 5))
            .collect();
        let records = vec![
            record(RecordKind::Sale, "1200", today()),
            record(RecordKind::Sale, "1000", date(2024, 2, 10)),
        ];
        let health = LedgerSnapshot::new(records, products).business_health(today());

        // margin 30 + stock 25 + growth 25, no credit sales
        assert_eq!(health.score, 80);
        assert_eq!(health.status, HealthStatus::Excellent);
        assert!(health.factors.debt_management.is_none());
        assert_eq!(health.recommendations.len(), 1);
    }

    #[test]
    fn test_recommendations_for_weak_factors() {
        let factors = HealthFactors {
            profit_margin: profit_margin_factor(dec("100"), dec("95")),
            stock_management: stock_factor(10, 10),
            revenue_growth: None,
            debt_management: debt_factor(dec("10"), dec("100")),
        };
        let health = BusinessHealth::from_factors(factors);
        assert_eq!(health.recommendations.len(), 2);
        // margin 10 + stock 0 + debt 20
        assert_eq!(health.score, 30);
    }

    #[test]
    fn test_sales_trend_zero_filled() {
        let records = vec![
            record(RecordKind::Sale, "100", today()),
            record(RecordKind::Sale, "50", today()),
            record(RecordKind::Sale, "70", today() - Duration::days(2)),
            record(RecordKind::Expense, "999", today()),
        ];
        let trend = LedgerSnapshot::new(records, vec![]).sales_trend(7, today());

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, today() - Duration::days(6));
        assert_eq!(trend[6].date, today());
        assert_eq!(trend[6].sales, dec("150"));
        assert_eq!(trend[6].day_name, "Fri");
        assert_eq!(trend[4].sales, dec("70"));
        assert_eq!(trend[5].sales, Decimal::ZERO);
    }

    #[test]
    fn test_top_products_ranked_by_sales() {
        let chai = product("Chai", "5", 100, 5);
        let kahawa = product("Kahawa", "5", 100, 5);
        let records = vec![
            sale_of(&chai, 3, "300", today()),
            sale_of(&chai, 6, "600", today()),
            sale_of(&kahawa, 2, "1200", today()),
            sale_of(&kahawa, 9, "5000", date(2024, 1, 5)),
        ];
        let snapshot = LedgerSnapshot::new(records, vec![chai.clone(), kahawa.clone()]);

        let top = snapshot.top_products(Period::Month.window(today()), 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, kahawa.id);
        assert_eq!(top[0].total_sales, dec("1200"));
        assert_eq!(top[1].name.as_deref(), Some("Chai"));
        assert_eq!(top[1].total_quantity, 9);

        assert_eq!(snapshot.top_products(Period::Month.window(today()), 1).len(), 1);
    }

    #[test]
    fn test_expense_breakdown_grouped_by_category() {
        let with_category = |amount: &str, category: &str, on: NaiveDate| BusinessRecord {
            category: Some(category.to_string()),
            ..record(RecordKind::Expense, amount, on)
        };
        let records = vec![
            with_category("500", "Kodi", today()),
            with_category("300", "Kodi", today()),
            with_category("200", "Umeme", today()),
            with_category("900", "Umeme", date(2024, 2, 1)),
        ];
        let breakdown =
            LedgerSnapshot::new(records, vec![]).expense_breakdown(Period::Month.window(today()));

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category.as_deref(), Some("Kodi"));
        assert_eq!(breakdown[0].total_amount, dec("800"));
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[1].total_amount, dec("200"));
    }

    #[test]
    fn test_low_stock_alerts_emptiest_first() {
        let products = vec![
            product("Sabuni", "10", 2, 5),
            product("Chumvi", "10", 1, 5),
            product("Mafuta", "10", 0, 5),
            product("Maji", "10", 20, 5),
        ];
        let alerts = LedgerSnapshot::new(vec![], products).low_stock_alerts(5);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].name, "Chumvi");
        assert_eq!(alerts[1].name, "Sabuni");
    }

    #[test]
    fn test_quick_stats() {
        let records = vec![
            BusinessRecord {
                customer_name: Some("Asha".to_string()),
                ..record(RecordKind::Sale, "100", today())
            },
            credit_sale("500", "100", "Juma", today()),
            credit_sale("500", "100", "Juma", date(2024, 3, 1)),
            record(RecordKind::Purchase, "300", today()),
            record(RecordKind::Expense, "50", date(2024, 3, 14)),
        ];
        let stats = LedgerSnapshot::new(records, vec![product("Sabuni", "10", 2, 5)])
            .quick_stats(today());

        assert_eq!(stats.today_sales_count, 2);
        assert_eq!(stats.today_purchases_count, 1);
        assert_eq!(stats.today_expenses_count, 0);
        assert_eq!(stats.pending_debts_count, 2);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.total_customers, 2);
    }

    #[test]
    fn test_recent_activities_newest_first() {
        let mut older = record(RecordKind::Expense, "10", today());
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = credit_sale("100", "0", "Juma", today());
        let newer_id = newer.id;

        let activities = LedgerSnapshot::new(vec![older, newer], vec![]).recent_activities(1);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].id, newer_id);
        assert!(activities[0].is_credit);
        assert_eq!(activities[0].payment_status, "Hajalipa");
    }

    #[test]
    fn test_dashboard_summary_uses_limits() {
        let products: Vec<InventoryItem> = (0..8)
            .map(|i| product(&format!("Bidhaa {}", i), "10", 1, 5))
            .collect();
        let records: Vec<BusinessRecord> = (0..30)
            .map(|_| record(RecordKind::Sale, "10", today()))
            .collect();
        let summary = LedgerSnapshot::new(records, products)
            .dashboard_summary(today(), DashboardLimits::default());

        assert_eq!(summary.recent_activities.len(), 20);
        assert_eq!(summary.low_stock_alerts.len(), 5);
        assert_eq!(summary.sales_trends.len(), 7);
        assert_eq!(summary.total_inventory_items, 8);
        assert_eq!(summary.total_business_records, 30);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn money() -> impl Strategy<Value = Decimal> {
        (0i64..100_000_000).prop_map(|c| Decimal::new(c, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The health score never exceeds 100 and the status always matches it
        #[test]
        fn prop_health_score_bounded(
            revenue in money(),
            expenses in money(),
            active in 0u64..500,
            low_share in 0u64..=100,
            this_month in money(),
            last_month in money(),
            debt_share in 0u64..=100,
            credit in money()
        ) {
            let low = active * low_share / 100;
            let debt = credit * Decimal::from(debt_share) / Decimal::ONE_HUNDRED;
            let health = BusinessHealth::from_factors(HealthFactors {
                profit_margin: profit_margin_factor(revenue, expenses),
                stock_management: stock_factor(active, low),
                revenue_growth: growth_factor(this_month, last_month),
                debt_management: debt_factor(debt, credit),
            });

            prop_assert!(health.score <= 100);
            prop_assert_eq!(health.status, HealthStatus::from_score(health.score));
            prop_assert!(!health.recommendations.is_empty());
        }

        /// Stock score is within 0..=25 for any mix of products
        #[test]
        fn prop_stock_score_bounded(active in 1u64..10_000, low in 0u64..10_000) {
            let factor = stock_factor(active, low.min(active)).unwrap();
            prop_assert!(factor.score <= 25);
        }

        /// A trend has one bucket per day and sums the sales inside its window
        #[test]
        fn prop_trend_sums_window_sales(
            sales in prop::collection::vec((0i64..60, 1i64..100_000), 0..40),
            days in 1u32..45
        ) {
            let records: Vec<BusinessRecord> = sales
                .iter()
                .map(|(back, cents)| {
                    let amount = Decimal::new(*cents, 2).to_string();
                    record(RecordKind::Sale, &amount, today() - Duration::days(*back))
                })
                .collect();
            let expected: Decimal = sales
                .iter()
                .filter(|(back, _)| *back < i64::from(days))
                .map(|(_, cents)| Decimal::new(*cents, 2))
                .sum();

            let trend = LedgerSnapshot::new(records, vec![]).sales_trend(days, today());
            prop_assert_eq!(trend.len(), days as usize);
            let total: Decimal = trend.iter().map(|p| p.sales).sum();
            prop_assert_eq!(total, expected);
        }

        /// Net profit is gross profit less expenses and revenue-funded purchases
        #[test]
        fn prop_net_profit_identity(
            sales in prop::collection::vec(1i64..1_000_000, 0..10),
            expenses in prop::collection::vec(1i64..1_000_000, 0..10),
            purchases in prop::collection::vec(1i64..1_000_000, 0..10)
        ) {
            let mut records = Vec::new();
            for (kind, list) in [
                (RecordKind::Sale, &sales),
                (RecordKind::Expense, &expenses),
                (RecordKind::Purchase, &purchases),
            ] {
                for cents in list {
                    records.push(record(kind, &Decimal::new(*cents, 2).to_string(), today()));
                }
            }
            let snapshot = LedgerSnapshot::new(records, vec![]);
            let summary = snapshot.profit_summary(snapshot.records());
            prop_assert_eq!(
                summary.net_profit,
                summary.gross_profit - summary.expenses - summary.purchases_revenue_funded
            );
            prop_assert_eq!(summary.revenue, summary.gross_profit);
        }
    }
}
