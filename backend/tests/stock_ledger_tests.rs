//! Stock ledger tests
//!
//! Covers the rules the stock ledger service applies inside its transactions:
//! - Stock never goes negative and every change is recorded as a movement
//! - Sales are rejected up front when stock is short
//! - Creating then deleting a sale or purchase restores the stock level

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::*;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(current_stock: i32, minimum_stock: i32) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
        id: Uuid::new_v4(),
        business_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Sukari 1kg".to_string(),
        category: Some("Chakula na Vinywaji".to_string()),
        unit: DEFAULT_UNIT.to_string(),
        buying_price: dec("2500"),
        selling_price: dec("3000"),
        wholesale_price: None,
        retail_price: None,
        current_stock,
        minimum_stock,
        description: None,
        barcode: None,
        sku: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn product_input(buying: &str, selling: &str) -> CreateProductInput {
    CreateProductInput {
        name: "Mchele".to_string(),
        category: None,
        unit: None,
        buying_price: dec(buying),
        selling_price: dec(selling),
        wholesale_price: None,
        retail_price: None,
        current_stock: 10,
        minimum_stock: 2,
        description: None,
        barcode: None,
        sku: None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_adjust_within_bounds() {
        let change = StockChange::adjust(10, -4).unwrap();
        assert_eq!(change.quantity_before, 10);
        assert_eq!(change.quantity_after, 6);
        assert_eq!(change.quantity_changed, -4);
        assert!(!change.was_clamped());
    }

    #[test]
    fn test_adjust_clamps_at_zero() {
        let change = StockChange::adjust(3, -10).unwrap();
        assert_eq!(change.quantity_after, 0);
        assert_eq!(change.quantity_changed, -10);
        assert!(change.was_clamped());
    }

    #[test]
    fn test_adjust_rejects_overflow() {
        assert!(matches!(
            StockChange::adjust(i32::MAX - 5, 10),
            Err(LedgerError::InvalidAmount(_))
        ));
        let full = StockChange::adjust(i32::MAX - 5, 5).unwrap();
        assert_eq!(full.quantity_after, i32::MAX);
    }

    #[test]
    fn test_two_sales_cross_reorder_threshold() {
        let mut product = item(10, 5);
        let product_id = product.id;

        for (expected_stock, expected_low) in [(7, false), (4, true)] {
            ensure_available(product.current_stock, 3).unwrap();
            let effect = stock_effect(RecordKind::Sale, Some(product_id), Some(3)).unwrap();
            let change = StockChange::adjust(product.current_stock, effect.delta).unwrap();
            assert_eq!(change.quantity_changed, -3);
            product.current_stock = change.quantity_after;

            assert_eq!(product.current_stock, expected_stock);
            assert_eq!(product.is_low_stock(), expected_low);
            assert!(!product.is_out_of_stock());
        }
    }

    #[test]
    fn test_set_records_difference() {
        let change = StockChange::set(12, 5);
        assert_eq!(change.quantity_after, 5);
        assert_eq!(change.quantity_changed, -7);

        let negative = StockChange::set(4, -3);
        assert_eq!(negative.quantity_after, 0);
        assert_eq!(negative.quantity_changed, -4);
    }

    #[test]
    fn test_initial_movement_starts_from_zero() {
        let change = StockChange::initial(25);
        assert_eq!(change.quantity_before, 0);
        assert_eq!(change.quantity_after, 25);
        assert_eq!(change.quantity_changed, 25);
    }

    #[test]
    fn test_sale_rejected_when_stock_short() {
        assert!(ensure_available(5, 5).is_ok());
        match ensure_available(5, 6) {
            Err(LedgerError::InsufficientStock {
                available,
                requested,
            }) => {
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
    }

    #[test]
    fn test_low_and_out_of_stock_flags() {
        assert!(item(3, 5).is_low_stock());
        assert!(item(5, 5).is_low_stock());
        assert!(!item(6, 5).is_low_stock());

        let empty = item(0, 5);
        assert!(empty.is_out_of_stock());
        assert!(!empty.is_low_stock());
    }

    #[test]
    fn test_stock_value_at_cost() {
        assert_eq!(item(4, 1).stock_value(), dec("10000"));
    }

    #[test]
    fn test_tier_prices_fall_back_to_selling_price() {
        let mut product = item(1, 0);
        assert_eq!(product.price_for(SaleType::Wholesale), dec("3000"));
        product.wholesale_price = Some(dec("2800"));
        assert_eq!(product.price_for(SaleType::Wholesale), dec("2800"));
        assert_eq!(product.price_for(SaleType::Retail), dec("3000"));
    }

    #[test]
    fn test_margin_zero_without_cost() {
        let mut product = item(1, 0);
        product.buying_price = Decimal::ZERO;
        assert_eq!(product.profit_margin_retail(), Decimal::ZERO);
    }

    #[test]
    fn test_margin_percent() {
        // (3000 - 2500) / 3000 * 100
        assert_eq!(item(1, 0).profit_margin_retail(), dec("16.67"));
    }

    #[test]
    fn test_selling_price_must_exceed_buying_price() {
        assert!(product_input("100", "150").validate_prices().is_ok());
        assert!(matches!(
            product_input("100", "100").validate_prices(),
            Err(LedgerError::InvalidPrice(_))
        ));
        assert!(matches!(
            product_input("-1", "150").validate_prices(),
            Err(LedgerError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_patch_never_writes_stock_directly() {
        let product = item(10, 2);
        let patch = ProductPatch {
            name: Some("Sukari 2kg".to_string()),
            current_stock: Some(40),
            ..Default::default()
        };
        let next = patch.apply_to(&product).unwrap();
        assert_eq!(next.name, "Sukari 2kg");
        assert_eq!(next.current_stock, 10);
        assert_eq!(patch.stock_target(product.current_stock), Some(40));
        assert_eq!(patch.stock_target(40), None);
    }

    #[test]
    fn test_summary_skips_deleted_and_inactive() {
        let mut deleted = item(10, 2);
        deleted.deleted_at = Some(Utc::now());
        let mut inactive = item(10, 2);
        inactive.is_active = false;
        let items = vec![item(1, 2), item(0, 2), deleted, inactive];

        let summary = InventorySummary::from_items(&items);
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.low_stock_items, 1);
        assert_eq!(summary.out_of_stock_items, 1);
        assert_eq!(summary.total_stock_value, dec("2500"));
    }

    #[test]
    fn test_categories_merge_after_defaults() {
        let merged = merge_categories(vec![
            "Vifaa".to_string(),
            "Elektroniki".to_string(),
            "  ".to_string(),
        ]);
        assert_eq!(merged.len(), DEFAULT_CATEGORIES.len() + 1);
        assert_eq!(merged.last().map(String::as_str), Some("Vifaa"));
    }

    #[test]
    fn test_record_stock_effects() {
        let product_id = Uuid::new_v4();

        let sale = stock_effect(RecordKind::Sale, Some(product_id), Some(3)).unwrap();
        assert_eq!(sale.delta, -3);
        assert_eq!(sale.kind, MovementKind::Sale);

        let purchase = stock_effect(RecordKind::Purchase, Some(product_id), Some(3)).unwrap();
        assert_eq!(purchase.delta, 3);
        assert_eq!(purchase.kind, MovementKind::Purchase);

        assert!(stock_effect(RecordKind::Expense, Some(product_id), Some(3)).is_none());
        assert!(stock_effect(RecordKind::Sale, None, Some(3)).is_none());
        assert!(stock_effect(RecordKind::Sale, Some(product_id), Some(0)).is_none());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stock after an adjustment is the clamped sum
        #[test]
        fn prop_adjust_is_clamped_sum(before in 0i32..100_000, delta in -200_000i32..200_000) {
            let change = StockChange::adjust(before, delta).unwrap();
            prop_assert_eq!(change.quantity_before, before);
            prop_assert_eq!(change.quantity_after, (before + delta).max(0));
            prop_assert!(change.quantity_after >= 0);
        }

        /// Any sequence of adjustments leaves stock non-negative and each
        /// movement starts where the previous one ended
        #[test]
        fn prop_movements_chain(
            start in 0i32..1_000,
            deltas in prop::collection::vec(-500i32..500, 1..30)
        ) {
            let mut stock = start;
            for delta in deltas {
                let change = StockChange::adjust(stock, delta).unwrap();
                prop_assert_eq!(change.quantity_before, stock);
                prop_assert!(change.quantity_after >= 0);
                stock = change.quantity_after;
            }
            prop_assert!(stock >= 0);
        }

        /// A purchase either fits in the stock column and reverses exactly,
        /// or it is rejected before anything is recorded
        #[test]
        fn prop_large_purchase_reverses_or_is_rejected(
            before in 0i32..=i32::MAX,
            quantity in 1i32..=i32::MAX
        ) {
            match StockChange::adjust(before, quantity) {
                Ok(bought) => {
                    prop_assert_eq!(bought.quantity_changed, quantity);
                    let restored = StockChange::adjust(bought.quantity_after, -quantity).unwrap();
                    prop_assert_eq!(restored.quantity_after, before);
                }
                Err(e) => {
                    prop_assert!(matches!(e, LedgerError::InvalidAmount(_)));
                    prop_assert!(i64::from(before) + i64::from(quantity) > i64::from(i32::MAX));
                }
            }
        }

        /// Setting stock records exactly the difference applied
        #[test]
        fn prop_set_records_difference(before in 0i32..100_000, target in -1_000i32..100_000) {
            let change = StockChange::set(before, target);
            prop_assert_eq!(change.quantity_after, target.max(0));
            prop_assert_eq!(change.quantity_before + change.quantity_changed, change.quantity_after);
        }

        /// An accepted sale followed by its reversal restores the stock level
        #[test]
        fn prop_sale_then_reversal_restores_stock(stock in 0i32..1_000, quantity in 1i32..1_000) {
            let product_id = Uuid::new_v4();
            let effect = stock_effect(RecordKind::Sale, Some(product_id), Some(quantity)).unwrap();

            if ensure_available(stock, quantity).is_ok() {
                let sold = StockChange::adjust(stock, effect.delta).unwrap();
                let restored = StockChange::adjust(sold.quantity_after, -effect.delta).unwrap();
                prop_assert_eq!(restored.quantity_after, stock);
            } else {
                prop_assert!(quantity > stock);
            }
        }

        /// A purchase followed by its reversal restores the stock level
        #[test]
        fn prop_purchase_then_reversal_restores_stock(stock in 0i32..1_000, quantity in 1i32..1_000) {
            let effect = stock_effect(RecordKind::Purchase, Some(Uuid::new_v4()), Some(quantity)).unwrap();
            let bought = StockChange::adjust(stock, effect.delta).unwrap();
            let restored = StockChange::adjust(bought.quantity_after, -effect.delta).unwrap();
            prop_assert_eq!(restored.quantity_after, stock);
        }
    }
}
