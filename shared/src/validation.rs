//! Validation utilities for ledger input
//!
//! Checks that go beyond what `validator` derives can express live here so
//! the backend and the WASM bindings apply the same rules.

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

/// Payment method recorded when a payment does not name one
pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

/// Decimal places stored for money columns
pub const MONEY_SCALE: u32 = 2;

/// Smallest payment accepted against a credit sale
pub fn minimum_payment() -> Decimal {
    Decimal::new(1, 2)
}

/// Money must fit the stored scale exactly; trailing zeros are fine
pub fn validate_money_scale(value: Decimal, label: &str) -> LedgerResult<()> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(LedgerError::InvalidAmount(format!(
            "{} cannot have more than {} decimal places",
            label, MONEY_SCALE
        )));
    }
    Ok(())
}

// ============================================================================
// Inventory Validations
// ============================================================================

/// Buying, selling and tier prices must all be non-negative whole cents
pub fn validate_product_prices(
    buying_price: Decimal,
    selling_price: Decimal,
    wholesale_price: Option<Decimal>,
    retail_price: Option<Decimal>,
) -> LedgerResult<()> {
    let prices = [
        ("buying price", Some(buying_price)),
        ("selling price", Some(selling_price)),
        ("wholesale price", wholesale_price),
        ("retail price", retail_price),
    ];
    for (label, price) in prices {
        if let Some(price) = price {
            if price < Decimal::ZERO {
                return Err(LedgerError::InvalidPrice(format!(
                    "{} cannot be negative",
                    label
                )));
            }
            validate_money_scale(price, label)?;
        }
    }
    Ok(())
}

/// Quantity moved by a record must be a positive whole number of units
pub fn validate_quantity(quantity: i32) -> LedgerResult<()> {
    if quantity <= 0 {
        return Err(LedgerError::InvalidAmount(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Payment Validations
// ============================================================================

/// Payment amount must be at least 0.01 and no more than what is owed
pub fn validate_payment_amount(amount: Decimal, outstanding: Decimal) -> LedgerResult<()> {
    validate_money_scale(amount, "payment amount")?;
    if amount < minimum_payment() {
        return Err(LedgerError::InvalidAmount(
            "payment amount must be at least 0.01".to_string(),
        ));
    }
    if amount > outstanding {
        return Err(LedgerError::Overpayment {
            amount,
            outstanding,
        });
    }
    Ok(())
}

/// Trimmed payment method, or the default when blank
pub fn normalize_payment_method(method: Option<&str>) -> String {
    method
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_PAYMENT_METHOD)
        .to_string()
}

// ============================================================================
// Query Validations
// ============================================================================

/// Search term suitable for an `ILIKE` pattern, or `None` when blank
pub fn search_pattern(term: Option<&str>) -> Option<String> {
    let term = term?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_prices() {
        assert!(validate_product_prices(Decimal::from(10), Decimal::from(12), None, None).is_ok());
        assert!(validate_product_prices(
            Decimal::from(10),
            Decimal::from(12),
            Some(Decimal::from(11)),
            Some(Decimal::ZERO)
        )
        .is_ok());
        assert!(matches!(
            validate_product_prices(Decimal::from(-1), Decimal::from(12), None, None),
            Err(LedgerError::InvalidPrice(_))
        ));
        assert!(matches!(
            validate_product_prices(Decimal::from(1), Decimal::from(2), None, Some(Decimal::from(-3))),
            Err(LedgerError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_validate_money_scale() {
        assert!(validate_money_scale(Decimal::new(1050, 2), "amount").is_ok());
        assert!(validate_money_scale(Decimal::new(10500, 3), "amount").is_ok());
        assert!(validate_money_scale(Decimal::from(7), "amount").is_ok());
        assert!(matches!(
            validate_money_scale(Decimal::new(10005, 3), "amount"),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_product_prices(Decimal::new(1001, 3), Decimal::from(2), None, None),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-4).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        let owed = Decimal::from(500);
        assert!(validate_payment_amount(Decimal::new(1, 2), owed).is_ok());
        assert!(validate_payment_amount(owed, owed).is_ok());
        assert!(validate_payment_amount(Decimal::new(1, 3), owed).is_err());
        assert_eq!(
            validate_payment_amount(Decimal::from(501), owed),
            Err(LedgerError::Overpayment {
                amount: Decimal::from(501),
                outstanding: owed,
            })
        );
    }

    #[test]
    fn test_normalize_payment_method() {
        assert_eq!(normalize_payment_method(None), "cash");
        assert_eq!(normalize_payment_method(Some("  ")), "cash");
        assert_eq!(normalize_payment_method(Some(" M-Pesa ")), "M-Pesa");
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(Some("sukari")), Some("%sukari%".to_string()));
        assert_eq!(search_pattern(Some("50%")), Some("%50\\%%".to_string()));
    }
}
