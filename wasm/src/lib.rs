//! WebAssembly module for the BIZMAX bookkeeping platform
//!
//! Provides client-side computation for:
//! - Credit sale payment status and recognised profit
//! - Stock flags for offline inventory screens
//! - Business health from a locally cached ledger
//!
//! Money crosses the boundary as decimal strings so no precision is lost.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn money(value: &str, field: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(value.trim())
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

/// Payment status ("pending", "partial" or "paid") of a credit sale
#[wasm_bindgen]
pub fn payment_status(amount_paid: &str, total_amount: &str) -> Result<String, JsValue> {
    let paid = money(amount_paid, "amount paid")?;
    let total = money(total_amount, "total amount")?;
    Ok(PaymentStatus::derive(paid, total).as_str().to_string())
}

/// Terms of a credit sale after a payment, as JSON
#[wasm_bindgen]
pub fn apply_credit_payment(
    total_amount: &str,
    amount_paid: &str,
    payment: &str,
) -> Result<String, JsValue> {
    let payment = money(payment, "payment")?;
    let terms = CreditTerms::credit(
        money(total_amount, "total amount")?,
        money(amount_paid, "amount paid")?,
    )
    .and_then(|terms| terms.apply_payment(payment))
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&terms).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Profit booked so far on a credit sale
#[wasm_bindgen]
pub fn recognized_profit(
    amount_paid: &str,
    total_amount: &str,
    cogs: &str,
) -> Result<String, JsValue> {
    let profit = recognized_credit_profit(
        money(amount_paid, "amount paid")?,
        money(total_amount, "total amount")?,
        money(cogs, "cost of goods sold")?,
    );
    Ok(profit.to_string())
}

#[wasm_bindgen]
pub fn is_low_stock(current_stock: i32, minimum_stock: i32) -> bool {
    is_low_stock_level(current_stock, minimum_stock)
}

#[wasm_bindgen]
pub fn is_out_of_stock(current_stock: i32) -> bool {
    is_out_of_stock_level(current_stock)
}

/// Swahili label for a health score
#[wasm_bindgen]
pub fn health_status_text(score: u32) -> String {
    HealthStatus::from_score(score).text().to_string()
}

/// Business health computed from cached records and products (JSON arrays)
#[wasm_bindgen]
pub fn business_health(
    records_json: &str,
    products_json: &str,
    today: &str,
) -> Result<String, JsValue> {
    let records: Vec<BusinessRecord> = serde_json::from_str(records_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid records JSON: {}", e)))?;
    let products: Vec<InventoryItem> = serde_json::from_str(products_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid products JSON: {}", e)))?;
    let today = NaiveDate::from_str(today)
        .map_err(|e| JsValue::from_str(&format!("Invalid date: {}", e)))?;

    let health = LedgerSnapshot::new(records, products).business_health(today);
    serde_json::to_string(&health).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status() {
        assert_eq!(payment_status("0", "100").unwrap(), "pending");
        assert_eq!(payment_status("40.50", "100").unwrap(), "partial");
        assert_eq!(payment_status("100", "100").unwrap(), "paid");
    }

    #[test]
    fn test_recognized_profit() {
        assert_eq!(recognized_profit("80", "100", "60").unwrap(), "20");
        assert_eq!(recognized_profit("50", "100", "60").unwrap(), "0");
    }

    #[test]
    fn test_stock_flags() {
        assert!(is_low_stock(4, 5));
        assert!(!is_low_stock(0, 5));
        assert!(is_out_of_stock(0));
        for (current, minimum) in [(0, 0), (3, 5), (5, 5), (6, 5), (-1, 2)] {
            assert_eq!(is_low_stock(current, minimum), is_low_stock_level(current, minimum));
            assert_eq!(is_out_of_stock(current), is_out_of_stock_level(current));
        }
    }

    #[test]
    fn test_health_status_text() {
        assert_eq!(health_status_text(85), "Biashara Ina Afya Nzuri Sana");
        assert_eq!(health_status_text(10), "Biashara Inahitaji Uboreshaji");
    }

    #[test]
    fn test_business_health_of_empty_ledger() {
        let json = business_health("[]", "[]", "2024-05-15").unwrap();
        assert!(json.contains("\"score\":0"));
    }
}
