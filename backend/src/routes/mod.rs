//! Route definitions for the BIZMAX API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - stock ledger
        .nest("/inventory", inventory_routes(state.clone()))
        // Protected routes - record ledger
        .nest("/records", record_routes(state.clone()))
        // Protected routes - quick entry
        .nest("/quick", quick_routes(state.clone()))
        // Protected routes - analytics
        .nest("/dashboard", dashboard_routes(state.clone()))
}

/// Inventory routes (protected)
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/categories", get(handlers::list_categories))
        .route("/low-stock", get(handlers::low_stock))
        .route("/movements", get(handlers::all_stock_movements))
        .route(
            "/:item_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:item_id/set-stock", post(handlers::set_stock))
        .route("/:item_id/adjust-stock", post(handlers::adjust_stock))
        .route("/:item_id/stock-movements", get(handlers::stock_movements))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Business record routes (protected)
fn record_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_records).post(handlers::create_record))
        .route("/credit-sales", get(handlers::credit_sales))
        .route(
            "/by-transaction/:transaction_id",
            get(handlers::records_by_transaction),
        )
        .route(
            "/:record_id",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route("/:record_id/payments", post(handlers::make_payment))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Quick entry routes (protected)
fn quick_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sale", post(handlers::quick_sale))
        .route("/purchase", post(handlers::quick_purchase))
        .route("/expense", post(handlers::quick_expense))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/metrics", get(handlers::get_metrics))
        .route("/health", get(handlers::get_health))
        .route("/sales-trends", get(handlers::get_sales_trends))
        .route("/top-products", get(handlers::get_top_products))
        .route("/expense-breakdown", get(handlers::get_expense_breakdown))
        .route("/recent-activities", get(handlers::get_recent_activities))
        .route("/low-stock-alerts", get(handlers::get_low_stock_alerts))
        .route("/quick-stats", get(handlers::get_quick_stats))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
