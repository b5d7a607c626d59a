//! Dashboard handlers for analytics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    Activity, BusinessHealth, BusinessMetrics, DashboardSummary, LowStockAlert, Period, QuickStats,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::analytics::AnalyticsService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<Period>,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: Option<Period>,
    pub limit: Option<usize>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

fn report_response<T: Serialize>(
    data: Vec<T>,
    format: Option<&str>,
    filename: &str,
) -> AppResult<Response> {
    if format == Some("csv") {
        let csv = AnalyticsService::export_to_csv(&data)?;
        let disposition = format!("attachment; filename=\"{}\"", filename);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Everything the dashboard home screen shows
pub async fn get_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardSummary>> {
    let service = AnalyticsService::new(state.db);
    let summary = service
        .dashboard_summary(
            &current_user.actor(),
            Utc::now().date_naive(),
            state.config.dashboard.limits(),
        )
        .await?;
    Ok(Json(summary))
}

/// Profit, inventory and credit metrics for a period
pub async fn get_metrics(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<BusinessMetrics>> {
    let service = AnalyticsService::new(state.db);
    let metrics = service
        .business_metrics(
            &current_user.actor(),
            query.period.unwrap_or_default(),
            Utc::now().date_naive(),
        )
        .await?;
    Ok(Json(metrics))
}

pub async fn get_health(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<BusinessHealth>> {
    let service = AnalyticsService::new(state.db);
    let health = service
        .business_health(&current_user.actor(), Utc::now().date_naive())
        .await?;
    Ok(Json(health))
}

/// Daily sales trend; defaults to the last week
pub async fn get_sales_trends(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = AnalyticsService::new(state.db);
    let data = service
        .sales_trends(
            &current_user.actor(),
            query.period.unwrap_or(Period::Week),
            Utc::now().date_naive(),
        )
        .await?;
    report_response(data, query.format.as_deref(), "sales_trends.csv")
}

pub async fn get_top_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = AnalyticsService::new(state.db);
    let limit = query
        .limit
        .unwrap_or(state.config.dashboard.top_products_limit);
    let data = service
        .top_products(
            &current_user.actor(),
            query.period.unwrap_or_default(),
            limit,
            Utc::now().date_naive(),
        )
        .await?;
    report_response(data, query.format.as_deref(), "top_products.csv")
}

pub async fn get_expense_breakdown(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = AnalyticsService::new(state.db);
    let data = service
        .expense_breakdown(
            &current_user.actor(),
            query.period.unwrap_or_default(),
            Utc::now().date_naive(),
        )
        .await?;
    report_response(data, query.format.as_deref(), "expense_breakdown.csv")
}

pub async fn get_recent_activities(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<Activity>>> {
    let service = AnalyticsService::new(state.db);
    let limit = query
        .limit
        .unwrap_or(state.config.dashboard.recent_activity_limit);
    let activities = service
        .recent_activities(&current_user.actor(), limit)
        .await?;
    Ok(Json(activities))
}

pub async fn get_low_stock_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<LowStockAlert>>> {
    let service = AnalyticsService::new(state.db);
    let limit = query
        .limit
        .unwrap_or(state.config.dashboard.low_stock_alert_limit);
    let alerts = service
        .low_stock_alerts(&current_user.actor(), limit)
        .await?;
    Ok(Json(alerts))
}

pub async fn get_quick_stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<QuickStats>> {
    let service = AnalyticsService::new(state.db);
    let stats = service
        .quick_stats(&current_user.actor(), Utc::now().date_naive())
        .await?;
    Ok(Json(stats))
}
