use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Optional `[from, to)` window over `transactions.created_at`.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesSummary {
    pub total_transactions: i64,
    pub accepted_transactions: i64,
    pub revenue: i64,
    pub items_sold: i64,
    pub customers: i64,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct DailySales {
    pub day: NaiveDate,
    pub transactions: i64,
    pub revenue: i64,
}
