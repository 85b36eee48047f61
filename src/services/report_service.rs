use chrono::{Duration, Utc};

use crate::{
    db::DbPool,
    dto::reports::{DailySales, ReportRange, SalesSummary, StatusCount, TopProduct},
    error::{AppError, AppResult},
    middleware::auth::AuthAdmin,
    response::{ApiResponse, Meta},
    routes::params::MAX_LIMIT,
};

const DEFAULT_TOP_PRODUCTS: i64 = 10;
const DEFAULT_SALES_DAYS: i64 = 30;

fn ensure_range(range: &ReportRange) -> AppResult<()> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from >= to {
            return Err(AppError::BadRequest("'from' must be before 'to'".into()));
        }
    }
    Ok(())
}

/// Totals over the window. Revenue and items sold only count accepted transactions.
pub async fn summary(
    pool: &DbPool,
    _admin: &AuthAdmin,
    range: ReportRange,
) -> AppResult<ApiResponse<SalesSummary>> {
    ensure_range(&range)?;

    let (total_transactions, accepted_transactions, revenue): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*)::BIGINT,
               COUNT(*) FILTER (WHERE status = 'accept')::BIGINT,
               COALESCE(SUM(total_amount) FILTER (WHERE status = 'accept'), 0)::BIGINT
        FROM transactions
        WHERE ($1::timestamptz IS NULL OR created_at >= $1)
          AND ($2::timestamptz IS NULL OR created_at < $2)
        "#,
    )
    .bind(range.from)
    .bind(range.to)
    .fetch_one(pool)
    .await?;

    let (items_sold,): (i64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(ti.quantity), 0)::BIGINT
        FROM transaction_items ti
        JOIN transactions t ON t.id = ti.transaction_id
        WHERE t.status = 'accept'
          AND ($1::timestamptz IS NULL OR t.created_at >= $1)
          AND ($2::timestamptz IS NULL OR t.created_at < $2)
        "#,
    )
    .bind(range.from)
    .bind(range.to)
    .fetch_one(pool)
    .await?;

    let (customers,): (i64,) = sqlx::query_as("SELECT COUNT(*)::BIGINT FROM users")
        .fetch_one(pool)
        .await?;

    let by_status = sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, COUNT(*)::BIGINT AS count
        FROM transactions
        WHERE ($1::timestamptz IS NULL OR created_at >= $1)
          AND ($2::timestamptz IS NULL OR created_at < $2)
        GROUP BY status
        ORDER BY status
        "#,
    )
    .bind(range.from)
    .bind(range.to)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success(
        "Summary",
        SalesSummary {
            total_transactions,
            accepted_transactions,
            revenue,
            items_sold,
            customers,
            by_status,
        },
        Some(Meta::empty()),
    ))
}

pub async fn top_products(
    pool: &DbPool,
    _admin: &AuthAdmin,
    range: ReportRange,
) -> AppResult<ApiResponse<Vec<TopProduct>>> {
    ensure_range(&range)?;
    let limit = range.limit.unwrap_or(DEFAULT_TOP_PRODUCTS).clamp(1, MAX_LIMIT);

    let items = sqlx::query_as::<_, TopProduct>(
        r#"
        SELECT p.id AS product_id, p.name,
               SUM(ti.quantity)::BIGINT AS quantity_sold,
               SUM(ti.price * ti.quantity)::BIGINT AS revenue
        FROM transaction_items ti
        JOIN transactions t ON t.id = ti.transaction_id
        JOIN products p ON p.id = ti.product_id
        WHERE t.status = 'accept'
          AND ($1::timestamptz IS NULL OR t.created_at >= $1)
          AND ($2::timestamptz IS NULL OR t.created_at < $2)
        GROUP BY p.id, p.name
        ORDER BY quantity_sold DESC, revenue DESC
        LIMIT $3
        "#,
    )
    .bind(range.from)
    .bind(range.to)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success("Top products", items, Some(Meta::empty())))
}

/// Accepted revenue per day. Without `from` the window starts 30 days ago.
pub async fn daily_sales(
    pool: &DbPool,
    _admin: &AuthAdmin,
    range: ReportRange,
) -> AppResult<ApiResponse<Vec<DailySales>>> {
    ensure_range(&range)?;
    let to = range.to.unwrap_or_else(Utc::now);
    let from = range
        .from
        .unwrap_or_else(|| to - Duration::days(DEFAULT_SALES_DAYS));

    let items = sqlx::query_as::<_, DailySales>(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::DATE AS day,
               COUNT(*)::BIGINT AS transactions,
               COALESCE(SUM(total_amount), 0)::BIGINT AS revenue
        FROM transactions
        WHERE status = 'accept' AND created_at >= $1 AND created_at < $2
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::success("Daily sales", items, Some(Meta::empty())))
}
