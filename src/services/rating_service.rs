use sqlx::{Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{
        products::Deleted,
        ratings::{CreateRatingRequest, RatingCreated, RatingList},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthAdmin, AuthUser},
    models::Rating,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn validate_rating(rating: i32) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::BadRequest(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

pub async fn list_ratings(
    pool: &DbPool,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<RatingList>> {
    let (page, limit, offset) = pagination.normalize();
    let items = sqlx::query_as::<_, Rating>(
        r#"
        SELECT r.id, r.user_id, u.name AS user_name, r.product_id, r.rating, r.review, r.created_at
        FROM ratings r
        JOIN users u ON u.id = r.user_id
        WHERE r.product_id = $1
        ORDER BY r.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(product_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ratings WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Ratings", RatingList { items }, Some(meta)))
}

/// Record a rating event. A user may rate the same product more than once.
pub async fn create_rating(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateRatingRequest,
) -> AppResult<ApiResponse<RatingCreated>> {
    validate_rating(payload.rating)?;

    let mut tx = pool.begin().await?;

    let product_exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound);
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO ratings (id, user_id, product_id, rating, review) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(user.user_id)
    .bind(product_id)
    .bind(payload.rating)
    .bind(payload.review.filter(|r| !r.trim().is_empty()))
    .execute(&mut *tx)
    .await?;

    let (rating_avg, rating_count) = refresh_aggregates(&mut tx, product_id).await?;

    let rating = sqlx::query_as::<_, Rating>(
        r#"
        SELECT r.id, r.user_id, u.name AS user_name, r.product_id, r.rating, r.review, r.created_at
        FROM ratings r
        JOIN users u ON u.id = r.user_id
        WHERE r.id = $1
        "#,
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ApiResponse::success(
        "Rating saved",
        RatingCreated {
            rating,
            rating_avg,
            rating_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_rating(
    pool: &DbPool,
    admin: &AuthAdmin,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    let mut tx = pool.begin().await?;

    let deleted: Option<(Uuid,)> =
        sqlx::query_as("DELETE FROM ratings WHERE id = $1 RETURNING product_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let (product_id,) = deleted.ok_or(AppError::NotFound)?;

    refresh_aggregates(&mut tx, product_id).await?;
    tx.commit().await?;

    tracing::info!(admin_id = %admin.admin_id, rating_id = %id, "rating deleted");
    Ok(ApiResponse::success("Deleted", Deleted { id }, Some(Meta::empty())))
}

/// Recompute `rating_avg`/`rating_count` on the product from the ratings table.
async fn refresh_aggregates(
    tx: &mut SqlxTransaction<'_, Postgres>,
    product_id: Uuid,
) -> AppResult<(f64, i32)> {
    let row: (f64, i32) = sqlx::query_as(
        r#"
        UPDATE products
        SET rating_avg = agg.avg, rating_count = agg.count, updated_at = NOW()
        FROM (
            SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION AS avg,
                   COUNT(*)::INTEGER AS count
            FROM ratings
            WHERE product_id = $1
        ) AS agg
        WHERE products.id = $1
        RETURNING products.rating_avg, products.rating_count
        "#,
    )
    .bind(product_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}
