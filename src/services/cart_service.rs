use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    db::DbPool,
    dto::{
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartRequest},
        products::Deleted,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::product_service::ProductRow,
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    size_id: Option<Uuid>,
    size_name: Option<String>,
    price_delta: Option<i64>,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl CartWithProductRow {
    fn into_dto(self, config: &AppConfig) -> CartItemDto {
        let unit_price = self.product.price.saturating_add(self.price_delta.unwrap_or(0));
        CartItemDto {
            id: self.cart_id,
            size_id: self.size_id,
            size_name: self.size_name,
            unit_price,
            quantity: self.quantity,
            subtotal: unit_price.saturating_mul(i64::from(self.quantity)),
            product: self.product.into_product(config),
        }
    }
}

pub async fn list_cart(
    pool: &DbPool,
    config: &AppConfig,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT sc.id AS cart_id, sc.quantity, sc.size_id, s.name AS size_name, ps.price_delta,
               p.id, p.category_id, p.name, p.description, p.price, p.stock,
               p.image, p.rating_avg, p.rating_count, p.created_at, p.updated_at
        FROM shopping_carts sc
        JOIN products p ON p.id = sc.product_id
        LEFT JOIN sizes s ON s.id = sc.size_id
        LEFT JOIN product_sizes ps ON ps.product_id = sc.product_id AND ps.size_id = sc.size_id
        WHERE sc.user_id = $1
        ORDER BY sc.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shopping_carts WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    let items: Vec<CartItemDto> = rows.into_iter().map(|row| row.into_dto(config)).collect();
    let total_amount = items
        .iter()
        .fold(0_i64, |acc, item| acc.saturating_add(item.subtotal));

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        CartList {
            items,
            total_amount,
        },
        Some(meta),
    ))
}

/// Add a product (optionally a specific size) to the cart, merging with an
/// existing row. The merged quantity must not exceed the current stock.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let available = available_stock(pool, payload.product_id, payload.size_id).await?;

    let exist: Option<CartItem> = sqlx::query_as(
        "SELECT * FROM shopping_carts WHERE user_id = $1 AND product_id = $2 \
         AND size_id IS NOT DISTINCT FROM $3",
    )
    .bind(user.user_id)
    .bind(payload.product_id)
    .bind(payload.size_id)
    .fetch_optional(pool)
    .await?;

    let requested = exist
        .as_ref()
        .map_or(0, |item| item.quantity)
        .checked_add(payload.quantity)
        .ok_or_else(|| AppError::BadRequest("quantity is too large".to_string()))?;
    ensure_within_stock(payload.product_id, requested, available)?;

    let cart_item = if let Some(item) = exist {
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE shopping_carts
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(user.user_id)
        .bind(requested)
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as(
            "INSERT INTO shopping_carts (id, user_id, product_id, size_id, quantity) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(payload.product_id)
        .bind(payload.size_id)
        .bind(requested)
        .fetch_one(pool)
        .await?
    };

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn update_cart_item(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let existing: Option<CartItem> =
        sqlx::query_as("SELECT * FROM shopping_carts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;
    let existing = existing.ok_or(AppError::NotFound)?;

    let available = available_stock(pool, existing.product_id, existing.size_id).await?;
    ensure_within_stock(existing.product_id, payload.quantity, available)?;

    let item = sqlx::query_as::<_, CartItem>(
        "UPDATE shopping_carts SET quantity = $3, updated_at = NOW() \
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user.user_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Updated", item, None))
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    let result = sqlx::query("DELETE FROM shopping_carts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        Deleted { id },
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<u64>> {
    let result = sqlx::query("DELETE FROM shopping_carts WHERE user_id = $1")
        .bind(user.user_id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Cart cleared",
        result.rows_affected(),
        Some(Meta::empty()),
    ))
}

/// Current stock for a product, or for one of its active sizes.
async fn available_stock(pool: &DbPool, product_id: Uuid, size_id: Option<Uuid>) -> AppResult<i32> {
    let product: Option<(i32,)> = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    let (product_stock,) =
        product.ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let Some(size_id) = size_id else {
        return Ok(product_stock);
    };

    let size: Option<(i32,)> = sqlx::query_as(
        "SELECT stock FROM product_sizes WHERE product_id = $1 AND size_id = $2 AND is_active",
    )
    .bind(product_id)
    .bind(size_id)
    .fetch_optional(pool)
    .await?;
    let (size_stock,) =
        size.ok_or_else(|| AppError::BadRequest("size not available for product".to_string()))?;

    Ok(size_stock.min(product_stock))
}

fn ensure_within_stock(product_id: Uuid, requested: i32, available: i32) -> AppResult<()> {
    if requested > available {
        return Err(AppError::InsufficientStock {
            product_id,
            requested,
            available,
        });
    }
    Ok(())
}
