use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::products::{
        CreateProductRequest, Deleted, ProductDetail, ProductList, ProductSizeList,
        ProductSizeRequest, StockAdjustRequest, UpdateProductRequest,
    },
    entity::{
        categories::Entity as Categories,
        product_sizes::{
            ActiveModel as ProductSizeActive, Column as ProductSizeCol, Entity as ProductSizes,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        sizes::Entity as Sizes,
        transaction_items::{Column as TransactionItemCol, Entity as TransactionItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthAdmin,
    models::{Product, ProductSize},
    response::{ApiResponse, Meta},
    routes::params::{LowStockQuery, ProductQuery, ProductSortBy, SortOrder, contains_pattern},
    state::AppState,
    upload::{self, UploadFolder},
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Rating => Column::RatingAvg,
        ProductSortBy::Stock => Column::Stock,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| product_from_entity(model, &state.config))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let category_name = match product.category_id {
        Some(category_id) => Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .map(|c| c.name),
        None => None,
    };
    let sizes = fetch_sizes(state, id).await?;

    let detail = ProductDetail {
        product: product_from_entity(product, &state.config),
        category_name,
        sizes,
    };
    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn create_product(
    state: &AppState,
    admin: &AuthAdmin,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    validate_product_fields(Some(&payload.name), Some(payload.price), Some(payload.stock))?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }
    ensure_name_available(state, &payload.name, None).await?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        image: Set(None),
        rating_avg: Set(0.0),
        rating_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    tracing::info!(admin_id = %admin.admin_id, product_id = %product.id, "product created");
    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product, &state.config),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    validate_product_fields(payload.name.as_deref(), payload.price, payload.stock)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    match payload.category_id {
        Some(Some(category_id)) => {
            ensure_category_exists(state, category_id).await?;
            active.category_id = Set(Some(category_id));
        }
        Some(None) => active.category_id = Set(None),
        None => {}
    }
    if let Some(name) = payload.name {
        ensure_name_available(state, &name, Some(id)).await?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description.filter(|d| !d.trim().is_empty()));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    tracing::info!(admin_id = %admin.admin_id, product_id = %product.id, "product updated");
    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product, &state.config),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let referenced = TransactionItems::find()
        .filter(TransactionItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if referenced > 0 {
        return Err(AppError::BadRequest(
            "Product is referenced by transactions and cannot be deleted".into(),
        ));
    }

    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Some(image) = product.image.as_deref() {
        upload::remove_upload(&state.config, image).await;
    }

    tracing::info!(admin_id = %admin.admin_id, product_id = %id, "product deleted");
    Ok(ApiResponse::success(
        "Deleted",
        Deleted { id },
        Some(Meta::empty()),
    ))
}

pub async fn upload_image(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let stored = upload::store_image(&state.config, UploadFolder::Products, &mut multipart).await?;
    let previous = existing.image.clone();

    let mut active: ActiveModel = existing.into();
    active.image = Set(Some(stored.clone()));
    active.updated_at = Set(Utc::now().into());
    let product = match active.update(&state.orm).await {
        Ok(product) => product,
        Err(err) => {
            upload::remove_upload(&state.config, &stored).await;
            return Err(err.into());
        }
    };

    if let Some(previous) = previous.as_deref() {
        upload::remove_upload(&state.config, previous).await;
    }

    tracing::info!(admin_id = %admin.admin_id, product_id = %id, image = %stored, "product image replaced");
    Ok(ApiResponse::success(
        "Image uploaded",
        product_from_entity(product, &state.config),
        Some(Meta::empty()),
    ))
}

pub async fn adjust_stock(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
    payload: StockAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let new_stock = product
        .stock
        .checked_add(payload.delta)
        .ok_or_else(|| AppError::BadRequest("stock out of range".into()))?;
    if new_stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }

    let mut active: ActiveModel = product.into();
    active.stock = Set(new_stock);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(admin_id = %admin.admin_id, product_id = %id, delta = payload.delta, "stock adjusted");
    Ok(ApiResponse::success(
        "Inventory updated",
        product_from_entity(updated, &state.config),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let threshold = query.threshold.unwrap_or(5);
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Products::find()
        .filter(Column::Stock.lte(threshold))
        .order_by_asc(Column::Stock)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| product_from_entity(model, &state.config))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", ProductList { items }, Some(meta)))
}

pub async fn list_sizes(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ProductSizeList>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let items = fetch_sizes(state, product_id).await?;
    Ok(ApiResponse::success("Sizes", ProductSizeList { items }, None))
}

/// Create or update the size row for a product. Reactivates a deactivated row.
pub async fn upsert_size(
    state: &AppState,
    admin: &AuthAdmin,
    product_id: Uuid,
    payload: ProductSizeRequest,
) -> AppResult<ApiResponse<ProductSizeList>> {
    if payload.stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Sizes::find_by_id(payload.size_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Size not found".into()))?;

    let existing = ProductSizes::find()
        .filter(ProductSizeCol::ProductId.eq(product_id))
        .filter(ProductSizeCol::SizeId.eq(payload.size_id))
        .one(&state.orm)
        .await?;

    match existing {
        Some(row) => {
            let mut active: ProductSizeActive = row.into();
            active.stock = Set(payload.stock);
            active.price_delta = Set(payload.price_delta);
            active.is_active = Set(true);
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?;
        }
        None => {
            ProductSizeActive {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                size_id: Set(payload.size_id),
                stock: Set(payload.stock),
                price_delta: Set(payload.price_delta),
                is_active: Set(true),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?;
        }
    }

    tracing::info!(admin_id = %admin.admin_id, product_id = %product_id, size_id = %payload.size_id, "product size saved");
    let items = fetch_sizes(state, product_id).await?;
    Ok(ApiResponse::success("Size saved", ProductSizeList { items }, None))
}

/// Soft-deactivate a product size so existing transaction items keep their reference.
pub async fn deactivate_size(
    state: &AppState,
    admin: &AuthAdmin,
    product_id: Uuid,
    size_id: Uuid,
) -> AppResult<ApiResponse<ProductSizeList>> {
    let result = ProductSizes::update_many()
        .col_expr(ProductSizeCol::IsActive, Expr::value(false))
        .col_expr(ProductSizeCol::UpdatedAt, Expr::value(Utc::now()))
        .filter(ProductSizeCol::ProductId.eq(product_id))
        .filter(ProductSizeCol::SizeId.eq(size_id))
        .filter(ProductSizeCol::IsActive.eq(true))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(admin_id = %admin.admin_id, product_id = %product_id, size_id = %size_id, "product size deactivated");
    let items = fetch_sizes(state, product_id).await?;
    Ok(ApiResponse::success("Size deactivated", ProductSizeList { items }, None))
}

async fn fetch_sizes(state: &AppState, product_id: Uuid) -> AppResult<Vec<ProductSize>> {
    let sizes = sqlx::query_as::<_, ProductSize>(
        r#"
        SELECT ps.id, ps.product_id, ps.size_id, s.name AS size_name,
               ps.stock, ps.price_delta, ps.is_active
        FROM product_sizes ps
        JOIN sizes s ON s.id = ps.size_id
        WHERE ps.product_id = $1 AND ps.is_active
        ORDER BY s.name
        "#,
    )
    .bind(product_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(sizes)
}

fn validate_product_fields(
    name: Option<&str>,
    price: Option<i64>,
    stock: Option<i32>,
) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> AppResult<()> {
    Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::BadRequest("Category not found".into()))
}

async fn ensure_name_available(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Products::find().filter(Column::Name.eq(name.trim()));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.count(&state.orm).await? > 0 {
        return Err(AppError::BadRequest("Product name is already used".into()));
    }
    Ok(())
}

/// `products` row read through sqlx joins.
#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub image: Option<String>,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub(crate) fn into_product(self, config: &AppConfig) -> Product {
        let image_url = self.image.as_deref().map(|path| config.upload_url(path));
        Product {
            id: self.id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image: self.image,
            image_url,
            rating_avg: self.rating_avg,
            rating_count: self.rating_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub(crate) fn product_from_entity(model: ProductModel, config: &AppConfig) -> Product {
    let image_url = model.image.as_deref().map(|path| config.upload_url(path));
    Product {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        image: model.image,
        image_url,
        rating_avg: model.rating_avg,
        rating_count: model.rating_count,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
