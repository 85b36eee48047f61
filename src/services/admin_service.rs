use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::{products::Deleted, users::CustomerList},
    entity::{
        ratings::{Column as RatingCol, Entity as Ratings},
        transactions::{Column as TransactionCol, Entity as Transactions},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthAdmin,
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::{SearchQuery, contains_pattern},
    state::AppState,
    upload,
};

pub async fn list_customers(
    state: &AppState,
    _admin: &AuthAdmin,
    query: SearchQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Name).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Email).ilike(pattern)),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", CustomerList { items }, Some(meta)))
}

pub async fn get_customer(
    state: &AppState,
    _admin: &AuthAdmin,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "User found",
        customer_from_entity(user),
        Some(Meta::empty()),
    ))
}

/// Deleting a customer cascades to their cart, wishlist, ratings and
/// transactions. Payment proof files are removed afterwards.
pub async fn delete_customer(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    let txn = state.orm.begin().await?;

    let proofs: Vec<Option<String>> = Transactions::find()
        .select_only()
        .column(TransactionCol::PaymentProof)
        .filter(TransactionCol::UserId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    let rated_products: Vec<Uuid> = Ratings::find()
        .select_only()
        .column(RatingCol::ProductId)
        .distinct()
        .filter(RatingCol::UserId.eq(id))
        .into_tuple()
        .all(&txn)
        .await?;

    let result = Users::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    // the cascade removed this customer's ratings
    for product_id in &rated_products {
        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
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
            "#,
            [(*product_id).into()],
        ))
        .await?;
    }

    txn.commit().await?;

    for proof in proofs.into_iter().flatten() {
        upload::remove_upload(&state.config, &proof).await;
    }

    tracing::info!(
        admin_id = %admin.admin_id,
        user_id = %id,
        rated_products = rated_products.len(),
        "customer deleted"
    );
    Ok(ApiResponse::success("User deleted", Deleted { id }, Some(Meta::empty())))
}

fn customer_from_entity(model: UserModel) -> Customer {
    Customer {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
