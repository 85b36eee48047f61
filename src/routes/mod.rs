use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod admin_auth;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod ratings;
pub mod reports;
pub mod transactions;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest(
            "/products",
            products::router().merge(ratings::product_router()),
        )
        .nest("/categories", catalog::category_router())
        .nest("/sizes", catalog::size_router())
        .nest("/ratings", ratings::router())
        .nest("/auth", auth::router())
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/transactions", transactions::router())
        .nest("/admin", admin::router())
}
