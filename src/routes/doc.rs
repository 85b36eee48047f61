use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth, cart, catalog, products, ratings as rating_dto, reports as report_dto,
        transactions as transaction_dto, users, wishlist as wishlist_dto,
    },
    error::ErrorData,
    models::{
        Admin, CartItem, Category, Customer, Product, ProductSize, Rating, Size, Transaction,
        TransactionItem, TransactionStatus, WishlistItem,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, admin_auth, auth as auth_routes, cart as cart_routes, catalog as catalog_routes,
        health, params, products as product_routes, ratings, reports, transactions, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth_routes::register,
        auth_routes::login,
        auth_routes::refresh,
        auth_routes::me,
        auth_routes::update_me,
        auth_routes::forgot_password,
        auth_routes::reset_password,
        admin_auth::login,
        admin_auth::refresh,
        admin_auth::me,
        admin_auth::create_admin,
        admin_auth::forgot_password,
        admin_auth::reset_password,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        product_routes::upload_image,
        product_routes::adjust_stock,
        product_routes::list_sizes,
        product_routes::upsert_size,
        product_routes::deactivate_size,
        catalog_routes::list_categories,
        catalog_routes::get_category,
        catalog_routes::create_category,
        catalog_routes::update_category,
        catalog_routes::delete_category,
        catalog_routes::list_sizes,
        catalog_routes::create_size,
        catalog_routes::update_size,
        catalog_routes::delete_size,
        ratings::list_ratings,
        ratings::create_rating,
        ratings::delete_rating,
        cart_routes::cart_list,
        cart_routes::add_to_cart,
        cart_routes::update_cart_item,
        cart_routes::remove_from_cart,
        cart_routes::clear_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        transactions::list_transactions,
        transactions::create_transaction,
        transactions::get_transaction,
        transactions::upload_payment_proof,
        transactions::delete_transaction,
        admin::list_all_transactions,
        admin::get_transaction_admin,
        admin::update_transaction_status,
        admin::delete_transaction,
        admin::list_users,
        admin::get_user,
        admin::delete_user,
        admin::list_low_stock,
        reports::summary,
        reports::top_products,
        reports::daily_sales
    ),
    components(
        schemas(
            Customer,
            Admin,
            Category,
            Product,
            Size,
            ProductSize,
            Rating,
            CartItem,
            WishlistItem,
            Transaction,
            TransactionItem,
            TransactionStatus,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::RefreshRequest,
            auth::TokenPair,
            auth::CustomerLoginResponse,
            auth::AdminLoginResponse,
            auth::CreateAdminRequest,
            auth::UpdateProfileRequest,
            auth::ForgotPasswordRequest,
            auth::ResetPasswordRequest,
            auth::ResetTokenIssued,
            catalog::CategoryRequest,
            catalog::UpdateCategoryRequest,
            catalog::CategoryList,
            catalog::SizeRequest,
            catalog::SizeList,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::StockAdjustRequest,
            products::ProductSizeRequest,
            products::ProductList,
            products::ProductDetail,
            products::ProductSizeList,
            products::ImageUpload,
            products::Deleted,
            rating_dto::CreateRatingRequest,
            rating_dto::RatingList,
            rating_dto::RatingCreated,
            cart::AddToCartRequest,
            cart::UpdateCartRequest,
            cart::CartList,
            cart::CartItemDto,
            wishlist_dto::AddWishlistRequest,
            wishlist_dto::WishlistProductList,
            transaction_dto::TransactionLineRequest,
            transaction_dto::CreateTransactionRequest,
            transaction_dto::UpdateTransactionStatusRequest,
            transaction_dto::TransactionWithItems,
            transaction_dto::TransactionList,
            transaction_dto::TransactionDeleted,
            users::CustomerList,
            report_dto::SalesSummary,
            report_dto::StatusCount,
            report_dto::TopProduct,
            report_dto::DailySales,
            params::SortOrder,
            params::ProductSortBy,
            ErrorData,
            Meta,
            ApiResponse<ErrorData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Customer authentication"),
        (name = "Admin Auth", description = "Admin authentication"),
        (name = "Products", description = "Product endpoints"),
        (name = "Catalog", description = "Categories and sizes"),
        (name = "Ratings", description = "Product ratings"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Transactions", description = "Customer transactions"),
        (name = "Admin", description = "Back office endpoints"),
        (name = "Reports", description = "Sales reports"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
