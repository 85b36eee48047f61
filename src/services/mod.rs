pub mod admin_auth_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod product_service;
pub mod rating_service;
pub mod report_service;
pub mod size_service;
pub mod token_service;
pub mod transaction_service;
pub mod wishlist_service;
