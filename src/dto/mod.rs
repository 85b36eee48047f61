pub mod auth;
pub mod cart;
pub mod catalog;
pub mod products;
pub mod ratings;
pub mod reports;
pub mod transactions;
pub mod users;
pub mod wishlist;
