pub mod categories;
pub mod product_sizes;
pub mod products;
pub mod ratings;
pub mod shopping_carts;
pub mod sizes;
pub mod transaction_items;
pub mod transactions;
pub mod users;
pub mod wishlists;

pub use categories::Entity as Categories;
pub use product_sizes::Entity as ProductSizes;
pub use products::Entity as Products;
pub use ratings::Entity as Ratings;
pub use shopping_carts::Entity as ShoppingCarts;
pub use sizes::Entity as Sizes;
pub use transaction_items::Entity as TransactionItems;
pub use transactions::Entity as Transactions;
pub use users::Entity as Users;
pub use wishlists::Entity as Wishlists;
