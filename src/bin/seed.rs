use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use backoffice_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&orm_from_pool(&pool)).await?;

    let admin_id = ensure_account(&pool, "admins", "Admin", "admin@example.com", "admin123").await?;
    let user_id = ensure_account(&pool, "users", "Demo Customer", "user@example.com", "user123").await?;
    seed_categories(&pool).await?;
    seed_sizes(&pool).await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

fn hash(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hashed)
}

/// `table` is either `users` or `admins`; both share the account columns.
async fn ensure_account(
    pool: &sqlx::PgPool,
    table: &str,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as(&format!("SELECT id FROM {table} WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        println!("{table}: {email} already present");
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(&format!(
        "INSERT INTO {table} (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING id"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(hash(password)?)
    .fetch_one(pool)
    .await?;

    println!("{table}: created {email}");
    Ok(id)
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        ("Apparel", "Shirts, hoodies and jackets"),
        ("Accessories", "Mugs, stickers and small goods"),
        ("Books", "Printed and digital books"),
    ];

    for (name, description) in categories {
        sqlx::query(
            "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories");
    Ok(())
}

async fn seed_sizes(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for name in ["S", "M", "L", "XL"] {
        sqlx::query("INSERT INTO sizes (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(pool)
            .await?;
    }

    println!("Seeded sizes");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = [
        ("Axum Hoodie", "Warm hoodie for Rustaceans", "Apparel", 550000_i64, 50_i32),
        ("Ferris Mug", "Coffee tastes better with Ferris", "Accessories", 120000, 100),
        ("Rust Sticker Pack", "Decorate your laptop", "Accessories", 50000, 200),
        ("E-book: Async Rust", "Learn async Rust patterns", "Books", 250000, 75),
    ];

    for (name, desc, category, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, price, stock)
            VALUES ($1, (SELECT id FROM categories WHERE name = $2), $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category)
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    // the hoodie is sold per size
    sqlx::query(
        r#"
        INSERT INTO product_sizes (id, product_id, size_id, stock, price_delta)
        SELECT gen_random_uuid(), p.id, s.id, 10, CASE WHEN s.name = 'XL' THEN 25000 ELSE 0 END
        FROM products p CROSS JOIN sizes s
        WHERE p.name = 'Axum Hoodie'
        ON CONFLICT (product_id, size_id) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?;

    println!("Seeded products");
    Ok(())
}
