mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use backoffice_api::{
    app::build_app,
    dto::{
        auth::{
            ForgotPasswordRequest, LoginRequest, PrincipalKind, RegisterRequest,
            ResetPasswordRequest,
        },
        cart::AddToCartRequest,
        catalog::{CategoryRequest, SizeRequest},
        products::{CreateProductRequest, ProductSizeRequest, UpdateProductRequest},
        ratings::CreateRatingRequest,
        reports::ReportRange,
        transactions::{
            CreateTransactionRequest, TransactionLineRequest, UpdateTransactionStatusRequest,
        },
        wishlist::AddWishlistRequest,
    },
    error::AppError,
    middleware::auth::{AuthAdmin, AuthUser},
    models::{Product, TransactionStatus},
    routes::params::ProductQuery,
    services::{
        admin_service, auth_service, cart_service, category_service, product_service,
        rating_service, report_service, size_service, token_service, transaction_service,
        wishlist_service,
    },
    state::AppState,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

// One test drives every flow so the shared database is truncated exactly once.
#[tokio::test]
async fn back_office_flows() -> anyhow::Result<()> {
    let Some(state) = common::db_state().await? else {
        return Ok(());
    };

    let admin = create_admin(&state).await?;
    let user = register_customer(&state, "buyer@example.com").await?;

    duplicate_email_is_rejected(&state).await?;
    password_reset_is_single_use(&state).await?;
    ratings_are_validated_and_aggregated(&state, &admin, &user).await?;
    cart_quantity_is_capped_by_stock(&state, &admin, &user).await?;
    accept_decrements_stock(&state, &admin, &user).await?;
    shortage_rolls_back_every_line(&state, &admin, &user).await?;
    delete_returns_payment_proof(&state, &user).await?;
    oversized_quantities_are_rejected(&state, &admin, &user).await?;
    deactivated_size_is_not_orderable(&state, &admin, &user).await?;
    wishlist_add_is_idempotent(&state, &admin, &user).await?;
    product_fields_can_be_cleared(&state, &admin).await?;
    search_matches_wildcards_literally(&state, &admin).await?;
    reports_count_accepted_sales_in_window(&state, &admin, &user).await?;
    deleting_customer_recomputes_ratings(&state, &admin).await?;

    Ok(())
}

async fn create_admin(state: &AppState) -> anyhow::Result<AuthAdmin> {
    let admin_id = Uuid::new_v4();
    sqlx::query("INSERT INTO admins (id, name, email, password_hash) VALUES ($1, $2, $3, 'x')")
        .bind(admin_id)
        .bind("Root")
        .bind("root@example.com")
        .execute(&state.pool)
        .await?;
    Ok(AuthAdmin {
        admin_id,
        email: "root@example.com".into(),
        name: "Root".into(),
    })
}

async fn register_customer(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            name: "Buyer".into(),
            email: email.into(),
            password: "secret123".into(),
            phone: None,
            address: Some("Jl. Merdeka 1".into()),
        },
    )
    .await?;
    let customer = resp.data.expect("customer");
    Ok(AuthUser {
        user_id: customer.id,
        email: customer.email,
        name: customer.name,
    })
}

async fn create_product(
    state: &AppState,
    admin: &AuthAdmin,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            category_id: None,
            name: name.into(),
            description: None,
            price,
            stock,
        },
    )
    .await?;
    Ok(resp.data.expect("product"))
}

async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(stock)
}

fn line(product_id: Uuid, size_id: Option<Uuid>, quantity: i32) -> TransactionLineRequest {
    TransactionLineRequest {
        product_id,
        size_id,
        quantity,
    }
}

async fn set_status(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
    status: TransactionStatus,
) -> Result<(), AppError> {
    transaction_service::update_status(
        state,
        admin,
        id,
        UpdateTransactionStatusRequest {
            status: status.as_str().into(),
        },
    )
    .await
    .map(|_| ())
}

async fn duplicate_email_is_rejected(state: &AppState) -> anyhow::Result<()> {
    let err = register_customer(state, "BUYER@example.com")
        .await
        .expect_err("duplicate email must fail");
    let err = err.downcast::<AppError>()?;
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    Ok(())
}

async fn password_reset_is_single_use(state: &AppState) -> anyhow::Result<()> {
    register_customer(state, "forgetful@example.com").await?;

    let issued = auth_service::forgot_password(
        state,
        ForgotPasswordRequest {
            email: "forgetful@example.com".into(),
        },
    )
    .await?
    .data
    .expect("reset token");

    auth_service::reset_password(
        state,
        ResetPasswordRequest {
            token: issued.reset_token.clone(),
            password: "brand-new-pass".into(),
        },
    )
    .await?;

    let login = auth_service::login_user(
        state,
        LoginRequest {
            email: "forgetful@example.com".into(),
            password: "brand-new-pass".into(),
        },
    )
    .await?;
    assert!(login.data.is_some());

    let reused = auth_service::reset_password(
        state,
        ResetPasswordRequest {
            token: issued.reset_token,
            password: "another-pass".into(),
        },
    )
    .await
    .expect_err("token is single use");
    assert_eq!(reused.status_code(), StatusCode::BAD_REQUEST);
    Ok(())
}

async fn ratings_are_validated_and_aggregated(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let product = create_product(state, admin, "Rated Tee", 100_000, 5).await?;

    let err = rating_service::create_rating(
        &state.pool,
        user,
        product.id,
        CreateRatingRequest {
            rating: 6,
            review: None,
        },
    )
    .await
    .expect_err("rating above 5");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    for rating in [4, 5] {
        rating_service::create_rating(
            &state.pool,
            user,
            product.id,
            CreateRatingRequest {
                rating,
                review: Some("nice".into()),
            },
        )
        .await?;
    }

    let detail = product_service::get_product(state, product.id)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.product.rating_count, 2);
    assert!((detail.product.rating_avg - 4.5).abs() < f64::EPSILON);
    Ok(())
}

async fn cart_quantity_is_capped_by_stock(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let product = create_product(state, admin, "Limited Cap", 50_000, 3).await?;
    let add = |quantity| AddToCartRequest {
        product_id: product.id,
        size_id: None,
        quantity,
    };

    cart_service::add_to_cart(&state.pool, user, add(2)).await?;
    let err = cart_service::add_to_cart(&state.pool, user, add(2))
        .await
        .expect_err("merged quantity exceeds stock");
    assert!(matches!(err, AppError::InsufficientStock { available: 3, .. }));

    cart_service::clear_cart(&state.pool, user).await?;
    Ok(())
}

async fn accept_decrements_stock(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let hoodie = create_product(state, admin, "Sized Hoodie", 200_000, 10).await?;
    let size = size_service::create_size(state, admin, SizeRequest { name: "xl".into() })
        .await?
        .data
        .expect("size");
    assert_eq!(size.name, "XL");
    product_service::upsert_size(
        state,
        admin,
        hoodie.id,
        ProductSizeRequest {
            size_id: size.id,
            stock: 4,
            price_delta: 25_000,
        },
    )
    .await?;

    cart_service::add_to_cart(
        &state.pool,
        user,
        AddToCartRequest {
            product_id: hoodie.id,
            size_id: Some(size.id),
            quantity: 3,
        },
    )
    .await?;

    // empty `items` checks out the cart
    let created = transaction_service::create_transaction(
        state,
        user,
        CreateTransactionRequest {
            items: Vec::new(),
            shipping_address: "Jl. Merdeka 1".into(),
            note: None,
        },
    )
    .await?
    .data
    .expect("transaction");
    assert_eq!(created.transaction.status, TransactionStatus::AwaitingPayment);
    assert_eq!(created.transaction.total_amount, 3 * 225_000);
    assert_eq!(created.items[0].price, 225_000);

    let cart = cart_service::list_cart(&state.pool, &state.config, user, Default::default())
        .await?
        .data
        .expect("cart");
    assert!(cart.items.is_empty(), "purchased lines leave the cart");

    let id = created.transaction.id;
    let early = set_status(state, admin, id, TransactionStatus::Accept)
        .await
        .expect_err("cannot accept before payment");
    assert!(matches!(early, AppError::InvalidTransition { .. }));

    set_status(state, admin, id, TransactionStatus::Waiting).await?;
    set_status(state, admin, id, TransactionStatus::Accept).await?;

    assert_eq!(stock_of(state, hoodie.id).await?, 7);
    let sizes = product_service::list_sizes(state, hoodie.id)
        .await?
        .data
        .expect("sizes");
    assert_eq!(sizes.items[0].stock, 1);

    let terminal = set_status(state, admin, id, TransactionStatus::Reject)
        .await
        .expect_err("accept is terminal");
    assert_eq!(terminal.status_code(), StatusCode::BAD_REQUEST);
    Ok(())
}

async fn shortage_rolls_back_every_line(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let plenty = create_product(state, admin, "Plenty Mug", 10_000, 50).await?;
    let scarce = create_product(state, admin, "Scarce Pin", 5_000, 2).await?;

    let create = |quantity| CreateTransactionRequest {
        items: vec![line(plenty.id, None, 5), line(scarce.id, None, quantity)],
        shipping_address: "Jl. Sudirman 2".into(),
        note: None,
    };
    let first = transaction_service::create_transaction(state, user, create(2))
        .await?
        .data
        .expect("first");
    let second = transaction_service::create_transaction(state, user, create(2))
        .await?
        .data
        .expect("second");

    for id in [first.transaction.id, second.transaction.id] {
        set_status(state, admin, id, TransactionStatus::Waiting).await?;
    }
    set_status(state, admin, first.transaction.id, TransactionStatus::Accept).await?;
    assert_eq!(stock_of(state, plenty.id).await?, 45);
    assert_eq!(stock_of(state, scarce.id).await?, 0);

    let err = set_status(state, admin, second.transaction.id, TransactionStatus::Accept)
        .await
        .expect_err("scarce pin is sold out");
    assert!(matches!(err, AppError::InsufficientStock { available: 0, .. }));

    assert_eq!(stock_of(state, plenty.id).await?, 45, "no partial decrement");
    let second = transaction_service::get_transaction(state, user, second.transaction.id)
        .await?
        .data
        .expect("second");
    assert_eq!(second.transaction.status, TransactionStatus::Waiting);
    Ok(())
}

async fn delete_returns_payment_proof(state: &AppState, user: &AuthUser) -> anyhow::Result<()> {
    let (product_id,): (Uuid,) = sqlx::query_as("SELECT id FROM products WHERE name = 'Plenty Mug'")
        .fetch_one(&state.pool)
        .await?;
    let created = transaction_service::create_transaction(
        state,
        user,
        CreateTransactionRequest {
            items: vec![line(product_id, None, 1)],
            shipping_address: "Jl. Thamrin 3".into(),
            note: Some("leave at door".into()),
        },
    )
    .await?
    .data
    .expect("transaction");
    let id = created.transaction.id;

    let token = token_service::issue_pair(&state.config, user.user_id, PrincipalKind::Customer)?
        .access_token;
    let boundary = "proofboundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"proof.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"\x89PNG\r\n\x1a\nnot-really-a-png");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/transactions/{id}/payment-proof"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))?;
    let response = build_app(state.clone())?.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(json["data"]["status"], "waiting");
    let proof = json["data"]["payment_proof"]
        .as_str()
        .expect("proof path")
        .to_string();
    assert!(proof.starts_with("payments/"));
    assert!(state.config.upload_dir.join(&proof).exists());

    // waiting transactions are no longer cancellable by the customer
    let err = transaction_service::delete_transaction(state, user, id)
        .await
        .expect_err("only unpaid transactions can be cancelled");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let admin = AuthAdmin {
        admin_id: Uuid::new_v4(),
        email: "root@example.com".into(),
        name: "Root".into(),
    };
    let deleted = transaction_service::delete_transaction_admin(state, &admin, id)
        .await?
        .data
        .expect("deleted");
    assert_eq!(deleted.removed_items, 1);
    assert_eq!(deleted.payment_proof.as_deref(), Some(proof.as_str()));
    assert!(!state.config.upload_dir.join(&proof).exists());

    let (remaining,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM transaction_items WHERE transaction_id = $1")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(remaining, 0);
    Ok(())
}

async fn oversized_quantities_are_rejected(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let socks = create_product(state, admin, "Overflow Sock", 1_000, 5).await?;
    let add = |quantity| AddToCartRequest {
        product_id: socks.id,
        size_id: None,
        quantity,
    };

    cart_service::add_to_cart(&state.pool, user, add(1)).await?;
    let err = cart_service::add_to_cart(&state.pool, user, add(i32::MAX))
        .await
        .expect_err("merged quantity overflows");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    cart_service::clear_cart(&state.pool, user).await?;

    let err = transaction_service::create_transaction(
        state,
        user,
        CreateTransactionRequest {
            items: vec![line(socks.id, None, i32::MAX), line(socks.id, None, 1)],
            shipping_address: "Jl. Gatot Subroto 4".into(),
            note: None,
        },
    )
    .await
    .expect_err("duplicate lines overflow");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(state, socks.id).await?, 5);
    Ok(())
}

async fn size_stock(state: &AppState, product_id: Uuid, size_id: Uuid) -> anyhow::Result<i32> {
    let (stock,): (i32,) =
        sqlx::query_as("SELECT stock FROM product_sizes WHERE product_id = $1 AND size_id = $2")
            .bind(product_id)
            .bind(size_id)
            .fetch_one(&state.pool)
            .await?;
    Ok(stock)
}

async fn deactivated_size_is_not_orderable(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let tee = create_product(state, admin, "Retired Tee", 80_000, 10).await?;
    let size = size_service::create_size(state, admin, SizeRequest { name: "m".into() })
        .await?
        .data
        .expect("size");
    let upsert = |stock| ProductSizeRequest {
        size_id: size.id,
        stock,
        price_delta: 0,
    };
    product_service::upsert_size(state, admin, tee.id, upsert(5)).await?;

    let placed = transaction_service::create_transaction(
        state,
        user,
        CreateTransactionRequest {
            items: vec![line(tee.id, Some(size.id), 2)],
            shipping_address: "Jl. Asia Afrika 5".into(),
            note: None,
        },
    )
    .await?
    .data
    .expect("transaction");

    let remaining = product_service::deactivate_size(state, admin, tee.id, size.id)
        .await?
        .data
        .expect("sizes");
    assert!(remaining.items.is_empty());

    let add_sized = AddToCartRequest {
        product_id: tee.id,
        size_id: Some(size.id),
        quantity: 1,
    };
    let err = cart_service::add_to_cart(&state.pool, user, add_sized)
        .await
        .expect_err("inactive size cannot be added");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let err = transaction_service::create_transaction(
        state,
        user,
        CreateTransactionRequest {
            items: vec![line(tee.id, Some(size.id), 1)],
            shipping_address: "Jl. Asia Afrika 5".into(),
            note: None,
        },
    )
    .await
    .expect_err("inactive size cannot be ordered");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    // orders placed before deactivation still complete
    let id = placed.transaction.id;
    set_status(state, admin, id, TransactionStatus::Waiting).await?;
    set_status(state, admin, id, TransactionStatus::Accept).await?;
    assert_eq!(stock_of(state, tee.id).await?, 8);
    assert_eq!(size_stock(state, tee.id, size.id).await?, 3);

    let restored = product_service::upsert_size(state, admin, tee.id, upsert(6))
        .await?
        .data
        .expect("sizes");
    assert_eq!(restored.items.len(), 1);
    assert!(restored.items[0].is_active);
    assert_eq!(restored.items[0].stock, 6);

    let add_sized = AddToCartRequest {
        product_id: tee.id,
        size_id: Some(size.id),
        quantity: 1,
    };
    cart_service::add_to_cart(&state.pool, user, add_sized).await?;
    cart_service::clear_cart(&state.pool, user).await?;
    Ok(())
}

async fn wishlist_add_is_idempotent(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let poster = create_product(state, admin, "Wish Poster", 30_000, 4).await?;
    let add = || AddWishlistRequest {
        product_id: poster.id,
    };

    let first = wishlist_service::add_to_wishlist(state, user, add())
        .await?
        .data
        .expect("first");
    let second = wishlist_service::add_to_wishlist(state, user, add())
        .await?
        .data
        .expect("second");
    assert_eq!(first.id, second.id);

    let listed =
        wishlist_service::list_wishlist(&state.pool, &state.config, user, Default::default())
            .await?
            .data
            .expect("wishlist");
    assert_eq!(listed.items.iter().filter(|p| p.id == poster.id).count(), 1);

    wishlist_service::remove_from_wishlist(state, user, poster.id).await?;
    let err = wishlist_service::remove_from_wishlist(state, user, poster.id)
        .await
        .expect_err("already removed");
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

async fn product_fields_can_be_cleared(state: &AppState, admin: &AuthAdmin) -> anyhow::Result<()> {
    let category = category_service::create_category(
        state,
        admin,
        CategoryRequest {
            name: "Outerwear".into(),
            description: None,
        },
    )
    .await?
    .data
    .expect("category");
    let product = product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            category_id: Some(category.id),
            name: "Rain Jacket".into(),
            description: Some("Keeps you dry".into()),
            price: 400_000,
            stock: 2,
        },
    )
    .await?
    .data
    .expect("product");

    let untouched: UpdateProductRequest =
        serde_json::from_value(serde_json::json!({ "price": 390000 }))?;
    let updated = product_service::update_product(state, admin, product.id, untouched)
        .await?
        .data
        .expect("product");
    assert_eq!(updated.category_id, Some(category.id));
    assert_eq!(updated.description.as_deref(), Some("Keeps you dry"));

    let cleared: UpdateProductRequest =
        serde_json::from_value(serde_json::json!({ "category_id": null, "description": null }))?;
    let updated = product_service::update_product(state, admin, product.id, cleared)
        .await?
        .data
        .expect("product");
    assert_eq!(updated.category_id, None);
    assert_eq!(updated.description, None);
    assert_eq!(updated.price, 390_000);
    Ok(())
}

async fn search_matches_wildcards_literally(
    state: &AppState,
    admin: &AuthAdmin,
) -> anyhow::Result<()> {
    create_product(state, admin, "100% Linen Shirt", 150_000, 3).await?;
    create_product(state, admin, "1000 Thread Sheet", 150_000, 3).await?;

    let found = product_service::list_products(
        state,
        ProductQuery {
            search: Some("0%".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("products");
    let names: Vec<&str> = found.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["100% Linen Shirt"]);

    let found = product_service::list_products(
        state,
        ProductQuery {
            search: Some("_00".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("products");
    assert!(found.items.is_empty(), "underscore is not a wildcard");
    Ok(())
}

fn at(timestamp: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&Utc))
}

fn window(from: &str, to: &str) -> anyhow::Result<ReportRange> {
    Ok(ReportRange {
        from: Some(at(from)?),
        to: Some(at(to)?),
        limit: None,
    })
}

async fn reports_count_accepted_sales_in_window(
    state: &AppState,
    admin: &AuthAdmin,
    user: &AuthUser,
) -> anyhow::Result<()> {
    let widget = create_product(state, admin, "Report Widget", 1_000, 100).await?;

    // (quantity, accepted, created_at)
    let placements = [
        (1, true, "2001-01-01T10:00:00Z"),
        (2, true, "2001-01-02T00:00:00Z"),
        (4, false, "2001-01-01T12:00:00Z"),
    ];
    for (quantity, accepted, created_at) in placements {
        let created = transaction_service::create_transaction(
            state,
            user,
            CreateTransactionRequest {
                items: vec![line(widget.id, None, quantity)],
                shipping_address: "Jl. Braga 6".into(),
                note: None,
            },
        )
        .await?
        .data
        .expect("transaction");
        let id = created.transaction.id;
        if accepted {
            set_status(state, admin, id, TransactionStatus::Waiting).await?;
            set_status(state, admin, id, TransactionStatus::Accept).await?;
        }
        sqlx::query("UPDATE transactions SET created_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at(created_at)?)
            .execute(&state.pool)
            .await?;
    }

    // the upper bound is exclusive, so the 2001-01-02 sale falls outside
    let first_day = window("2001-01-01T00:00:00Z", "2001-01-02T00:00:00Z")?;
    let summary = report_service::summary(&state.pool, admin, first_day)
        .await?
        .data
        .expect("summary");
    assert_eq!(summary.total_transactions, 2);
    assert_eq!(summary.accepted_transactions, 1);
    assert_eq!(summary.revenue, 1_000);
    assert_eq!(summary.items_sold, 1);

    let two_days = || window("2001-01-01T00:00:00Z", "2001-01-03T00:00:00Z");
    let top = report_service::top_products(&state.pool, admin, two_days()?)
        .await?
        .data
        .expect("top products");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].product_id, widget.id);
    assert_eq!(top[0].quantity_sold, 3);
    assert_eq!(top[0].revenue, 3_000);

    let daily = report_service::daily_sales(&state.pool, admin, two_days()?)
        .await?
        .data
        .expect("daily sales");
    let revenue: Vec<i64> = daily.iter().map(|day| day.revenue).collect();
    assert_eq!(revenue, vec![1_000, 2_000]);

    let inverted = window("2001-01-03T00:00:00Z", "2001-01-01T00:00:00Z")?;
    let err = report_service::summary(&state.pool, admin, inverted)
        .await
        .expect_err("from after to");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    Ok(())
}

async fn deleting_customer_recomputes_ratings(
    state: &AppState,
    admin: &AuthAdmin,
) -> anyhow::Result<()> {
    let (product_id,): (Uuid,) = sqlx::query_as("SELECT id FROM products WHERE name = 'Rated Tee'")
        .fetch_one(&state.pool)
        .await?;
    let leaving = register_customer(state, "leaving@example.com").await?;

    rating_service::create_rating(
        &state.pool,
        &leaving,
        product_id,
        CreateRatingRequest {
            rating: 1,
            review: None,
        },
    )
    .await?;
    wishlist_service::add_to_wishlist(state, &leaving, AddWishlistRequest { product_id }).await?;
    cart_service::add_to_cart(
        &state.pool,
        &leaving,
        AddToCartRequest {
            product_id,
            size_id: None,
            quantity: 1,
        },
    )
    .await?;

    let detail = product_service::get_product(state, product_id)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.product.rating_count, 3);

    admin_service::delete_customer(state, admin, leaving.user_id).await?;

    let detail = product_service::get_product(state, product_id)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.product.rating_count, 2);
    assert!((detail.product.rating_avg - 4.5).abs() < f64::EPSILON);

    for table in ["ratings", "wishlists", "shopping_carts"] {
        let (rows,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM {table} WHERE user_id = $1"))
                .bind(leaving.user_id)
                .fetch_one(&state.pool)
                .await?;
        assert_eq!(rows, 0, "{table} rows cascade");
    }

    let err = admin_service::delete_customer(state, admin, leaving.user_id)
        .await
        .expect_err("already deleted");
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}
