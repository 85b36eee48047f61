mod common;

use axum::http::StatusCode;
use backoffice_api::{
    dto::auth::{PrincipalKind, TokenUse},
    error::AppError,
    models::TransactionStatus,
    response::Meta,
    routes::params::{Pagination, contains_pattern},
    services::{rating_service, token_service, transaction_service::build_invoice_number},
    upload::{extension_for, is_safe_relative},
};
use uuid::Uuid;

#[test]
fn transitions_follow_the_order_lifecycle() {
    use TransactionStatus::*;

    assert!(AwaitingPayment.can_transition_to(Waiting));
    assert!(AwaitingPayment.can_transition_to(Reject));
    assert!(Waiting.can_transition_to(Accept));
    assert!(Waiting.can_transition_to(Reject));

    assert!(!AwaitingPayment.can_transition_to(Accept));
    assert!(!Waiting.can_transition_to(AwaitingPayment));
    assert!(!Waiting.can_transition_to(Waiting));
}

#[test]
fn terminal_states_reject_every_transition() {
    for terminal in [TransactionStatus::Accept, TransactionStatus::Reject] {
        assert!(terminal.is_terminal());
        for next in TransactionStatus::ALL {
            let err = terminal.ensure_transition(next).unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition { .. }));
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }
}

#[test]
fn status_parses_stored_strings() {
    assert_eq!(
        "menunggu pembayaran".parse::<TransactionStatus>().unwrap(),
        TransactionStatus::AwaitingPayment
    );
    assert_eq!(" Accept ".parse::<TransactionStatus>().unwrap(), TransactionStatus::Accept);

    let err = "shipped".parse::<TransactionStatus>().unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[test]
fn status_serializes_as_stored_string() {
    let json = serde_json::to_string(&TransactionStatus::AwaitingPayment).unwrap();
    assert_eq!(json, "\"menunggu pembayaran\"");
    assert_eq!(TransactionStatus::Waiting.to_string(), "waiting");
}

#[test]
fn pagination_applies_defaults_and_clamps() {
    assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    assert_eq!(Pagination::new(3, 10).normalize(), (3, 10, 20));
    assert_eq!(Pagination::new(0, 1000).normalize(), (1, 100, 0));
    assert_eq!(Pagination::new(-4, 0).normalize(), (1, 1, 0));

    let (page, limit, offset) = Pagination::new(i64::MAX, 100).normalize();
    assert_eq!((page, limit), (i64::MAX, 100));
    assert_eq!(offset, i64::MAX);
}

#[test]
fn search_terms_escape_like_wildcards() {
    assert_eq!(contains_pattern("hoodie"), "%hoodie%");
    assert_eq!(contains_pattern("100%"), "%100\\%%");
    assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    assert_eq!(contains_pattern("C:\\tmp"), "%C:\\\\tmp%");
}

#[test]
fn meta_rounds_total_pages_up() {
    let meta = Meta::new(1, 20, 41);
    assert_eq!(meta.total_pages, Some(3));
    assert_eq!(Meta::new(1, 20, 0).total_pages, Some(0));
}

#[test]
fn only_jpeg_png_and_webp_are_accepted() {
    assert_eq!(extension_for("image/jpeg"), Some("jpg"));
    assert_eq!(extension_for("IMAGE/PNG"), Some("png"));
    assert_eq!(extension_for("image/webp"), Some("webp"));
    assert_eq!(extension_for("image/gif"), None);
    assert_eq!(extension_for("application/pdf"), None);
}

#[test]
fn upload_paths_must_stay_inside_upload_dir() {
    assert!(is_safe_relative("payments/abc.png"));
    assert!(!is_safe_relative("../etc/passwd"));
    assert!(!is_safe_relative("/etc/passwd"));
    assert!(!is_safe_relative(""));
}

#[test]
fn rating_must_be_between_one_and_five() {
    assert!(rating_service::validate_rating(1).is_ok());
    assert!(rating_service::validate_rating(5).is_ok());
    assert!(rating_service::validate_rating(0).is_err());
    assert!(rating_service::validate_rating(6).is_err());
}

#[test]
fn invoice_numbers_are_dated_and_short() {
    let invoice = build_invoice_number(Uuid::new_v4());
    let parts: Vec<&str> = invoice.split('-').collect();

    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "INV");
    assert_eq!(parts[1].len(), 8);
    assert_eq!(parts[2].len(), 8);
}

#[test]
fn error_variants_map_to_status_codes() {
    let stock = AppError::InsufficientStock {
        product_id: Uuid::new_v4(),
        requested: 3,
        available: 1,
    };
    assert_eq!(stock.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        AppError::Unauthorized("x".into()).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn issued_tokens_verify_for_their_own_kind_and_use() {
    let config = common::test_config("postgres://unused");
    let subject = Uuid::new_v4();
    let pair = token_service::issue_pair(&config, subject, PrincipalKind::Admin).unwrap();

    let access =
        token_service::verify(&config, &pair.access_token, PrincipalKind::Admin, TokenUse::Access);
    assert_eq!(access.unwrap(), subject);

    let refresh = token_service::verify(
        &config,
        &pair.refresh_token,
        PrincipalKind::Admin,
        TokenUse::Refresh,
    );
    assert_eq!(refresh.unwrap(), subject);
}

#[test]
fn token_for_other_principal_is_forbidden() {
    let config = common::test_config("postgres://unused");
    let pair = token_service::issue_pair(&config, Uuid::new_v4(), PrincipalKind::Customer).unwrap();

    let err = token_service::verify(&config, &pair.access_token, PrincipalKind::Admin, TokenUse::Access)
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn refresh_token_signed_with_separate_secret() {
    let config = common::test_config("postgres://unused");
    let pair = token_service::issue_pair(&config, Uuid::new_v4(), PrincipalKind::Customer).unwrap();

    let err = token_service::verify(
        &config,
        &pair.refresh_token,
        PrincipalKind::Customer,
        TokenUse::Access,
    )
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}
