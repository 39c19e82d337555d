mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

// Listing endpoints under the broken-database failure policy: the page
// renders empty rather than failing the request, and pagination inputs are
// coerced, never rejected.

#[tokio::test]
async fn query_failure_yields_an_empty_page() -> Result<()> {
    let (app, state) = common::test_app();
    let (cookie, _) = common::seed_session(&state, "admin").await;

    let (status, payload) = common::send(&app, common::get("/admin/coupons", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));

    let data = &payload["data"];
    assert_eq!(data["records"], json!([]));
    assert_eq!(data["total_records"], json!(0));
    assert_eq!(data["total_pages"], json!(0));
    assert_eq!(data["links"], json!([]));
    assert_eq!(data["has_next"], json!(false));
    Ok(())
}

#[tokio::test]
async fn page_and_per_page_are_coerced_to_positive_defaults() -> Result<()> {
    let (app, state) = common::test_app();
    let (cookie, _) = common::seed_session(&state, "admin").await;

    let (status, payload) = common::send(
        &app,
        common::get("/admin/coupons?page=0&per_page=-5", Some(&cookie)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["data"]["page"], json!(1));
    assert_eq!(payload["data"]["per_page"], json!(20));
    Ok(())
}

#[tokio::test]
async fn per_page_is_capped_at_the_configured_maximum() -> Result<()> {
    let (app, state) = common::test_app();
    let (cookie, _) = common::seed_session(&state, "admin").await;

    let (_, payload) = common::send(
        &app,
        common::get("/admin/coupons?per_page=100000", Some(&cookie)),
    )
    .await?;
    assert_eq!(payload["data"]["per_page"], json!(100));
    Ok(())
}

#[tokio::test]
async fn requested_page_is_preserved_in_the_response() -> Result<()> {
    let (app, state) = common::test_app();
    let (cookie, _) = common::seed_session(&state, "admin").await;

    let (_, payload) = common::send(
        &app,
        common::get("/admin/coupons?page=3&per_page=20", Some(&cookie)),
    )
    .await?;
    assert_eq!(payload["data"]["page"], json!(3));
    assert_eq!(payload["data"]["has_next"], json!(false));
    Ok(())
}

#[tokio::test]
async fn filters_and_sort_keys_never_error() -> Result<()> {
    let (app, state) = common::test_app();
    let (cookie, _) = common::seed_session(&state, "admin").await;

    for path in [
        "/admin/coupons?search=SUMMER&kind=cart_base&status=1&sort=code_asc",
        "/admin/coupons?sort=definitely_not_a_sort_key",
        "/admin/users?search=nguyen&kind=customer&sort=name_asc",
        "/admin/shops?search=market&status=0&sort=name_desc",
        "/admin/settings?search=site",
        "/admin/payments?search=bank",
        "/admin/payments/pending",
    ] {
        let (status, payload) = common::send(&app, common::get(path, Some(&cookie))).await?;
        assert_eq!(status, StatusCode::OK, "listing failed for {}", path);
        assert_eq!(payload["success"], json!(true), "failure body for {}", path);
    }
    Ok(())
}
