// Database-backed action tests: coupon writes and the payout transaction
// against a real Postgres. Each test no-ops unless TEST_DATABASE_URL points
// at a disposable database, so the suite stays green offline.
mod common;

use anyhow::Result;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

const DUPLICATE_CODE_MESSAGE: &str = "Mã giảm giá đã tồn tại";

fn unique_code(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

fn coupon_payload(code: &str, csrf: &str) -> Value {
    json!({
        "action": "create_coupon",
        "token": csrf,
        "code": code,
        "type": "cart_base",
        "discount": 25,
        "discount_type": "percent",
        "start_date": "2026-01-01",
        "end_date": "2026-12-31",
        "details": { "type": "cart_base", "min_buy": 100 },
    })
}

async fn coupon_count(pool: &PgPool, code: &str) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM coupons WHERE code = $1")
        .bind(code)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[tokio::test]
async fn create_coupon_persists_row_and_returns_id() -> Result<()> {
    let Some(pool) = common::live_pool().await else { return Ok(()) };
    let (app, state) = common::live_app(pool.clone());
    let (cookie, csrf) = common::seed_session(&state, "admin").await;

    let code = unique_code("SUMMER");
    let (status, payload) = common::send(
        &app,
        common::post_json("/admin/coupons", Some(&cookie), &coupon_payload(&code, &csrf)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));
    let coupon_id = payload["coupon_id"].as_i64().expect("coupon_id in response");

    let (stored_code,): (String,) = sqlx::query_as("SELECT code FROM coupons WHERE id = $1")
        .bind(coupon_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(stored_code, code);
    Ok(())
}

#[tokio::test]
async fn duplicate_code_fails_and_inserts_nothing() -> Result<()> {
    let Some(pool) = common::live_pool().await else { return Ok(()) };
    let (app, state) = common::live_app(pool.clone());
    let (cookie, csrf) = common::seed_session(&state, "admin").await;

    let code = unique_code("DUP");
    let (status, payload) = common::send(
        &app,
        common::post_json("/admin/coupons", Some(&cookie), &coupon_payload(&code, &csrf)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));

    // Same code again: refused with the storefront message, no second row
    let (status, payload) = common::send(
        &app,
        common::post_json("/admin/coupons", Some(&cookie), &coupon_payload(&code, &csrf)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!(DUPLICATE_CODE_MESSAGE));
    assert_eq!(coupon_count(&pool, &code).await?, 1);
    Ok(())
}

#[tokio::test]
async fn update_rejects_code_of_another_coupon() -> Result<()> {
    let Some(pool) = common::live_pool().await else { return Ok(()) };
    let (app, state) = common::live_app(pool.clone());
    let (cookie, csrf) = common::seed_session(&state, "admin").await;

    let first_code = unique_code("FIRST");
    let second_code = unique_code("SECOND");
    for code in [&first_code, &second_code] {
        let (_, payload) = common::send(
            &app,
            common::post_json("/admin/coupons", Some(&cookie), &coupon_payload(code, &csrf)),
        )
        .await?;
        assert_eq!(payload["success"], json!(true));
    }
    let (second_id,): (i64,) = sqlx::query_as("SELECT id FROM coupons WHERE code = $1")
        .bind(&second_code)
        .fetch_one(&pool)
        .await?;

    let mut update = coupon_payload(&first_code, &csrf);
    update["action"] = json!("update_coupon");
    update["id"] = json!(second_id);
    let (status, payload) =
        common::send(&app, common::post_json("/admin/coupons", Some(&cookie), &update)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!(DUPLICATE_CODE_MESSAGE));

    let (stored_code,): (String,) = sqlx::query_as("SELECT code FROM coupons WHERE id = $1")
        .bind(second_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(stored_code, second_code);
    Ok(())
}

#[tokio::test]
async fn payout_records_payment_and_clears_balance() -> Result<()> {
    let Some(pool) = common::live_pool().await else { return Ok(()) };
    let (app, state) = common::live_app(pool.clone());
    let (cookie, csrf) = common::seed_session(&state, "admin").await;

    let (seller_id,): (i64,) =
        sqlx::query_as("INSERT INTO sellers (admin_to_pay) VALUES (500) RETURNING id")
            .fetch_one(&pool)
            .await?;

    let body = json!({
        "action": "process_payment",
        "token": csrf,
        "seller_id": seller_id,
        "payment_method": "bank_transfer",
        "txn_code": "TXN-500",
    });
    let (status, payload) =
        common::send(&app, common::post_json("/admin/payments", Some(&cookie), &body)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));
    assert!(payload["payment_id"].as_i64().is_some());

    let (amount,): (Decimal,) =
        sqlx::query_as("SELECT amount FROM payments WHERE seller_id = $1")
            .bind(seller_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(amount, Decimal::from(500));
    let (balance,): (Decimal,) =
        sqlx::query_as("SELECT admin_to_pay FROM sellers WHERE id = $1")
            .bind(seller_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(balance, Decimal::ZERO);

    // Nothing left to pay: the second attempt fails without a second row
    let (status, payload) =
        common::send(&app, common::post_json("/admin/payments", Some(&cookie), &body)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!("Nothing to pay for this seller"));
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments WHERE seller_id = $1")
        .bind(seller_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn payout_rolls_back_when_balance_reset_fails() -> Result<()> {
    let Some(pool) = common::live_pool().await else { return Ok(()) };
    let (app, state) = common::live_app(pool.clone());
    let (cookie, csrf) = common::seed_session(&state, "admin").await;

    // reject_reset trips the trigger on the UPDATE half of the transaction
    let (seller_id,): (i64,) = sqlx::query_as(
        "INSERT INTO sellers (admin_to_pay, reject_reset) VALUES (800, true) RETURNING id",
    )
    .fetch_one(&pool)
    .await?;

    let body = json!({
        "action": "process_payment",
        "token": csrf,
        "seller_id": seller_id,
        "payment_method": "bank_transfer",
    });
    let (status, payload) =
        common::send(&app, common::post_json("/admin/payments", Some(&cookie), &body)).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["code"], json!("DATABASE_ERROR"));

    // The payment insert must not survive the failed reset
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments WHERE seller_id = $1")
        .bind(seller_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 0);
    let (balance,): (Decimal,) =
        sqlx::query_as("SELECT admin_to_pay FROM sellers WHERE id = $1")
            .bind(seller_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(balance, Decimal::from(800));
    Ok(())
}
