mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn public_catalog_is_readable_without_login() {
    let ctx = TestContext::new();
    ctx.backend
        .seed_product("Stratocaster", 999.0, Some("Guitars"), Some("Fender"))
        .await;
    ctx.backend
        .seed_product("Jazz Bass", 1099.0, Some("Basses"), Some("Fender"))
        .await;

    let products = ctx.get("/api/public/products", None).await;
    assert_eq!(products.status, StatusCode::OK);
    assert_eq!(products.body["status"], "success");
    assert_eq!(products.body["data"].as_array().unwrap().len(), 2);

    let brands = ctx.get("/api/public/products/brands", None).await;
    assert_eq!(brands.status, StatusCode::OK);
    assert_eq!(brands.body["data"], json!(["Fender"]));

    let categories = ctx.get("/api/public/products/categories", None).await;
    assert_eq!(categories.body["data"], json!(["Basses", "Guitars"]));

    let missing = ctx.get("/api/public/products/9999", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["status"], "error");
}

#[tokio::test]
async fn cart_requires_a_session() {
    let ctx = TestContext::new();

    let response = ctx.get("/api/cart", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = ctx
        .post("/api/cart/checkout", Some("SESSION=does-not-exist"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_login() {
    let ctx = TestContext::new();

    let body = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "secret1",
        "recaptchaResponse": "token"
    });

    let registered = ctx
        .send_json("POST", "/api/users/register", None, body.clone())
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["data"]["role"], "USER");
    assert!(registered.body["data"].get("password").is_none());

    let duplicate = ctx.send_json("POST", "/api/users/register", None, body).await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let cookie = ctx.login("alice").await;
    let me = ctx.get("/api/users/me", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn register_rejects_invalid_payloads() {
    let ctx = TestContext::new();

    let response = ctx
        .send_json(
            "POST",
            "/api/users/register",
            None,
            json!({ "username": "bob", "email": "bob@nowhere", "password": "123" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.body["message"].as_str().unwrap();
    assert!(message.contains("Password must be at least 6 characters"));
    assert!(message.contains("Invalid email format"));

    let response = ctx
        .send_json(
            "POST",
            "/api/users/register",
            None,
            json!({ "username": "   ", "email": "bob@example.com", "password": "secret1" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Username must not be empty");

    let response = ctx
        .send_json(
            "POST",
            "/api/users/register",
            None,
            json!({ "username": "jose", "email": "josé@example.com", "password": "secret1" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid email format");

    ctx.backend.captcha.set_accept(false);
    let response = ctx
        .send_json(
            "POST",
            "/api/users/register",
            None,
            json!({ "username": "bob", "email": "bob@nowhere", "password": "123" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "CAPTCHA verification failed");
}

#[tokio::test]
async fn product_writes_are_validated() {
    let ctx = TestContext::new();
    ctx.seed_user("root", "ADMIN").await;
    let admin = ctx.login("root").await;

    let response = ctx
        .send_json(
            "POST",
            "/api/admin/products",
            Some(&admin),
            json!({ "name": "", "price": -1.0 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["details"]["name"].is_array());
    assert!(response.body["details"]["price"].is_array());
}

#[tokio::test]
async fn login_failures() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;

    let wrong_password = ctx.login_with("alice", "nope").await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert!(wrong_password.session_cookie.is_none());

    ctx.backend.captcha.set_accept(false);
    let rejected = ctx.login_with("alice", "secret1").await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_accepts_email_as_username() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;

    let response = ctx.login_with("alice@example.com", "secret1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "alice");
}

#[tokio::test]
async fn second_login_replaces_the_first_session() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;

    let first = ctx.login("alice").await;
    let second = ctx.login("alice").await;
    assert_ne!(first, second);

    let stale = ctx.get("/api/users/me", Some(&first)).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let current = ctx.get("/api/users/me", Some(&second)).await;
    assert_eq!(current.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;
    let cookie = ctx.login("alice").await;

    let response = ctx.post("/logout", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);

    let after = ctx.get("/api/cart", Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn shopping_flow_from_cart_to_order() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;
    let guitar = ctx.backend.seed_product("Stratocaster", 1000.0, None, None).await;
    let strings = ctx.backend.seed_product("Strings", 12.5, None, None).await;
    let cookie = ctx.login("alice").await;

    let empty = ctx.get("/api/cart", Some(&cookie)).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body["data"]["items"], json!([]));

    let empty_checkout = ctx.post("/api/cart/checkout", Some(&cookie)).await;
    assert_eq!(empty_checkout.status, StatusCode::BAD_REQUEST);

    ctx.post(&format!("/api/cart/add/{}", guitar.id), Some(&cookie))
        .await;
    ctx.post(&format!("/api/cart/add/{}", strings.id), Some(&cookie))
        .await;
    let cart = ctx
        .post(&format!("/api/cart/add/{}", strings.id), Some(&cookie))
        .await;

    assert_eq!(cart.status, StatusCode::OK);
    let items = cart.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["quantity"], 2);
    assert_eq!(cart.body["data"]["totalPrice"], 1025.0);

    let order = ctx.post("/api/cart/checkout", Some(&cookie)).await;
    assert_eq!(order.status, StatusCode::OK);
    assert_eq!(order.body["data"]["totalPrice"], 1025.0);
    assert_eq!(order.body["data"]["products"].as_array().unwrap().len(), 3);

    let cart = ctx.get("/api/cart", Some(&cookie)).await;
    assert_eq!(cart.body["data"]["items"], json!([]));

    let orders = ctx.get("/api/cart/orders", Some(&cookie)).await;
    assert_eq!(orders.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn removing_a_foreign_cart_item_is_not_found() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;
    ctx.seed_user("bob", "USER").await;
    let guitar = ctx.backend.seed_product("Stratocaster", 1000.0, None, None).await;

    let alice = ctx.login("alice").await;
    let bob = ctx.login("bob").await;

    let cart = ctx
        .post(&format!("/api/cart/add/{}", guitar.id), Some(&alice))
        .await;
    let item_id = cart.body["data"]["items"][0]["id"].as_i64().unwrap();

    let foreign = ctx
        .delete(&format!("/api/cart/remove/{item_id}"), Some(&bob))
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let own = ctx
        .delete(&format!("/api/cart/remove/{item_id}"), Some(&alice))
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["data"]["items"], json!([]));
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;
    let cookie = ctx.login("alice").await;

    for uri in [
        "/api/admin/users",
        "/api/admin/orders/metrics/orders-by-user",
        "/api/admin/orders/metrics/total-price-by-user",
    ] {
        let response = ctx.get(uri, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
    }

    let create = ctx
        .send_json(
            "POST",
            "/api/admin/products",
            Some(&cookie),
            json!({ "name": "Drum kit", "price": 500.0 }),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let anonymous = ctx.get("/api/admin/users", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_manages_products() {
    let ctx = TestContext::new();
    ctx.seed_user("root", "ADMIN").await;
    ctx.seed_user("alice", "USER").await;
    let admin = ctx.login("root").await;
    let alice = ctx.login("alice").await;

    let created = ctx
        .send_json(
            "POST",
            "/api/admin/products",
            Some(&admin),
            json!({ "name": "Drum kit", "price": 500.0, "brand": "Pearl" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["inStock"], true);
    let product_id = created.body["data"]["id"].as_i64().unwrap();

    let updated = ctx
        .send_json(
            "PUT",
            &format!("/api/admin/products/{product_id}"),
            Some(&admin),
            json!({ "name": "Drum kit", "price": 450.0, "inStock": false }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["price"], 450.0);

    ctx.post(&format!("/api/cart/add/{product_id}"), Some(&alice))
        .await;

    let deleted = ctx
        .delete(&format!("/api/admin/products/{product_id}"), Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let cart = ctx.get("/api/cart", Some(&alice)).await;
    assert_eq!(cart.body["data"]["items"], json!([]));

    let public = ctx
        .get(&format!("/api/public/products/{product_id}"), None)
        .await;
    assert_eq!(public.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_manages_users() {
    let ctx = TestContext::new();
    ctx.seed_user("root", "ADMIN").await;
    let alice = ctx.seed_user("alice", "USER").await;
    let admin = ctx.login("root").await;
    let alice_cookie = ctx.login("alice").await;

    let users = ctx.get("/api/admin/users", Some(&admin)).await;
    assert_eq!(users.status, StatusCode::OK);
    assert_eq!(users.body["data"].as_array().unwrap().len(), 2);

    let bad_role = ctx
        .send_json(
            "PUT",
            &format!("/api/admin/users/{}/role", alice.id),
            Some(&admin),
            json!({ "role": "SUPERUSER" }),
        )
        .await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);

    let promoted = ctx
        .send_json(
            "PUT",
            &format!("/api/admin/users/{}/role", alice.id),
            Some(&admin),
            json!({ "role": "ADMIN" }),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["data"]["role"], "ADMIN");

    let revoked = ctx.get("/api/users/me", Some(&alice_cookie)).await;
    assert_eq!(revoked.status, StatusCode::UNAUTHORIZED);

    let deleted = ctx
        .delete(&format!("/api/admin/users/{}", alice.id), Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(ctx.backend.user_by_name("alice").await.is_none());

    let missing = ctx
        .delete(&format!("/api/admin/users/{}", alice.id), Some(&admin))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_order_metrics_group_by_username() {
    let ctx = TestContext::new();
    ctx.seed_user("root", "ADMIN").await;
    ctx.seed_user("alice", "USER").await;
    ctx.seed_user("bob", "USER").await;
    let product = ctx.backend.seed_product("Picks", 10.0, None, None).await;

    for (username, orders) in [("alice", 2), ("bob", 1)] {
        let cookie = ctx.login(username).await;
        for _ in 0..orders {
            ctx.post(&format!("/api/cart/add/{}", product.id), Some(&cookie))
                .await;
            let order = ctx.post("/api/cart/checkout", Some(&cookie)).await;
            assert_eq!(order.status, StatusCode::OK);
        }
    }

    let admin = ctx.login("root").await;

    let counts = ctx
        .get("/api/admin/orders/metrics/orders-by-user", Some(&admin))
        .await;
    assert_eq!(
        counts.body["data"],
        json!([
            { "username": "alice", "orderCount": 2 },
            { "username": "bob", "orderCount": 1 }
        ])
    );

    let totals = ctx
        .get("/api/admin/orders/metrics/total-price-by-user", Some(&admin))
        .await;
    assert_eq!(
        totals.body["data"],
        json!([
            { "username": "alice", "totalPrice": 20.0 },
            { "username": "bob", "totalPrice": 10.0 }
        ])
    );
}

#[tokio::test]
async fn change_password_and_email() {
    let ctx = TestContext::new();
    ctx.seed_user("alice", "USER").await;
    ctx.seed_user("bob", "USER").await;
    let cookie = ctx.login("alice").await;

    let wrong_old = ctx
        .send_json(
            "POST",
            "/api/users/change-password",
            Some(&cookie),
            json!({ "oldPassword": "nope", "newPassword": "secret2" }),
        )
        .await;
    assert_eq!(wrong_old.status, StatusCode::BAD_REQUEST);

    let changed = ctx
        .send_json(
            "POST",
            "/api/users/change-password",
            Some(&cookie),
            json!({ "oldPassword": "secret1", "newPassword": "secret2" }),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let taken = ctx
        .send_json(
            "POST",
            "/api/users/change-email",
            Some(&cookie),
            json!({ "newEmail": "bob@example.com" }),
        )
        .await;
    assert_eq!(taken.status, StatusCode::BAD_REQUEST);

    let email = ctx
        .send_json(
            "POST",
            "/api/users/change-email",
            Some(&cookie),
            json!({ "newEmail": "alice@music.shop" }),
        )
        .await;
    assert_eq!(email.status, StatusCode::OK);
    assert_eq!(email.body["data"]["email"], "alice@music.shop");

    let relogin = ctx.login_with("alice", "secret2").await;
    assert_eq!(relogin.status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_and_openapi_are_exposed() {
    let ctx = TestContext::new();
    ctx.get("/api/public/products", None).await;

    let metrics = ctx.get("/metrics", None).await;
    assert_eq!(metrics.status, StatusCode::OK);
    assert!(metrics.text.contains("product_service_request_counter"));
    assert!(metrics.text.contains("process_start_time_seconds"));

    let openapi = ctx.get("/api-docs/openapi.json", None).await;
    assert_eq!(openapi.status, StatusCode::OK);
    assert!(openapi.body["paths"]["/api/cart/checkout"].is_object());
}
