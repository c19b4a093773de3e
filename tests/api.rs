mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bistro::{
    auth::{
        jwt::{JwtConfig, JwtService},
        user::{Backend, Registration},
    },
    entities::sea_orm_active_enums::UserType,
    router::{AppState, create_router},
};
use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret-with-enough-bytes";

async fn app() -> (Router, AppState) {
    let db = setup().await;
    let state = AppState {
        db,
        jwt: JwtService::with_config(JwtConfig::new(SECRET)),
        policy: policy(),
    };
    (create_router(state.clone()), state)
}

async fn token_for(state: &AppState, username: &str, role: UserType) -> String {
    let user = Backend::new(state.db.clone())
        .create_with_role(
            Registration {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "correct horse battery".to_string(),
            },
            role,
        )
        .await
        .unwrap();
    state.jwt.issue_token(&user).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn staff_routes_check_the_caller_role() {
    let (app, state) = app().await;
    let member = token_for(&state, "member", UserType::Member).await;
    let staff = token_for(&state, "waiter", UserType::Staff).await;

    let (status, body) = send(&app, get("/api/orders", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, get("/api/orders", Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/orders", Some(&member))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, get("/api/orders", Some(&staff))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn login_returns_a_usable_token() {
    let (app, _) = app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "username": "ada_l",
                "email": "ada@example.com",
                "password": "correct horse battery"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userType"], "Member");
    assert!(body.get("passwordHash").is_none());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "ada_l", "password": "wrong password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "ada_l", "password": "correct horse battery" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let token = body["token"].as_str().unwrap();

    let (status, profile) = send(&app, get("/api/auth/profile", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "ada_l");

    // The cookie alone is enough for browser clients.
    let pair = cookie.split(';').next().unwrap();
    let request = Request::get("/api/auth/profile")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn public_booking_flow() {
    let (app, state) = app().await;
    let manager = token_for(&state, "manager", UserType::Manager).await;
    let staff = token_for(&state, "waiter", UserType::Staff).await;

    let sitting = json!({
        "sittingType": "Lunch",
        "startTime": at("12:00"),
        "endTime": at("15:00"),
        "capacity": 80
    });
    let (status, _) = send(&app, json_request("POST", "/api/sittings", Some(&staff), sitting.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, created) =
        send(&app, json_request("POST", "/api/sittings", Some(&manager), sitting)).await;
    assert_eq!(status, StatusCode::CREATED);
    let sitting_id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/tables",
            Some(&manager),
            json!({ "id": "M1", "area": "Main", "capacity": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, available) = send(
        &app,
        get(&format!("/api/sittings/available?date={SERVICE_DAY}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(available.as_array().map(Vec::len), Some(1));

    let (status, reservation) = send(
        &app,
        json_request(
            "POST",
            "/api/reservations",
            None,
            json!({
                "sittingId": sitting_id,
                "startTime": at("12:30"),
                "tableIds": ["M1"],
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phoneNumber": "0411111111",
                "numberOfGuests": 2
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["status"], "Pending");
    assert_eq!(reservation["tableIds"], json!(["M1"]));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/sittings",
            Some(&manager),
            json!({
                "sittingType": "Afternoon",
                "startTime": at("14:00"),
                "endTime": at("17:00"),
                "capacity": 40
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = send(
        &app,
        get(&format!("/api/reservations/date/{SERVICE_DAY}"), Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let id = reservation["id"].as_i64().unwrap();
    let (status, confirmed) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/reservations/{id}/status"),
            Some(&staff),
            json!({ "status": "Confirmed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "Confirmed");

    let (status, body) = send(&app, get("/api/reservations/9999", Some(&staff))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn orders_over_http_are_priced() {
    let (app, state) = app().await;
    let manager = token_for(&state, "manager", UserType::Manager).await;

    let (status, category) = send(
        &app,
        json_request(
            "POST",
            "/api/menu/categories",
            Some(&manager),
            json!({ "name": "Mains" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, item) = send(
        &app,
        json_request(
            "POST",
            "/api/menu/items",
            Some(&manager),
            json!({ "categoryId": category["id"], "name": "Barramundi", "price": "24.00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = item["id"].as_i64().unwrap();

    let (status, option) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/menu/items/{item_id}/options"),
            Some(&manager),
            json!({ "name": "Extra chips", "priceModifier": "4.00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/menu/items/{item_id}/availability/Lunch"),
            Some(&manager),
            json!({ "isAvailable": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, lunch_menu) = send(&app, get("/api/menu/sitting/Lunch", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lunch_menu.as_array().map(Vec::len), Some(1));

    let (status, order) = send(
        &app,
        json_request(
            "POST",
            "/api/orders",
            Some(&manager),
            json!({
                "items": [{
                    "menuItemId": item_id,
                    "quantity": 2,
                    "selectedOptionIds": [option["id"]]
                }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&order["totalAmount"]), dec!(56.00));
    assert_eq!(decimal(&order["items"][0]["unitPrice"]), dec!(28.00));
}

#[tokio::test]
async fn managers_provision_staff_accounts() {
    let (app, state) = app().await;
    let manager = token_for(&state, "manager", UserType::Manager).await;
    let staff = token_for(&state, "waiter", UserType::Staff).await;
    let account = json!({
        "username": "chef_one",
        "email": "chef@example.com",
        "password": "correct horse battery",
        "userType": "Staff"
    });

    let (status, _) = send(
        &app,
        json_request("POST", "/api/auth/users", Some(&staff), account.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(
        &app,
        json_request("POST", "/api/auth/users", Some(&manager), account),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userType"], "Staff");
    assert!(created.get("passwordHash").is_none());

    let (status, login) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "chef_one", "password": "correct horse battery"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chef = login["token"].as_str().unwrap().to_string();
    let (status, _) = send(&app, get("/api/orders", Some(&chef))).await;
    assert_eq!(status, StatusCode::OK);

    // Registration stays member-only; promotion goes through the role endpoint.
    let (status, member) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "username": "ada_l",
                "email": "ada@example.com",
                "password": "correct horse battery"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["userType"], "Member");
    let uri = format!("/api/auth/users/{}/role", member["id"]);

    let (status, _) = send(
        &app,
        json_request("PUT", &uri, Some(&staff), json!({"userType": "Manager"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, promoted) = send(
        &app,
        json_request("PUT", &uri, Some(&manager), json!({"userType": "Staff"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["userType"], "Staff");

    let (status, users) = send(&app, get("/api/auth/users", Some(&manager))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn dashboard_stats_are_for_staff() {
    let (app, state) = app().await;
    let member = token_for(&state, "member", UserType::Member).await;
    let staff = token_for(&state, "waiter", UserType::Staff).await;

    let (status, _) = send(&app, get("/api/dashboard/stats", Some(&member))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        get(&format!("/api/dashboard/stats?date={SERVICE_DAY}"), Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalReservations"], 0);
    assert_eq!(body["totalOrders"], 0);
    assert_eq!(decimal(&body["revenue"]), Decimal::ZERO);

    let (status, _) = send(&app, get("/api/dashboard/stats?date=10-06-2025", Some(&staff))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
