use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use super::StatusChange;
use crate::{
    auth::extract::StaffUser,
    entities::sea_orm_active_enums::{ItemStatus, OrderStatus},
    error::AppResult,
    router::AppState,
    services::orders::{self, NewOrder, OrderView},
    util::time::parse_date,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(all_orders).post(create_order))
        .route("/api/orders/date/{date}", get(orders_for_date))
        .route("/api/orders/{id}", get(order_by_id))
        .route("/api/orders/{id}/status", put(update_status))
        .route(
            "/api/orders/{id}/items/{item_id}/status",
            put(update_item_status),
        )
}

pub async fn all_orders(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<Vec<OrderView>>> {
    Ok(Json(orders::list_orders(&state.db).await?))
}

pub async fn order_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(orders::get_order(&state.db, id).await?))
}

pub async fn orders_for_date(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(date): Path<String>,
) -> AppResult<Json<Vec<OrderView>>> {
    let date = parse_date(&date)?;
    Ok(Json(
        orders::list_orders_by_date(&state.db, date, state.policy.timezone).await?,
    ))
}

pub async fn create_order(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(input): Json<NewOrder>,
) -> AppResult<impl IntoResponse> {
    let order = orders::create_order(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_status(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
    Json(change): Json<StatusChange<OrderStatus>>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(
        orders::update_order_status(&state.db, id, change.status).await?,
    ))
}

pub async fn update_item_status(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path((id, item_id)): Path<(i32, i32)>,
    Json(change): Json<StatusChange<ItemStatus>>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(
        orders::update_order_item_status(&state.db, id, item_id, change.status).await?,
    ))
}
