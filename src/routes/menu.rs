use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::{
    auth::extract::ManagerUser,
    entities::{item_option, menu_availability, menu_category},
    error::AppResult,
    router::AppState,
    services::catalog::{
        self, CategoryUpdate, MenuItemUpdate, MenuItemView, NewCategory, NewMenuItem, NewOption,
        OptionUpdate,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityChange {
    pub is_available: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(full_menu))
        .route("/api/menu/sitting/{sitting_type}", get(menu_for_sitting))
        .route(
            "/api/menu/categories",
            get(all_categories).post(create_category),
        )
        .route(
            "/api/menu/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/api/menu/items", post(create_item))
        .route(
            "/api/menu/items/{id}",
            get(item_by_id).put(update_item).delete(delete_item),
        )
        .route("/api/menu/items/{id}/options", post(create_option))
        .route(
            "/api/menu/items/{id}/availability/{sitting_type}",
            put(set_availability).delete(remove_availability),
        )
        .route(
            "/api/menu/options/{id}",
            put(update_option).delete(delete_option),
        )
}

pub async fn full_menu(State(state): State<AppState>) -> AppResult<Json<Vec<MenuItemView>>> {
    Ok(Json(catalog::list_menu(&state.db).await?))
}

pub async fn menu_for_sitting(
    State(state): State<AppState>,
    Path(sitting_type): Path<String>,
) -> AppResult<Json<Vec<MenuItemView>>> {
    Ok(Json(
        catalog::list_menu_for_sitting(&state.db, &sitting_type).await?,
    ))
}

pub async fn all_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<menu_category::Model>>> {
    Ok(Json(catalog::list_categories(&state.db).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Json(input): Json<NewCategory>,
) -> AppResult<impl IntoResponse> {
    let category = catalog::create_category(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
    Json(update): Json<CategoryUpdate>,
) -> AppResult<Json<menu_category::Model>> {
    Ok(Json(catalog::update_category(&state.db, id, update).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    catalog::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn item_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MenuItemView>> {
    Ok(Json(catalog::get_item(&state.db, id).await?))
}

pub async fn create_item(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Json(input): Json<NewMenuItem>,
) -> AppResult<impl IntoResponse> {
    let item = catalog::create_item(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
    Json(update): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItemView>> {
    Ok(Json(catalog::update_item(&state.db, id, update).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    catalog::delete_item(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_option(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(item_id): Path<i32>,
    Json(input): Json<NewOption>,
) -> AppResult<impl IntoResponse> {
    let option = catalog::create_option(&state.db, item_id, input).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

pub async fn update_option(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
    Json(update): Json<OptionUpdate>,
) -> AppResult<Json<item_option::Model>> {
    Ok(Json(catalog::update_option(&state.db, id, update).await?))
}

pub async fn delete_option(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    catalog::delete_option(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_availability(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path((item_id, sitting_type)): Path<(i32, String)>,
    Json(change): Json<AvailabilityChange>,
) -> AppResult<Json<menu_availability::Model>> {
    Ok(Json(
        catalog::set_availability(&state.db, item_id, &sitting_type, change.is_available).await?,
    ))
}

pub async fn remove_availability(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path((item_id, sitting_type)): Path<(i32, String)>,
) -> AppResult<StatusCode> {
    catalog::remove_availability(&state.db, item_id, &sitting_type).await?;
    Ok(StatusCode::NO_CONTENT)
}
