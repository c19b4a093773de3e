use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    auth::extract::StaffUser,
    entities::guest,
    error::{AppError, AppResult},
    router::AppState,
    services::guests::{self, GuestInfo, GuestProfileUpdate},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/guests", get(all_guests).post(create_guest))
        .route("/api/guests/phone/{phone}", get(guest_by_phone))
        .route(
            "/api/guests/{id}",
            get(guest_by_id).put(update_guest).delete(delete_guest),
        )
}

pub async fn all_guests(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<Vec<guest::Model>>> {
    Ok(Json(guests::list_guests(&state.db).await?))
}

pub async fn guest_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<Json<guest::Model>> {
    Ok(Json(guests::get_guest(&state.db, id).await?))
}

pub async fn guest_by_phone(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(phone): Path<String>,
) -> AppResult<Json<guest::Model>> {
    guests::find_guest_by_phone(&state.db, &phone)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Guest with phone {phone}")))
}

pub async fn create_guest(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(info): Json<GuestInfo>,
) -> AppResult<impl IntoResponse> {
    let guest = guests::create_guest(&state.db, &info).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}

pub async fn update_guest(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
    Json(update): Json<GuestProfileUpdate>,
) -> AppResult<Json<guest::Model>> {
    Ok(Json(guests::update_guest_profile(&state.db, id, &update).await?))
}

pub async fn delete_guest(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    guests::delete_guest(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
