use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use super::StatusChange;
use crate::{
    auth::extract::StaffUser,
    entities::sea_orm_active_enums::ReservationStatus,
    error::AppResult,
    router::AppState,
    services::reservations::{self, NewReservation, ReservationUpdate, ReservationView},
    util::time::parse_date,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reservations",
            get(all_reservations).post(create_reservation),
        )
        .route("/api/reservations/date/{date}", get(reservations_for_date))
        .route(
            "/api/reservations/{id}",
            get(reservation_by_id)
                .put(update_reservation)
                .delete(delete_reservation),
        )
        .route("/api/reservations/{id}/status", put(update_status))
        .route("/api/reservations/{id}/cancel", post(cancel_reservation))
}

/// Public booking endpoint.
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(input): Json<NewReservation>,
) -> AppResult<impl IntoResponse> {
    let reservation = reservations::create_reservation(&state.db, &state.policy, input).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn all_reservations(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<Vec<ReservationView>>> {
    Ok(Json(reservations::list_reservations(&state.db).await?))
}

pub async fn reservation_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReservationView>> {
    Ok(Json(reservations::get_reservation(&state.db, id).await?))
}

pub async fn reservations_for_date(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(date): Path<String>,
) -> AppResult<Json<Vec<ReservationView>>> {
    let date = parse_date(&date)?;
    Ok(Json(
        reservations::list_reservations_for_date(&state.db, &state.policy, date).await?,
    ))
}

pub async fn update_reservation(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
    Json(update): Json<ReservationUpdate>,
) -> AppResult<Json<ReservationView>> {
    Ok(Json(
        reservations::update_reservation(&state.db, &state.policy, id, update).await?,
    ))
}

pub async fn update_status(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
    Json(change): Json<StatusChange<ReservationStatus>>,
) -> AppResult<Json<ReservationView>> {
    Ok(Json(
        reservations::update_reservation_status(&state.db, id, change.status).await?,
    ))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReservationView>> {
    Ok(Json(reservations::cancel_reservation(&state.db, id).await?))
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    reservations::delete_reservation(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
