use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use super::DateQuery;
use crate::{
    auth::extract::ManagerUser,
    entities::sitting,
    error::AppResult,
    router::AppState,
    services::seating::{self, NewSitting, SittingUpdate},
    util::time::{local_date, parse_date},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sittings", get(all_sittings).post(create_sitting))
        .route("/api/sittings/available", get(available_sittings))
        .route("/api/sittings/date/{date}", get(sittings_for_date))
        .route(
            "/api/sittings/{id}",
            get(sitting_by_id).put(update_sitting).delete(delete_sitting),
        )
}

pub async fn all_sittings(State(state): State<AppState>) -> AppResult<Json<Vec<sitting::Model>>> {
    Ok(Json(seating::list_sittings(&state.db).await?))
}

pub async fn sitting_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<sitting::Model>> {
    Ok(Json(seating::get_sitting(&state.db, id).await?))
}

/// `?date=YYYY-MM-DD`, today in the restaurant's timezone when omitted.
pub async fn available_sittings(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<sitting::Model>>> {
    let tz = state.policy.timezone;
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => local_date(chrono::Utc::now(), tz),
    };
    Ok(Json(seating::list_available_sittings(&state.db, date, tz).await?))
}

pub async fn sittings_for_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<Vec<sitting::Model>>> {
    let date = parse_date(&date)?;
    Ok(Json(
        seating::list_sittings_for_date(&state.db, date, state.policy.timezone).await?,
    ))
}

pub async fn create_sitting(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Json(input): Json<NewSitting>,
) -> AppResult<impl IntoResponse> {
    let sitting = seating::create_sitting(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(sitting)))
}

pub async fn update_sitting(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
    Json(update): Json<SittingUpdate>,
) -> AppResult<Json<sitting::Model>> {
    Ok(Json(seating::update_sitting(&state.db, id, update).await?))
}

pub async fn delete_sitting(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    seating::delete_sitting(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
