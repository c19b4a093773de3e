use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    auth::extract::{ManagerUser, StaffUser},
    entities::dining_table,
    error::AppResult,
    router::AppState,
    services::seating::{self, NewTable, TableUpdate},
};

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub area: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub guests: i32,
    pub area: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tables", get(all_tables).post(create_table))
        .route("/api/tables/available", get(available_tables))
        .route("/api/tables/suggest", get(suggest_tables))
        .route("/api/tables/area/{area}", get(tables_by_area))
        .route(
            "/api/tables/{id}",
            get(table_by_id).put(update_table).delete(delete_table),
        )
}

pub async fn all_tables(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<Vec<dining_table::Model>>> {
    Ok(Json(seating::list_tables(&state.db).await?))
}

pub async fn table_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<String>,
) -> AppResult<Json<dining_table::Model>> {
    Ok(Json(seating::get_table(&state.db, &id).await?))
}

pub async fn tables_by_area(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(area): Path<String>,
) -> AppResult<Json<Vec<dining_table::Model>>> {
    Ok(Json(seating::find_tables_by_area(&state.db, &area).await?))
}

pub async fn available_tables(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<Vec<dining_table::Model>>> {
    Ok(Json(
        seating::available_tables(&state.db, query.start, query.end, query.area.as_deref())
            .await?,
    ))
}

pub async fn suggest_tables(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(query): Query<SuggestQuery>,
) -> AppResult<Json<Vec<dining_table::Model>>> {
    Ok(Json(
        seating::suggest_tables(
            &state.db,
            query.start,
            query.end,
            query.guests,
            query.area.as_deref(),
        )
        .await?,
    ))
}

pub async fn create_table(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Json(input): Json<NewTable>,
) -> AppResult<impl IntoResponse> {
    let table = seating::create_table(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

pub async fn update_table(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<String>,
    Json(update): Json<TableUpdate>,
) -> AppResult<Json<dining_table::Model>> {
    Ok(Json(seating::update_table(&state.db, &id, update).await?))
}

pub async fn delete_table(
    State(state): State<AppState>,
    _manager: ManagerUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    seating::delete_table(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
