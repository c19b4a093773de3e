use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use super::DateQuery;
use crate::{
    auth::extract::StaffUser,
    error::AppResult,
    router::AppState,
    services::dashboard::{self, DashboardStats},
    util::time::{local_date, parse_date},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(stats))
}

/// `?date=YYYY-MM-DD`, today in the restaurant's timezone when omitted.
pub async fn stats(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<DashboardStats>> {
    let tz = state.policy.timezone;
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => local_date(chrono::Utc::now(), tz),
    };
    Ok(Json(dashboard::dashboard_stats(&state.db, tz, date).await?))
}
