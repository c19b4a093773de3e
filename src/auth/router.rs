use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};

use super::extract::{CurrentUser, ManagerUser, TOKEN_COOKIE};
use super::user::{Backend, Credentials, Registration};
use crate::entities::{app_user, sea_orm_active_enums::UserType};
use crate::error::{AppError, AppResult};
use crate::router::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: app_user::Model,
}

/// Account provisioned by a manager.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(flatten)]
    pub registration: Registration,
    pub user_type: UserType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChange {
    pub user_type: UserType,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(self::post::login))
        .route("/api/auth/register", post(self::post::register))
        .route("/api/auth/logout", post(self::post::logout))
        .route("/api/auth/profile", get(self::get::profile))
        .route(
            "/api/auth/users",
            get(self::get::users).post(self::post::create_user),
        )
        .route("/api/auth/users/{id}/role", put(self::put::role))
}

mod post {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        jar: CookieJar,
        Json(creds): Json<Credentials>,
    ) -> AppResult<impl IntoResponse> {
        let backend = Backend::new(state.db.clone());
        let user = backend
            .verify_credentials(&creds)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let token = state.jwt.issue_token(&user)?;

        // Same-site cookie for browser clients; API clients use the body token.
        let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);

        Ok((jar.add(cookie), Json(LoginResponse { token, user })))
    }

    pub async fn register(
        State(state): State<AppState>,
        Json(registration): Json<Registration>,
    ) -> AppResult<impl IntoResponse> {
        let backend = Backend::new(state.db.clone());
        let user = backend.register(registration).await?;
        Ok((StatusCode::CREATED, Json(user)))
    }

    pub async fn create_user(
        State(state): State<AppState>,
        ManagerUser(manager): ManagerUser,
        Json(account): Json<NewAccount>,
    ) -> AppResult<impl IntoResponse> {
        let backend = Backend::new(state.db.clone());
        let user = backend
            .create_with_role(account.registration, account.user_type)
            .await?;
        tracing::info!(manager_id = manager.id, user_id = user.id, "Manager created account");
        Ok((StatusCode::CREATED, Json(user)))
    }

    pub async fn logout(jar: CookieJar) -> impl IntoResponse {
        (
            jar.remove(Cookie::build(TOKEN_COOKIE).path("/")),
            StatusCode::NO_CONTENT,
        )
    }
}

mod get {
    use super::*;

    pub async fn profile(
        State(state): State<AppState>,
        current: CurrentUser,
    ) -> AppResult<Json<app_user::Model>> {
        let backend = Backend::new(state.db.clone());
        Ok(Json(backend.get_user(current.id).await?))
    }

    pub async fn users(
        State(state): State<AppState>,
        _manager: ManagerUser,
    ) -> AppResult<Json<Vec<app_user::Model>>> {
        let backend = Backend::new(state.db.clone());
        Ok(Json(backend.list_users().await?))
    }
}

mod put {
    use super::*;

    pub async fn role(
        State(state): State<AppState>,
        ManagerUser(manager): ManagerUser,
        Path(id): Path<i32>,
        Json(change): Json<RoleChange>,
    ) -> AppResult<Json<app_user::Model>> {
        let backend = Backend::new(state.db.clone());
        Ok(Json(backend.set_role(manager.id, id, change.user_type).await?))
    }
}
