//! Request extractors resolving the caller from a JWT.
//!
//! The token is read from `Authorization: Bearer ...` first and from the
//! `token` cookie second.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Authorization, authorization::Bearer},
};
use serde::Serialize;

use crate::entities::sea_orm_active_enums::UserType;
use crate::error::{AppError, AppResult};
use crate::router::AppState;

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: UserType,
}

impl CurrentUser {
    pub fn require_staff(&self) -> AppResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Staff access required".to_string()))
        }
    }

    pub fn require_manager(&self) -> AppResult<()> {
        if self.role == UserType::Manager {
            Ok(())
        } else {
            Err(AppError::Forbidden("Manager access required".to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let bearer = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string());

        let token = match bearer {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .ok_or(AppError::Unauthorized)?,
        };

        let claims = state.jwt.validate_token(&token)?;
        let id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::Unauthorized)?;

        Ok(CurrentUser {
            id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Caller with the `Staff` or `Manager` role.
#[derive(Debug, Clone)]
pub struct StaffUser(pub CurrentUser);

impl<S> FromRequestParts<S> for StaffUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require_staff()?;
        Ok(StaffUser(user))
    }
}

/// Caller with the `Manager` role.
#[derive(Debug, Clone)]
pub struct ManagerUser(pub CurrentUser);

impl<S> FromRequestParts<S> for ManagerUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require_manager()?;
        Ok(ManagerUser(user))
    }
}
