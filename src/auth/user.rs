use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::entities::{app_user, sea_orm_active_enums::UserType};
use crate::error::{AppError, AppResult};

pub const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 5..=20;
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Account store backed by the `app_user` table.
#[derive(Debug, Clone)]
pub struct Backend {
    db: DatabaseConnection,
}

impl Backend {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a `Member` account.
    pub async fn register(&self, registration: Registration) -> AppResult<app_user::Model> {
        self.create_with_role(registration, UserType::Member).await
    }

    /// Provision an account with an explicit role.
    ///
    /// Registration always yields members; staff and managers are created here.
    /// The duplicate check and the insert share one transaction.
    pub async fn create_with_role(
        &self,
        registration: Registration,
        user_type: UserType,
    ) -> AppResult<app_user::Model> {
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_lowercase();

        if !USERNAME_LENGTH.contains(&username.chars().count()) {
            return Err(AppError::validation(
                "Username must be between 5 and 20 characters",
            ));
        }
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(
                "Password must be at least 8 characters",
            ));
        }
        if !email.contains('@') {
            return Err(AppError::validation("Email address is invalid"));
        }

        let password_hash = hash_password_blocking(registration.password).await?;

        let txn = self.db.begin().await?;
        let existing = app_user::Entity::find()
            .filter(
                app_user::Column::Username
                    .eq(username.clone())
                    .or(app_user::Column::Email.eq(email.clone())),
            )
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("Username or email is already registered"));
        }

        let user = app_user::ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            user_type: Set(user_type),
            ..Default::default()
        };
        debug!("Creating new user: {:?}", user.username);
        let user = user.insert(&txn).await?;
        txn.commit().await?;
        info!(user_id = user.id, role = ?user.user_type, "Created account");

        Ok(user)
    }

    pub async fn list_users(&self) -> AppResult<Vec<app_user::Model>> {
        Ok(app_user::Entity::find()
            .order_by_asc(app_user::Column::Username)
            .all(&self.db)
            .await?)
    }

    /// Change another account's role. Managers cannot change their own.
    pub async fn set_role(
        &self,
        acting_user_id: i32,
        user_id: i32,
        user_type: UserType,
    ) -> AppResult<app_user::Model> {
        if acting_user_id == user_id {
            return Err(AppError::validation("You cannot change your own role"));
        }
        let user = self.get_user(user_id).await?;
        if user.user_type == user_type {
            return Ok(user);
        }

        let mut user: app_user::ActiveModel = user.into();
        user.user_type = Set(user_type);
        let user = user.update(&self.db).await?;
        info!(user_id, role = ?user_type, "Changed account role");
        Ok(user)
    }

    /// `None` for an unknown user or a wrong password.
    pub async fn verify_credentials(
        &self,
        creds: &Credentials,
    ) -> AppResult<Option<app_user::Model>> {
        let user = app_user::Entity::find()
            .filter(app_user::Column::Username.eq(creds.username.trim()))
            .one(&self.db)
            .await?;

        let Some(user) = user else {
            debug!("Login attempt for unknown user");
            return Ok(None);
        };

        if verify_password_blocking(creds.password.clone(), user.password_hash.clone()).await? {
            Ok(Some(user))
        } else {
            warn!(user_id = user.id, "Password verification failed");
            Ok(None)
        }
    }

    pub async fn get_user(&self, user_id: i32) -> AppResult<app_user::Model> {
        app_user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
}

async fn verify_password_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))
}
