//! Guest directory: contact-keyed identity shared by all of a guest's bookings.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::required;
use crate::entities::{guest, reservation};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = required(email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::validation(format!("Invalid email address: {email}")));
    }
    Ok(email)
}

fn normalize_phone(phone: &str) -> AppResult<String> {
    let phone: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    required(&phone, "phoneNumber")
}

pub async fn find_guest_by_phone<C: ConnectionTrait>(
    db: &C,
    phone: &str,
) -> AppResult<Option<guest::Model>> {
    let phone = normalize_phone(phone)?;
    Ok(guest::Entity::find()
        .filter(guest::Column::PhoneNumber.eq(phone))
        .one(db)
        .await?)
}

pub async fn get_guest<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<guest::Model> {
    guest::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Guest {id}")))
}

pub async fn list_guests<C: ConnectionTrait>(db: &C) -> AppResult<Vec<guest::Model>> {
    Ok(guest::Entity::find()
        .order_by_asc(guest::Column::LastName)
        .order_by_asc(guest::Column::FirstName)
        .all(db)
        .await?)
}

pub async fn create_guest<C: ConnectionTrait>(db: &C, info: &GuestInfo) -> AppResult<guest::Model> {
    let first_name = required(&info.first_name, "firstName")?;
    let last_name = required(&info.last_name, "lastName")?;
    let email = normalize_email(&info.email)?;
    let phone = normalize_phone(&info.phone_number)?;

    ensure_contact_free(db, None, Some(&email), Some(&phone)).await?;

    let guest = guest::ActiveModel {
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email),
        phone_number: Set(phone),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(guest_id = guest.id, "Created guest");

    Ok(guest)
}

/// Existing guest with this phone number, or a new one.
///
/// A returning guest keeps their stored name and email even when the request
/// carries different values.
pub async fn resolve_or_create<C: ConnectionTrait>(
    db: &C,
    info: &GuestInfo,
) -> AppResult<guest::Model> {
    if let Some(existing) = find_guest_by_phone(db, &info.phone_number).await? {
        debug!(guest_id = existing.id, "Matched returning guest by phone");
        return Ok(existing);
    }
    create_guest(db, info).await
}

/// Shared-identity edit: every reservation of this guest sees the change.
pub async fn update_guest_profile<C: ConnectionTrait>(
    db: &C,
    id: i32,
    update: &GuestProfileUpdate,
) -> AppResult<guest::Model> {
    let existing = get_guest(db, id).await?;

    let email = update.email.as_deref().map(normalize_email).transpose()?;
    let phone = update
        .phone_number
        .as_deref()
        .map(normalize_phone)
        .transpose()?;
    ensure_contact_free(db, Some(id), email.as_deref(), phone.as_deref()).await?;

    let mut guest: guest::ActiveModel = existing.into();
    if let Some(first_name) = &update.first_name {
        guest.first_name = Set(required(first_name, "firstName")?);
    }
    if let Some(last_name) = &update.last_name {
        guest.last_name = Set(required(last_name, "lastName")?);
    }
    if let Some(email) = email {
        guest.email = Set(email);
    }
    if let Some(phone) = phone {
        guest.phone_number = Set(phone);
    }

    let guest = guest.update(db).await?;
    info!(guest_id = guest.id, "Updated guest profile");
    Ok(guest)
}

pub async fn delete_guest<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    let guest = get_guest(db, id).await?;

    let bookings = guest.find_related(reservation::Entity).count(db).await?;
    if bookings > 0 {
        return Err(AppError::conflict(format!(
            "Guest {id} still has {bookings} reservation(s)"
        )));
    }

    guest.delete(db).await?;
    info!(guest_id = id, "Deleted guest");
    Ok(())
}

/// Conflict when another guest already owns `email` or `phone`.
async fn ensure_contact_free<C: ConnectionTrait>(
    db: &C,
    exclude: Option<i32>,
    email: Option<&str>,
    phone: Option<&str>,
) -> AppResult<()> {
    if let Some(email) = email {
        let mut query = guest::Entity::find().filter(guest::Column::Email.eq(email));
        if let Some(id) = exclude {
            query = query.filter(guest::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Email {email} belongs to another guest"
            )));
        }
    }
    if let Some(phone) = phone {
        let mut query = guest::Entity::find().filter(guest::Column::PhoneNumber.eq(phone));
        if let Some(id) = exclude {
            query = query.filter(guest::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Phone number {phone} belongs to another guest"
            )));
        }
    }
    Ok(())
}
