//! Seating ledger: sittings (timed service windows with a headcount cap) and
//! physical tables.
//!
//! Sittings never overlap one another. Overlap checks and the writes they
//! guard share one serializable transaction.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::required;
use crate::database::begin_serializable;
use crate::entities::{
    dining_table, order, reservation, reservation_table, sea_orm_active_enums::ReservationStatus,
    sitting,
};
use crate::error::{AppError, AppResult};
use crate::util::time::day_window;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSitting {
    pub sitting_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    #[serde(default)]
    pub closed_for_reservations: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SittingUpdate {
    pub sitting_type: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub closed_for_reservations: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTable {
    pub id: String,
    pub area: String,
    pub capacity: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUpdate {
    pub area: Option<String>,
    pub capacity: Option<i32>,
}

/// Half-open `[start, end)` intersection.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if end <= start {
        return Err(AppError::validation("End time must be after start time"));
    }
    Ok(())
}

fn validate_capacity(capacity: i32) -> AppResult<()> {
    if capacity <= 0 {
        return Err(AppError::validation("Capacity must be greater than zero"));
    }
    Ok(())
}

/// Table codes are 2 to 4 letters or digits, e.g. `M1`, `B10`.
pub fn validate_table_code(code: &str) -> AppResult<String> {
    let code = code.trim();
    let len = code.chars().count();
    if !(2..=4).contains(&len) || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::validation(format!(
            "Table id {code:?} must be 2 to 4 letters or digits"
        )));
    }
    Ok(code.to_uppercase())
}

async fn find_overlapping_sitting<C: ConnectionTrait>(
    db: &C,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i32>,
) -> AppResult<Option<sitting::Model>> {
    let mut query = sitting::Entity::find()
        .filter(sitting::Column::StartTime.lt(end))
        .filter(sitting::Column::EndTime.gt(start));
    if let Some(id) = exclude {
        query = query.filter(sitting::Column::Id.ne(id));
    }
    Ok(query.one(db).await?)
}

fn overlap_conflict(existing: &sitting::Model) -> AppError {
    AppError::conflict(format!(
        "Sitting overlaps {} sitting {} ({} - {})",
        existing.sitting_type, existing.id, existing.start_time, existing.end_time
    ))
}

pub async fn create_sitting(db: &DatabaseConnection, input: NewSitting) -> AppResult<sitting::Model> {
    let sitting_type = required(&input.sitting_type, "sittingType")?;
    validate_window(input.start_time, input.end_time)?;
    validate_capacity(input.capacity)?;

    let txn = begin_serializable(db).await?;

    if let Some(existing) =
        find_overlapping_sitting(&txn, input.start_time, input.end_time, None).await?
    {
        debug!(existing = existing.id, "Rejected overlapping sitting");
        return Err(overlap_conflict(&existing));
    }

    let sitting = sitting::ActiveModel {
        sitting_type: Set(sitting_type),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        capacity: Set(input.capacity),
        closed_for_reservations: Set(input.closed_for_reservations),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(sitting_id = sitting.id, "Created {} sitting", sitting.sitting_type);
    Ok(sitting)
}

pub async fn update_sitting(
    db: &DatabaseConnection,
    id: i32,
    update: SittingUpdate,
) -> AppResult<sitting::Model> {
    let txn = begin_serializable(db).await?;
    let existing = get_sitting(&txn, id).await?;

    let start = update.start_time.unwrap_or(existing.start_time);
    let end = update.end_time.unwrap_or(existing.end_time);
    validate_window(start, end)?;

    if start != existing.start_time || end != existing.end_time {
        if let Some(other) = find_overlapping_sitting(&txn, start, end, Some(id)).await? {
            return Err(overlap_conflict(&other));
        }
    }

    let mut sitting: sitting::ActiveModel = existing.into();
    sitting.start_time = Set(start);
    sitting.end_time = Set(end);
    if let Some(sitting_type) = &update.sitting_type {
        sitting.sitting_type = Set(required(sitting_type, "sittingType")?);
    }
    if let Some(capacity) = update.capacity {
        validate_capacity(capacity)?;
        sitting.capacity = Set(capacity);
    }
    if let Some(closed) = update.closed_for_reservations {
        sitting.closed_for_reservations = Set(closed);
    }

    let sitting = sitting.update(&txn).await?;
    txn.commit().await?;
    info!(sitting_id = id, "Updated sitting");
    Ok(sitting)
}

pub async fn delete_sitting<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    let sitting = get_sitting(db, id).await?;

    let bookings = sitting.find_related(reservation::Entity).count(db).await?;
    if bookings > 0 {
        return Err(AppError::conflict(format!(
            "Sitting {id} still has {bookings} reservation(s)"
        )));
    }

    sitting.delete(db).await?;
    info!(sitting_id = id, "Deleted sitting");
    Ok(())
}

pub async fn get_sitting<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<sitting::Model> {
    sitting::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sitting {id}")))
}

pub async fn list_sittings<C: ConnectionTrait>(db: &C) -> AppResult<Vec<sitting::Model>> {
    Ok(sitting::Entity::find()
        .order_by_asc(sitting::Column::StartTime)
        .all(db)
        .await?)
}

/// Every sitting starting on `date` in `tz`.
pub async fn list_sittings_for_date<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
    tz: Tz,
) -> AppResult<Vec<sitting::Model>> {
    let (day_start, day_end) = day_window(date, tz);
    Ok(sitting::Entity::find()
        .filter(sitting::Column::StartTime.gte(day_start))
        .filter(sitting::Column::StartTime.lt(day_end))
        .order_by_asc(sitting::Column::StartTime)
        .all(db)
        .await?)
}

/// Sittings starting on `date` in `tz` that still take bookings.
pub async fn list_available_sittings<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
    tz: Tz,
) -> AppResult<Vec<sitting::Model>> {
    let (day_start, day_end) = day_window(date, tz);
    Ok(sitting::Entity::find()
        .filter(sitting::Column::StartTime.gte(day_start))
        .filter(sitting::Column::StartTime.lt(day_end))
        .filter(sitting::Column::ClosedForReservations.eq(false))
        .order_by_asc(sitting::Column::StartTime)
        .all(db)
        .await?)
}

pub async fn list_tables<C: ConnectionTrait>(db: &C) -> AppResult<Vec<dining_table::Model>> {
    Ok(dining_table::Entity::find()
        .order_by_asc(dining_table::Column::Area)
        .order_by_asc(dining_table::Column::Id)
        .all(db)
        .await?)
}

pub async fn find_tables_by_area<C: ConnectionTrait>(
    db: &C,
    area: &str,
) -> AppResult<Vec<dining_table::Model>> {
    Ok(dining_table::Entity::find()
        .filter(dining_table::Column::Area.eq(area.trim()))
        .order_by_asc(dining_table::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_table<C: ConnectionTrait>(db: &C, id: &str) -> AppResult<dining_table::Model> {
    dining_table::Entity::find_by_id(id.trim().to_uppercase())
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {id}")))
}

pub async fn create_table<C: ConnectionTrait>(
    db: &C,
    input: NewTable,
) -> AppResult<dining_table::Model> {
    let id = validate_table_code(&input.id)?;
    let area = required(&input.area, "area")?;
    validate_capacity(input.capacity)?;

    if dining_table::Entity::find_by_id(id.clone())
        .one(db)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(format!("Table {id} already exists")));
    }

    let table = dining_table::ActiveModel {
        id: Set(id),
        area: Set(area),
        capacity: Set(input.capacity),
    }
    .insert(db)
    .await?;
    info!(table_id = %table.id, "Created table");
    Ok(table)
}

pub async fn update_table<C: ConnectionTrait>(
    db: &C,
    id: &str,
    update: TableUpdate,
) -> AppResult<dining_table::Model> {
    let existing = get_table(db, id).await?;

    let mut table: dining_table::ActiveModel = existing.into();
    if let Some(area) = &update.area {
        table.area = Set(required(area, "area")?);
    }
    if let Some(capacity) = update.capacity {
        validate_capacity(capacity)?;
        table.capacity = Set(capacity);
    }
    Ok(table.update(db).await?)
}

pub async fn delete_table<C: ConnectionTrait>(db: &C, id: &str) -> AppResult<()> {
    let table = get_table(db, id).await?;

    let orders = table.find_related(order::Entity).count(db).await?;
    let bookings = table
        .find_related(reservation_table::Entity)
        .count(db)
        .await?;
    if orders > 0 || bookings > 0 {
        return Err(AppError::conflict(format!(
            "Table {} is referenced by {orders} order(s) and {bookings} reservation(s)",
            table.id
        )));
    }

    let table_id = table.id.clone();
    table.delete(db).await?;
    info!(table_id = %table_id, "Deleted table");
    Ok(())
}

/// Ids of tables held by a non-cancelled reservation overlapping `[start, end)`.
pub(crate) async fn committed_table_ids<C: ConnectionTrait>(
    db: &C,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_reservation: Option<i32>,
) -> AppResult<HashSet<String>> {
    let mut query = reservation::Entity::find()
        .filter(reservation::Column::StartTime.lt(end))
        .filter(reservation::Column::EndTime.gt(start))
        .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled));
    if let Some(id) = exclude_reservation {
        query = query.filter(reservation::Column::Id.ne(id));
    }
    let reservation_ids: Vec<i32> = query.all(db).await?.into_iter().map(|r| r.id).collect();
    if reservation_ids.is_empty() {
        return Ok(HashSet::new());
    }

    Ok(reservation_table::Entity::find()
        .filter(reservation_table::Column::ReservationId.is_in(reservation_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.table_id)
        .collect())
}

/// Tables with no overlapping non-cancelled booking, optionally within one area.
pub async fn available_tables<C: ConnectionTrait>(
    db: &C,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    area: Option<&str>,
) -> AppResult<Vec<dining_table::Model>> {
    validate_window(start, end)?;
    let busy = committed_table_ids(db, start, end, None).await?;

    let tables = match area {
        Some(area) => find_tables_by_area(db, area).await?,
        None => list_tables(db).await?,
    };
    Ok(tables
        .into_iter()
        .filter(|table| !busy.contains(&table.id))
        .collect())
}

/// Best-fit seating for a party over `[start, end)`.
pub async fn suggest_tables<C: ConnectionTrait>(
    db: &C,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    guests: i32,
    area: Option<&str>,
) -> AppResult<Vec<dining_table::Model>> {
    if guests <= 0 {
        return Err(AppError::validation("Number of guests must be greater than zero"));
    }
    let free = available_tables(db, start, end, area).await?;
    Ok(best_fit(free, guests))
}

/// Smallest single table that seats the party; otherwise the fewest tables,
/// largest first, whose seats add up; otherwise nothing.
pub fn best_fit(mut tables: Vec<dining_table::Model>, guests: i32) -> Vec<dining_table::Model> {
    tables.sort_by(|a, b| a.capacity.cmp(&b.capacity).then_with(|| a.id.cmp(&b.id)));
    if let Some(pos) = tables.iter().position(|t| t.capacity >= guests) {
        return vec![tables.swap_remove(pos)];
    }

    let mut picked = Vec::new();
    let mut seats = 0;
    for table in tables.into_iter().rev() {
        seats += table.capacity;
        picked.push(table);
        if seats >= guests {
            return picked;
        }
    }
    Vec::new()
}
