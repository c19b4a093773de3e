//! Reservation manager.
//!
//! Every booking write runs the same checks inside one serializable
//! transaction:
//!
//! * the assigned tables seat the party,
//! * the sitting's headcount stays within its capacity,
//! * no assigned table is held by another live reservation overlapping the
//!   new `[start, end)` window.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::guests::{self, GuestInfo, GuestProfileUpdate};
use super::seating;
use crate::config::BookingPolicy;
use crate::database::begin_serializable;
use crate::entities::{
    dining_table, guest, order, reservation, reservation_table,
    sea_orm_active_enums::{ReservationStatus, StatusFlow},
    sitting,
};
use crate::error::{AppError, AppResult};
use crate::util::time::day_window;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub sitting_id: i32,
    /// Defaults to the sitting's start.
    pub start_time: Option<DateTime<Utc>>,
    pub table_ids: Vec<String>,
    #[serde(flatten)]
    pub guest: GuestInfo,
    pub number_of_guests: i32,
    pub notes: Option<String>,
}

/// Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUpdate {
    pub start_time: Option<DateTime<Utc>>,
    pub number_of_guests: Option<i32>,
    pub status: Option<ReservationStatus>,
    pub notes: Option<String>,
    pub table_ids: Option<Vec<String>>,
    pub sitting_id: Option<i32>,
    /// Edits the guest record itself, affecting all of the guest's bookings.
    pub shared_guest_profile: Option<GuestProfileUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    pub id: i32,
    pub guest_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub sitting_id: i32,
    pub sitting_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub number_of_guests: i32,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub table_ids: Vec<String>,
}

/// Trimmed, upper-cased, de-duplicated table ids in request order.
fn normalize_table_ids(ids: &[String]) -> AppResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim().to_uppercase();
        if !id.is_empty() && !normalized.contains(&id) {
            normalized.push(id);
        }
    }
    if normalized.is_empty() {
        return Err(AppError::validation("At least one table must be assigned"));
    }
    Ok(normalized)
}

fn validate_party(guests: i32) -> AppResult<()> {
    if guests <= 0 {
        return Err(AppError::validation(
            "Number of guests must be greater than zero",
        ));
    }
    Ok(())
}

async fn open_sitting<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<sitting::Model> {
    let sitting = seating::get_sitting(db, id).await?;
    if sitting.closed_for_reservations {
        return Err(AppError::conflict(format!(
            "Sitting {id} is closed for reservations"
        )));
    }
    Ok(sitting)
}

struct Booking<'a> {
    /// Reservation being edited, excluded from its own capacity and table checks.
    reservation_id: Option<i32>,
    sitting: &'a sitting::Model,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    guests: i32,
    table_ids: &'a [String],
}

async fn check_booking<C: ConnectionTrait>(
    db: &C,
    policy: &BookingPolicy,
    booking: &Booking<'_>,
) -> AppResult<()> {
    let tables = dining_table::Entity::find()
        .filter(dining_table::Column::Id.is_in(booking.table_ids.to_vec()))
        .all(db)
        .await?;
    if tables.len() != booking.table_ids.len() {
        let missing: Vec<&str> = booking
            .table_ids
            .iter()
            .filter(|id| !tables.iter().any(|t| &t.id == *id))
            .map(String::as_str)
            .collect();
        return Err(AppError::not_found(format!("Table(s) {}", missing.join(", "))));
    }

    if policy.enforce_sitting_window
        && !(booking.sitting.start_time <= booking.start && booking.start < booking.sitting.end_time)
    {
        return Err(AppError::validation(format!(
            "Start time must fall within the sitting ({} - {})",
            booking.sitting.start_time, booking.sitting.end_time
        )));
    }

    let seats: i32 = tables.iter().map(|t| t.capacity).sum();
    if seats < booking.guests {
        return Err(AppError::validation(format!(
            "Assigned tables seat {seats}, party is {}",
            booking.guests
        )));
    }

    let mut live = reservation::Entity::find()
        .filter(reservation::Column::SittingId.eq(booking.sitting.id))
        .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled));
    if let Some(id) = booking.reservation_id {
        live = live.filter(reservation::Column::Id.ne(id));
    }
    let booked: i32 = live
        .all(db)
        .await?
        .iter()
        .map(|r| r.number_of_guests)
        .sum();
    if booked + booking.guests > booking.sitting.capacity {
        return Err(AppError::conflict(format!(
            "Sitting {} has room for {} more guest(s)",
            booking.sitting.id,
            (booking.sitting.capacity - booked).max(0)
        )));
    }

    let committed =
        seating::committed_table_ids(db, booking.start, booking.end, booking.reservation_id)
            .await?;
    let clashes: Vec<&str> = booking
        .table_ids
        .iter()
        .filter(|id| committed.contains(*id))
        .map(String::as_str)
        .collect();
    if !clashes.is_empty() {
        return Err(AppError::conflict(format!(
            "Table(s) {} already booked for an overlapping time",
            clashes.join(", ")
        )));
    }

    Ok(())
}

async fn link_tables<C: ConnectionTrait>(
    db: &C,
    reservation_id: i32,
    table_ids: &[String],
) -> AppResult<()> {
    let links = table_ids.iter().map(|table_id| reservation_table::ActiveModel {
        reservation_id: Set(reservation_id),
        table_id: Set(table_id.clone()),
    });
    reservation_table::Entity::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn create_reservation(
    db: &DatabaseConnection,
    policy: &BookingPolicy,
    input: NewReservation,
) -> AppResult<ReservationView> {
    validate_party(input.number_of_guests)?;
    let table_ids = normalize_table_ids(&input.table_ids)?;

    let txn = begin_serializable(db).await?;

    let sitting = open_sitting(&txn, input.sitting_id).await?;
    let guest = guests::resolve_or_create(&txn, &input.guest).await?;

    let start = input.start_time.unwrap_or(sitting.start_time);
    let end = start + policy.reservation_length;

    check_booking(
        &txn,
        policy,
        &Booking {
            reservation_id: None,
            sitting: &sitting,
            start,
            end,
            guests: input.number_of_guests,
            table_ids: &table_ids,
        },
    )
    .await?;

    let reservation = reservation::ActiveModel {
        guest_id: Set(guest.id),
        sitting_id: Set(sitting.id),
        start_time: Set(start),
        end_time: Set(end),
        number_of_guests: Set(input.number_of_guests),
        status: Set(ReservationStatus::Pending),
        notes: Set(clean_notes(input.notes)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    link_tables(&txn, reservation.id, &table_ids).await?;

    txn.commit().await?;
    info!(
        reservation_id = reservation.id,
        guest_id = guest.id,
        sitting_id = sitting.id,
        "Created reservation for {} guest(s)",
        reservation.number_of_guests
    );

    Ok(view(reservation, &guest, &sitting, table_ids))
}

pub async fn update_reservation(
    db: &DatabaseConnection,
    policy: &BookingPolicy,
    id: i32,
    update: ReservationUpdate,
) -> AppResult<ReservationView> {
    let txn = begin_serializable(db).await?;
    let existing = find_reservation(&txn, id).await?;

    if let Some(profile) = &update.shared_guest_profile {
        guests::update_guest_profile(&txn, existing.guest_id, profile).await?;
    }

    let sitting_changed = update
        .sitting_id
        .is_some_and(|sitting_id| sitting_id != existing.sitting_id);
    let sitting = if sitting_changed {
        open_sitting(&txn, update.sitting_id.unwrap_or(existing.sitting_id)).await?
    } else {
        seating::get_sitting(&txn, existing.sitting_id).await?
    };

    let start = match update.start_time {
        Some(start) => start,
        None if sitting_changed => sitting.start_time,
        None => existing.start_time,
    };
    let end = start + policy.reservation_length;

    let guests = update.number_of_guests.unwrap_or(existing.number_of_guests);
    validate_party(guests)?;

    let current_tables = table_ids_for(&txn, id).await?;
    let table_ids = match &update.table_ids {
        Some(ids) => normalize_table_ids(ids)?,
        None => current_tables.clone(),
    };
    let tables_changed = sorted(&table_ids) != sorted(&current_tables);

    let status = match update.status {
        Some(next) => transition(existing.status, next)?,
        None => existing.status,
    };

    let booking_changed = sitting_changed
        || start != existing.start_time
        || guests != existing.number_of_guests
        || tables_changed;
    if booking_changed && status != ReservationStatus::Cancelled {
        check_booking(
            &txn,
            policy,
            &Booking {
                reservation_id: Some(id),
                sitting: &sitting,
                start,
                end,
                guests,
                table_ids: &table_ids,
            },
        )
        .await?;
    }

    let mut reservation: reservation::ActiveModel = existing.into();
    reservation.sitting_id = Set(sitting.id);
    reservation.start_time = Set(start);
    reservation.end_time = Set(end);
    reservation.number_of_guests = Set(guests);
    reservation.status = Set(status);
    if update.notes.is_some() {
        reservation.notes = Set(clean_notes(update.notes));
    }
    let reservation = reservation.update(&txn).await?;

    if tables_changed {
        reservation_table::Entity::delete_many()
            .filter(reservation_table::Column::ReservationId.eq(id))
            .exec(&txn)
            .await?;
        link_tables(&txn, id, &table_ids).await?;
    }

    let guest = guests::get_guest(&txn, reservation.guest_id).await?;
    txn.commit().await?;
    info!(reservation_id = id, "Updated reservation");

    Ok(view(reservation, &guest, &sitting, table_ids))
}

pub async fn update_reservation_status<C: ConnectionTrait>(
    db: &C,
    id: i32,
    status: ReservationStatus,
) -> AppResult<ReservationView> {
    let existing = find_reservation(db, id).await?;
    let next = transition(existing.status, status)?;

    let reservation = if next == existing.status {
        debug!(reservation_id = id, "Status unchanged");
        existing
    } else {
        let mut reservation: reservation::ActiveModel = existing.into();
        reservation.status = Set(next);
        let reservation = reservation.update(db).await?;
        info!(reservation_id = id, status = ?next, "Reservation status changed");
        reservation
    };

    single_view(db, reservation).await
}

pub async fn cancel_reservation<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<ReservationView> {
    update_reservation_status(db, id, ReservationStatus::Cancelled).await
}

/// Hard delete. The guest stays in the directory.
pub async fn delete_reservation(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = begin_serializable(db).await?;
    let reservation = find_reservation(&txn, id).await?;

    let orders = reservation.find_related(order::Entity).count(&txn).await?;
    if orders > 0 {
        return Err(AppError::conflict(format!(
            "Reservation {id} still has {orders} order(s)"
        )));
    }

    reservation_table::Entity::delete_many()
        .filter(reservation_table::Column::ReservationId.eq(id))
        .exec(&txn)
        .await?;
    reservation.delete(&txn).await?;

    txn.commit().await?;
    info!(reservation_id = id, "Deleted reservation");
    Ok(())
}

pub async fn get_reservation<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<ReservationView> {
    let reservation = find_reservation(db, id).await?;
    single_view(db, reservation).await
}

pub async fn list_reservations<C: ConnectionTrait>(db: &C) -> AppResult<Vec<ReservationView>> {
    let reservations = reservation::Entity::find()
        .order_by_asc(reservation::Column::StartTime)
        .all(db)
        .await?;
    views(db, reservations).await
}

/// Reservations starting on `date` in the policy's timezone, by start time.
pub async fn list_reservations_for_date<C: ConnectionTrait>(
    db: &C,
    policy: &BookingPolicy,
    date: NaiveDate,
) -> AppResult<Vec<ReservationView>> {
    let (day_start, day_end) = day_window(date, policy.timezone);
    let reservations = reservation::Entity::find()
        .filter(reservation::Column::StartTime.gte(day_start))
        .filter(reservation::Column::StartTime.lt(day_end))
        .order_by_asc(reservation::Column::StartTime)
        .all(db)
        .await?;
    views(db, reservations).await
}

/// `next` when it is reachable from `current`; re-applying `current` is allowed.
fn transition(current: ReservationStatus, next: ReservationStatus) -> AppResult<ReservationStatus> {
    if current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(AppError::conflict(format!(
            "Reservation cannot move from {current:?} to {next:?}"
        )))
    }
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn sorted(ids: &[String]) -> Vec<&String> {
    let mut ids: Vec<&String> = ids.iter().collect();
    ids.sort();
    ids
}

async fn find_reservation<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<reservation::Model> {
    reservation::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reservation {id}")))
}

async fn table_ids_for<C: ConnectionTrait>(db: &C, reservation_id: i32) -> AppResult<Vec<String>> {
    Ok(reservation_table::Entity::find()
        .filter(reservation_table::Column::ReservationId.eq(reservation_id))
        .order_by_asc(reservation_table::Column::TableId)
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.table_id)
        .collect())
}

fn view(
    reservation: reservation::Model,
    guest: &guest::Model,
    sitting: &sitting::Model,
    table_ids: Vec<String>,
) -> ReservationView {
    ReservationView {
        id: reservation.id,
        guest_id: guest.id,
        first_name: guest.first_name.clone(),
        last_name: guest.last_name.clone(),
        email: guest.email.clone(),
        phone_number: guest.phone_number.clone(),
        sitting_id: sitting.id,
        sitting_type: sitting.sitting_type.clone(),
        start_time: reservation.start_time,
        end_time: reservation.end_time,
        number_of_guests: reservation.number_of_guests,
        status: reservation.status,
        notes: reservation.notes,
        table_ids,
    }
}

async fn single_view<C: ConnectionTrait>(
    db: &C,
    reservation: reservation::Model,
) -> AppResult<ReservationView> {
    let guest = guests::get_guest(db, reservation.guest_id).await?;
    let sitting = seating::get_sitting(db, reservation.sitting_id).await?;
    let table_ids = table_ids_for(db, reservation.id).await?;
    Ok(view(reservation, &guest, &sitting, table_ids))
}

/// Batch-load guests, sittings and table links for a page of reservations.
async fn views<C: ConnectionTrait>(
    db: &C,
    reservations: Vec<reservation::Model>,
) -> AppResult<Vec<ReservationView>> {
    if reservations.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = reservations.iter().map(|r| r.id).collect();
    let guest_ids: Vec<i32> = reservations.iter().map(|r| r.guest_id).collect();
    let sitting_ids: Vec<i32> = reservations.iter().map(|r| r.sitting_id).collect();

    let guests: HashMap<i32, guest::Model> = guest::Entity::find()
        .filter(guest::Column::Id.is_in(guest_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|g| (g.id, g))
        .collect();
    let sittings: HashMap<i32, sitting::Model> = sitting::Entity::find()
        .filter(sitting::Column::Id.is_in(sitting_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let mut tables: HashMap<i32, Vec<String>> = HashMap::new();
    for link in reservation_table::Entity::find()
        .filter(reservation_table::Column::ReservationId.is_in(ids))
        .order_by_asc(reservation_table::Column::TableId)
        .all(db)
        .await?
    {
        tables
            .entry(link.reservation_id)
            .or_default()
            .push(link.table_id);
    }

    reservations
        .into_iter()
        .map(|reservation| {
            let guest = guests.get(&reservation.guest_id).ok_or_else(|| {
                AppError::Internal(format!("Guest {} missing", reservation.guest_id))
            })?;
            let sitting = sittings.get(&reservation.sitting_id).ok_or_else(|| {
                AppError::Internal(format!("Sitting {} missing", reservation.sitting_id))
            })?;
            let table_ids = tables.remove(&reservation.id).unwrap_or_default();
            Ok(view(reservation, guest, sitting, table_ids))
        })
        .collect()
}
