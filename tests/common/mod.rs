#![allow(dead_code)]

use bistro::{
    config::BookingPolicy,
    database::setup_database,
    entities::{dining_table, item_option, menu_category, sitting},
    services::{
        catalog::{self, MenuItemView, NewCategory, NewMenuItem, NewOption},
        guests::GuestInfo,
        reservations::NewReservation,
        seating::{self, NewSitting, NewTable},
    },
    util::time::local_to_utc,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

pub const SERVICE_DAY: &str = "2025-06-10";

/// Fresh in-memory database with every migration applied.
pub async fn setup() -> DatabaseConnection {
    setup_database("sqlite::memory:")
        .await
        .expect("in-memory database should migrate")
}

pub fn policy() -> BookingPolicy {
    BookingPolicy::default()
}

pub fn service_day() -> NaiveDate {
    NaiveDate::parse_from_str(SERVICE_DAY, "%Y-%m-%d").expect("valid date")
}

/// Restaurant-local wall clock time on `date` as a UTC instant.
pub fn local(date: &str, time: &str) -> DateTime<Utc> {
    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
        .expect("valid local time");
    local_to_utc(naive, policy().timezone)
}

/// Local time on the shared service day.
pub fn at(time: &str) -> DateTime<Utc> {
    local(SERVICE_DAY, time)
}

pub async fn add_sitting(
    db: &DatabaseConnection,
    sitting_type: &str,
    start: &str,
    end: &str,
    capacity: i32,
) -> sitting::Model {
    seating::create_sitting(
        db,
        NewSitting {
            sitting_type: sitting_type.to_string(),
            start_time: at(start),
            end_time: at(end),
            capacity,
            closed_for_reservations: false,
        },
    )
    .await
    .expect("sitting should be created")
}

pub async fn lunch(db: &DatabaseConnection) -> sitting::Model {
    add_sitting(db, "Lunch", "12:00", "15:00", 80).await
}

pub async fn add_table(
    db: &DatabaseConnection,
    id: &str,
    area: &str,
    capacity: i32,
) -> dining_table::Model {
    seating::create_table(
        db,
        NewTable {
            id: id.to_string(),
            area: area.to_string(),
            capacity,
        },
    )
    .await
    .expect("table should be created")
}

pub fn guest(phone: &str) -> GuestInfo {
    GuestInfo {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: format!("ada.{phone}@example.com"),
        phone_number: phone.to_string(),
    }
}

pub fn booking(
    sitting_id: i32,
    start: &str,
    tables: &[&str],
    guests: i32,
    phone: &str,
) -> NewReservation {
    NewReservation {
        sitting_id,
        start_time: Some(at(start)),
        table_ids: tables.iter().map(|t| t.to_string()).collect(),
        guest: guest(phone),
        number_of_guests: guests,
        notes: None,
    }
}

pub async fn add_category(db: &DatabaseConnection, name: &str) -> menu_category::Model {
    catalog::create_category(
        db,
        NewCategory {
            name: name.to_string(),
            description: None,
            is_available: true,
        },
    )
    .await
    .expect("category should be created")
}

pub async fn add_item(
    db: &DatabaseConnection,
    category_id: i32,
    name: &str,
    price: Decimal,
) -> MenuItemView {
    catalog::create_item(
        db,
        NewMenuItem {
            category_id,
            name: name.to_string(),
            description: None,
            price,
            is_available: true,
            prep_time: Some(15),
            image_url: None,
        },
    )
    .await
    .expect("menu item should be created")
}

pub async fn add_option(
    db: &DatabaseConnection,
    item_id: i32,
    name: &str,
    price_modifier: Decimal,
) -> item_option::Model {
    catalog::create_option(
        db,
        item_id,
        NewOption {
            name: name.to_string(),
            description: None,
            price_modifier,
        },
    )
    .await
    .expect("option should be created")
}
