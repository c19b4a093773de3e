mod common;

use bistro::{
    entities::sea_orm_active_enums::OrderStatus,
    services::{
        dashboard,
        orders::{self, NewOrder, NewOrderItem},
        reservations::{self, NewReservation},
        seating::{self, NewSitting},
    },
    util::time::local_date,
};
use chrono::Utc;
use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

async fn sitting_on(db: &DatabaseConnection, date: &str) -> i32 {
    seating::create_sitting(
        db,
        NewSitting {
            sitting_type: "Lunch".to_string(),
            start_time: local(date, "12:00"),
            end_time: local(date, "15:00"),
            capacity: 80,
            closed_for_reservations: false,
        },
    )
    .await
    .unwrap()
    .id
}

fn booking_on(sitting_id: i32, date: &str, table: &str, phone: &str) -> NewReservation {
    NewReservation {
        start_time: Some(local(date, "12:30")),
        ..booking(sitting_id, "12:30", &[table], 2, phone)
    }
}

fn one_of(menu_item_id: i32) -> NewOrder {
    NewOrder {
        table_id: None,
        reservation_id: None,
        special_requests: None,
        items: vec![NewOrderItem {
            menu_item_id,
            quantity: 2,
            selected_option_ids: Vec::new(),
            special_instructions: None,
        }],
    }
}

#[tokio::test]
async fn reservation_figures_follow_the_local_day() {
    let db = setup().await;
    let policy = policy();
    for table in ["M1", "M2", "M3"] {
        add_table(&db, table, "Main", 4).await;
    }
    let april = sitting_on(&db, "2025-04-01").await;
    let yesterday = sitting_on(&db, "2025-06-09").await;
    let today = lunch(&db).await.id;

    for input in [
        booking_on(april, "2025-04-01", "M1", "0400000001"),
        booking_on(yesterday, "2025-06-09", "M1", "0400000004"),
        booking_on(today, SERVICE_DAY, "M1", "0400000001"),
        booking_on(today, SERVICE_DAY, "M2", "0400000002"),
    ] {
        reservations::create_reservation(&db, &policy, input)
            .await
            .unwrap();
    }
    let cancelled = reservations::create_reservation(
        &db,
        &policy,
        booking_on(today, SERVICE_DAY, "M3", "0400000003"),
    )
    .await
    .unwrap();
    reservations::cancel_reservation(&db, cancelled.id)
        .await
        .unwrap();

    let stats = dashboard::dashboard_stats(&db, policy.timezone, service_day())
        .await
        .unwrap();
    assert_eq!(stats.total_customers, 4);
    assert_eq!(stats.total_reservations, 2);
    assert_eq!(stats.reservation_growth, dec!(100.0));
    // One guest had booked before 2025-05-10.
    assert_eq!(stats.customer_growth, dec!(300.0));
    assert_eq!(stats.total_orders, 0);
    assert_eq!(stats.revenue, Decimal::ZERO);
    assert_eq!(stats.order_growth, Decimal::ZERO);

    let next_day = service_day().succ_opt().unwrap();
    let quiet = dashboard::dashboard_stats(&db, policy.timezone, next_day)
        .await
        .unwrap();
    assert_eq!(quiet.total_reservations, 0);
    assert_eq!(quiet.reservation_growth, dec!(-100.0));
}

#[tokio::test]
async fn revenue_counts_todays_live_orders() {
    let db = setup().await;
    let category = add_category(&db, "Mains").await;
    let item = add_item(&db, category.id, "Barramundi", dec!(24.00)).await;

    orders::create_order(&db, one_of(item.id)).await.unwrap();
    let voided = orders::create_order(&db, one_of(item.id)).await.unwrap();
    orders::update_order_status(&db, voided.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let tz = policy().timezone;
    let stats = dashboard::dashboard_stats(&db, tz, local_date(Utc::now(), tz))
        .await
        .unwrap();
    assert_eq!(stats.total_orders, 1);
    assert_eq!(stats.revenue, dec!(48.00));
    assert_eq!(stats.order_growth, Decimal::ZERO);

    let earlier = dashboard::dashboard_stats(&db, tz, service_day())
        .await
        .unwrap();
    assert_eq!(earlier.total_orders, 0);
    assert_eq!(earlier.revenue, Decimal::ZERO);
}
