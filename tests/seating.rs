mod common;

use bistro::{
    error::AppError,
    services::{
        reservations,
        seating::{self, NewSitting, SittingUpdate, TableUpdate},
    },
};
use chrono::Duration;
use common::*;
use proptest::prelude::*;

#[tokio::test]
async fn overlapping_sitting_is_rejected() {
    let db = setup().await;
    lunch(&db).await;

    let result = seating::create_sitting(
        &db,
        NewSitting {
            sitting_type: "Afternoon".to_string(),
            start_time: at("14:00"),
            end_time: at("17:00"),
            capacity: 40,
            closed_for_reservations: false,
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(seating::list_sittings(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn back_to_back_sittings_do_not_overlap() {
    let db = setup().await;
    let lunch = lunch(&db).await;
    let dinner = add_sitting(&db, "Dinner", "15:00", "22:00", 120).await;

    assert_eq!(lunch.end_time, dinner.start_time);
    let day = seating::list_sittings_for_date(&db, service_day(), policy().timezone)
        .await
        .unwrap();
    let ids: Vec<i32> = day.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![lunch.id, dinner.id]);
}

#[tokio::test]
async fn sitting_window_must_be_ordered() {
    let db = setup().await;

    let result = seating::create_sitting(
        &db,
        NewSitting {
            sitting_type: "Breakfast".to_string(),
            start_time: at("10:00"),
            end_time: at("08:00"),
            capacity: 20,
            closed_for_reservations: false,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let result = seating::create_sitting(
        &db,
        NewSitting {
            sitting_type: "Breakfast".to_string(),
            start_time: at("07:00"),
            end_time: at("10:00"),
            capacity: 0,
            closed_for_reservations: false,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn moving_a_sitting_onto_another_is_rejected() {
    let db = setup().await;
    lunch(&db).await;
    let dinner = add_sitting(&db, "Dinner", "17:00", "22:00", 120).await;

    let result = seating::update_sitting(
        &db,
        dinner.id,
        SittingUpdate {
            start_time: Some(at("14:30")),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // Resizing within its own window only overlaps itself.
    let widened = seating::update_sitting(
        &db,
        dinner.id,
        SittingUpdate {
            start_time: Some(at("16:00")),
            capacity: Some(100),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(widened.start_time, at("16:00"));
    assert_eq!(widened.capacity, 100);
}

#[tokio::test]
async fn closed_sittings_are_not_offered() {
    let db = setup().await;
    let lunch = lunch(&db).await;
    let dinner = add_sitting(&db, "Dinner", "17:00", "22:00", 120).await;
    seating::update_sitting(
        &db,
        lunch.id,
        SittingUpdate {
            closed_for_reservations: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let open = seating::list_available_sittings(&db, service_day(), policy().timezone)
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, dinner.id);

    let elsewhere = seating::list_available_sittings(
        &db,
        service_day() + Duration::days(1),
        policy().timezone,
    )
    .await
    .unwrap();
    assert!(elsewhere.is_empty());
}

#[tokio::test]
async fn sitting_with_reservations_cannot_be_deleted() {
    let db = setup().await;
    let lunch = lunch(&db).await;
    add_table(&db, "M1", "Main", 4).await;
    reservations::create_reservation(&db, &policy(), booking(lunch.id, "12:30", &["M1"], 2, "0411111111"))
        .await
        .unwrap();

    let result = seating::delete_sitting(&db, lunch.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let empty = add_sitting(&db, "Dinner", "17:00", "22:00", 120).await;
    seating::delete_sitting(&db, empty.id).await.unwrap();
    assert!(matches!(
        seating::get_sitting(&db, empty.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn table_codes_are_validated_and_normalized() {
    let db = setup().await;
    let table = add_table(&db, "b10", "Bar", 2).await;
    assert_eq!(table.id, "B10");

    let found = seating::get_table(&db, "b10").await.unwrap();
    assert_eq!(found, table);

    for bad in ["X", "TOOLONG", "M-1"] {
        let result = seating::create_table(
            &db,
            seating::NewTable {
                id: bad.to_string(),
                area: "Main".to_string(),
                capacity: 4,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))), "{bad}");
    }

    let duplicate = seating::create_table(
        &db,
        seating::NewTable {
            id: "B10".to_string(),
            area: "Bar".to_string(),
            capacity: 2,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn tables_are_filtered_by_area_and_updated() {
    let db = setup().await;
    add_table(&db, "M1", "Main", 4).await;
    add_table(&db, "M2", "Main", 6).await;
    add_table(&db, "O1", "Outdoor", 2).await;

    let main = seating::find_tables_by_area(&db, "Main").await.unwrap();
    assert_eq!(main.len(), 2);

    let updated = seating::update_table(
        &db,
        "O1",
        TableUpdate {
            area: Some("Terrace".to_string()),
            capacity: Some(3),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.area, "Terrace");
    assert_eq!(updated.capacity, 3);
    assert!(seating::find_tables_by_area(&db, "Outdoor").await.unwrap().is_empty());
}

#[tokio::test]
async fn booked_tables_are_not_available() {
    let db = setup().await;
    let lunch = lunch(&db).await;
    add_table(&db, "M1", "Main", 4).await;
    add_table(&db, "M2", "Main", 6).await;
    add_table(&db, "M3", "Main", 2).await;
    reservations::create_reservation(&db, &policy(), booking(lunch.id, "12:30", &["M1"], 2, "0411111111"))
        .await
        .unwrap();

    let free = seating::available_tables(&db, at("13:00"), at("14:30"), None)
        .await
        .unwrap();
    let ids: Vec<&str> = free.iter().map(|t| t.id.as_str()).collect();
    assert!(!ids.contains(&"M1"));
    assert!(ids.contains(&"M2"));

    // The booking ends at 14:00, so M1 is free again from then on.
    let later = seating::available_tables(&db, at("14:00"), at("15:00"), Some("Main"))
        .await
        .unwrap();
    assert_eq!(later.len(), 3);

    let suggestion = seating::suggest_tables(&db, at("13:00"), at("14:30"), 5, None)
        .await
        .unwrap();
    let ids: Vec<&str> = suggestion.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["M2"]);
}

#[tokio::test]
async fn table_with_bookings_cannot_be_deleted() {
    let db = setup().await;
    let lunch = lunch(&db).await;
    add_table(&db, "M1", "Main", 4).await;
    add_table(&db, "M2", "Main", 4).await;
    reservations::create_reservation(&db, &policy(), booking(lunch.id, "12:30", &["M1"], 2, "0411111111"))
        .await
        .unwrap();

    assert!(matches!(
        seating::delete_table(&db, "M1").await,
        Err(AppError::Conflict(_))
    ));
    seating::delete_table(&db, "M2").await.unwrap();
    assert!(matches!(
        seating::get_table(&db, "M2").await,
        Err(AppError::NotFound(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn persisted_sittings_never_overlap(
        windows in prop::collection::vec((0i64..40, 1i64..8), 1..8)
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let outcomes = runtime.block_on(async {
            let db = setup().await;
            let base = at("06:00");
            let mut accepted: Vec<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)> =
                Vec::new();
            let mut outcomes = Vec::new();

            for (offset, length) in windows {
                let start = base + Duration::minutes(30 * offset);
                let end = start + Duration::minutes(30 * length);
                let expected_clash = accepted
                    .iter()
                    .any(|(s, e)| seating::windows_overlap(start, end, *s, *e));

                let result = seating::create_sitting(
                    &db,
                    NewSitting {
                        sitting_type: "Service".to_string(),
                        start_time: start,
                        end_time: end,
                        capacity: 10,
                        closed_for_reservations: false,
                    },
                )
                .await;
                let rejected = matches!(result, Err(AppError::Conflict(_)));
                if result.is_ok() {
                    accepted.push((start, end));
                }
                outcomes.push((expected_clash, rejected));
            }

            let stored = seating::list_sittings(&db).await.unwrap();
            let disjoint = stored.iter().enumerate().all(|(i, a)| {
                stored.iter().skip(i + 1).all(|b| {
                    !seating::windows_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
                })
            });
            (outcomes, disjoint, stored.len() == accepted.len())
        });

        let (outcomes, disjoint, counts_match) = outcomes;
        for (expected_clash, rejected) in outcomes {
            prop_assert_eq!(expected_clash, rejected);
        }
        prop_assert!(disjoint);
        prop_assert!(counts_match);
    }
}
