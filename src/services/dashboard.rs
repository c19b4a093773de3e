//! Front-of-house summary figures for one local day.

use chrono::{Months, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use serde::Serialize;
use tracing::debug;

use crate::entities::{
    guest, order, reservation,
    sea_orm_active_enums::{OrderStatus, ReservationStatus},
};
use crate::error::AppResult;
use crate::util::time::day_window;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: u64,
    pub total_reservations: u64,
    pub total_orders: u64,
    pub revenue: Decimal,
    pub customer_growth: Decimal,
    pub reservation_growth: Decimal,
    pub order_growth: Decimal,
}

/// Percentage change from `previous` to `current`, one decimal place.
///
/// Zero when there is nothing to compare against.
pub fn growth(current: u64, previous: u64) -> Decimal {
    if previous == 0 {
        return Decimal::ZERO;
    }
    let current = Decimal::from(current);
    let previous = Decimal::from(previous);
    ((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(1)
}

/// Figures for `today` in `tz`. Cancelled reservations and orders are left out.
///
/// Customer growth compares every guest on file with the guests who had
/// booked before the same day last month.
pub async fn dashboard_stats<C: ConnectionTrait>(
    db: &C,
    tz: Tz,
    today: NaiveDate,
) -> AppResult<DashboardStats> {
    let yesterday = today.pred_opt().unwrap_or(today);
    let month_ago = today.checked_sub_months(Months::new(1)).unwrap_or(today);

    let total_customers = guest::Entity::find().count(db).await?;
    let (month_ago_start, _) = day_window(month_ago, tz);
    let previous_customers = reservation::Entity::find()
        .select_only()
        .column(reservation::Column::GuestId)
        .distinct()
        .filter(reservation::Column::StartTime.lt(month_ago_start))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .len() as u64;

    let total_reservations = reservations_on(db, today, tz).await?;
    let previous_reservations = reservations_on(db, yesterday, tz).await?;

    let todays_orders = orders_on(db, today, tz).await?;
    let previous_orders = orders_on(db, yesterday, tz).await?.len() as u64;
    let total_orders = todays_orders.len() as u64;
    let revenue = todays_orders.iter().map(|o| o.total_amount).sum();

    debug!(%today, total_reservations, total_orders, "Computed dashboard stats");

    Ok(DashboardStats {
        total_customers,
        total_reservations,
        total_orders,
        revenue,
        customer_growth: growth(total_customers, previous_customers),
        reservation_growth: growth(total_reservations, previous_reservations),
        order_growth: growth(total_orders, previous_orders),
    })
}

async fn reservations_on<C: ConnectionTrait>(db: &C, date: NaiveDate, tz: Tz) -> AppResult<u64> {
    let (start, end) = day_window(date, tz);
    Ok(reservation::Entity::find()
        .filter(reservation::Column::StartTime.gte(start))
        .filter(reservation::Column::StartTime.lt(end))
        .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled))
        .count(db)
        .await?)
}

async fn orders_on<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
    tz: Tz,
) -> AppResult<Vec<order::Model>> {
    let (start, end) = day_window(date, tz);
    Ok(order::Entity::find()
        .filter(order::Column::OrderTime.gte(start))
        .filter(order::Column::OrderTime.lt(end))
        .filter(order::Column::Status.ne(OrderStatus::Cancelled))
        .all(db)
        .await?)
}
