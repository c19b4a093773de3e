//! Order engine: priced orders and their kitchen workflow.
//!
//! Unit prices are frozen when the order is placed, so later catalog edits do
//! not touch existing orders. `total_amount` always equals the sum of the
//! item subtotals.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::seating;
use crate::entities::{
    item_option, menu_item, order, order_item, order_item_option, reservation,
    sea_orm_active_enums::{ItemStatus, OrderStatus, StatusFlow},
};
use crate::error::{AppError, AppResult};
use crate::util::time::day_window;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub table_id: Option<String>,
    pub reservation_id: Option<i32>,
    pub special_requests: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub menu_item_id: i32,
    pub quantity: i32,
    #[serde(default)]
    pub selected_option_ids: Vec<i32>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: i32,
    pub reservation_id: Option<i32>,
    pub table_id: Option<String>,
    pub status: OrderStatus,
    pub order_time: DateTime<Utc>,
    pub special_requests: Option<String>,
    pub total_amount: Decimal,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: i32,
    pub menu_item_id: i32,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub special_instructions: Option<String>,
    pub item_status: ItemStatus,
    pub options: Vec<SelectedOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub id: i32,
    pub name: String,
    pub price_modifier: Decimal,
}

/// `(unit_price, subtotal)` for one order line.
pub fn price_line(base: Decimal, modifiers: &[Decimal], quantity: i32) -> (Decimal, Decimal) {
    let unit = base + modifiers.iter().copied().sum::<Decimal>();
    (unit, unit * Decimal::from(quantity))
}

fn validate_lines(items: &[NewOrderItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::validation("An order needs at least one item"));
    }
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::validation(format!(
                "Quantity for menu item {} must be at least 1",
                item.menu_item_id
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = item.selected_option_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(AppError::validation(format!(
                "Option {dup} selected more than once for menu item {}",
                item.menu_item_id
            )));
        }
    }
    Ok(())
}

struct PricedLine {
    item: menu_item::Model,
    options: Vec<item_option::Model>,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
    special_instructions: Option<String>,
}

async fn price_item<C: ConnectionTrait>(db: &C, line: &NewOrderItem) -> AppResult<PricedLine> {
    let item = menu_item::Entity::find_by_id(line.menu_item_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item {}", line.menu_item_id)))?;

    let options = if line.selected_option_ids.is_empty() {
        Vec::new()
    } else {
        item_option::Entity::find()
            .filter(item_option::Column::Id.is_in(line.selected_option_ids.clone()))
            .filter(item_option::Column::ItemId.eq(item.id))
            .order_by_asc(item_option::Column::Id)
            .all(db)
            .await?
    };
    if options.len() != line.selected_option_ids.len() {
        let foreign: Vec<String> = line
            .selected_option_ids
            .iter()
            .filter(|id| !options.iter().any(|o| o.id == **id))
            .map(i32::to_string)
            .collect();
        return Err(AppError::validation(format!(
            "Option(s) {} do not belong to menu item {}",
            foreign.join(", "),
            item.id
        )));
    }

    let modifiers: Vec<Decimal> = options.iter().map(|o| o.price_modifier).collect();
    let (unit_price, subtotal) = price_line(item.price, &modifiers, line.quantity);
    // Discount options may lower the price, never below zero.
    if unit_price < Decimal::ZERO {
        return Err(AppError::validation(format!(
            "Selected options take menu item {} below zero",
            item.id
        )));
    }

    Ok(PricedLine {
        item,
        options,
        quantity: line.quantity,
        unit_price,
        subtotal,
        special_instructions: line
            .special_instructions
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

pub async fn create_order(db: &DatabaseConnection, input: NewOrder) -> AppResult<OrderView> {
    validate_lines(&input.items)?;

    let txn = db.begin().await?;

    let table_id = match &input.table_id {
        Some(id) => Some(seating::get_table(&txn, id).await?.id),
        None => None,
    };
    if let Some(reservation_id) = input.reservation_id {
        reservation::Entity::find_by_id(reservation_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {reservation_id}")))?;
    }

    let mut lines = Vec::with_capacity(input.items.len());
    for item in &input.items {
        lines.push(price_item(&txn, item).await?);
    }
    let total: Decimal = lines.iter().map(|l| l.subtotal).sum();

    let order = order::ActiveModel {
        reservation_id: Set(input.reservation_id),
        table_id: Set(table_id),
        status: Set(OrderStatus::Pending),
        order_time: Set(Utc::now()),
        special_requests: Set(input.special_requests.filter(|s| !s.trim().is_empty())),
        total_amount: Set(total),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for line in lines {
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            item_id: Set(line.item.id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            subtotal: Set(line.subtotal),
            special_instructions: Set(line.special_instructions),
            item_status: Set(ItemStatus::Pending),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !line.options.is_empty() {
            let links = line.options.iter().map(|o| order_item_option::ActiveModel {
                order_item_id: Set(item.id),
                option_id: Set(o.id),
            });
            order_item_option::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }
    }

    txn.commit().await?;
    info!(order_id = order.id, total = %order.total_amount, "Created order");

    get_order(db, order.id).await
}

pub async fn update_order_status<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    status: OrderStatus,
) -> AppResult<OrderView> {
    let existing = find_order(db, order_id).await?;
    if !existing.status.can_transition_to(status) {
        return Err(AppError::conflict(format!(
            "Order cannot move from {:?} to {status:?}",
            existing.status
        )));
    }

    if existing.status != status {
        let mut order: order::ActiveModel = existing.into();
        order.status = Set(status);
        order.update(db).await?;
        info!(order_id, status = ?status, "Order status changed");
    } else {
        debug!(order_id, "Order status unchanged");
    }

    get_order(db, order_id).await
}

/// An item that belongs to a different order counts as missing.
pub async fn update_order_item_status<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    item_id: i32,
    status: ItemStatus,
) -> AppResult<OrderView> {
    find_order(db, order_id).await?;
    let existing = order_item::Entity::find_by_id(item_id)
        .filter(order_item::Column::OrderId.eq(order_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {item_id} on order {order_id}")))?;

    if !existing.item_status.can_transition_to(status) {
        return Err(AppError::conflict(format!(
            "Item cannot move from {:?} to {status:?}",
            existing.item_status
        )));
    }

    if existing.item_status != status {
        let mut item: order_item::ActiveModel = existing.into();
        item.item_status = Set(status);
        item.update(db).await?;
        info!(order_id, item_id, status = ?status, "Order item status changed");
    }

    get_order(db, order_id).await
}

pub async fn get_order<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<OrderView> {
    let order = find_order(db, id).await?;
    let mut views = views(db, vec![order]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::Internal(format!("Order {id} vanished while loading")))
}

pub async fn list_orders<C: ConnectionTrait>(db: &C) -> AppResult<Vec<OrderView>> {
    let orders = order::Entity::find()
        .order_by_desc(order::Column::OrderTime)
        .all(db)
        .await?;
    views(db, orders).await
}

/// Orders placed on `date` in `tz`, oldest first.
pub async fn list_orders_by_date<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
    tz: chrono_tz::Tz,
) -> AppResult<Vec<OrderView>> {
    let (day_start, day_end) = day_window(date, tz);
    let orders = order::Entity::find()
        .filter(order::Column::OrderTime.gte(day_start))
        .filter(order::Column::OrderTime.lt(day_end))
        .order_by_asc(order::Column::OrderTime)
        .all(db)
        .await?;
    views(db, orders).await
}

async fn find_order<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<order::Model> {
    order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))
}

/// Rebuild the item and option tree for a batch of orders.
async fn views<C: ConnectionTrait>(db: &C, orders: Vec<order::Model>) -> AppResult<Vec<OrderView>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    let menu_ids: Vec<i32> = items.iter().map(|i| i.item_id).collect();
    let names: HashMap<i32, String> = if menu_ids.is_empty() {
        HashMap::new()
    } else {
        menu_item::Entity::find()
            .filter(menu_item::Column::Id.is_in(menu_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect()
    };

    let item_ids: Vec<i32> = items.iter().map(|i| i.id).collect();
    let links = if item_ids.is_empty() {
        Vec::new()
    } else {
        order_item_option::Entity::find()
            .filter(order_item_option::Column::OrderItemId.is_in(item_ids))
            .all(db)
            .await?
    };
    let option_ids: Vec<i32> = links.iter().map(|l| l.option_id).collect();
    let options: HashMap<i32, item_option::Model> = if option_ids.is_empty() {
        HashMap::new()
    } else {
        item_option::Entity::find()
            .filter(item_option::Column::Id.is_in(option_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect()
    };

    let mut selected: HashMap<i32, Vec<SelectedOption>> = HashMap::new();
    for link in links {
        if let Some(option) = options.get(&link.option_id) {
            selected
                .entry(link.order_item_id)
                .or_default()
                .push(SelectedOption {
                    id: option.id,
                    name: option.name.clone(),
                    price_modifier: option.price_modifier,
                });
        }
    }

    let mut lines: HashMap<i32, Vec<OrderItemView>> = HashMap::new();
    for item in items {
        let mut options = selected.remove(&item.id).unwrap_or_default();
        options.sort_by_key(|o| o.id);
        lines.entry(item.order_id).or_default().push(OrderItemView {
            id: item.id,
            menu_item_id: item.item_id,
            item_name: names.get(&item.item_id).cloned().unwrap_or_default(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            special_instructions: item.special_instructions,
            item_status: item.item_status,
            options,
        });
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderView {
            items: lines.remove(&order.id).unwrap_or_default(),
            id: order.id,
            reservation_id: order.reservation_id,
            table_id: order.table_id,
            status: order.status,
            order_time: order.order_time,
            special_requests: order.special_requests,
            total_amount: order.total_amount,
        })
        .collect())
}
