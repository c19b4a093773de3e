//! Menu catalog: categories, items, per-item options and per-sitting-type
//! availability.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::required;
use crate::entities::{
    item_option, menu_availability, menu_category, menu_item, order_item, order_item_option,
};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "yes")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub category_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "yes")]
    pub is_available: bool,
    pub prep_time: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub category_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
    pub prep_time: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOption {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price_modifier: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_modifier: Option<Decimal>,
}

fn yes() -> bool {
    true
}

/// A menu item as guests and staff see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    pub id: i32,
    pub category_id: i32,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_available: bool,
    pub prep_time: Option<i32>,
    pub image_url: Option<String>,
    pub options: Vec<item_option::Model>,
    pub available_sitting_types: Vec<String>,
}

fn validate_amount(amount: Decimal, field: &str) -> AppResult<()> {
    if amount < Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    Ok(())
}

fn validate_prep_time(prep_time: Option<i32>) -> AppResult<()> {
    if prep_time.is_some_and(|minutes| minutes < 0) {
        return Err(AppError::validation("prepTime must not be negative"));
    }
    Ok(())
}

fn text(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Every item with its category, options and the sitting types it is served at.
pub async fn list_menu<C: ConnectionTrait>(db: &C) -> AppResult<Vec<MenuItemView>> {
    let items = menu_item::Entity::find()
        .order_by_asc(menu_item::Column::CategoryId)
        .order_by_asc(menu_item::Column::Name)
        .all(db)
        .await?;
    views(db, items).await
}

/// Available items with an enabled availability row for `sitting_type`.
pub async fn list_menu_for_sitting<C: ConnectionTrait>(
    db: &C,
    sitting_type: &str,
) -> AppResult<Vec<MenuItemView>> {
    let item_ids: Vec<i32> = menu_availability::Entity::find()
        .filter(menu_availability::Column::SittingType.eq(sitting_type.trim()))
        .filter(menu_availability::Column::IsAvailable.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.item_id)
        .collect();
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }

    let items = menu_item::Entity::find()
        .filter(menu_item::Column::Id.is_in(item_ids))
        .filter(menu_item::Column::IsAvailable.eq(true))
        .order_by_asc(menu_item::Column::CategoryId)
        .order_by_asc(menu_item::Column::Name)
        .all(db)
        .await?;
    views(db, items).await
}

pub async fn list_categories<C: ConnectionTrait>(db: &C) -> AppResult<Vec<menu_category::Model>> {
    Ok(menu_category::Entity::find()
        .order_by_asc(menu_category::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_category<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<menu_category::Model> {
    menu_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu category {id}")))
}

pub async fn create_category<C: ConnectionTrait>(
    db: &C,
    input: NewCategory,
) -> AppResult<menu_category::Model> {
    let category = menu_category::ActiveModel {
        name: Set(required(&input.name, "name")?),
        description: Set(text(input.description.as_ref())),
        is_available: Set(input.is_available),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(category_id = category.id, "Created menu category");
    Ok(category)
}

pub async fn update_category<C: ConnectionTrait>(
    db: &C,
    id: i32,
    update: CategoryUpdate,
) -> AppResult<menu_category::Model> {
    let mut category: menu_category::ActiveModel = get_category(db, id).await?.into();
    if let Some(name) = &update.name {
        category.name = Set(required(name, "name")?);
    }
    if update.description.is_some() {
        category.description = Set(text(update.description.as_ref()));
    }
    if let Some(is_available) = update.is_available {
        category.is_available = Set(is_available);
    }
    Ok(category.update(db).await?)
}

/// Removes the category with its items, their options and availability rows.
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;
    let category = get_category(&txn, id).await?;

    let item_ids: Vec<i32> = category
        .find_related(menu_item::Entity)
        .all(&txn)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();

    if !item_ids.is_empty() {
        let ordered = order_item::Entity::find()
            .filter(order_item::Column::ItemId.is_in(item_ids.clone()))
            .count(&txn)
            .await?;
        if ordered > 0 {
            return Err(AppError::conflict(format!(
                "Category {id} has items referenced by {ordered} order item(s)"
            )));
        }
        remove_item_children(&txn, &item_ids).await?;
        menu_item::Entity::delete_many()
            .filter(menu_item::Column::Id.is_in(item_ids))
            .exec(&txn)
            .await?;
    }
    category.delete(&txn).await?;

    txn.commit().await?;
    info!(category_id = id, "Deleted menu category");
    Ok(())
}

pub async fn get_item<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<MenuItemView> {
    let item = find_item(db, id).await?;
    let mut views = views(db, vec![item]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::Internal(format!("Menu item {id} vanished while loading")))
}

pub async fn create_item<C: ConnectionTrait>(db: &C, input: NewMenuItem) -> AppResult<MenuItemView> {
    get_category(db, input.category_id).await?;
    validate_amount(input.price, "price")?;
    validate_prep_time(input.prep_time)?;

    let item = menu_item::ActiveModel {
        category_id: Set(input.category_id),
        name: Set(required(&input.name, "name")?),
        description: Set(text(input.description.as_ref())),
        price: Set(input.price),
        is_available: Set(input.is_available),
        prep_time: Set(input.prep_time),
        image_url: Set(text(input.image_url.as_ref())),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(item_id = item.id, "Created menu item");

    get_item(db, item.id).await
}

/// Price changes apply to future orders only.
pub async fn update_item<C: ConnectionTrait>(
    db: &C,
    id: i32,
    update: MenuItemUpdate,
) -> AppResult<MenuItemView> {
    let mut item: menu_item::ActiveModel = find_item(db, id).await?.into();
    if let Some(category_id) = update.category_id {
        get_category(db, category_id).await?;
        item.category_id = Set(category_id);
    }
    if let Some(name) = &update.name {
        item.name = Set(required(name, "name")?);
    }
    if update.description.is_some() {
        item.description = Set(text(update.description.as_ref()));
    }
    if let Some(price) = update.price {
        validate_amount(price, "price")?;
        item.price = Set(price);
    }
    if let Some(is_available) = update.is_available {
        item.is_available = Set(is_available);
    }
    if update.prep_time.is_some() {
        validate_prep_time(update.prep_time)?;
        item.prep_time = Set(update.prep_time);
    }
    if update.image_url.is_some() {
        item.image_url = Set(text(update.image_url.as_ref()));
    }
    item.update(db).await?;

    get_item(db, id).await
}

pub async fn delete_item(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;
    let item = find_item(&txn, id).await?;

    let ordered = item.find_related(order_item::Entity).count(&txn).await?;
    if ordered > 0 {
        return Err(AppError::conflict(format!(
            "Menu item {id} is referenced by {ordered} order item(s)"
        )));
    }

    remove_item_children(&txn, &[id]).await?;
    item.delete(&txn).await?;

    txn.commit().await?;
    info!(item_id = id, "Deleted menu item");
    Ok(())
}

pub async fn create_option<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    input: NewOption,
) -> AppResult<item_option::Model> {
    find_item(db, item_id).await?;
    let option = item_option::ActiveModel {
        item_id: Set(item_id),
        name: Set(required(&input.name, "name")?),
        description: Set(text(input.description.as_ref())),
        price_modifier: Set(input.price_modifier),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(option_id = option.id, item_id, "Created item option");
    Ok(option)
}

pub async fn update_option<C: ConnectionTrait>(
    db: &C,
    option_id: i32,
    update: OptionUpdate,
) -> AppResult<item_option::Model> {
    let mut option: item_option::ActiveModel = find_option(db, option_id).await?.into();
    if let Some(name) = &update.name {
        option.name = Set(required(name, "name")?);
    }
    if update.description.is_some() {
        option.description = Set(text(update.description.as_ref()));
    }
    if let Some(modifier) = update.price_modifier {
        option.price_modifier = Set(modifier);
    }
    Ok(option.update(db).await?)
}

pub async fn delete_option<C: ConnectionTrait>(db: &C, option_id: i32) -> AppResult<()> {
    let option = find_option(db, option_id).await?;

    let selected = option
        .find_related(order_item_option::Entity)
        .count(db)
        .await?;
    if selected > 0 {
        return Err(AppError::conflict(format!(
            "Option {option_id} is selected on {selected} order item(s)"
        )));
    }

    option.delete(db).await?;
    info!(option_id, "Deleted item option");
    Ok(())
}

/// Insert or overwrite the availability flag for `(item, sitting_type)`.
pub async fn set_availability<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    sitting_type: &str,
    is_available: bool,
) -> AppResult<menu_availability::Model> {
    find_item(db, item_id).await?;
    let sitting_type = required(sitting_type, "sittingType")?;

    let existing = menu_availability::Entity::find_by_id((item_id, sitting_type.clone()))
        .one(db)
        .await?;
    let row = match existing {
        Some(row) => {
            let mut row: menu_availability::ActiveModel = row.into();
            row.is_available = Set(is_available);
            row.update(db).await?
        }
        None => {
            menu_availability::ActiveModel {
                item_id: Set(item_id),
                sitting_type: Set(sitting_type),
                is_available: Set(is_available),
            }
            .insert(db)
            .await?
        }
    };
    Ok(row)
}

pub async fn remove_availability<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    sitting_type: &str,
) -> AppResult<()> {
    let result =
        menu_availability::Entity::delete_by_id((item_id, sitting_type.trim().to_string()))
            .exec(db)
            .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(format!(
            "Availability of item {item_id} for {sitting_type}"
        )));
    }
    Ok(())
}

async fn find_item<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<menu_item::Model> {
    menu_item::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item {id}")))
}

async fn find_option<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<item_option::Model> {
    item_option::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item option {id}")))
}

async fn remove_item_children<C: ConnectionTrait>(db: &C, item_ids: &[i32]) -> AppResult<()> {
    menu_availability::Entity::delete_many()
        .filter(menu_availability::Column::ItemId.is_in(item_ids.to_vec()))
        .exec(db)
        .await?;
    item_option::Entity::delete_many()
        .filter(item_option::Column::ItemId.is_in(item_ids.to_vec()))
        .exec(db)
        .await?;
    Ok(())
}

async fn views<C: ConnectionTrait>(
    db: &C,
    items: Vec<menu_item::Model>,
) -> AppResult<Vec<MenuItemView>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let item_ids: Vec<i32> = items.iter().map(|i| i.id).collect();
    let category_ids: Vec<i32> = items.iter().map(|i| i.category_id).collect();

    let categories: HashMap<i32, String> = menu_category::Entity::find()
        .filter(menu_category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut options: HashMap<i32, Vec<item_option::Model>> = HashMap::new();
    for option in item_option::Entity::find()
        .filter(item_option::Column::ItemId.is_in(item_ids.clone()))
        .order_by_asc(item_option::Column::Id)
        .all(db)
        .await?
    {
        options.entry(option.item_id).or_default().push(option);
    }

    let mut sitting_types: HashMap<i32, Vec<String>> = HashMap::new();
    for row in menu_availability::Entity::find()
        .filter(menu_availability::Column::ItemId.is_in(item_ids))
        .filter(menu_availability::Column::IsAvailable.eq(true))
        .order_by_asc(menu_availability::Column::SittingType)
        .all(db)
        .await?
    {
        sitting_types
            .entry(row.item_id)
            .or_default()
            .push(row.sitting_type);
    }

    Ok(items
        .into_iter()
        .map(|item| MenuItemView {
            category_name: categories.get(&item.category_id).cloned().unwrap_or_default(),
            options: options.remove(&item.id).unwrap_or_default(),
            available_sitting_types: sitting_types.remove(&item.id).unwrap_or_default(),
            id: item.id,
            category_id: item.category_id,
            name: item.name,
            description: item.description,
            price: item.price,
            is_available: item.is_available,
            prep_time: item.prep_time,
            image_url: item.image_url,
        })
        .collect())
}
