use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create MenuCategory Table
        let table = table_auto(MenuCategory::Table)
            .col(pk_auto(MenuCategory::Id))
            .col(string(MenuCategory::Name))
            .col(string_null(MenuCategory::Description))
            .col(boolean(MenuCategory::IsAvailable).default(true))
            .to_owned();
        manager.create_table(table).await?;

        // Create MenuItem Table
        let table = table_auto(MenuItem::Table)
            .col(pk_auto(MenuItem::Id))
            .col(integer(MenuItem::CategoryId))
            .col(string(MenuItem::Name))
            .col(string_null(MenuItem::Description))
            .col(decimal_len(MenuItem::Price, 10, 2))
            .col(boolean(MenuItem::IsAvailable).default(true))
            .col(integer_null(MenuItem::PrepTime))
            .col(string_null(MenuItem::ImageUrl))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_menu_item_category")
                    .from(MenuItem::Table, MenuItem::CategoryId)
                    .to(MenuCategory::Table, MenuCategory::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create ItemOption Table
        let table = table_auto(ItemOption::Table)
            .col(pk_auto(ItemOption::Id))
            .col(integer(ItemOption::ItemId))
            .col(string(ItemOption::Name))
            .col(string_null(ItemOption::Description))
            .col(decimal_len(ItemOption::PriceModifier, 10, 2).default(0))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_item_option_item")
                    .from(ItemOption::Table, ItemOption::ItemId)
                    .to(MenuItem::Table, MenuItem::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create MenuAvailability Table, one row per (item, sitting type)
        let table = Table::create()
            .table(MenuAvailability::Table)
            .if_not_exists()
            .col(integer(MenuAvailability::ItemId))
            .col(string(MenuAvailability::SittingType))
            .col(boolean(MenuAvailability::IsAvailable).default(true))
            .primary_key(
                Index::create()
                    .col(MenuAvailability::ItemId)
                    .col(MenuAvailability::SittingType),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_menu_availability_item")
                    .from(MenuAvailability::Table, MenuAvailability::ItemId)
                    .to(MenuItem::Table, MenuItem::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create Orders Table
        let table = table_auto(Orders::Table)
            .col(pk_auto(Orders::Id))
            .col(integer_null(Orders::ReservationId))
            .col(ColumnDef::new(Orders::TableId).string_len(4).null())
            .col(string(Orders::Status).default("Pending"))
            .col(
                ColumnDef::new(Orders::OrderTime)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(string_null(Orders::SpecialRequests))
            .col(decimal_len(Orders::TotalAmount, 10, 2))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_orders_reservation")
                    .from(Orders::Table, Orders::ReservationId)
                    .to(Reservation::Table, Reservation::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_orders_table")
                    .from(Orders::Table, Orders::TableId)
                    .to(DiningTable::Table, DiningTable::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create OrderItem Table
        let table = table_auto(OrderItem::Table)
            .col(pk_auto(OrderItem::Id))
            .col(integer(OrderItem::OrderId))
            .col(integer(OrderItem::ItemId))
            .col(integer(OrderItem::Quantity).default(1))
            .col(decimal_len(OrderItem::UnitPrice, 10, 2))
            .col(decimal_len(OrderItem::Subtotal, 10, 2))
            .col(string_null(OrderItem::SpecialInstructions))
            .col(string(OrderItem::ItemStatus).default("Pending"))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_order_item_order")
                    .from(OrderItem::Table, OrderItem::OrderId)
                    .to(Orders::Table, Orders::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_order_item_menu_item")
                    .from(OrderItem::Table, OrderItem::ItemId)
                    .to(MenuItem::Table, MenuItem::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .check(Expr::col(OrderItem::Quantity).gte(1))
            .to_owned();
        manager.create_table(table).await?;

        // Create OrderItemOption join table
        let table = Table::create()
            .table(OrderItemOption::Table)
            .if_not_exists()
            .col(integer(OrderItemOption::OrderItemId))
            .col(integer(OrderItemOption::OptionId))
            .primary_key(
                Index::create()
                    .col(OrderItemOption::OrderItemId)
                    .col(OrderItemOption::OptionId),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_order_item_option_order_item")
                    .from(OrderItemOption::Table, OrderItemOption::OrderItemId)
                    .to(OrderItem::Table, OrderItem::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_order_item_option_option")
                    .from(OrderItemOption::Table, OrderItemOption::OptionId)
                    .to(ItemOption::Table, ItemOption::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_order_time")
                    .table(Orders::Table)
                    .col(Orders::OrderTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_item_order")
                    .table(OrderItem::Table)
                    .col(OrderItem::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItemOption::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(OrderItem::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MenuAvailability::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ItemOption::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MenuItem::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MenuCategory::Table).to_owned())
            .await?;

        Ok(())
    }
}
