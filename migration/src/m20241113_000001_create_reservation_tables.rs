use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Guest Table
        let table = table_auto(Guest::Table)
            .col(pk_auto(Guest::Id))
            .col(string(Guest::FirstName))
            .col(string(Guest::LastName))
            .col(string_uniq(Guest::Email))
            .col(string_uniq(Guest::PhoneNumber))
            .to_owned();
        manager.create_table(table).await?;

        // Create Sitting Table
        let table = table_auto(Sitting::Table)
            .col(pk_auto(Sitting::Id))
            .col(string(Sitting::SittingType))
            .col(
                ColumnDef::new(Sitting::StartTime)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Sitting::EndTime)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(integer(Sitting::Capacity))
            .col(boolean(Sitting::ClosedForReservations).default(false))
            .check(Expr::col(Sitting::EndTime).gt(Expr::col(Sitting::StartTime)))
            .check(Expr::col(Sitting::Capacity).gt(0))
            .to_owned();
        manager.create_table(table).await?;

        // Create DiningTable Table, keyed by its short code (M1, O10, B3, ...)
        let table = table_auto(DiningTable::Table)
            .col(
                ColumnDef::new(DiningTable::Id)
                    .string_len(4)
                    .not_null()
                    .primary_key(),
            )
            .col(string(DiningTable::Area))
            .col(integer(DiningTable::Capacity))
            .check(Expr::col(DiningTable::Capacity).gt(0))
            .to_owned();
        manager.create_table(table).await?;

        // Create Reservation Table
        let table = table_auto(Reservation::Table)
            .col(pk_auto(Reservation::Id))
            .col(integer(Reservation::GuestId))
            .col(integer(Reservation::SittingId))
            .col(
                ColumnDef::new(Reservation::StartTime)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Reservation::EndTime)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(integer(Reservation::NumberOfGuests))
            .col(string(Reservation::Status).default("Pending"))
            .col(string_null(Reservation::Notes))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_reservation_guest")
                    .from(Reservation::Table, Reservation::GuestId)
                    .to(Guest::Table, Guest::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_reservation_sitting")
                    .from(Reservation::Table, Reservation::SittingId)
                    .to(Sitting::Table, Sitting::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .check(Expr::col(Reservation::NumberOfGuests).gt(0))
            .check(Expr::col(Reservation::EndTime).gt(Expr::col(Reservation::StartTime)))
            .to_owned();
        manager.create_table(table).await?;

        // Create ReservationTable join table
        let table = Table::create()
            .table(ReservationTable::Table)
            .if_not_exists()
            .col(integer(ReservationTable::ReservationId))
            .col(ColumnDef::new(ReservationTable::TableId).string_len(4).not_null())
            .primary_key(
                Index::create()
                    .col(ReservationTable::ReservationId)
                    .col(ReservationTable::TableId),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_reservation_table_reservation")
                    .from(ReservationTable::Table, ReservationTable::ReservationId)
                    .to(Reservation::Table, Reservation::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_reservation_table_table")
                    .from(ReservationTable::Table, ReservationTable::TableId)
                    .to(DiningTable::Table, DiningTable::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create indices for common lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_sitting_start_time")
                    .table(Sitting::Table)
                    .col(Sitting::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_start_time")
                    .table(Reservation::Table)
                    .col(Reservation::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_sitting")
                    .table(Reservation::Table)
                    .col(Reservation::SittingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_table_table")
                    .table(ReservationTable::Table)
                    .col(ReservationTable::TableId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop all tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(ReservationTable::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reservation::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DiningTable::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Sitting::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Guest::Table).to_owned())
            .await?;

        Ok(())
    }
}
