use sea_orm_migration::prelude::*;

// Define table names
#[derive(DeriveIden)]
pub enum Guest {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
}

#[derive(DeriveIden)]
pub enum Sitting {
    Table,
    Id,
    SittingType,
    StartTime,
    EndTime,
    Capacity,
    ClosedForReservations,
}

#[derive(DeriveIden)]
pub enum DiningTable {
    Table,
    Id,
    Area,
    Capacity,
}

#[derive(DeriveIden)]
pub enum Reservation {
    Table,
    Id,
    GuestId,
    SittingId,
    StartTime,
    EndTime,
    NumberOfGuests,
    Status,
    Notes,
}

#[derive(DeriveIden)]
pub enum ReservationTable {
    Table,
    ReservationId,
    TableId,
}

#[derive(DeriveIden)]
pub enum MenuCategory {
    Table,
    Id,
    Name,
    Description,
    IsAvailable,
}

#[derive(DeriveIden)]
pub enum MenuItem {
    Table,
    Id,
    CategoryId,
    Name,
    Description,
    Price,
    IsAvailable,
    PrepTime,
    ImageUrl,
}

#[derive(DeriveIden)]
pub enum ItemOption {
    Table,
    Id,
    ItemId,
    Name,
    Description,
    PriceModifier,
}

#[derive(DeriveIden)]
pub enum MenuAvailability {
    Table,
    ItemId,
    SittingType,
    IsAvailable,
}

#[derive(DeriveIden)]
pub enum Orders {
    Table,
    Id,
    ReservationId,
    TableId,
    Status,
    OrderTime,
    SpecialRequests,
    TotalAmount,
}

#[derive(DeriveIden)]
pub enum OrderItem {
    Table,
    Id,
    OrderId,
    ItemId,
    Quantity,
    UnitPrice,
    Subtotal,
    SpecialInstructions,
    ItemStatus,
}

#[derive(DeriveIden)]
pub enum OrderItemOption {
    Table,
    OrderItemId,
    OptionId,
}

#[derive(DeriveIden)]
pub enum AppUser {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    UserType,
}
