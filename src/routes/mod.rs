use serde::Deserialize;

pub mod dashboard;
pub mod guests;
pub mod menu;
pub mod orders;
pub mod reservations;
pub mod sittings;
pub mod tables;

/// Body of the `PUT .../status` endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusChange<T> {
    pub status: T,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}
