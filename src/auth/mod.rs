pub mod extract;
pub mod jwt;
pub mod router;
pub mod user;
