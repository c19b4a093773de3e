use anyhow::{Context, bail};
use chrono::Duration;
use chrono_tz::Tz;
use std::env;

use crate::auth::user::Registration;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Australia::Sydney;
pub const DEFAULT_RESERVATION_MINUTES: i64 = 90;
pub const DEFAULT_JWT_EXPIRATION_MINUTES: i64 = 60 * 24 * 7;
pub const JWT_ISSUER: &str = "bistro-rs";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub timezone: Tz,
    pub reservation_minutes: i64,
    pub enforce_sitting_window: bool,
    /// First manager account, provisioned at start-up when all three
    /// `MANAGER_*` variables are present.
    pub bootstrap_manager: Option<Registration>,
}

/// Booking rules handed to the reservation and seating services.
#[derive(Clone, Copy, Debug)]
pub struct BookingPolicy {
    /// Reference timezone for calendar-day queries.
    pub timezone: Tz,
    /// Fixed length of every reservation.
    pub reservation_length: Duration,
    /// Require `sitting.start <= reservation.start < sitting.end`.
    pub enforce_sitting_window: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            reservation_length: Duration::minutes(DEFAULT_RESERVATION_MINUTES),
            enforce_sitting_window: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is fine; the process environment may carry everything.
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "debug".into());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 characters");
        }
        let jwt_expiration_minutes = parse_var("JWT_EXPIRATION_MINUTES", DEFAULT_JWT_EXPIRATION_MINUTES)?;

        let timezone = match env::var("RESTAURANT_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("RESTAURANT_TIMEZONE {name:?} is invalid: {e}"))?,
            Err(_) => DEFAULT_TIMEZONE,
        };
        let reservation_minutes = parse_var("RESERVATION_MINUTES", DEFAULT_RESERVATION_MINUTES)?;
        if reservation_minutes <= 0 {
            bail!("RESERVATION_MINUTES must be positive");
        }
        let enforce_sitting_window = parse_var("ENFORCE_SITTING_WINDOW", false)?;

        let bootstrap_manager = match (
            env::var("MANAGER_USERNAME"),
            env::var("MANAGER_EMAIL"),
            env::var("MANAGER_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(Registration {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            rust_log,
            bind_addr,
            jwt_secret,
            jwt_expiration_minutes,
            timezone,
            reservation_minutes,
            enforce_sitting_window,
            bootstrap_manager,
        })
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            timezone: self.timezone,
            reservation_length: Duration::minutes(self.reservation_minutes),
            enforce_sitting_window: self.enforce_sitting_window,
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
