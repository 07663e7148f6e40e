//! Application configuration loaded from environment variables.

use booking::BookingConfig;
use seat_store::{StoreError, VenueLayout};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Engine configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DATABASE_URL`: PostgreSQL connection string; unset selects the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `10`)
/// - `VENUE_ROWS`: number of rows (default: `12`)
/// - `VENUE_LAST_ROW_SEATS`: seats in the last row (default: `3`)
/// - `MAX_SEATS_PER_REQUEST`: booking size limit (default: `7`)
/// - `BOOKING_CONFLICT_RETRIES`: extra attempts after a conflict (default: `3`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub venue_rows: u32,
    pub venue_last_row_seats: u32,
    pub max_seats_per_request: usize,
    pub conflict_retries: u32,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse().ok());

        Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: number("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            venue_rows: number("VENUE_ROWS").unwrap_or(defaults.venue_rows),
            venue_last_row_seats: number("VENUE_LAST_ROW_SEATS")
                .unwrap_or(defaults.venue_last_row_seats),
            max_seats_per_request: lookup("MAX_SEATS_PER_REQUEST")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_seats_per_request),
            conflict_retries: number("BOOKING_CONFLICT_RETRIES")
                .unwrap_or(defaults.conflict_retries),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
        }
    }

    /// Booking limits for [`booking::BookingService`].
    pub fn booking(&self) -> BookingConfig {
        BookingConfig {
            max_seats_per_request: self.max_seats_per_request,
            conflict_retries: self.conflict_retries,
        }
    }

    /// Validated venue layout.
    pub fn layout(&self) -> Result<VenueLayout, StoreError> {
        VenueLayout::new(self.venue_rows, self.venue_last_row_seats)
    }
}

impl Default for Config {
    fn default() -> Self {
        let layout = VenueLayout::coach();
        let booking = BookingConfig::default();
        Self {
            database_url: None,
            database_max_connections: 10,
            venue_rows: layout.rows(),
            venue_last_row_seats: layout.last_row_seats(),
            max_seats_per_request: booking.max_seats_per_request,
            conflict_retries: booking.conflict_retries,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}
