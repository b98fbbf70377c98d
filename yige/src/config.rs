//! Application configuration constants
//!
//! Central location for limits, timeouts, storage keys and defaults.
//! User-adjustable values live in `services::settings` and fall back to these.

use std::time::Duration;

// ===== Registration Gating =====

/// Number of locally saved records after which a guest is asked to register
pub const DEFAULT_REGISTRATION_THRESHOLD: u64 = 10;

/// Lowest threshold accepted from settings
pub const MIN_REGISTRATION_THRESHOLD: u64 = 1;

/// Highest threshold accepted from settings
pub const MAX_REGISTRATION_THRESHOLD: u64 = 1_000;

// ===== Record Limits =====

/// Maximum length of a record's free text, in characters
pub const MAX_CONTENT_CHARS: usize = 5_000;

// ===== Metadata Collection =====

/// Upper bound on waiting for a location fix
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on resolving an address for a location fix
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on waiting for a weather lookup
pub const WEATHER_TIMEOUT: Duration = Duration::from_secs(8);

/// Default Open-Meteo compatible endpoint for weather lookups
pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.open-meteo.com";

/// Default Open-Meteo compatible endpoint for historical weather
pub const DEFAULT_WEATHER_ARCHIVE_API_BASE: &str = "https://archive-api.open-meteo.com";

/// Oldest day, in days before today, the forecast endpoint still serves
pub const FORECAST_PAST_DAYS: i64 = 92;

/// Placeholder auth gateway; deployments override it in settings
pub const DEFAULT_AUTH_API_BASE: &str = "https://api.yige.app";

// ===== Session Storage Keys =====

/// Serialized `User` of the logged-in account
pub const KEY_CURRENT_USER: &str = "current_user";

/// Stable identifier of this device in guest mode
pub const KEY_GUEST_DEVICE_ID: &str = "guest_device_id";

/// Number of records saved on this device
pub const KEY_LOCAL_RECORD_COUNT: &str = "local_record_count";

// ===== Imaging =====

/// Channel value at or above which a pixel counts as border white
pub const DEFAULT_WHITE_THRESHOLD: u8 = 240;

// ===== Files =====

/// Database file name inside the app data directory
pub const DATABASE_FILE: &str = "yige.db";

/// Settings file name inside the app data directory
pub const SETTINGS_FILE: &str = "settings.json";
