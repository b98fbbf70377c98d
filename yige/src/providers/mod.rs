//! External collaborators
//!
//! Traits for the platform services the core consumes, plus the
//! implementations that ship with the crate.

pub mod auth;
pub mod calendar;
pub mod location;
pub mod weather;

pub use auth::{AuthProvider, Credentials, HttpAuthProvider, LoginProvider, ProviderIdentity};
pub use calendar::{CalendarEvent, CalendarProvider, FixedCalendarProvider};
pub use location::{FixedLocationProvider, Geocoder, LocationProvider, ResolvedPlace};
pub use weather::{OpenMeteoProvider, WeatherProvider};
