//! Services module
//!
//! Business logic services that coordinate between providers and the repository.

pub mod auth;
pub mod metadata;
pub mod records;
pub mod session;
pub mod settings;

pub use auth::{
    AuthService, AuthState, GuestMigrator, LocalRecordMigrator, LoginOutcome, MigrationOutcome,
    RegistrationTrigger,
};
pub use metadata::{CollectorOptions, MetadataCollector};
pub use records::RecordsService;
pub use session::SessionStore;
pub use settings::{AppSettings, SettingsService};
