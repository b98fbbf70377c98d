//! Location collaborators
//!
//! `LocationProvider` yields the device position, `Geocoder` turns it into a
//! human readable address. Platform wrappers implement these; the crate ships
//! a fixed provider for hosts without positioning hardware.

use crate::database::GeoLocation;
use crate::error::LocationError;
use async_trait::async_trait;

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current position, subject to the user's permission
    async fn current_location(&self) -> Result<GeoLocation, LocationError>;
}

/// Resolved address of a position
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub address: Option<String>,
    pub place_name: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(&self, location: &GeoLocation) -> Result<ResolvedPlace, LocationError>;
}

/// Always reports the configured position, or permission denied when none is set
#[derive(Debug, Clone, Default)]
pub struct FixedLocationProvider {
    location: Option<GeoLocation>,
}

impl FixedLocationProvider {
    pub fn new(location: Option<GeoLocation>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> Result<GeoLocation, LocationError> {
        self.location.clone().ok_or(LocationError::PermissionDenied)
    }
}
