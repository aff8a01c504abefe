use async_trait::async_trait;

use crate::configuration::DeviceSettings;
use crate::error::LocationError;
use crate::models::Coordinate;

/// The device's ability to report where it is.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// A position fixed by configuration; absent means the capability is missing.
pub struct FixedLocation(Option<Coordinate>);

impl FixedLocation {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        FixedLocation(coordinate)
    }

    pub fn from_settings(settings: &DeviceSettings) -> Self {
        let coordinate = match (settings.latitude, settings.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate { latitude, longitude }),
            _ => None,
        };
        FixedLocation(coordinate)
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.0.ok_or(LocationError::Unsupported)
    }
}
