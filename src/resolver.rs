use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::directory::Directory;
use crate::error::ResolveError;
use crate::geocoding::ReverseGeocoder;
use crate::location::LocationSource;
use crate::matcher::best_match;
use crate::models::{Coordinate, District, RawPlace};
use crate::normalize::{display_form, normalize};

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedDistrict {
    pub district: District,
    pub coordinate: Coordinate,
    /// Provider names with the qualifier stripped, as detected.
    pub place: RawPlace,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoMatchReason {
    /// The provider gave no usable locality or region.
    IncompletePlace,
    /// The place was read but names no district in the directory.
    NotInDirectory,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoMatch {
    pub coordinate: Coordinate,
    pub place: RawPlace,
    pub reason: NoMatchReason,
}

/// Outcome of a resolution that reached the provider successfully.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedDistrict),
    NoMatch(NoMatch),
}

/// Device position, then provider names, then the directory; one attempt, no retries.
pub struct LocationResolver<G, L> {
    geocoder: G,
    location: L,
}

impl<G: ReverseGeocoder, L: LocationSource> LocationResolver<G, L> {
    pub fn new(geocoder: G, location: L) -> Self {
        LocationResolver { geocoder, location }
    }

    pub async fn resolve(&self, directory: &Directory) -> Result<Resolution, ResolveError> {
        let coordinate = self.location.current_position().await?;
        self.resolve_coordinate(coordinate, directory).await
    }

    pub async fn resolve_coordinate(
        &self,
        coordinate: Coordinate,
        directory: &Directory,
    ) -> Result<Resolution, ResolveError> {
        debug!("Resolving {:?}", coordinate);
        let raw = self.geocoder.reverse(coordinate).await?;
        let place = RawPlace {
            locality: display_form(&raw.locality),
            region: raw.region.trim().to_string(),
        };
        info!("Detected {:?} at {:?}", place, coordinate);

        if normalize(&place.locality).is_empty() || normalize(&place.region).is_empty() {
            return Ok(Resolution::NoMatch(NoMatch {
                coordinate,
                place,
                reason: NoMatchReason::IncompletePlace,
            }));
        }

        Ok(match best_match(directory, &place.locality, &place.region) {
            Some(district) => Resolution::Resolved(ResolvedDistrict {
                district: district.clone(),
                coordinate,
                place,
                resolved_at: Utc::now(),
            }),
            None => Resolution::NoMatch(NoMatch {
                coordinate,
                place,
                reason: NoMatchReason::NotInDirectory,
            }),
        })
    }
}
