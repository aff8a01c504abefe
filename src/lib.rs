//! District resolution and metrics aggregation for the employment-program dashboard.

pub mod backend;
pub mod comparison;
pub mod configuration;
pub mod directory;
pub mod error;
pub mod gate;
pub mod geocoding;
pub mod location;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod notifications;
pub mod resolver;
pub mod session;
pub mod timeseries;

pub use crate::directory::Directory;
pub use crate::error::{
    BackendFetchError, ComparisonFetchError, Error, FetchError, LocationError, ProviderError, ResolveError,
};
pub use crate::models::{ComparisonRow, Coordinate, District, Month, MonthlyRecord, RawPlace};
pub use crate::session::{DetectOutcome, Notice, Session, Trigger};
