//! Dashboard state and the async flows that mutate it.
//!
//! Location resolution and history fetches are both tagged with a
//! [`RequestToken`]; a result is applied only while its token is the latest
//! one started and the session is still open. State lives behind a single
//! lock that is never held across an `.await`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};

use crate::backend::MetricsBackend;
use crate::directory::Directory;
use crate::error::{BackendFetchError, LocationError, ResolveError};
use crate::gate::{RequestGate, RequestToken};
use crate::geocoding::ReverseGeocoder;
use crate::location::LocationSource;
use crate::models::{District, MonthlyRecord, RawPlace};
use crate::resolver::{LocationResolver, NoMatch, NoMatchReason, Resolution, ResolvedDistrict};
use crate::timeseries::{self, MonthFilter};

/// Who asked for a location resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// First-load attempt; failures stay in the log.
    Automatic,
    /// User pressed the detect button; failures become a [`Notice`].
    Manual,
}

/// Dismissable message for the user.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Found(District),
    NotInDirectory(RawPlace),
    IncompletePlace,
    LocationUnavailable(LocationError),
    DetectionFailed,
    DirectoryUnavailable,
    HistoryUnavailable(u32),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Found(d) => write!(f, "Found district: {}", d),
            Notice::NotInDirectory(place) => write!(
                f,
                "Found {}, {} but no matching district in the dataset.",
                place.locality, place.region
            ),
            Notice::IncompletePlace => f.write_str("Could not detect district or state properly."),
            Notice::LocationUnavailable(LocationError::Unsupported) => {
                f.write_str("Location is not supported on this device.")
            }
            Notice::LocationUnavailable(_) => f.write_str("Permission denied or unable to get location."),
            Notice::DetectionFailed => f.write_str("Failed to detect district."),
            Notice::DirectoryUnavailable => f.write_str("Failed to load districts. Please try again later."),
            Notice::HistoryUnavailable(id) => write!(f, "Failed to load data for district {}.", id),
        }
    }
}

/// What a call to [`Session::detect_location`] ended up doing.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectOutcome {
    Selected(ResolvedDistrict),
    NoMatch(NoMatch),
    Failed,
    /// A newer attempt was started, the session closed, or (for automatic
    /// attempts) the user picked a district before this one finished.
    Superseded,
}

#[derive(Default)]
struct State {
    directory: Arc<Directory>,
    selected: Option<u32>,
    location: Option<ResolvedDistrict>,
    /// Always in chronological order.
    history: Vec<MonthlyRecord>,
    notice: Option<Notice>,
    /// Bumped by every explicit [`Session::select_district`].
    user_selections: u64,
}

pub struct Session<B, G, L> {
    backend: B,
    resolver: LocationResolver<G, L>,
    resolutions: RequestGate,
    histories: RequestGate,
    state: Mutex<State>,
}

impl<B, G, L> Session<B, G, L>
where
    B: MetricsBackend,
    G: ReverseGeocoder,
    L: LocationSource,
{
    pub fn new(backend: B, resolver: LocationResolver<G, L>) -> Self {
        Session {
            backend,
            resolver,
            resolutions: RequestGate::new(),
            histories: RequestGate::new(),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the directory, then tries to detect the user's district if none is selected.
    pub async fn start(&self) {
        if let Err(e) = self.load_directory().await {
            error!("{}", e);
            self.state().notice = Some(Notice::DirectoryUnavailable);
            return;
        }
        let should_detect = {
            let state = self.state();
            state.selected.is_none() && !state.directory.is_empty()
        };
        if should_detect {
            self.detect_location(Trigger::Automatic).await;
        }
    }

    /// Replaces the directory wholesale with a fresh backend listing.
    pub async fn load_directory(&self) -> Result<usize, BackendFetchError> {
        let districts = self.backend.districts().await.map_err(|source| BackendFetchError {
            what: "districts".to_string(),
            source,
        })?;
        let directory = Arc::new(Directory::new(districts));
        let count = directory.len();
        info!("Loaded {} districts", count);
        if !self.resolutions.is_closed() {
            self.state().directory = directory;
        }
        Ok(count)
    }

    pub async fn detect_location(&self, trigger: Trigger) -> DetectOutcome {
        let token = self.resolutions.begin();
        let (directory, selections) = {
            let state = self.state();
            (Arc::clone(&state.directory), state.user_selections)
        };
        let result = self.resolver.resolve(&directory).await;

        let (outcome, history_token) = {
            let mut state = self.state();
            if !self.resolutions.is_current(token) {
                debug!("Discarding resolution {:?}, a newer one was started", token);
                return DetectOutcome::Superseded;
            }
            if trigger == Trigger::Automatic && state.user_selections != selections {
                debug!("Discarding automatic resolution {:?}, the user picked a district meanwhile", token);
                return DetectOutcome::Superseded;
            }
            self.apply_resolution(&mut state, trigger, result)
        };

        if let (DetectOutcome::Selected(resolved), Some(history_token)) = (&outcome, history_token) {
            let district_id = resolved.district.id;
            // Already logged; a history failure does not undo the selection.
            let failed = self.fetch_history(district_id, history_token).await.is_err();
            if failed && trigger == Trigger::Manual && self.histories.is_current(history_token) {
                self.state().notice = Some(Notice::HistoryUnavailable(district_id));
            }
        }
        outcome
    }

    fn apply_resolution(
        &self,
        state: &mut State,
        trigger: Trigger,
        result: Result<Resolution, ResolveError>,
    ) -> (DetectOutcome, Option<RequestToken>) {
        let notice = match &result {
            Ok(Resolution::Resolved(r)) => Notice::Found(r.district.clone()),
            Ok(Resolution::NoMatch(m)) if m.reason == NoMatchReason::IncompletePlace => Notice::IncompletePlace,
            Ok(Resolution::NoMatch(m)) => Notice::NotInDirectory(m.place.clone()),
            Err(ResolveError::CapabilityUnavailable(e)) => Notice::LocationUnavailable(*e),
            Err(ResolveError::Provider(_)) => Notice::DetectionFailed,
        };
        if trigger == Trigger::Manual {
            state.notice = Some(notice);
        }

        match result {
            Ok(Resolution::Resolved(resolved)) => {
                info!("Resolved location to {}", resolved.district);
                let token = self.select_locked(state, resolved.district.id);
                state.location = Some(resolved.clone());
                (DetectOutcome::Selected(resolved), Some(token))
            }
            Ok(Resolution::NoMatch(no_match)) => {
                warn!(
                    "No district matches {:?} ({:?})",
                    no_match.place, no_match.reason
                );
                (DetectOutcome::NoMatch(no_match), None)
            }
            Err(e) => {
                error!("Failed to detect district ({:?} trigger): {}", trigger, e);
                (DetectOutcome::Failed, None)
            }
        }
    }

    /// Selects a district and loads its history.
    pub async fn select_district(&self, district_id: u32) -> Result<(), BackendFetchError> {
        let token = {
            let mut state = self.state();
            state.user_selections += 1;
            self.select_locked(&mut state, district_id)
        };
        let result = self.fetch_history(district_id, token).await;
        if result.is_err() && self.histories.is_current(token) {
            self.state().notice = Some(Notice::HistoryUnavailable(district_id));
        }
        result
    }

    /// Re-fetches the history if `district_id` is the selected district.
    pub async fn refresh_district(&self, district_id: u32) -> Result<bool, BackendFetchError> {
        let token = {
            let state = self.state();
            if state.selected != Some(district_id) {
                return Ok(false);
            }
            self.histories.begin()
        };
        self.fetch_history(district_id, token).await?;
        Ok(true)
    }

    /// Selection and its history token change together, under the lock,
    /// so history tokens follow selection order.
    fn select_locked(&self, state: &mut State, district_id: u32) -> RequestToken {
        state.selected = Some(district_id);
        state.history.clear();
        self.histories.begin()
    }

    async fn fetch_history(&self, district_id: u32, token: RequestToken) -> Result<(), BackendFetchError> {
        let result = self.backend.district_months(district_id).await;
        let mut state = self.state();
        if !self.histories.is_current(token) || state.selected != Some(district_id) {
            debug!("Discarding history of district {}, selection moved on", district_id);
            return Ok(());
        }
        match result {
            Ok(records) => {
                debug!("District {} has {} monthly records", district_id, records.len());
                state.history = timeseries::sort_chronological(records);
                Ok(())
            }
            Err(source) => {
                let e = BackendFetchError {
                    what: format!("history of district {}", district_id),
                    source,
                };
                error!("{}", e);
                Err(e)
            }
        }
    }

    /// Stops every in-flight request from touching state when it completes.
    pub fn close(&self) {
        self.resolutions.close();
        self.histories.close();
    }

    pub fn directory(&self) -> Arc<Directory> {
        Arc::clone(&self.state().directory)
    }

    pub fn selected(&self) -> Option<District> {
        let state = self.state();
        state.selected.and_then(|id| state.directory.get(id).cloned())
    }

    pub fn selected_id(&self) -> Option<u32> {
        self.state().selected
    }

    pub fn location(&self) -> Option<ResolvedDistrict> {
        self.state().location.clone()
    }

    pub fn history(&self) -> Vec<MonthlyRecord> {
        self.state().history.clone()
    }

    /// The history limited to the trend selector's choice.
    pub fn trend(&self, filter: &MonthFilter) -> Vec<MonthlyRecord> {
        let state = self.state();
        timeseries::prefix_up_to(&state.history, filter).to_vec()
    }

    pub fn latest(&self) -> Option<MonthlyRecord> {
        timeseries::latest(&self.state().history).cloned()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state().notice = None;
    }
}
