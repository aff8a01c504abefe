#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::channel::oneshot;
use reqwest::StatusCode;
use serde_json::json;

use district_insights::backend::MetricsBackend;
use district_insights::geocoding::ReverseGeocoder;
use district_insights::location::FixedLocation;
use district_insights::models::WAGES;
use district_insights::resolver::LocationResolver;
use district_insights::{
    ComparisonRow, Coordinate, District, FetchError, Month, MonthlyRecord, ProviderError, RawPlace, Session,
};

pub const HERE: Coordinate = Coordinate {
    latitude: 15.4909,
    longitude: 73.8278,
};

pub fn district(id: u32, name: &str, region: &str) -> District {
    District {
        id,
        name: name.to_string(),
        region_name: region.to_string(),
    }
}

pub fn place(locality: &str, region: &str) -> RawPlace {
    RawPlace {
        locality: locality.to_string(),
        region: region.to_string(),
    }
}

pub fn record(district_id: u32, month: Month, fiscal_year: &str, wages: f64) -> MonthlyRecord {
    let mut fields = BTreeMap::new();
    fields.insert(WAGES.to_string(), json!(wages));
    MonthlyRecord {
        district_id,
        month,
        fiscal_year: fiscal_year.to_string(),
        fields,
    }
}

pub fn row(district_id: u32) -> ComparisonRow {
    ComparisonRow {
        district_id,
        district_name: None,
        fields: BTreeMap::new(),
    }
}

fn unavailable(path: &str) -> FetchError {
    FetchError::Status {
        url: path.to_string(),
        status: StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// In-memory backend that records every call it receives.
#[derive(Default)]
pub struct FakeBackend {
    pub districts: Vec<District>,
    pub months: HashMap<u32, Vec<MonthlyRecord>>,
    pub rows: Vec<ComparisonRow>,
    pub fail_districts: bool,
    pub fail_compare: bool,
    /// History requests for this district wait until the receiver fires.
    pub hold: Mutex<Option<(u32, oneshot::Receiver<()>)>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn goa_and_pune() -> Self {
        let mut months = HashMap::new();
        months.insert(
            1,
            vec![
                record(1, Month::March, "2023-2024", 30.0),
                record(1, Month::January, "2023-2024", 10.0),
                record(1, Month::December, "2022-2023", 5.0),
            ],
        );
        months.insert(2, vec![record(2, Month::April, "2023-2024", 200.0)]);
        FakeBackend {
            districts: vec![district(1, "North Goa", "Goa"), district(2, "Pune", "Maharashtra")],
            months,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MetricsBackend for FakeBackend {
    async fn districts(&self) -> Result<Vec<District>, FetchError> {
        self.record_call("/districts".to_string());
        if self.fail_districts {
            return Err(unavailable("/districts"));
        }
        Ok(self.districts.clone())
    }

    async fn district_months(&self, district_id: u32) -> Result<Vec<MonthlyRecord>, FetchError> {
        let path = format!("/districts/{}/months", district_id);
        self.record_call(path.clone());
        let held = {
            let mut hold = self.hold.lock().unwrap();
            match hold.take() {
                Some((id, rx)) if id == district_id => Some(rx),
                other => {
                    *hold = other;
                    None
                }
            }
        };
        if let Some(rx) = held {
            let _ = rx.await;
        }
        self.months.get(&district_id).cloned().ok_or_else(|| unavailable(&path))
    }

    async fn compare(&self, district_ids: &[u32]) -> Result<Vec<ComparisonRow>, FetchError> {
        let ids: Vec<String> = district_ids.iter().map(u32::to_string).collect();
        let path = format!("/compare?districts={}", ids.join(","));
        self.record_call(path.clone());
        if self.fail_compare {
            return Err(unavailable(&path));
        }
        Ok(self.rows.clone())
    }
}

/// Answers immediately with a fixed place or failure.
pub struct InstantGeocoder(pub Result<RawPlace, String>);

#[async_trait]
impl ReverseGeocoder for InstantGeocoder {
    async fn reverse(&self, _: Coordinate) -> Result<RawPlace, ProviderError> {
        self.0.clone().map_err(ProviderError::Rejected)
    }
}

/// Each call waits for the next scripted answer, so tests choose completion order.
pub struct GatedGeocoder {
    pending: Mutex<VecDeque<oneshot::Receiver<RawPlace>>>,
}

impl GatedGeocoder {
    pub fn new(answers: Vec<oneshot::Receiver<RawPlace>>) -> Self {
        GatedGeocoder {
            pending: Mutex::new(answers.into()),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for GatedGeocoder {
    async fn reverse(&self, _: Coordinate) -> Result<RawPlace, ProviderError> {
        let answer = self.pending.lock().unwrap().pop_front();
        match answer {
            Some(rx) => rx.await.map_err(|_| ProviderError::Rejected("answer dropped".to_string())),
            None => Err(ProviderError::Rejected("unexpected geocoding call".to_string())),
        }
    }
}

pub fn session<G: ReverseGeocoder>(backend: FakeBackend, geocoder: G) -> Session<FakeBackend, G, FixedLocation> {
    Session::new(backend, LocationResolver::new(geocoder, FixedLocation::new(Some(HERE))))
}
