use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::Value;

/// Persons who worked at least one day in the month.
pub const TOTAL_INDIVIDUALS_WORKED: &str = "Total_Individuals_Worked";
/// Total wages paid out in the month.
pub const WAGES: &str = "Wages";
pub const AVERAGE_WAGE_RATE: &str = "Average_Wage_rate_per_day_per_person";

/// Canonical administrative district as listed by the backend.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
pub struct District {
    #[serde(rename = "district_code", deserialize_with = "deserialize_number_from_string")]
    pub id: u32,
    #[serde(rename = "district_name")]
    pub name: String,
    #[serde(rename = "state_name")]
    pub region_name: String,
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.region_name)
    }
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Place names as a geocoding provider returned them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPlace {
    pub locality: String,
    pub region: String,
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// January is 0, December is 11.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = String;

    /// Accepts full English month names or their three-letter abbreviations, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Month::ALL
            .into_iter()
            .find(|m| {
                let name = m.name().to_lowercase();
                name == wanted || (wanted.len() == 3 && name.starts_with(&wanted))
            })
            .ok_or_else(|| format!("{} is not a calendar month", s))
    }
}

impl TryFrom<String> for Month {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Month> for String {
    fn from(m: Month) -> Self {
        m.name().to_string()
    }
}

/// Reads a numeric field that the backend may send as a number or a numeric string.
fn numeric(fields: &BTreeMap<String, Value>, name: &str) -> Option<f64> {
    match fields.get(name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One month of program metrics for a district.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
pub struct MonthlyRecord {
    #[serde(rename = "district_code", deserialize_with = "deserialize_number_from_string")]
    pub district_id: u32,
    pub month: Month,
    #[serde(rename = "fin_year")]
    pub fiscal_year: String,
    /// Remaining backend fields; numeric ones are the metrics.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl MonthlyRecord {
    /// `"{month} {fiscal_year}"`, the label the trend selector shows.
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.fiscal_year)
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        numeric(&self.fields, name)
    }

    pub fn metric_or_zero(&self, name: &str) -> f64 {
        self.metric(name).unwrap_or(0.0)
    }
}

/// Per-district summary as computed by the backend for side-by-side display.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
pub struct ComparisonRow {
    #[serde(rename = "district_code", deserialize_with = "deserialize_number_from_string")]
    pub district_id: u32,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ComparisonRow {
    pub fn metric(&self, name: &str) -> Option<f64> {
        numeric(&self.fields, name)
    }

    pub fn metric_or_zero(&self, name: &str) -> f64 {
        self.metric(name).unwrap_or(0.0)
    }
}

/// Push message announcing that a district's records changed.
#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
pub struct DistrictUpdate {
    #[serde(rename = "district_code", deserialize_with = "deserialize_number_from_string")]
    pub district_id: u32,
}
