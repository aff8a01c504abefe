//! Chronological ordering and filtering of a district's monthly records.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::MonthlyRecord;

/// Sentinel selector value meaning "show every month".
pub const ALL: &str = "All";

/// `(fiscal_year, month index)`; fiscal years must share one lexicographically sortable format.
fn chronological(a: &MonthlyRecord, b: &MonthlyRecord) -> Ordering {
    a.fiscal_year
        .cmp(&b.fiscal_year)
        .then_with(|| a.month.cmp(&b.month))
}

/// Stable sort, so equal keys keep their received order and re-sorting is a no-op.
pub fn sort_chronological(mut records: Vec<MonthlyRecord>) -> Vec<MonthlyRecord> {
    records.sort_by(chronological);
    records
}

/// What the trend view is limited to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MonthFilter {
    All,
    /// Up to and including the record labelled `"{month} {fiscal_year}"`.
    UpTo(String),
}

impl FromStr for MonthFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ALL {
            MonthFilter::All
        } else {
            MonthFilter::UpTo(s.to_string())
        })
    }
}

/// Inclusive prefix ending at the first record with the filter's label.
///
/// An unknown label behaves like [`MonthFilter::All`].
pub fn prefix_up_to<'a>(sorted: &'a [MonthlyRecord], filter: &MonthFilter) -> &'a [MonthlyRecord] {
    let MonthFilter::UpTo(label) = filter else {
        return sorted;
    };
    match sorted.iter().position(|r| r.label() == *label) {
        Some(index) => &sorted[..=index],
        None => sorted,
    }
}

pub fn latest(sorted: &[MonthlyRecord]) -> Option<&MonthlyRecord> {
    sorted.last()
}

/// Selector options, one per record, in order.
pub fn labels(sorted: &[MonthlyRecord]) -> Vec<String> {
    sorted.iter().map(MonthlyRecord::label).collect()
}

/// One value per record; missing or non-numeric fields count as zero.
pub fn metric_series(records: &[MonthlyRecord], name: &str) -> Vec<f64> {
    records.iter().map(|r| r.metric_or_zero(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Month, WAGES};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn record(month: Month, fiscal_year: &str) -> MonthlyRecord {
        MonthlyRecord {
            district_id: 1,
            month,
            fiscal_year: fiscal_year.to_string(),
            fields: BTreeMap::new(),
        }
    }

    fn keys(records: &[MonthlyRecord]) -> Vec<String> {
        labels(records)
    }

    #[test]
    fn sorts_months_within_a_year() {
        let sorted = sort_chronological(vec![
            record(Month::March, "2023-2024"),
            record(Month::January, "2023-2024"),
        ]);
        assert_eq!(keys(&sorted), ["January 2023-2024", "March 2023-2024"]);
    }

    #[test]
    fn fiscal_year_dominates_month() {
        let sorted = sort_chronological(vec![
            record(Month::January, "2023-2024"),
            record(Month::December, "2022-2023"),
            record(Month::April, "2023-2024"),
        ]);
        assert_eq!(
            keys(&sorted),
            ["December 2022-2023", "January 2023-2024", "April 2023-2024"]
        );
    }

    #[test]
    fn sorting_is_idempotent_and_keeps_duplicates() {
        let mut first = record(Month::May, "2023-2024");
        first.fields.insert("tag".into(), json!("first"));
        let mut second = record(Month::May, "2023-2024");
        second.fields.insert("tag".into(), json!("second"));

        let once = sort_chronological(vec![record(Month::June, "2023-2024"), first, second]);
        let twice = sort_chronological(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
        assert_eq!(once[0].fields["tag"], json!("first"));
    }

    #[test]
    fn all_returns_everything() {
        let sorted = sort_chronological(vec![
            record(Month::January, "2023-2024"),
            record(Month::February, "2023-2024"),
        ]);
        let filter: MonthFilter = "All".parse().unwrap();
        assert_eq!(prefix_up_to(&sorted, &filter), &sorted[..]);
    }

    #[test]
    fn prefix_is_inclusive() {
        let sorted = sort_chronological(vec![
            record(Month::January, "2023-2024"),
            record(Month::February, "2023-2024"),
            record(Month::March, "2023-2024"),
        ]);
        let filter: MonthFilter = "February 2023-2024".parse().unwrap();
        assert_eq!(keys(prefix_up_to(&sorted, &filter)), ["January 2023-2024", "February 2023-2024"]);
    }

    #[test]
    fn unknown_label_returns_everything() {
        let sorted = vec![record(Month::January, "2023-2024")];
        let filter = MonthFilter::UpTo("Smarch 1999".into());
        assert_eq!(prefix_up_to(&sorted, &filter).len(), 1);
    }

    #[test]
    fn latest_is_last_or_none() {
        assert!(latest(&[]).is_none());
        let sorted = sort_chronological(vec![
            record(Month::March, "2023-2024"),
            record(Month::January, "2024-2025"),
        ]);
        assert_eq!(latest(&sorted).map(MonthlyRecord::label).as_deref(), Some("January 2024-2025"));
    }

    #[test]
    fn series_defaults_missing_metrics_to_zero() {
        let mut paid = record(Month::January, "2023-2024");
        paid.fields.insert(WAGES.into(), json!("250.5"));
        let unpaid = record(Month::February, "2023-2024");
        assert_eq!(metric_series(&[paid, unpaid], WAGES), vec![250.5, 0.0]);
    }
}
