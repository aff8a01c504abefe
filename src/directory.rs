use std::collections::HashSet;

use log::warn;

use crate::models::District;
use crate::normalize::normalize;

/// A district together with its precomputed comparison keys.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub district: District,
    pub name_key: String,
    pub region_key: String,
}

/// Immutable snapshot of all districts, in backend order.
///
/// Built once per load and replaced wholesale on reload. Iteration order is
/// the tie-break for matching, so it is never re-sorted.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    entries: Vec<Entry>,
}

impl Directory {
    /// Later entries that reuse an id are dropped so lookups stay unambiguous.
    pub fn new(districts: Vec<District>) -> Self {
        let mut seen = HashSet::with_capacity(districts.len());
        let entries = districts
            .into_iter()
            .filter(|d| {
                let fresh = seen.insert(d.id);
                if !fresh {
                    warn!("Dropping duplicate district id {} ({})", d.id, d);
                }
                fresh
            })
            .map(|district| Entry {
                name_key: normalize(&district.name),
                region_key: normalize(&district.region_name),
                district,
            })
            .collect();
        Directory { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&District> {
        self.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &District> + '_ {
        self.entries.iter().map(|e| &e.district)
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

impl FromIterator<District> for Directory {
    fn from_iter<I: IntoIterator<Item = District>>(iter: I) -> Self {
        Directory::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district(id: u32, name: &str, region: &str) -> District {
        District {
            id,
            name: name.to_string(),
            region_name: region.to_string(),
        }
    }

    #[test]
    fn keeps_backend_order_and_drops_duplicate_ids() {
        let dir = Directory::new(vec![
            district(3, "Pune", "Maharashtra"),
            district(1, "Goa", "Goa"),
            district(3, "Nagpur", "Maharashtra"),
        ]);
        let names: Vec<_> = dir.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Pune", "Goa"]);
        assert_eq!(dir.get(3).map(|d| d.name.as_str()), Some("Pune"));
        assert!(dir.get(9).is_none());
    }
}
