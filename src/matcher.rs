//! Containment-based matching of provider place names against the directory.
//!
//! Two strengths of hit exist. A *name hit* is a district whose normalized
//! name contains, or is contained in, the normalized locality. A
//! *region-confirmed hit* is a name hit whose region also matches by
//! containment. The first region-confirmed hit in directory order wins,
//! otherwise the first name hit. There is no scoring.

use crate::directory::Directory;
use crate::models::District;
use crate::normalize::normalize;

fn contains_either_way(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

/// Finds the district named by `locality` and `region`, or `None` for no match.
///
/// Both inputs are normalized here, so raw provider text can be passed as is.
pub fn best_match<'a>(directory: &'a Directory, locality: &str, region: &str) -> Option<&'a District> {
    let locality = normalize(locality);
    if locality.is_empty() {
        return None;
    }
    let region = normalize(region);

    let mut first_name_hit = None;
    for entry in directory.entries() {
        if !contains_either_way(&entry.name_key, &locality) {
            continue;
        }
        if contains_either_way(&entry.region_key, &region) {
            return Some(&entry.district);
        }
        first_name_hit.get_or_insert(&entry.district);
    }
    first_name_hit
}
