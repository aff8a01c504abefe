//! Place-name normalization for comparing provider output with directory names.

/// Administrative qualifier that providers attach to district names.
const QUALIFIER: &str = "district";

/// Folds a raw place name into its comparison key.
///
/// Lowercases, removes every occurrence of the qualifier word (also inside
/// longer words, as providers glue it on inconsistently), and collapses the
/// whitespace left behind. Pure and total.
///
/// ```
/// use district_insights::normalize::normalize;
///
/// assert_eq!(normalize("  Pune District "), "pune");
/// assert_eq!(normalize("DISTRICT of  North   Goa"), "of north goa");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .replace(QUALIFIER, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips the qualifier and surrounding whitespace but keeps the provider's casing.
///
/// Used when echoing a detected place back to the user.
pub fn display_form(raw: &str) -> String {
    // The qualifier is ASCII, so ASCII lowercasing keeps byte offsets aligned.
    let folded = raw.to_ascii_lowercase();
    let mut out = String::with_capacity(raw.len());
    let mut rest = 0;
    for (start, _) in folded.match_indices(QUALIFIER) {
        out.push_str(&raw[rest..start]);
        rest = start + QUALIFIER.len();
    }
    out.push_str(&raw[rest..]);
    out.trim().to_string()
}
