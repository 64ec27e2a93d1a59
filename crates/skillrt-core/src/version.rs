//! Dotted numeric triple version comparison (§3, testable property #2).
//!
//! Numeric per segment, missing segments default to 0, and a non-numeric
//! segment is treated as 0 rather than rejected outright — skill documents
//! are user-authored text, not a build artifact, so a typo in a version
//! string shouldn't make the whole document unparseable.

use std::cmp::Ordering;

/// Parse a dotted version string into its numeric segments, padding or
/// truncating implicitly via [`compare_versions`] (this function just
/// extracts what's present).
fn segments(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|segment| segment.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

/// Compare two dotted version strings.
///
/// Returns `Ordering::Less/Equal/Greater` as `a` compares to `b`. Missing
/// trailing segments compare as `0`; an empty string compares as `0.0.0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let sa = segments(a);
    let sb = segments(b);
    let len = sa.len().max(sb.len());
    for i in 0..len {
        let va = sa.get(i).copied().unwrap_or(0);
        let vb = sb.get(i).copied().unwrap_or(0);
        match va.cmp(&vb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
