//! Version identifier allocation
//!
//! Identifiers are a prefix plus a UTC timestamp at whole-second
//! resolution, with a numeric suffix to disambiguate repeated calls within
//! the same second. The clock is passed in so callers and tests control it.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Timestamp layout used in version identifiers
const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Allocate an identifier that is not present in `existing`
///
/// Produces `prefix + YYYYMMDDHHMMSS`; if taken, appends `_2`, `_3`, …
/// until a free identifier is found. The returned id is guaranteed absent
/// from `existing` at call time; racing callers on the same document are
/// handled by the store's conflict detection, not here.
pub fn allocate_id(existing: &HashSet<String>, prefix: &str, now: DateTime<Utc>) -> String {
    let base = format!("{}{}", prefix, now.format(ID_TIMESTAMP_FORMAT));
    if !existing.contains(&base) {
        return base;
    }

    let mut counter = 2u32;
    loop {
        let candidate = format!("{}_{}", base, counter);
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, 14, 30, 5).unwrap()
    }

    #[test]
    fn test_first_allocation_is_plain_timestamp() {
        let existing = HashSet::new();
        let id = allocate_id(&existing, "v", fixed_now());
        assert_eq!(id, "v20260823143005");
    }

    #[test]
    fn test_same_second_collision_gets_suffix() {
        let mut existing = HashSet::new();
        existing.insert("v20260823143005".to_string());

        let id = allocate_id(&existing, "v", fixed_now());
        assert_eq!(id, "v20260823143005_2");
    }

    #[test]
    fn test_suffix_counts_up_past_taken_ids() {
        let mut existing = HashSet::new();
        existing.insert("v20260823143005".to_string());
        existing.insert("v20260823143005_2".to_string());
        existing.insert("v20260823143005_3".to_string());

        let id = allocate_id(&existing, "v", fixed_now());
        assert_eq!(id, "v20260823143005_4");
    }

    #[test]
    fn test_returned_id_never_in_set() {
        let mut existing = HashSet::new();
        for _ in 0..5 {
            let id = allocate_id(&existing, "v", fixed_now());
            assert!(!existing.contains(&id));
            existing.insert(id);
        }
        assert_eq!(existing.len(), 5);
    }

    #[test]
    fn test_prefix_is_arbitrary() {
        let existing = HashSet::new();
        let id = allocate_id(&existing, "build-", fixed_now());
        assert_eq!(id, "build-20260823143005");
    }
}
