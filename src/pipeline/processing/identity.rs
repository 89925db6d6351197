use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::common::error::{PipelineError, Result};

/// Compute the content-addressable id for an event.
///
/// The digest is taken over `venue-title-day`, with the title lower-cased
/// and whitespace-collapsed and the date truncated to day granularity.
/// Time-of-day never affects the identity, so a corrected start time for
/// the same calendar event still deduplicates. The caller must pass an
/// already-cleaned title; display normalization happens in the assembler
/// strictly before hashing.
pub fn event_id(venue_name: &str, title: &str, start_day: NaiveDate) -> Result<String> {
    let venue_name = venue_name.trim();
    if venue_name.is_empty() {
        return Err(PipelineError::InvalidIdentityInput("venue name"));
    }

    let canonical_title = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if canonical_title.is_empty() {
        return Err(PipelineError::InvalidIdentityInput("title"));
    }

    let canonical = format!(
        "{}-{}-{}",
        venue_name,
        canonical_title,
        start_day.format("%Y-%m-%d")
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_identical_inputs_produce_identical_ids() {
        let a = event_id("BC Place", "The fin.", day(2025, 7, 22)).unwrap();
        let b = event_id("BC Place", "The fin.", day(2025, 7, 22)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_title_case_and_whitespace_do_not_affect_id() {
        let a = event_id("BC Place", "The  Fin.", day(2025, 7, 22)).unwrap();
        let b = event_id("BC Place", "the fin.", day(2025, 7, 22)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_changing_any_component_changes_id() {
        let base = event_id("BC Place", "The fin.", day(2025, 7, 22)).unwrap();
        assert_ne!(base, event_id("Rogers Arena", "The fin.", day(2025, 7, 22)).unwrap());
        assert_ne!(base, event_id("BC Place", "The fin. II", day(2025, 7, 22)).unwrap());
        assert_ne!(base, event_id("BC Place", "The fin.", day(2025, 7, 23)).unwrap());
    }

    #[test]
    fn test_no_collisions_over_a_corpus() {
        let venues = ["BC Place", "Royal Ontario Museum (ROM)", "Horseshoe Tavern"];
        let titles = ["Concert A", "Concert B", "ROMWalks Plus", "Night Market"];
        let mut seen = std::collections::HashSet::new();
        for venue in venues {
            for title in titles {
                for d in 1..=28 {
                    let id = event_id(venue, title, day(2025, 7, d)).unwrap();
                    assert!(seen.insert(id), "collision for {}/{}/{}", venue, title, d);
                }
            }
        }
    }

    #[test]
    fn test_missing_inputs_are_identity_errors() {
        let err = event_id("", "The fin.", day(2025, 7, 22)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidIdentityInput("venue name")));

        let err = event_id("BC Place", "   ", day(2025, 7, 22)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidIdentityInput("title")));
    }
}
