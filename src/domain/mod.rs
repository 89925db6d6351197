use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates for a venue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A fully resolved venue. Every persisted event carries one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Venue information as it arrives from a scraper.
///
/// Scrapers either know only a display name, or carry the full record
/// from a per-venue constant block. The hint is normalized to a
/// `VenueRecord` at the pipeline boundary before any downstream stage
/// runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VenueHint {
    Named(String),
    Structured(VenueRecord),
}

impl VenueHint {
    pub fn name(&self) -> &str {
        match self {
            VenueHint::Named(name) => name,
            VenueHint::Structured(record) => &record.name,
        }
    }
}

/// Broad venue classification used to pick the category vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueClass {
    Museum,
    Nightlife,
    Theatre,
    Festival,
    Community,
}

/// Untrusted event data as extracted from a venue page.
///
/// Produced fresh per scrape pass and discarded after processing; none
/// of these fields have been cleaned or validated yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventCandidate {
    pub title: String,
    pub date_text: String,
    pub time_text: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub venue: VenueHint,
    pub image_url: Option<String>,
}

/// A normalized, deduplicated event record ready for persistence.
///
/// `id` is a content hash of `(venue name, normalized title, start day)`;
/// two scrapes of the same logical event always converge on the same id.
/// Dates are venue-local wall-clock times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub venue: VenueRecord,
    pub category: String,
    pub price: String,
    pub tags: Vec<String>,
    pub source_url: String,
    pub image_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_venue_hint_deserializes_bare_name() {
        let hint: VenueHint = serde_json::from_value(json!("BC Place")).unwrap();
        assert!(matches!(hint, VenueHint::Named(ref n) if n == "BC Place"));
        assert_eq!(hint.name(), "BC Place");
    }

    #[test]
    fn test_venue_hint_deserializes_structured_record() {
        let hint: VenueHint = serde_json::from_value(json!({
            "name": "Royal Ontario Museum (ROM)",
            "address": "100 Queens Park, Toronto, ON M5S 2C6",
            "city": "Toronto",
            "province": "ON",
            "country": "Canada",
            "coordinates": { "lat": 43.6677, "lng": -79.3948 }
        }))
        .unwrap();

        match hint {
            VenueHint::Structured(record) => {
                assert_eq!(record.city, "Toronto");
                assert_eq!(record.coordinates.unwrap().lat, 43.6677);
            }
            VenueHint::Named(_) => panic!("expected structured venue"),
        }
    }
}
