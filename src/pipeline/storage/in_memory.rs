use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::{payload_fingerprint, UpsertOutcome, UpsertSink};
use crate::common::error::Result;
use crate::domain::CanonicalEvent;

/// In-memory sink implementation for development and testing.
#[derive(Debug, Default)]
pub struct InMemorySink {
    events: Mutex<HashMap<String, CanonicalEvent>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<CanonicalEvent> {
        self.events.lock().unwrap().get(id).cloned()
    }

    pub fn all(&self) -> Vec<CanonicalEvent> {
        self.events.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl UpsertSink for InMemorySink {
    async fn upsert(&self, id: &str, event: &CanonicalEvent) -> Result<UpsertOutcome> {
        let mut events = self.events.lock().unwrap();
        let outcome = match events.get(id) {
            None => UpsertOutcome::Inserted,
            Some(existing) if payload_fingerprint(existing) == payload_fingerprint(event) => {
                UpsertOutcome::Unchanged
            }
            Some(_) => UpsertOutcome::Updated,
        };

        match outcome {
            // Unchanged payload: stored state is left untouched, so the
            // original scraped_at stamp survives.
            UpsertOutcome::Unchanged => {
                debug!(%id, "event unchanged");
            }
            UpsertOutcome::Inserted => {
                events.insert(id.to_string(), event.clone());
                debug!(%id, title = %event.title, "inserted event");
            }
            UpsertOutcome::Updated => {
                events.insert(id.to_string(), event.clone());
                debug!(%id, title = %event.title, "updated event");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VenueRecord;
    use chrono::{NaiveDate, Utc};

    fn test_event(title: &str, price: &str) -> CanonicalEvent {
        let day = NaiveDate::from_ymd_opt(2025, 7, 22).unwrap();
        CanonicalEvent {
            id: "abc123".to_string(),
            title: title.to_string(),
            description: String::new(),
            start_date: day.and_hms_opt(19, 0, 0).unwrap(),
            end_date: day.and_hms_opt(22, 0, 0).unwrap(),
            venue: VenueRecord {
                name: "BC Place".to_string(),
                address: String::new(),
                city: "Vancouver".to_string(),
                province: "BC".to_string(),
                country: "Canada".to_string(),
                coordinates: None,
            },
            category: "Live Music".to_string(),
            price: price.to_string(),
            tags: vec!["concert".to_string()],
            source_url: String::new(),
            image_url: None,
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_unchanged() {
        let sink = InMemorySink::new();
        let event = test_event("The fin.", "$25");

        assert_eq!(sink.upsert(&event.id, &event).await.unwrap(), UpsertOutcome::Inserted);

        // Same payload, fresh scrape stamp: must be a no-op.
        let mut rescrape = event.clone();
        rescrape.scraped_at = Utc::now();
        assert_eq!(
            sink.upsert(&rescrape.id, &rescrape).await.unwrap(),
            UpsertOutcome::Unchanged
        );
        assert_eq!(sink.len(), 1);

        // Stored state is bit-for-bit the original insert.
        assert_eq!(sink.get(&event.id).unwrap(), event);
    }

    #[tokio::test]
    async fn test_changed_payload_updates_in_place() {
        let sink = InMemorySink::new();
        let event = test_event("The fin.", "$25");
        sink.upsert(&event.id, &event).await.unwrap();

        let corrected = test_event("The fin.", "$30");
        assert_eq!(
            sink.upsert(&corrected.id, &corrected).await.unwrap(),
            UpsertOutcome::Updated
        );
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(&event.id).unwrap().price, "$30");
    }

    #[test]
    fn test_fingerprint_ignores_scrape_stamp() {
        let a = test_event("The fin.", "$25");
        let mut b = a.clone();
        b.scraped_at = Utc::now() + chrono::Duration::days(1);
        assert_eq!(payload_fingerprint(&a), payload_fingerprint(&b));

        let c = test_event("Different", "$25");
        assert_ne!(payload_fingerprint(&a), payload_fingerprint(&c));
    }
}
