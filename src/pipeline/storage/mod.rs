pub mod in_memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::error::Result;
use crate::domain::CanonicalEvent;

pub use in_memory::InMemorySink;

/// Result of one keyed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Persistence contract consumed by the pipeline.
///
/// Writes are keyed uniquely by `id` and must be idempotent: repeated
/// calls with an unchanged payload report `Unchanged` and leave stored
/// state bit-for-bit identical. The pipeline never deletes and never
/// reads before writing; the sink's storage layer owns that.
#[async_trait]
pub trait UpsertSink: Send + Sync {
    async fn upsert(&self, id: &str, event: &CanonicalEvent) -> Result<UpsertOutcome>;
}

/// Serialization of the event minus the volatile scrape stamp, used by
/// sinks to decide `Updated` vs `Unchanged`. Two scrapes of identical
/// content differ only in `scraped_at` and must compare equal.
pub fn payload_fingerprint(event: &CanonicalEvent) -> serde_json::Value {
    let mut value = serde_json::to_value(event).expect("event serialization cannot fail");
    if let Some(map) = value.as_object_mut() {
        map.remove("scraped_at");
    }
    value
}
