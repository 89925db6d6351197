//! Shared normalization, quality-filtering and deduplication core for
//! venue event scrapers.
//!
//! Scrapers hand the pipeline loosely structured [`domain::RawEventCandidate`]s;
//! the pipeline cleans titles, resolves free-text dates, filters scraping
//! noise, resolves venues against per-source profiles, and writes
//! [`domain::CanonicalEvent`]s through an idempotent [`pipeline::storage::UpsertSink`]
//! keyed by a content hash, so repeated scrapes converge instead of
//! duplicating.

pub mod common;
pub mod domain;
pub mod observability;
pub mod pipeline;
pub mod registry;

pub use common::error::{PipelineError, RejectionReason, Result};
pub use domain::{CanonicalEvent, Coordinates, RawEventCandidate, VenueClass, VenueHint, VenueRecord};
pub use pipeline::processing::assemble::Assembler;
pub use pipeline::processing::datetime::{DateTimeResolver, EventSpan, ResolverConfig};
pub use pipeline::processing::identity::event_id;
pub use pipeline::processing::quality::{ClassifierConfig, ContentClassifier, Verdict};
pub use pipeline::storage::{InMemorySink, UpsertOutcome, UpsertSink};
pub use pipeline::{run_candidates, RunSummary};
pub use registry::{VenueProfile, VenueRegistry};
