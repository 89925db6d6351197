pub mod processing;
pub mod storage;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::common::error::{RejectionReason, Result};
use crate::domain::RawEventCandidate;
use crate::observability::metrics::PipelineMetrics;
use crate::registry::VenueRegistry;

use processing::assemble::Assembler;
use storage::{UpsertOutcome, UpsertSink};

/// Tallies for one pipeline invocation.
///
/// `seen` always equals `persisted + duplicates + rejected`; a batch of
/// N candidates with K failures still persists the N−K successes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub source_id: String,
    pub seen: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub duplicates: usize,
    pub rejected: HashMap<RejectionReason, usize>,
}

impl RunSummary {
    pub fn persisted(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Feed one source's candidates through the assembler and into the sink.
///
/// The dedup cache is scoped to this invocation and owned here, never
/// module state, so the pipeline stays referentially transparent. Every
/// failure is scoped to its candidate; the run itself only fails on
/// registry or sink errors.
pub async fn run_candidates(
    source_id: &str,
    candidates: &[RawEventCandidate],
    registry: &VenueRegistry,
    sink: &dyn UpsertSink,
    now: NaiveDate,
) -> Result<RunSummary> {
    let profile = registry.get(source_id)?;
    let assembler = Assembler::new(profile.clone(), now);

    let mut summary = RunSummary {
        source_id: source_id.to_string(),
        ..RunSummary::default()
    };
    let mut seen_ids: HashSet<String> = HashSet::new();

    for candidate in candidates {
        summary.seen += 1;
        PipelineMetrics::record_candidate_seen(source_id);

        let event = match assembler.assemble(candidate) {
            Ok(event) => event,
            Err(err) => {
                match err.rejection_reason() {
                    Some(reason) => {
                        // An identity failure past the cleaning stages is
                        // an assembler bug, not dirty input.
                        if reason == RejectionReason::InvalidIdentity {
                            error!(source_id, title = %candidate.title, %err, "identity input missing after assembly");
                        } else {
                            debug!(source_id, title = %candidate.title, %err, "candidate rejected");
                        }
                        PipelineMetrics::record_rejection(source_id, reason);
                        *summary.rejected.entry(reason).or_insert(0) += 1;
                        continue;
                    }
                    // Registry/sink-level errors abort the run.
                    None => return Err(err),
                }
            }
        };

        if !seen_ids.insert(event.id.clone()) {
            debug!(source_id, id = %event.id, "duplicate within run");
            PipelineMetrics::record_duplicate(source_id);
            summary.duplicates += 1;
            continue;
        }

        match sink.upsert(&event.id, &event).await? {
            UpsertOutcome::Inserted => summary.inserted += 1,
            UpsertOutcome::Updated => summary.updated += 1,
            UpsertOutcome::Unchanged => summary.unchanged += 1,
        }
        PipelineMetrics::record_persisted(source_id);
    }

    info!(
        source_id,
        seen = summary.seen,
        persisted = summary.persisted(),
        duplicates = summary.duplicates,
        rejected = summary.rejected_total(),
        "pipeline run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::PipelineError;
    use crate::domain::{VenueClass, VenueHint, VenueRecord};
    use crate::registry::VenueProfile;
    use storage::InMemorySink;

    fn registry() -> VenueRegistry {
        let mut registry = VenueRegistry::new();
        registry.insert(
            "bc_place",
            VenueProfile {
                venue: VenueRecord {
                    name: "BC Place".to_string(),
                    address: "777 Pacific Blvd".to_string(),
                    city: "Vancouver".to_string(),
                    province: "BC".to_string(),
                    country: "Canada".to_string(),
                    coordinates: None,
                },
                venue_class: VenueClass::Nightlife,
                default_duration_hours: 3,
                price_default: "Varies".to_string(),
                base_url: None,
            },
        );
        registry
    }

    fn candidate(title: &str, date_text: &str) -> RawEventCandidate {
        RawEventCandidate {
            title: title.to_string(),
            date_text: date_text.to_string(),
            time_text: None,
            description: None,
            url: None,
            venue: VenueHint::Named("BC Place".to_string()),
            image_url: None,
        }
    }

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_the_batch() {
        let sink = InMemorySink::new();
        let candidates = vec![
            candidate("Jonah Kagen Concert", "July 22, 2025"),
            candidate("Get Directions \u{203a}", "July 22, 2025"),
            candidate("Summer Nights", "no date here"),
            candidate("ROMWalks Plus: Park Lawn Cemetery", "July 23, 2025"),
        ];

        let summary = run_candidates("bc_place", &candidates, &registry(), &sink, now())
            .await
            .unwrap();

        assert_eq!(summary.seen, 4);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.rejected[&RejectionReason::LowQuality], 1);
        assert_eq!(summary.rejected[&RejectionReason::UnparseableDate], 1);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicates_within_run_are_skipped() {
        let sink = InMemorySink::new();
        let candidates = vec![
            candidate("Jonah Kagen Concert", "July 22, 2025"),
            candidate("Jonah Kagen Concert", "July 22, 2025"),
        ];

        let summary = run_candidates("bc_place", &candidates, &registry(), &sink, now())
            .await
            .unwrap();

        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_runs_converge() {
        let sink = InMemorySink::new();
        let candidates = vec![candidate("Jonah Kagen Concert", "July 22, 2025")];
        let registry = registry();

        let first = run_candidates("bc_place", &candidates, &registry, &sink, now())
            .await
            .unwrap();
        assert_eq!(first.inserted, 1);

        let second = run_candidates("bc_place", &candidates, &registry, &sink, now())
            .await
            .unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.unchanged, 1);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_source_fails_the_run() {
        let sink = InMemorySink::new();
        let err = run_candidates("nowhere", &[], &registry(), &sink, now())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownSource(_)));
    }

    #[tokio::test]
    async fn test_summary_arithmetic_holds() {
        let sink = InMemorySink::new();
        let candidates = vec![
            candidate("Jonah Kagen Concert", "July 22, 2025"),
            candidate("Jonah Kagen Concert", "July 22, 2025"),
            candidate("Menu", "July 22, 2025"),
            candidate("Night Market", "garbage"),
            candidate("ROMWalks Plus", "July 24, 2025"),
        ];

        let summary = run_candidates("bc_place", &candidates, &registry(), &sink, now())
            .await
            .unwrap();
        assert_eq!(
            summary.seen,
            summary.persisted() + summary.duplicates + summary.rejected_total()
        );
    }
}
