//! Pipeline counters.
//!
//! Counters are recorded through the `metrics` facade; binding an
//! exporter is the host's concern. With no recorder installed these
//! calls are no-ops.

use crate::common::error::RejectionReason;

/// Metrics collection for candidate processing.
pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_candidate_seen(source_id: &str) {
        ::metrics::counter!("normalizer_candidates_seen_total", "source" => source_id.to_string())
            .increment(1);
    }

    pub fn record_persisted(source_id: &str) {
        ::metrics::counter!("normalizer_events_persisted_total", "source" => source_id.to_string())
            .increment(1);
    }

    pub fn record_duplicate(source_id: &str) {
        ::metrics::counter!("normalizer_duplicates_total", "source" => source_id.to_string())
            .increment(1);
    }

    pub fn record_rejection(source_id: &str, reason: RejectionReason) {
        ::metrics::counter!(
            "normalizer_candidates_rejected_total",
            "source" => source_id.to_string(),
            "reason" => reason_label(reason)
        )
        .increment(1);
    }
}

fn reason_label(reason: RejectionReason) -> &'static str {
    match reason {
        RejectionReason::UnparseableDate => "unparseable_date",
        RejectionReason::LowQuality => "low_quality",
        RejectionReason::MalformedRange => "malformed_range",
        RejectionReason::InvalidIdentity => "invalid_identity",
    }
}
