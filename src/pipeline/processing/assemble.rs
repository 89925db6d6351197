use chrono::{Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::common::error::{PipelineError, Result};
use crate::domain::{CanonicalEvent, RawEventCandidate, VenueHint, VenueRecord};
use crate::registry::VenueProfile;

use super::datetime::{DateTimeResolver, ResolverConfig};
use super::enrich;
use super::identity;
use super::quality::{ContentClassifier, Verdict};

/// Assembly stages, in pipeline order. A candidate either reaches
/// `ReadyForUpsert` or exits at the stage that rejected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TitleCleaned,
    DateResolved,
    Classified,
    VenueResolved,
    CategoryTagged,
    Priced,
    ReadyForUpsert,
}

/// Leading "Event:" style prefixes on scraped titles.
static RE_TITLE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:event|events)\s*:\s*").unwrap());

/// Turns one venue's raw candidates into canonical events.
///
/// The assembler is a linear state machine with early-exit rejection;
/// every stage is pure and nothing downstream runs on a rejected
/// candidate. One assembler is built per source from its venue profile.
pub struct Assembler {
    profile: VenueProfile,
    resolver: DateTimeResolver,
    classifier: ContentClassifier,
}

impl Assembler {
    /// Build an assembler for one venue profile. `now` anchors year
    /// inference for dates that omit it.
    pub fn new(profile: VenueProfile, now: NaiveDate) -> Self {
        let resolver = DateTimeResolver::new(ResolverConfig {
            default_duration: Duration::hours(profile.default_duration_hours),
            now,
        });
        Self {
            profile,
            resolver,
            classifier: ContentClassifier::default(),
        }
    }

    /// Run one candidate through the full stage sequence.
    pub fn assemble(&self, candidate: &RawEventCandidate) -> Result<CanonicalEvent> {
        // TITLE_CLEANED
        let title = clean_title(&candidate.title);
        if title.is_empty() {
            return Err(PipelineError::RejectedLowQuality("empty title".to_string()));
        }
        debug!(stage = ?Stage::TitleCleaned, %title);

        // DATE_RESOLVED | REJECTED_DATE
        let span = self
            .resolver
            .resolve(&candidate.date_text, candidate.time_text.as_deref())?;
        debug!(stage = ?Stage::DateResolved, start = %span.start, end = %span.end);

        // CLASSIFIED | REJECTED_QUALITY
        let title = match self.classifier.classify(&title) {
            Verdict::Accept { text } => text,
            Verdict::Reject { reason } => {
                return Err(PipelineError::RejectedLowQuality(reason.to_string()));
            }
        };
        // A noisy description does not sink the candidate; it is simply
        // dropped. Only the title is load-bearing.
        let description = match candidate.description.as_deref() {
            Some(text) => match self.classifier.classify(text) {
                Verdict::Accept { text } => text,
                Verdict::Reject { .. } => String::new(),
            },
            None => String::new(),
        };
        debug!(stage = ?Stage::Classified, %title);

        // VENUE_RESOLVED
        let venue = self.resolve_venue(&candidate.venue);
        debug!(stage = ?Stage::VenueResolved, venue = %venue.name);

        // CATEGORY_TAGGED
        let (category, tags) =
            enrich::assign_category(self.profile.venue_class, &title, &description);
        debug!(stage = ?Stage::CategoryTagged, %category);

        // PRICED
        let price = enrich::extract_price(
            &format!("{} {}", title, description),
            &self.profile.price_default,
        );
        debug!(stage = ?Stage::Priced, %price);

        // READY_FOR_UPSERT
        let id = identity::event_id(&venue.name, &title, span.start.date())?;
        let event = CanonicalEvent {
            id,
            title,
            description,
            start_date: span.start,
            end_date: span.end,
            venue,
            category,
            price,
            tags,
            source_url: self.normalize_url(candidate.url.as_deref()),
            image_url: candidate
                .image_url
                .as_deref()
                .map(|url| self.normalize_url(Some(url)))
                .filter(|url| !url.is_empty()),
            scraped_at: Utc::now(),
        };
        debug!(stage = ?Stage::ReadyForUpsert, id = %event.id);
        Ok(event)
    }

    /// Normalize a venue hint to a full record.
    ///
    /// A bare name matching the profile venue takes the profile's full
    /// record; an unknown bare name gets a minimal record backfilled
    /// from the profile's locality defaults.
    fn resolve_venue(&self, hint: &VenueHint) -> VenueRecord {
        match hint {
            VenueHint::Structured(record) => record.clone(),
            VenueHint::Named(name) => {
                let name = name.trim();
                let profile_venue = &self.profile.venue;
                if name.is_empty() || name.eq_ignore_ascii_case(&profile_venue.name) {
                    profile_venue.clone()
                } else {
                    VenueRecord {
                        name: name.to_string(),
                        address: String::new(),
                        city: profile_venue.city.clone(),
                        province: profile_venue.province.clone(),
                        country: profile_venue.country.clone(),
                        coordinates: None,
                    }
                }
            }
        }
    }

    /// Resolve a possibly-relative URL against the profile base URL.
    fn normalize_url(&self, url: Option<&str>) -> String {
        let url = url.unwrap_or("").trim();
        if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match &self.profile.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                if url.starts_with('/') {
                    format!("{}{}", base, url)
                } else {
                    format!("{}/{}", base, url)
                }
            }
            None => url.to_string(),
        }
    }
}

/// Display cleanup applied to titles before classification and hashing:
/// trim, collapse internal whitespace, strip "Event:" prefixes and
/// trailing arrow/chevron glyphs.
pub fn clean_title(raw: &str) -> String {
    let trimmed = RE_TITLE_PREFIX.replace(raw.trim(), "");
    let stripped = trimmed.trim_end_matches(['\u{203a}', '\u{2039}', '\u{ab}', '\u{bb}', '\u{2192}', '>', ' ']);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
