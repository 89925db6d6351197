use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::VenueClass;

/// `$NN` or `$NN-$NN`, with optional cents.
static RE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\d+(?:\.\d{2})?)(?:\s*-\s*\$?(\d+(?:\.\d{2})?))?").unwrap());

type CategoryTable = &'static [(&'static str, &'static [&'static str])];

static MUSEUM_CATEGORIES: CategoryTable = &[
    ("Art & Exhibitions", &["exhibition", "exhibit", "gallery", "art", "installation"]),
    ("Tours & Walks", &["walk", "tour", "cemetery"]),
    ("Educational", &["talk", "lecture", "conversation", "class", "course"]),
    ("Family", &["family", "kids", "children", "camp"]),
    ("Evening Events", &["after dark", "night", "evening"]),
];

static NIGHTLIFE_CATEGORIES: CategoryTable = &[
    ("Live Music", &["concert", "band", "live music", "dj", "tour"]),
    ("Comedy", &["comedy", "stand-up", "improv"]),
    ("Dance Party", &["party", "dance", "club night"]),
];

static THEATRE_CATEGORIES: CategoryTable = &[
    ("Theatre & Performance", &["play", "performance", "drama", "musical", "opera", "ballet", "dance"]),
    ("Film", &["film", "screening", "cinema", "movie"]),
    ("Comedy", &["comedy", "stand-up", "improv"]),
];

static FESTIVAL_CATEGORIES: CategoryTable = &[
    ("Music Festival", &["music", "concert", "stage", "headliner"]),
    ("Food & Drink", &["food", "beer", "wine", "tasting"]),
    ("Cultural Festival", &["culture", "heritage", "parade"]),
];

static COMMUNITY_CATEGORIES: CategoryTable = &[
    ("Markets", &["market", "bazaar", "vendors"]),
    ("Workshops", &["workshop", "class", "course"]),
    ("Family", &["family", "kids", "children"]),
    ("Community", &["community", "neighbourhood", "volunteer"]),
];

/// Category vocabulary per venue class. Table order is the tie-break:
/// on equal keyword scores the first-registered category wins. That
/// break is arbitrary and documented, not a quality ranking.
fn vocabulary(class: VenueClass) -> (CategoryTable, &'static str) {
    match class {
        VenueClass::Museum => (MUSEUM_CATEGORIES, "Museum Events"),
        VenueClass::Nightlife => (NIGHTLIFE_CATEGORIES, "Nightlife"),
        VenueClass::Theatre => (THEATRE_CATEGORIES, "Performing Arts"),
        VenueClass::Festival => (FESTIVAL_CATEGORIES, "Festival"),
        VenueClass::Community => (COMMUNITY_CATEGORIES, "Community Events"),
    }
}

/// Pick a category by keyword frequency against the class vocabulary.
///
/// Returns the winning category plus every matched keyword as tags.
/// With no keyword hits at all, the class fallback category applies.
pub fn assign_category(class: VenueClass, title: &str, description: &str) -> (String, Vec<String>) {
    let text = format!("{} {}", title, description).to_lowercase();
    let (table, fallback) = vocabulary(class);

    let mut best: Option<(&str, usize)> = None;
    let mut tags = Vec::new();

    for (category, keywords) in table {
        let mut score = 0;
        for keyword in *keywords {
            let hits = text.matches(keyword).count();
            if hits > 0 {
                score += hits;
                if !tags.iter().any(|t| t == keyword) {
                    tags.push(keyword.to_string());
                }
            }
        }
        // Strictly-greater keeps the first-registered winner on ties.
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((category, score));
        }
    }

    let category = best.map(|(c, _)| c).unwrap_or(fallback).to_string();
    (category, tags)
}

/// Extract a display price from event text.
///
/// Dollar amounts win, then free/admission/donation keywords, then the
/// venue-configured default.
pub fn extract_price(text: &str, default_price: &str) -> String {
    if let Some(caps) = RE_PRICE.captures(text) {
        return match caps.get(2) {
            Some(high) => format!("${}-${}", &caps[1], high.as_str()),
            None => format!("${}", &caps[1]),
        };
    }

    let lowered = text.to_lowercase();
    if lowered.contains("free") {
        return "Free".to_string();
    }
    if lowered.contains("donation") || lowered.contains("pay what you can") {
        return "By donation".to_string();
    }
    if lowered.contains("admission") {
        return "Included with admission".to_string();
    }

    default_price.to_string()
}
