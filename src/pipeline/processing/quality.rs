use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use uuid::Uuid;

/// Outcome of classifying one scraped text fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The fragment looks like genuine event text. Over-long input is
    /// truncated, so downstream stages use this text, not the original.
    Accept { text: String },
    /// The fragment is scraping noise.
    Reject { reason: &'static str },
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept { .. })
    }
}

/// Length bounds for classified text.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Fragments shorter than this are rejected.
    pub min_len: usize,
    /// Fragments longer than this are truncated with an ellipsis.
    pub max_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_len: 3,
            max_len: 200,
        }
    }
}

/// Hex color codes leaking out of inline styles.
static RE_HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[0-9a-fA-F]{3,8}\b").unwrap());

/// SVG/CSS property fragments.
static RE_CSS_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:fill|stroke|transform)\s*:|viewBox=").unwrap());

/// Residual HTML tags.
static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").unwrap());

/// Empty object-literal braces.
static RE_EMPTY_BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\{\s*\}\s*$").unwrap());

/// Bare class/id attribute strings and selector fragments.
static RE_ATTR_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^\s*(?:class|id)\s*=|^\s*[.#][\w-]+\s*\{"#).unwrap());

/// Pure-numeric strings.
static RE_NUMERIC_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

/// Strings of nothing but whitespace, dashes, dots and underscores.
static RE_FILLER_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s.\-\u{2013}\u{2014}_]*$").unwrap());

/// Date-like substrings used by the positive-signal score.
static RE_DATEISH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\b\.?\s*\d{1,2}|\d{1,2}[:/]\d{2}|\b\d{4}\b")
        .unwrap()
});

/// Navigation and UI boilerplate, matched exactly (case-insensitive,
/// trailing arrow glyphs stripped first).
static NAV_TERMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "home",
        "about",
        "about us",
        "menu",
        "main menu",
        "submenu",
        "navigation",
        "login",
        "log in",
        "logout",
        "sign up",
        "sign in",
        "register",
        "search",
        "next",
        "previous",
        "prev",
        "more",
        "show more",
        "load more",
        "learn more",
        "read more",
        "see more",
        "view all",
        "see all",
        "get directions",
        "directions",
        "plan your visit",
        "buy tickets",
        "get tickets",
        "tickets",
        "contact",
        "contact us",
        "subscribe",
        "newsletter",
        "donate",
        "support",
        "membership",
        "shop",
        "share",
        "follow us",
        "facebook",
        "twitter",
        "instagram",
        "youtube",
        "linkedin",
        "accessibility",
        "privacy policy",
        "terms of use",
        "skip to content",
        "back to top",
        "events",
        "exhibitions",
        "calendar",
        "\u{ab}",
        "\u{bb}",
        "\u{2039}",
        "\u{203a}",
        "\u{2026}",
        "...",
    ]
    .into_iter()
    .collect()
});

/// Technical placeholder literals that web frameworks leak into text.
static PLACEHOLDER_TERMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "undefined",
        "null",
        "nan",
        "none",
        "n/a",
        "tbd",
        "tba",
        "true",
        "false",
        "[object object]",
    ]
    .into_iter()
    .collect()
});

/// Event nouns worth positive score.
static EVENT_NOUNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "exhibition",
        "exhibit",
        "concert",
        "workshop",
        "tour",
        "festival",
        "performance",
        "screening",
        "show",
        "gala",
        "market",
        "lecture",
        "opening",
        "recital",
        "fair",
        "walk",
    ]
});

/// URL path segments that suggest an event/exhibition/program page.
static EVENT_PATH_SEGMENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "/event",
        "/events",
        "/exhibition",
        "/exhibitions",
        "/program",
        "/programs",
        "/whats-on",
        "/calendar",
        "/shows",
    ]
});

/// Rule-based filter separating genuine event text from scraping noise.
///
/// Rules run as an ordered rejection cascade: markup leakage, then
/// navigation boilerplate, then technical placeholders, then length
/// bounds. The first matching rule decides.
pub struct ContentClassifier {
    config: ClassifierConfig,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl ContentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, text: &str) -> Verdict {
        let trimmed = text.trim();

        // Rule 1: markup/CSS leakage.
        if RE_HEX_COLOR.is_match(trimmed)
            || RE_CSS_FRAGMENT.is_match(trimmed)
            || RE_ATTR_FRAGMENT.is_match(trimmed)
        {
            return Verdict::Reject {
                reason: "markup_leakage",
            };
        }
        if RE_HTML_TAG.is_match(trimmed) || RE_EMPTY_BRACES.is_match(trimmed) {
            return Verdict::Reject {
                reason: "markup_leakage",
            };
        }

        // Rule 2: navigation/UI boilerplate.
        let bare = strip_trailing_glyphs(trimmed);
        if NAV_TERMS.contains(bare.to_lowercase().as_str()) {
            return Verdict::Reject {
                reason: "navigation_boilerplate",
            };
        }

        // Rule 3: technical placeholders.
        let lowered = trimmed.to_lowercase();
        if PLACEHOLDER_TERMS.contains(lowered.as_str())
            || RE_NUMERIC_ONLY.is_match(trimmed)
            || RE_FILLER_ONLY.is_match(trimmed)
            || Uuid::parse_str(trimmed).is_ok()
        {
            return Verdict::Reject {
                reason: "placeholder",
            };
        }

        // Rule 4: length bounds. Too-short rejects; too-long truncates.
        if trimmed.chars().count() < self.config.min_len {
            return Verdict::Reject { reason: "too_short" };
        }
        if trimmed.chars().count() > self.config.max_len {
            let truncated: String = trimmed.chars().take(self.config.max_len).collect();
            return Verdict::Accept {
                text: format!("{}\u{2026}", truncated.trim_end()),
            };
        }

        Verdict::Accept {
            text: trimmed.to_string(),
        }
    }

    /// Relative quality score for ranking competing extractions of the
    /// same page slot. Only meaningful between fragments that already
    /// passed [`classify`]; higher wins.
    pub fn score(&self, text: &str, url: Option<&str>) -> u32 {
        let lowered = text.to_lowercase();
        let mut score = 0u32;

        if RE_DATEISH.is_match(text) {
            score += 3;
        }
        for noun in EVENT_NOUNS.iter() {
            if lowered.contains(noun) {
                score += 2;
            }
        }
        if let Some(url) = url {
            let path = url.to_lowercase();
            if EVENT_PATH_SEGMENTS.iter().any(|seg| path.contains(seg)) {
                score += 3;
            }
        }
        // Longer descriptions carry more signal, up to a cap.
        score += (text.chars().count() as u32 / 40).min(5);

        score
    }
}

/// Trailing arrow/chevron glyphs on link text ("Get Directions \u{203a}").
fn strip_trailing_glyphs(text: &str) -> &str {
    text.trim_end_matches([
        '\u{203a}', '\u{2039}', '\u{ab}', '\u{bb}', '\u{2192}', '\u{2190}', '>', '<', ' ',
    ])
}
