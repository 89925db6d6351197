use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::common::error::{PipelineError, Result};

/// Resolved start/end of an event, in venue-local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Configuration for a [`DateTimeResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Duration assumed when only a start time is known. Venue-dependent:
    /// a talk runs shorter than a club night, so this comes from the
    /// venue profile rather than a constant.
    pub default_duration: Duration,
    /// Reference date for inferring omitted years. Injected so that year
    /// inference is deterministic under test.
    pub now: NaiveDate,
}

/// Parses free-text date and time fragments into an [`EventSpan`].
///
/// Fail-closed: text that cannot be parsed with confidence is an error.
/// The resolver never substitutes "today" or any fabricated placeholder
/// date.
pub struct DateTimeResolver {
    config: ResolverConfig,
}

/// Weekday prefixes ("Tuesday, July 22" or "Fri July 5 - Sat July 6").
static RE_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun)\.?,?\s+",
    )
    .unwrap()
});

/// The word "to" between two dates or times.
static RE_TO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+to\s+").unwrap());

/// `MM/DD/YYYY-MM/DD/YYYY`
static RE_NUMERIC_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})\s*-\s*(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap()
});

/// `MM/DD/YYYY`
static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());

/// `YYYY-MM-DD`
static RE_ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

/// `Month D-D[, YYYY]`: a span of days within one month.
static RE_DAY_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?\s*-\s*(\d{1,2})(?:st|nd|rd|th)?(?:\s*,?\s*(\d{4}))?$")
        .unwrap()
});

/// `Month D[, YYYY] - Month D[, YYYY]`: a span across months.
static RE_MONTH_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:\s*,?\s*(\d{4}))?\s*-\s*([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:\s*,?\s*(\d{4}))?$",
    )
    .unwrap()
});

/// `Month D[, YYYY]`
static RE_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:\s*,?\s*(\d{4}))?$").unwrap()
});

/// 12-hour clock time, with or without minutes: "7 pm", "7:30pm", "9:00 a.m."
static RE_TIME_12H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s?m\.?").unwrap());

/// 24-hour clock fallback: "19:00"
static RE_TIME_24H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

impl DateTimeResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve free-text date and optional time text into an event span.
    ///
    /// Times found in `time_text` win; if the caller has no separate time
    /// fragment, times embedded in the date text are used instead.
    pub fn resolve(&self, date_text: &str, time_text: Option<&str>) -> Result<EventSpan> {
        let cleaned = Self::clean_date_text(date_text);
        if cleaned.is_empty() {
            return Err(PipelineError::UnparseableDate(date_text.to_string()));
        }

        let times = match time_text {
            Some(text) => {
                let parsed = parse_times(text);
                if parsed.is_empty() {
                    parse_times(&cleaned)
                } else {
                    parsed
                }
            }
            None => parse_times(&cleaned),
        };

        let date_portion = Self::strip_time_fragments(&cleaned);
        let (start_day, end_day) = self.resolve_days(&date_portion, date_text)?;
        if end_day < start_day {
            return Err(PipelineError::MalformedRange);
        }

        let span = match (times.first().copied(), times.get(1).copied()) {
            // No time known: the span covers the date(s) at day granularity.
            (None, _) => EventSpan {
                start: start_day.and_hms_opt(0, 0, 0).unwrap(),
                end: end_day.and_hms_opt(23, 59, 59).unwrap(),
            },
            // Only a start time: the end is the configured default
            // duration past the start time on the final day.
            (Some(start_time), None) => {
                let start = start_day.and_time(start_time);
                EventSpan {
                    start,
                    end: end_day.and_time(start_time) + self.config.default_duration,
                }
            }
            // Start and end time. A same-day end earlier than the start
            // ("10 pm - 1 am") rolls into the next day.
            (Some(start_time), Some(end_time)) => {
                let start = start_day.and_time(start_time);
                let mut end = end_day.and_time(end_time);
                if start_day == end_day && end <= start {
                    end = end + Duration::days(1);
                }
                EventSpan { start, end }
            }
        };

        if span.end < span.start {
            return Err(PipelineError::MalformedRange);
        }
        Ok(span)
    }

    /// Strip weekday names, unify dash variants and "to", collapse runs
    /// of whitespace.
    fn clean_date_text(text: &str) -> String {
        let text = RE_WEEKDAY.replace_all(text.trim(), "");
        let text = text.replace(['\u{2013}', '\u{2014}'], "-");
        let text = RE_TO.replace_all(&text, " - ");
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Remove clock times and their joiners so the anchored date
    /// patterns can match text like "July 22, 2025 at 8pm".
    fn strip_time_fragments(cleaned: &str) -> String {
        let stripped = RE_TIME_12H.replace_all(cleaned, "");
        let stripped = RE_TIME_24H.replace_all(&stripped, "");
        let mut out = stripped
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        loop {
            let trimmed = out
                .trim_end_matches([' ', '-', ',', '@'])
                .trim_end_matches("at")
                .trim_end_matches(" from")
                .to_string();
            if trimmed == out {
                break;
            }
            out = trimmed;
        }
        out
    }

    /// Parse the date portion of the cleaned text into a start/end day.
    fn resolve_days(&self, cleaned: &str, original: &str) -> Result<(NaiveDate, NaiveDate)> {
        if let Some(caps) = RE_NUMERIC_RANGE.captures(cleaned) {
            let start = ymd(
                caps[3].parse().unwrap(),
                caps[1].parse().unwrap(),
                caps[2].parse().unwrap(),
                original,
            )?;
            let end = ymd(
                caps[6].parse().unwrap(),
                caps[4].parse().unwrap(),
                caps[5].parse().unwrap(),
                original,
            )?;
            return Ok((start, end));
        }

        if let Some(caps) = RE_DAY_SPAN.captures(cleaned) {
            let month = month_number(&caps[1])
                .ok_or_else(|| PipelineError::UnparseableDate(original.to_string()))?;
            let year = match caps.get(4) {
                Some(y) => y.as_str().parse().unwrap(),
                None => self.infer_year(month),
            };
            let start = ymd(year, month, caps[2].parse().unwrap(), original)?;
            let end = ymd(year, month, caps[3].parse().unwrap(), original)?;
            return Ok((start, end));
        }

        if let Some(caps) = RE_MONTH_SPAN.captures(cleaned) {
            let start_month = month_number(&caps[1])
                .ok_or_else(|| PipelineError::UnparseableDate(original.to_string()))?;
            let end_month = month_number(&caps[4])
                .ok_or_else(|| PipelineError::UnparseableDate(original.to_string()))?;
            let start_year_cap: Option<i32> = caps.get(3).map(|y| y.as_str().parse().unwrap());
            let end_year_cap: Option<i32> = caps.get(6).map(|y| y.as_str().parse().unwrap());

            let (start_year, end_year) = match (start_year_cap, end_year_cap) {
                (Some(s), Some(e)) => (s, e),
                // A single trailing year belongs to the end date; a range
                // that wraps the year boundary started the year before.
                (None, Some(e)) => {
                    if start_month > end_month {
                        (e - 1, e)
                    } else {
                        (e, e)
                    }
                }
                (Some(s), None) => {
                    if end_month < start_month {
                        (s, s + 1)
                    } else {
                        (s, s)
                    }
                }
                (None, None) => (self.infer_year(start_month), self.infer_year(end_month)),
            };

            let start = ymd(start_year, start_month, caps[2].parse().unwrap(), original)?;
            let end = ymd(end_year, end_month, caps[5].parse().unwrap(), original)?;
            return Ok((start, end));
        }

        if let Some(caps) = RE_NUMERIC.captures(cleaned) {
            let day = ymd(
                caps[3].parse().unwrap(),
                caps[1].parse().unwrap(),
                caps[2].parse().unwrap(),
                original,
            )?;
            return Ok((day, day));
        }

        if let Some(caps) = RE_ISO.captures(cleaned) {
            let day = ymd(
                caps[1].parse().unwrap(),
                caps[2].parse().unwrap(),
                caps[3].parse().unwrap(),
                original,
            )?;
            return Ok((day, day));
        }

        if let Some(caps) = RE_SINGLE.captures(cleaned) {
            let month = month_number(&caps[1])
                .ok_or_else(|| PipelineError::UnparseableDate(original.to_string()))?;
            let year = match caps.get(3) {
                Some(y) => y.as_str().parse().unwrap(),
                None => self.infer_year(month),
            };
            let day = ymd(year, month, caps[2].parse().unwrap(), original)?;
            return Ok((day, day));
        }

        Err(PipelineError::UnparseableDate(original.to_string()))
    }

    /// Year inference for dates that omit it: the current year, rolled
    /// forward when the month has already passed. Listings rarely
    /// advertise past events, so "Jan 12" scraped in July means next
    /// January.
    fn infer_year(&self, month: u32) -> i32 {
        if month < self.config.now.month() {
            self.config.now.year() + 1
        } else {
            self.config.now.year()
        }
    }
}

fn ymd(year: i32, month: u32, day: u32, original: &str) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| PipelineError::UnparseableDate(original.to_string()))
}

/// Extract up to two clock times from a text fragment, in order.
///
/// Labels around the time ("Door Time: 7:00 pm") are ignored; only the
/// clock portions are read. 12-hour times are preferred; a bare 24-hour
/// "HH:MM" is accepted when no am/pm time is present.
fn parse_times(text: &str) -> Vec<NaiveTime> {
    let mut times = Vec::new();
    for caps in RE_TIME_12H.captures_iter(text) {
        let hour: u32 = caps[1].parse().unwrap();
        if hour == 0 || hour > 12 {
            continue;
        }
        let minute: u32 = caps
            .get(2)
            .map(|m| m.as_str().parse().unwrap())
            .unwrap_or(0);
        let meridiem = caps[3].to_lowercase();
        let hour24 = match (hour, meridiem.as_str()) {
            (12, "a") => 0,
            (12, "p") => 12,
            (h, "p") => h + 12,
            (h, _) => h,
        };
        if let Some(time) = NaiveTime::from_hms_opt(hour24, minute, 0) {
            times.push(time);
            if times.len() == 2 {
                return times;
            }
        }
    }
    if !times.is_empty() {
        return times;
    }

    for caps in RE_TIME_24H.captures_iter(text) {
        let hour: u32 = caps[1].parse().unwrap();
        let minute: u32 = caps[2].parse().unwrap();
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            times.push(time);
            if times.len() == 2 {
                break;
            }
        }
    }
    times
}
