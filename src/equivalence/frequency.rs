//! Frequency canonicalization and per-day magnitudes.
//!
//! Canonical codes: `daily`, `bid`, `tid`, `qid`, `qod`, `weekly`, `monthly`,
//! `immediately`, `q{n}h`, `q{a}-{b}h`, `q{n}d` and `{n}x daily`. Hour and
//! day intervals that equal a named code fold into it (`q12h` → `bid`).

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::{phrase_key, Lexicon};

static MEAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:\b(?:with|before|after)\s+(?:each\s+|a\s+)?meals?|\b(?:ac|pc))$").unwrap()
});
static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:q|every)\s*(\d+)\s*(?:-|to)\s*(\d+)\s*(?:h|hr|hrs|hours?)$").unwrap()
});
static HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:q|every)\s*(\d+)\s*(?:h|hr|hrs|hours?)$").unwrap());
static DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:q|every)\s*(\d+)\s*(?:d|days?)$").unwrap());
static TIMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(\d+|once|twice|thrice|one|two|three|four|five|six)\s*(?:x|times?)?\s*(?:daily|a\s+day|per\s+day|/\s*day)$",
    )
    .unwrap()
});
static RANGE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^q(\d+)-(\d+)h$").unwrap());
static HOURS_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^q(\d+)h$").unwrap());
static DAYS_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^q(\d+)d$").unwrap());
static TIMES_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)x daily$").unwrap());

fn fold_hours(hours: u32) -> String {
    match hours {
        24 => "daily".into(),
        12 => "bid".into(),
        8 => "tid".into(),
        6 => "qid".into(),
        48 => "qod".into(),
        168 => "weekly".into(),
        n => format!("q{n}h"),
    }
}

fn fold_days(days: u32) -> String {
    match days {
        1 => "daily".into(),
        2 => "qod".into(),
        7 => "weekly".into(),
        n => format!("q{n}d"),
    }
}

fn fold_times(count: &str) -> Option<String> {
    let n = match count {
        "once" | "one" => 1,
        "twice" | "two" => 2,
        "thrice" | "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        digits => digits.parse().ok()?,
    };
    Some(match n {
        1 => "daily".into(),
        2 => "bid".into(),
        3 => "tid".into(),
        4 => "qid".into(),
        n => format!("{n}x daily"),
    })
}

fn capture_u32(caps: &regex::Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

/// Canonical code for a frequency written any way the lexicon knows.
/// Unrecognized text comes back lowercased and single-spaced.
pub fn normalize_frequency_with(lexicon: &Lexicon, text: &str) -> String {
    let key = phrase_key(text.trim_matches(|c: char| c == '.' || c == ',' || c == ';'));
    if key.is_empty() {
        return key;
    }
    if let Some(canon) = lexicon.frequencies().lookup(&key) {
        return canon.to_string();
    }

    let stripped = MEAL_SUFFIX.replace(&key, "").trim().to_string();
    if !stripped.is_empty() && stripped != key {
        return normalize_frequency_with(lexicon, &stripped);
    }

    if let Some(caps) = RANGE.captures(&key) {
        if let (Some(low), Some(high)) = (capture_u32(&caps, 1), capture_u32(&caps, 2)) {
            return if low == high {
                fold_hours(low)
            } else {
                format!("q{}-{}h", low.min(high), low.max(high))
            };
        }
    }
    if let Some(hours) = HOURS.captures(&key).and_then(|c| capture_u32(&c, 1)) {
        return fold_hours(hours);
    }
    if let Some(days) = DAYS.captures(&key).and_then(|c| capture_u32(&c, 1)) {
        return fold_days(days);
    }
    if let Some(folded) = TIMES
        .captures(&key)
        .and_then(|c| c.get(1).and_then(|m| fold_times(m.as_str())))
    {
        return folded;
    }

    let contained = lexicon
        .frequencies()
        .find_iter(&key)
        .into_iter()
        .max_by(|a, b| {
            a.text
                .chars()
                .count()
                .cmp(&b.text.chars().count())
                .then(b.start.cmp(&a.start))
        });
    match contained {
        Some(m) => m.canonical,
        None => key,
    }
}

/// [`normalize_frequency_with`] on the built-in lexicon.
pub fn normalize_frequency(text: &str) -> String {
    normalize_frequency_with(Lexicon::global(), text)
}

/// Doses per day as `(low, high)`; equal bounds unless the code is a range.
/// `None` for codes with no known magnitude.
fn per_day_range(code: &str) -> Option<(f64, f64)> {
    let single = |v: f64| Some((v, v));
    match code {
        "" | "daily" | "immediately" => return single(1.0),
        "bid" => return single(2.0),
        "tid" => return single(3.0),
        "qid" => return single(4.0),
        "qod" => return single(0.5),
        "weekly" => return single(1.0 / 7.0),
        "monthly" => return single(1.0 / 30.0),
        _ => {}
    }
    if let Some(caps) = RANGE_CODE.captures(code) {
        let low = f64::from(capture_u32(&caps, 1)?);
        let high = f64::from(capture_u32(&caps, 2)?);
        if low > 0.0 && high > 0.0 {
            return Some((24.0 / high, 24.0 / low));
        }
    }
    if let Some(hours) = HOURS_CODE.captures(code).and_then(|c| capture_u32(&c, 1)) {
        return (hours > 0).then(|| (24.0 / f64::from(hours), 24.0 / f64::from(hours)));
    }
    if let Some(days) = DAYS_CODE.captures(code).and_then(|c| capture_u32(&c, 1)) {
        return (days > 0).then(|| (1.0 / f64::from(days), 1.0 / f64::from(days)));
    }
    if let Some(times) = TIMES_CODE.captures(code).and_then(|c| capture_u32(&c, 1)) {
        return single(f64::from(times));
    }
    None
}

/// Approximate doses per day. Ranges use their midpoint interval
/// (`q4-6h` → 24 / 5); unknown text counts as once daily.
pub fn freq_numeric(text: &str) -> f64 {
    let code = normalize_frequency(text);
    if let Some(caps) = RANGE_CODE.captures(&code) {
        if let (Some(low), Some(high)) = (capture_u32(&caps, 1), capture_u32(&caps, 2)) {
            let mid = f64::from(low + high) / 2.0;
            if mid > 0.0 {
                return 24.0 / mid;
            }
        }
    }
    per_day_range(&code).map_or(1.0, |(low, _)| low)
}

/// Whether two frequencies describe the same schedule. A blank frequency
/// means once daily. Ranges match any frequency inside their per-day span
/// (`q4-6h` ≡ `q6h`). Unrecognized text only matches itself.
pub fn frequencies_equivalent_with(lexicon: &Lexicon, a: &str, b: &str) -> bool {
    let blank_is_daily = |code: String| if code.is_empty() { "daily".to_string() } else { code };
    let a = blank_is_daily(normalize_frequency_with(lexicon, a));
    let b = blank_is_daily(normalize_frequency_with(lexicon, b));
    if a == b {
        return true;
    }
    if a == "immediately" || b == "immediately" {
        return false;
    }
    let (Some((a_low, a_high)), Some((b_low, b_high))) = (per_day_range(&a), per_day_range(&b))
    else {
        return false;
    };
    const EPS: f64 = 1e-9;
    a_low <= b_high + EPS && b_low <= a_high + EPS
}

pub fn frequencies_equivalent(a: &str, b: &str) -> bool {
    frequencies_equivalent_with(Lexicon::global(), a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_fold_to_codes() {
        assert_eq!(normalize_frequency("BID"), "bid");
        assert_eq!(normalize_frequency("two times a day"), "bid");
        assert_eq!(normalize_frequency("2 times a day"), "bid");
        assert_eq!(normalize_frequency("three times a day"), "tid");
        assert_eq!(normalize_frequency("every other day"), "qod");
        assert_eq!(normalize_frequency("once daily"), "daily");
        assert_eq!(normalize_frequency("6 times a day"), "6x daily");
    }

    #[test]
    fn hour_and_day_intervals_fold() {
        assert_eq!(normalize_frequency("q12h"), "bid");
        assert_eq!(normalize_frequency("Q6H"), "qid");
        assert_eq!(normalize_frequency("every 8 hours"), "tid");
        assert_eq!(normalize_frequency("q48h"), "qod");
        assert_eq!(normalize_frequency("q2d"), "qod");
        assert_eq!(normalize_frequency("q7d"), "weekly");
        assert_eq!(normalize_frequency("q4h"), "q4h");
        assert_eq!(normalize_frequency("every 4 to 6 hours"), "q4-6h");
        assert_eq!(normalize_frequency("q4-6h"), "q4-6h");
    }

    #[test]
    fn meal_suffix_is_dropped() {
        assert_eq!(normalize_frequency("tid with meals"), "tid");
        assert_eq!(normalize_frequency("tid before meals"), "tid");
        assert_eq!(normalize_frequency("twice daily with meals"), "bid");
        assert_eq!(normalize_frequency("with meals"), "tid");
    }

    #[test]
    fn normalization_is_idempotent() {
        for text in [
            "BID",
            "two times a day",
            "q12h",
            "every 4-6 hours",
            "q3d",
            "5 times a day",
            "tid with meals",
            "weekly",
            "immediately",
            "as directed",
            "",
        ] {
            let once = normalize_frequency(text);
            assert_eq!(normalize_frequency(&once), once, "{text}");
        }
    }

    #[test]
    fn numeric_magnitudes() {
        assert_eq!(freq_numeric(""), 1.0);
        assert_eq!(freq_numeric("daily"), 1.0);
        assert_eq!(freq_numeric("bid"), 2.0);
        assert_eq!(freq_numeric("tid"), 3.0);
        assert_eq!(freq_numeric("qid"), 4.0);
        assert_eq!(freq_numeric("q4h"), 6.0);
        assert_eq!(freq_numeric("q48h"), 0.5);
        assert_eq!(freq_numeric("q2d"), 0.5);
        assert_eq!(freq_numeric("5 times a day"), 5.0);
        assert!((freq_numeric("q4-6h") - 4.8).abs() < 1e-9);
        assert!((freq_numeric("weekly") - 1.0 / 7.0).abs() < 1e-9);
        assert_eq!(freq_numeric("as directed"), 1.0);
    }

    #[test]
    fn equivalence_ignores_phrasing() {
        assert!(frequencies_equivalent("BID", "two times a day"));
        assert!(frequencies_equivalent("q12h", "twice daily"));
        assert!(frequencies_equivalent("", "daily"));
        assert!(frequencies_equivalent("q4-6h", "q6h"));
        assert!(frequencies_equivalent("q4-6h", "qid"));
        assert!(!frequencies_equivalent("q4-6h", "q8h"));
        assert!(!frequencies_equivalent("bid", "tid"));
        assert!(!frequencies_equivalent("daily", "weekly"));
    }

    #[test]
    fn immediately_and_unknown_text() {
        assert!(!frequencies_equivalent("immediately", "daily"));
        assert!(frequencies_equivalent("immediately", "once now"));
        assert!(!frequencies_equivalent("as directed", "daily"));
        assert!(frequencies_equivalent("as directed", "As Directed"));
    }
}
