//! Order metadata: taper wording, start/end dates and refill counts.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::quantity::number_value;
use super::{collapse_whitespace, ParseContext, ParseState};

static TAPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:taper(?:ing)?|wean(?:ing)?)\b").unwrap());
static TAPER_LEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:[\s,;-]*\bthen)?[\s,;-]*$").unwrap());

const DATE: &str = r"(\d{1,2}/\d{1,2}/\d{2,4}|\d{4}-\d{2}-\d{2})";
static START_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:start(?:ing|s)?|begin(?:ning|s)?|from)\s*(?:on\s*)?:?\s*{DATE}"
    ))
    .unwrap()
});
static END_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:end(?:ing|s)?|stop(?:ping|s)?|until|through|thru|to)\s*(?:on\s*)?:?\s*{DATE}"
    ))
    .unwrap()
});

static REFILLS_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+|no|zero|one|two|three|four|five|six|seven|eight|nine|ten)\s+refills?\b")
        .unwrap()
});
static REFILLS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brefills?\s*[:=#]?\s*(\d+)\b").unwrap());

// ---------------------------------------------------------------------------
// Taper
// ---------------------------------------------------------------------------

/// Record taper wording. A taper clause that follows the dose is cut from the
/// residual so its step doses never compete with the current dose.
pub fn taper(mut state: ParseState, _ctx: &ParseContext<'_>) -> ParseState {
    let Some(m) = TAPER.find(&state.residual) else {
        return state;
    };
    state.order.taper_flag = Some(m.as_str().to_lowercase());

    let head = &state.residual[..m.start()];
    if head.chars().any(|c| c.is_ascii_digit()) {
        let cut = TAPER_LEAD.find(head).map_or(head.len(), |lead| lead.start());
        state.residual = collapse_whitespace(&head[..cut]);
    } else {
        let span = (m.start(), m.end());
        state.excise(&[span]);
    }
    tracing::debug!(taper = ?state.order.taper_flag, "Taper wording found");
    state
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse `m/d/yy`, `m/d/yyyy` or ISO dates.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.contains('-') {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    }
    let year_len = text.rsplit('/').next().map_or(0, str::len);
    let format = if year_len == 2 { "%m/%d/%y" } else { "%m/%d/%Y" };
    NaiveDate::parse_from_str(text, format).ok()
}

pub fn dates(mut state: ParseState, _ctx: &ParseContext<'_>) -> ParseState {
    let mut spans = Vec::new();

    for (field, regex) in [("start_date", &*START_DATE), ("end_date", &*END_DATE)] {
        let Some(caps) = regex.captures(&state.residual) else {
            continue;
        };
        let (Some(whole), Some(date)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        match parse_date(date.as_str()) {
            Some(parsed) => {
                if field == "start_date" {
                    state.order.start_date = Some(parsed);
                } else {
                    state.order.end_date = Some(parsed);
                }
                spans.push((whole.start(), whole.end()));
            }
            None => tracing::warn!(field, "Unparseable date in order, left in text"),
        }
    }

    state.excise(&spans);
    state
}

// ---------------------------------------------------------------------------
// Refills
// ---------------------------------------------------------------------------

pub fn refills(mut state: ParseState, _ctx: &ParseContext<'_>) -> ParseState {
    let caps = REFILLS_COUNT
        .captures(&state.residual)
        .or_else(|| REFILLS_LABEL.captures(&state.residual));
    let Some(caps) = caps else {
        return state;
    };
    let (Some(whole), Some(count)) = (caps.get(0), caps.get(1)) else {
        return state;
    };

    let value = match count.as_str().to_lowercase().as_str() {
        "no" => Some(0.0),
        other => number_value(other),
    };
    if let Some(value) = value.filter(|v| *v >= 0.0 && v.fract() == 0.0) {
        state.order.refills = Some(value as u32);
        let span = (whole.start(), whole.end());
        state.excise(&[span]);
    }
    state
}
