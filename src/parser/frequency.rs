//! Frequency extraction.
//!
//! Cascade, first hit wins: "immediately", a guarded daily/bid/tid/qid
//! token, hour and day intervals, then the long-form phrase table. Orders
//! with a time of day but no frequency are once daily.

use std::sync::LazyLock;

use regex::Regex;

use crate::equivalence::normalize_frequency_with;
use crate::lexicon::phrase_key;

use super::{ParseContext, ParseState};

static IMMEDIATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bimmediately\b").unwrap());
static PRIMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(daily|bid|tid|qid)\b").unwrap());
/// A multiplier right before a primary token ("3 daily doses").
static NUM_LEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:once|twice|thrice|one|two|three|four|five|six|seven|eight|nine|ten)|(?:^|\s)\d+)\s*(?:x|times?)?\s*$",
    )
    .unwrap()
});
/// A subordinate clause right after a primary token ("daily if SBP > 100").
static NEG_TRAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s+(?:for|if|until|check|monitor|adjust)\b").unwrap());
static Q_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bq\s*(\d+)\s*(?:-|to)\s*(\d+)\s*(?:h|hr|hrs|hours?)\b").unwrap()
});
static EVERY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bevery\s+(\d+)\s*(?:-|to)\s*(\d+)\s*(?:h|hr|hrs|hours?)\b").unwrap()
});
static Q_HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bq\s*(\d+)\s*(?:h|hr|hrs|hours?)\b").unwrap());
static EVERY_HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bevery\s+(\d+)\s*(?:h|hr|hrs|hours?)\b").unwrap());
static Q_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bq\s*(\d+)\s*(?:d|days?)\b").unwrap());
static EVERY_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bevery\s+(\d+)\s*days?\b").unwrap());
/// Meal-anchored twice-daily wording that some sources write as tid.
static TWICE_WITH_MEALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btwice\s+(?:a\s+|per\s+)?(?:day|daily)\s+with\s+meals|\bbid\s+with\s+meals")
        .unwrap()
});

/// A frequency found in the residual.
struct Found {
    code: String,
    text: String,
    span: Option<(usize, usize)>,
}

fn immediate(text: &str) -> Option<Found> {
    let m = IMMEDIATE.find(text)?;
    Some(Found {
        code: "immediately".into(),
        text: m.as_str().to_string(),
        span: Some((m.start(), m.end())),
    })
}

fn primary(text: &str) -> Option<Found> {
    PRIMARY.find_iter(text).find_map(|m| {
        if NUM_LEAD.is_match(&text[..m.start()]) || NEG_TRAIL.is_match(&text[m.end()..]) {
            return None;
        }
        Some(Found {
            code: m.as_str().to_lowercase(),
            text: m.as_str().to_string(),
            span: Some((m.start(), m.end())),
        })
    })
}

fn interval(text: &str) -> Option<Found> {
    for regex in [&*Q_RANGE, &*EVERY_RANGE] {
        if let Some(caps) = regex.captures(text) {
            let (Some(whole), Some(low), Some(high)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            return Some(Found {
                code: format!("q{}-{}h", low.as_str(), high.as_str()),
                text: whole.as_str().to_string(),
                span: Some((whole.start(), whole.end())),
            });
        }
    }
    for (regex, suffix) in [(&*Q_HOURS, "h"), (&*EVERY_HOURS, "h"), (&*Q_DAYS, "d"), (&*EVERY_DAYS, "d")] {
        if let Some(caps) = regex.captures(text) {
            let (Some(whole), Some(n)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            return Some(Found {
                code: format!("q{}{suffix}", n.as_str()),
                text: whole.as_str().to_string(),
                span: Some((whole.start(), whole.end())),
            });
        }
    }
    None
}

/// Longest table phrase in the text, earliest on ties. Meal wording
/// ("with meals") is left in place for the administration stage.
fn table(text: &str, ctx: &ParseContext<'_>) -> Option<Found> {
    let best = ctx
        .lexicon
        .frequencies()
        .find_iter(text)
        .into_iter()
        .max_by(|a, b| {
            a.text
                .chars()
                .count()
                .cmp(&b.text.chars().count())
                .then(b.start.cmp(&a.start))
        })?;
    let keep = phrase_key(&best.text).starts_with("with ");
    Some(Found {
        code: best.canonical,
        span: (!keep).then_some((best.start, best.end)),
        text: best.text,
    })
}

pub fn run(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    let found = immediate(&state.residual)
        .or_else(|| primary(&state.residual))
        .or_else(|| interval(&state.residual))
        .or_else(|| table(&state.residual, ctx));

    let mut code = match found {
        Some(found) => {
            state.order.frequency_tokens.push(found.text.to_lowercase());
            if let Some(span) = found.span {
                state.excise(&[span]);
            }
            found.code
        }
        None if !state.order.time_of_day.is_empty() => "daily".to_string(),
        None => String::new(),
    };

    if !code.is_empty() {
        code = normalize_frequency_with(ctx.lexicon, &code);
    }
    if code == "tid"
        && ctx.config.meal_tid_downgrade
        && TWICE_WITH_MEALS.is_match(&state.order.original_raw)
    {
        tracing::debug!("Meal-anchored tid read as bid");
        code = "bid".into();
    }

    state.order.frequency = code;
    tracing::debug!(frequency = %state.order.frequency, "Frequency extracted");
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexicon::Lexicon;
    use crate::models::ParsedOrder;

    fn apply_with(text: &str, config: ParserConfig, time_of_day: &str) -> ParseState {
        let ctx = ParseContext {
            lexicon: Lexicon::global(),
            config: &config,
        };
        let mut order = ParsedOrder::new(text);
        order.time_of_day = time_of_day.to_string();
        run(ParseState::new(text.to_string(), order), &ctx)
    }

    fn apply(text: &str) -> ParseState {
        apply_with(text, ParserConfig::default(), "")
    }

    #[test]
    fn immediately_beats_everything() {
        let state = apply("Ceftriaxone 1 g IV immediately then daily");
        assert_eq!(state.order.frequency, "immediately");
        assert_eq!(state.order.frequency_tokens, vec!["immediately"]);
    }

    #[test]
    fn primary_tokens() {
        let state = apply("Metoprolol 25 mg BID");
        assert_eq!(state.order.frequency, "bid");
        assert_eq!(state.residual, "Metoprolol 25 mg");
    }

    #[test]
    fn multiplier_before_token_is_not_primary() {
        // falls through to the phrase table, which reads the whole phrase
        let state = apply("Gabapentin 300 mg three times daily");
        assert_eq!(state.order.frequency, "tid");
        assert_eq!(state.order.frequency_tokens, vec!["three times daily"]);
        assert_eq!(state.residual, "Gabapentin 300 mg");
    }

    #[test]
    fn number_inside_a_name_is_not_a_multiplier() {
        let state = apply("Omega-3 bid");
        assert_eq!(state.order.frequency, "bid");
        assert_eq!(state.residual, "Omega-3");
    }

    #[test]
    fn clause_after_token_is_not_primary() {
        let state = apply("Metoprolol 25 mg daily if HR > 60, bid");
        assert_eq!(state.order.frequency, "bid");
    }

    #[test]
    fn hour_intervals() {
        assert_eq!(apply("Albuterol q4-6h").order.frequency, "q4-6h");
        assert_eq!(apply("Albuterol every 4 to 6 hours").order.frequency, "q4-6h");
        assert_eq!(apply("Ondansetron Q6H").order.frequency, "qid");
        assert_eq!(apply("Ondansetron every 8 hours").order.frequency, "tid");
        assert_eq!(apply("Oxycodone q4h").order.frequency, "q4h");
        assert_eq!(apply("Vancomycin q12 hrs").order.frequency, "bid");
    }

    #[test]
    fn day_intervals() {
        assert_eq!(apply("Drug every 2 days").order.frequency, "qod");
        assert_eq!(apply("Drug q3d").order.frequency, "q3d");
        assert_eq!(apply("Drug every other day").order.frequency, "qod");
    }

    #[test]
    fn longest_table_phrase_wins() {
        let state = apply("Drug 5 mg two times a day");
        assert_eq!(state.order.frequency, "bid");
        assert_eq!(state.residual, "Drug 5 mg");
    }

    #[test]
    fn meal_wording_stays_for_administration() {
        let state = apply("Insulin 5 units with meals");
        assert_eq!(state.order.frequency, "tid");
        assert_eq!(state.residual, "Insulin 5 units with meals");
    }

    #[test]
    fn time_of_day_implies_daily() {
        let state = apply_with("Lasix 20 mg", ParserConfig::default(), "morning");
        assert_eq!(state.order.frequency, "daily");
        assert!(state.order.frequency_tokens.is_empty());

        let none = apply("Lasix 20 mg");
        assert_eq!(none.order.frequency, "");
    }

    #[test]
    fn twice_with_meals_downgrade() {
        let state = apply("Metformin 500 mg tid with meals - twice daily with meals per home list");
        assert_eq!(state.order.frequency, "bid");

        let config = ParserConfig {
            meal_tid_downgrade: false,
            ..ParserConfig::default()
        };
        let kept = apply_with(
            "Metformin 500 mg tid with meals - twice daily with meals per home list",
            config,
            "",
        );
        assert_eq!(kept.order.frequency, "tid");
    }

    #[test]
    fn plain_tid_with_meals_is_kept() {
        assert_eq!(apply("Insulin 5 units tid with meals").order.frequency, "tid");
    }
}
