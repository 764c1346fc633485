//! Per-administration counts: "1 tab", "2 puffs", "½ tablet", "one capsule".

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::{phrase_key, tables};

use super::{ParseContext, ParseState};

const WHOLE: &str = r"\d+|one|two|three|four|five|six|seven|eight|nine|ten";
const PART: &str = r"a\s+half|one-half|one\s+half|half|\d+\s*/\s*\d+";

/// `<count> <quantity word>`; group 1 is the count, group 2 the word.
/// Mixed counts ("1 1/2", "1½", "one and a half") are tried first.
pub(crate) static QTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:^|[\s(])((?:{WHOLE})\s+and\s+(?:{PART})|\d+\s+\d+\s*/\s*\d+|\d+\s*[¼½¾⅓⅔]|(?:\d+\s*/\s*\d+)|[¼½¾⅓⅔]|\d+(?:\.\d+)?|one-half|one\s+half|half|one|two|three|four|five|six|seven|eight|nine|ten)\s*(tablets?|tabs?|caplets?|capsules?|caps?|puffs?|inhalations?|actuations?|sprays?|drops?|gtts?|patch(?:es)?|lozenges?|troches?|suppositor(?:y|ies))\b",
    ))
    .unwrap()
});

/// Whole part and fraction of a mixed count.
static MIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+|[a-z]+)(?:\s+and\s+|\s+)?(\S.*)$").unwrap()
});

/// Numeric value of a count: digits, decimals, `n/m`, unicode fractions,
/// number words, or a whole number plus a fraction.
pub fn number_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Some(value) = simple_value(text) {
        return Some(value);
    }

    let caps = MIXED.captures(text)?;
    let whole = simple_value(caps.get(1)?.as_str())?;
    let part = simple_value(caps.get(2)?.as_str())?;
    (whole.fract() == 0.0 && part > 0.0 && part < 1.0).then_some(whole + part)
}

fn simple_value(text: &str) -> Option<f64> {
    match text {
        "¼" => return Some(0.25),
        "½" => return Some(0.5),
        "¾" => return Some(0.75),
        "⅓" => return Some(1.0 / 3.0),
        "⅔" => return Some(2.0 / 3.0),
        _ => {}
    }

    if let Some((num, den)) = text.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        return (den != 0.0).then(|| num / den);
    }

    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return text.parse().ok();
    }

    let key = phrase_key(text);
    tables::NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == key)
        .map(|(_, value)| *value)
}

/// Count in a quantity phrase such as `"½ tab"`, `"1/2 tab"` or
/// `"one tablet"`. A bare number is accepted as well.
pub fn parse_quantity(text: &str) -> Option<f64> {
    match QTY.captures(text).and_then(|caps| caps.get(1)) {
        Some(count) => number_value(count.as_str()),
        None => number_value(text),
    }
}

pub fn run(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    let Some(caps) = QTY.captures(&state.residual) else {
        return state;
    };
    let (Some(whole), Some(count), Some(word)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return state;
    };
    let Some(value) = number_value(count.as_str()) else {
        return state;
    };

    state.order.qty = Some(value);
    state.order.qty_unit = ctx
        .lexicon
        .standard_unit(word.as_str())
        .or_else(|| ctx.lexicon.standard_unit(word.as_str().trim_end_matches('s')))
        .unwrap_or_default()
        .to_string();

    let span = (count.start(), whole.end());
    state.excise(&[span]);
    tracing::debug!(qty = value, unit = %state.order.qty_unit, "Quantity extracted");
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexicon::Lexicon;
    use crate::models::ParsedOrder;

    fn apply(text: &str) -> ParseState {
        let config = ParserConfig::default();
        let ctx = ParseContext {
            lexicon: Lexicon::global(),
            config: &config,
        };
        run(ParseState::new(text.to_string(), ParsedOrder::new(text)), &ctx)
    }

    #[test]
    fn fractions_and_words() {
        assert_eq!(parse_quantity("½ tab"), Some(0.5));
        assert_eq!(parse_quantity("1/2 tab"), Some(0.5));
        assert_eq!(parse_quantity("one tablet"), Some(1.0));
        assert_eq!(parse_quantity("one half tablet"), Some(0.5));
        assert_eq!(parse_quantity("2 puffs"), Some(2.0));
        assert_eq!(parse_quantity("1.5"), Some(1.5));
        assert_eq!(parse_quantity("several"), None);
    }

    #[test]
    fn mixed_counts_add_up() {
        assert_eq!(parse_quantity("1 1/2 tabs"), Some(1.5));
        assert_eq!(parse_quantity("1½ tablets"), Some(1.5));
        assert_eq!(parse_quantity("one and a half tablets"), Some(1.5));
        assert_eq!(parse_quantity("two and one-half tablets"), Some(2.5));
        assert_eq!(number_value("one and two"), None);
    }

    #[test]
    fn mixed_count_is_consumed_whole() {
        let state = apply("Metformin 500 mg tab; take one and one-half tablets daily");
        assert_eq!(state.order.qty, Some(1.5));
        assert_eq!(state.order.qty_unit, "tablet");
        assert_eq!(state.residual, "Metformin 500 mg tab; take daily");
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert_eq!(number_value("1/0"), None);
        assert_eq!(number_value("inf"), None);
    }

    #[test]
    fn quantity_is_consumed_with_its_word() {
        let state = apply("Warfarin 2.5 mg 1 tab po daily");
        assert_eq!(state.order.qty, Some(1.0));
        assert_eq!(state.order.qty_unit, "tablet");
        assert_eq!(state.residual, "Warfarin 2.5 mg po daily");
    }

    #[test]
    fn strength_per_puff_is_not_a_quantity() {
        let state = apply("Albuterol HFA 90 mcg/puff - 2 puffs every 4-6 hours");
        assert_eq!(state.order.qty, Some(2.0));
        assert_eq!(state.order.qty_unit, "puff");
        assert_eq!(state.residual, "Albuterol HFA 90 mcg/puff - every 4-6 hours");
    }

    #[test]
    fn spelled_out_count() {
        let state = apply("Spiriva - inhale contents of one capsule daily");
        assert_eq!(state.order.qty, Some(1.0));
        assert_eq!(state.order.qty_unit, "capsule");
    }

    #[test]
    fn no_count_word() {
        let state = apply("Amlodipine tablet 5mg - 1 PO daily");
        assert_eq!(state.order.qty, None);
        assert_eq!(state.residual, "Amlodipine tablet 5mg - 1 PO daily");
    }
}
