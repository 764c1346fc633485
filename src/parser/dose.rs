//! Dose strength extraction.
//!
//! Candidates are tried in a fixed cascade: weight-based dosing, two-part
//! combination strengths, several distinct mg strengths, the ranked unit
//! scan, then a bare-number fallback. The first level that yields a dose
//! wins. Afterwards mcg and g are folded into mg, the late quantity pass
//! reads the untouched order text, and the total is computed.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::{parse_number, NUMBER};
use crate::models::DoseValue;

use super::quantity::{number_value, QTY};
use super::{collapse_whitespace, round_to, ParseContext, ParseState};

static ELEMENTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*\d+(?:\.\d+)?\s*mg\s*(?:of\s+)?elemental[^)]*\)").unwrap()
});
static MAX_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\(?\s*\b(?:max(?:imum)?(?:\s+daily)?(?:\s+dose)?|not\s+to\s+exceed|do\s+not\s+exceed|no\s+more\s+than)\b[^;,)]*\)?",
    )
    .unwrap()
});
static WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)({NUMBER})\s*mg\s*/\s*kg\b")).unwrap());
static COMBO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)({NUMBER})\s*(?:mg)?\s*[-/+]\s*({NUMBER})\s*mg\b")).unwrap()
});
static MG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)({NUMBER})\s*(?:mg|mgs|milligrams?)\b")).unwrap()
});
static FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:^|[\s(])({NUMBER})(?:\s*([a-z]+))?")).unwrap()
});
static RELEASE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[-\s]*(xr|er|sr|la|xl|cr|dr)\b").unwrap());
static LEADING_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:give|take|administer)\s*$").unwrap());

/// Words after a bare number that make it a unit of the fallback vocabulary.
const FALLBACK_UNITS: &[(&str, &str)] = &[
    ("tsp", "tsp"),
    ("teaspoon", "tsp"),
    ("teaspoons", "tsp"),
    ("tbsp", "tbsp"),
    ("tablespoon", "tbsp"),
    ("tablespoons", "tbsp"),
    ("each", "each"),
    ("ea", "each"),
    ("dose", "dose"),
    ("doses", "dose"),
    ("tab", "tablet"),
    ("tabs", "tablet"),
    ("tablet", "tablet"),
    ("tablets", "tablet"),
    ("cap", "capsule"),
    ("caps", "capsule"),
    ("capsule", "capsule"),
    ("capsules", "capsule"),
    ("lozenge", "lozenge"),
    ("suppository", "suppository"),
];

/// Words after a bare number that make it a count of time or events.
const NOT_A_DOSE: &[&str] = &[
    "h", "hr", "hrs", "hour", "hours", "hourly", "d", "day", "days", "wk", "wks", "week", "weeks",
    "month", "months", "min", "mins", "minute", "minutes", "time", "times", "x", "refill",
    "refills", "more",
];

/// A dose found by one cascade level.
#[derive(Debug, Clone, PartialEq)]
struct DoseHit {
    value: DoseValue,
    unit: String,
    written_unit: String,
    spans: Vec<(usize, usize)>,
}

/// A `<number><unit>` occurrence from the unit scan.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    rank: usize,
    start: usize,
    end: usize,
    value: f64,
    unit: String,
    written_unit: String,
}

pub fn run(mut state: ParseState, ctx: &ParseContext<'_>) -> ParseState {
    strip_asides(&mut state);

    let text = state.residual.clone();
    let fixed = weight_based(&text)
        .or_else(|| combination(&text))
        .or_else(|| multiple_mg(&text));
    let hit = match fixed {
        Some(hit) => Some(hit),
        None => ranked_scan(&text, &mut state, ctx).or_else(|| fallback(&text, &mut state)),
    };

    if let Some(hit) = hit {
        state.order.dose.unit = hit.unit;
        state.order.raw_unit = hit.written_unit;
        state.order.dose.value = Some(hit.value);
        state.excise(&hit.spans);
    }

    normalize_units(&mut state, ctx);
    late_quantity(&mut state, ctx);
    compute_total(&mut state, ctx);

    tracing::debug!(
        unit = %state.order.dose.unit,
        has_value = state.order.dose.value.is_some(),
        qty = ?state.order.qty,
        "Dose extracted"
    );
    state
}

/// Remove elemental-content asides and maximum-dose clauses, whose numbers
/// are never the ordered dose.
fn strip_asides(state: &mut ParseState) {
    let without_elemental = ELEMENTAL.replace_all(&state.residual, " ");
    let without_max = MAX_DOSE.replace_all(&without_elemental, " ");
    state.residual = collapse_whitespace(&without_max);
}

// ---------------------------------------------------------------------------
// Cascade levels
// ---------------------------------------------------------------------------

fn weight_based(text: &str) -> Option<DoseHit> {
    let caps = WEIGHT.captures(text)?;
    let whole = caps.get(0)?;
    let value = parse_number(caps.get(1)?.as_str())?;
    Some(DoseHit {
        value: DoseValue::Single(value),
        unit: "mg/kg".into(),
        written_unit: "mg/kg".into(),
        spans: vec![(whole.start(), whole.end())],
    })
}

fn combination(text: &str) -> Option<DoseHit> {
    let caps = COMBO.captures(text)?;
    let whole = caps.get(0)?;
    let first = parse_number(caps.get(1)?.as_str())?;
    let second = parse_number(caps.get(2)?.as_str())?;
    Some(DoseHit {
        value: DoseValue::Multiple(vec![first, second]),
        unit: "mg".into(),
        written_unit: "mg".into(),
        spans: vec![(whole.start(), whole.end())],
    })
}

/// Two or more distinct mg strengths ("Lisinopril 20mg / HCTZ 12.5mg").
/// The same strength written twice is one dose, left to the unit scan.
fn multiple_mg(text: &str) -> Option<DoseHit> {
    let mut values = Vec::new();
    let mut spans = Vec::new();
    for caps in MG.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(value) = parse_number(number.as_str()) else {
            continue;
        };
        values.push(value);
        spans.push((whole.start(), whole.end()));
    }

    let distinct = values.iter().any(|v| (v - values[0]).abs() > f64::EPSILON);
    if values.len() < 2 || !distinct {
        return None;
    }
    Some(DoseHit {
        value: DoseValue::Multiple(values),
        unit: "mg".into(),
        written_unit: "mg".into(),
        spans,
    })
}

/// Every `<number><unit>` occurrence, ranked by unit precedence and then
/// position. Strength units outrank dosage-form units.
fn candidates(text: &str, ctx: &ParseContext<'_>) -> Vec<Candidate> {
    let mut found: Vec<Candidate> = ctx
        .lexicon
        .unit_scan()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = parse_number(caps.get(1)?.as_str())?;
            let written = caps.get(2)?.as_str();
            let unit = ctx.lexicon.standard_unit(written)?.to_string();
            Some(Candidate {
                rank: ctx.lexicon.unit_rank(&unit),
                start: whole.start(),
                end: whole.end(),
                value,
                unit,
                written_unit: written.to_lowercase(),
            })
        })
        .collect();
    found.sort_by_key(|c| (c.rank, c.start));
    found
}

fn ranked_scan(text: &str, state: &mut ParseState, ctx: &ParseContext<'_>) -> Option<DoseHit> {
    let ranked = candidates(text, ctx);
    for c in &ranked {
        tracing::trace!(unit = %c.unit, rank = c.rank, start = c.start, "Dose candidate");
    }
    let best = ranked.into_iter().next()?;
    let mut spans = vec![(best.start, best.end)];

    if let Some(tail) = RELEASE_TAIL.captures(&text[best.end..]) {
        if let (Some(whole), Some(code)) = (tail.get(0), tail.get(1)) {
            if state.order.formulation.is_empty() {
                if let Some(family) = ctx.lexicon.formulations().lookup(code.as_str()) {
                    state.order.formulation = family.to_string();
                }
            }
            spans.push((best.end + whole.start(), best.end + whole.end()));
        }
    }
    if let Some(verb) = LEADING_VERB.find(&text[..best.start]) {
        spans.push((verb.start(), verb.end()));
    }

    if matches!(best.unit.as_str(), "tablet" | "capsule") && state.order.form.is_empty() {
        if let Some(form) = ctx.lexicon.form_for_unit(&best.unit) {
            state.order.form = form.to_string();
        }
    }
    // A spray or puff count describes the per-dose quantity too.
    if matches!(best.unit.as_str(), "spray" | "puff") && state.order.qty.is_none() {
        state.order.qty = Some(best.value);
        state.order.qty_unit = best.unit.clone();
    }

    Some(DoseHit {
        value: DoseValue::Single(best.value),
        unit: best.unit,
        written_unit: best.written_unit,
        spans,
    })
}

fn fallback(text: &str, state: &mut ParseState) -> Option<DoseHit> {
    for caps in FALLBACK.captures_iter(text) {
        let Some(number) = caps.get(1) else {
            continue;
        };
        let Some(value) = parse_number(number.as_str()) else {
            continue;
        };
        let word = caps.get(2).map(|w| w.as_str().to_lowercase());
        if word.as_deref().is_some_and(|w| NOT_A_DOSE.contains(&w)) {
            continue;
        }

        let unit = word
            .as_deref()
            .and_then(|w| FALLBACK_UNITS.iter().find(|(written, _)| *written == w))
            .map(|(_, unit)| *unit);
        let end = match (unit, caps.get(2)) {
            (Some(_), Some(w)) => w.end(),
            _ => number.end(),
        };
        let unit = unit.unwrap_or_default();

        if matches!(unit, "tablet" | "capsule") && state.order.form.is_empty() {
            state.order.form = unit.to_string();
        }
        return Some(DoseHit {
            value: DoseValue::Single(value),
            unit: unit.to_string(),
            written_unit: word.filter(|_| !unit.is_empty()).unwrap_or_default(),
            spans: vec![(number.start(), end)],
        });
    }
    None
}

// ---------------------------------------------------------------------------
// Post-processing
// ---------------------------------------------------------------------------

/// Fold mcg and g into mg and round to the configured precision.
fn normalize_units(state: &mut ParseState, ctx: &ParseContext<'_>) {
    let dose = &mut state.order.dose;
    let factor = match dose.unit.as_str() {
        "mcg" => Some(0.001),
        "g" => Some(1000.0),
        _ => None,
    };
    let places = ctx.config.dose_precision;

    if let Some(factor) = factor {
        dose.unit = "mg".into();
        state.order.raw_unit = "mg".into();
        if let Some(value) = dose.value.as_mut() {
            match value {
                DoseValue::Single(v) => *v = round_to(*v * factor, places),
                DoseValue::Multiple(vs) => {
                    for v in vs.iter_mut() {
                        *v = round_to(*v * factor, places);
                    }
                }
            }
        }
    } else if dose.unit == "mg" {
        if let Some(DoseValue::Single(v)) = dose.value.as_mut() {
            *v = round_to(*v, places);
        }
    }
}

/// When no quantity was found, look for a trailing count in the untouched
/// order text. A count that merely restates the dose is ignored.
fn late_quantity(state: &mut ParseState, ctx: &ParseContext<'_>) {
    if state.order.qty.is_some() {
        return;
    }
    let raw = state.order.original_raw.clone();
    let Some(caps) = QTY.captures_iter(&raw).last() else {
        return;
    };
    let (Some(count), Some(word)) = (caps.get(1), caps.get(2)) else {
        return;
    };
    let Some(value) = number_value(count.as_str()) else {
        return;
    };
    let unit = ctx
        .lexicon
        .standard_unit(word.as_str())
        .unwrap_or_default()
        .to_string();

    let dose = &state.order.dose;
    let duplicates_dose = dose.unit == unit
        && dose
            .scalar()
            .is_some_and(|d| (d - value).abs() < f64::EPSILON);
    if duplicates_dose {
        return;
    }
    state.order.qty = Some(value);
    state.order.qty_unit = unit;
}

fn compute_total(state: &mut ParseState, ctx: &ParseContext<'_>) {
    let order = &mut state.order;
    let countable = ctx.lexicon.is_countable(&order.dose.unit);

    // A dose counted in tablets or puffs is its own quantity.
    if order.qty.is_none() && countable {
        if let Some(value) = order.dose.scalar() {
            order.qty = Some(value);
            order.qty_unit = order.dose.unit.clone();
        }
    }

    order.dose.total = match (&order.dose.value, order.dose.unit.as_str()) {
        (None, _) | (Some(DoseValue::Multiple(_)), _) | (_, "mg/kg") => None,
        (Some(DoseValue::Single(value)), _) if countable => Some(*value),
        (Some(DoseValue::Single(value)), _) => {
            let qty = order.qty.unwrap_or(1.0);
            Some(round_to(value * qty, ctx.config.dose_precision))
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::lexicon::Lexicon;
    use crate::models::ParsedOrder;

    fn apply_with(text: &str, qty: Option<f64>) -> ParseState {
        let config = ParserConfig::default();
        let ctx = ParseContext {
            lexicon: Lexicon::global(),
            config: &config,
        };
        let mut order = ParsedOrder::new(text);
        order.qty = qty;
        run(ParseState::new(text.to_string(), order), &ctx)
    }

    fn apply(text: &str) -> ParseState {
        apply_with(text, None)
    }

    #[test]
    fn micrograms_fold_into_mg() {
        let state = apply("Levothyroxine 100 mcg daily");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(0.1)));
        assert_eq!(state.order.dose.unit, "mg");
        assert_eq!(state.order.raw_unit, "mg");
        assert_eq!(state.order.dose.total, Some(0.1));
        assert_eq!(state.residual, "Levothyroxine daily");
    }

    #[test]
    fn grams_fold_into_mg() {
        let gram = apply("Cefazolin 1 gram IV q8h");
        let g = apply("Cefazolin 1 g IV q8h");
        assert_eq!(gram.order.dose, g.order.dose);
        assert_eq!(gram.order.dose.value, Some(DoseValue::Single(1000.0)));
        assert_eq!(gram.order.raw_unit, "mg");
        assert_eq!(g.order.raw_unit, "mg");
    }

    #[test]
    fn weight_based_dose_has_no_total() {
        let state = apply("Vancomycin 15 mg/kg IV q12h");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(15.0)));
        assert_eq!(state.order.dose.unit, "mg/kg");
        assert_eq!(state.order.dose.total, None);
    }

    #[test]
    fn combination_strength() {
        let state = apply_with("Lisinopril/HCTZ 20-12.5mg - daily", Some(1.0));
        assert_eq!(
            state.order.dose.value,
            Some(DoseValue::Multiple(vec![20.0, 12.5]))
        );
        assert_eq!(state.order.dose.unit, "mg");
        assert_eq!(state.order.dose.total, None);
        assert_eq!(state.residual, "Lisinopril/HCTZ - daily");
    }

    #[test]
    fn separate_strengths_form_a_list() {
        let state = apply("Lisinopril 20mg / Hydrochlorothiazide 12.5mg combination tablet");
        assert_eq!(
            state.order.dose.value,
            Some(DoseValue::Multiple(vec![20.0, 12.5]))
        );
        assert_eq!(state.residual, "Lisinopril / Hydrochlorothiazide combination tablet");
    }

    #[test]
    fn repeated_strength_is_one_dose() {
        let state = apply("Metformin 500 mg tablet - take 500 mg daily");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(500.0)));
        assert_eq!(state.residual, "Metformin tablet - take 500 mg daily");
    }

    #[test]
    fn strength_outranks_form_count() {
        let state = apply("Potassium chloride 2 tablets 20 mEq daily");
        assert_eq!(state.order.dose.unit, "mEq");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(20.0)));
    }

    #[test]
    fn thousands_separator_is_one_number() {
        let state = apply("Vitamin D3 50,000 IU weekly");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(50000.0)));
        assert_eq!(state.order.dose.unit, "unit");
        assert_eq!(state.order.raw_unit, "iu");
        assert_eq!(state.residual, "Vitamin D3 weekly");

        let state = apply("Heparin 5,000 units subcut q8h");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(5000.0)));
    }

    #[test]
    fn dose_times_quantity() {
        let state = apply_with("Warfarin 2.5 mg po daily", Some(2.0));
        assert_eq!(state.order.dose.total, Some(5.0));
    }

    #[test]
    fn elemental_aside_is_ignored() {
        let state = apply("Ferrous sulfate 325 mg (65 mg elemental iron) daily");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(325.0)));
        assert_eq!(state.residual, "Ferrous sulfate daily");
    }

    #[test]
    fn maximum_dose_clause_is_ignored() {
        let state = apply("Acetaminophen 650 mg q6h prn pain, max 3000 mg per day");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(650.0)));
    }

    #[test]
    fn trailing_release_marker_becomes_formulation() {
        let state = apply("Metoprolol 25 mg-XL daily");
        assert_eq!(state.order.formulation, "extended release");
        assert_eq!(state.residual, "Metoprolol daily");
    }

    #[test]
    fn leading_verb_is_stripped() {
        let state = apply("Heparin give 5000 units subcut q8h");
        assert_eq!(state.order.dose.unit, "unit");
        assert_eq!(state.residual, "Heparin subcut q8h");
    }

    #[test]
    fn spray_dose_sets_quantity() {
        let state = apply("Fluticasone 2 sprays each nostril daily");
        assert_eq!(state.order.dose.unit, "spray");
        assert_eq!(state.order.qty, Some(2.0));
        assert_eq!(state.order.dose.total, Some(2.0));
    }

    #[test]
    fn late_quantity_from_original_text() {
        // the residual has lost the count; the original text still has it
        let config = ParserConfig::default();
        let ctx = ParseContext {
            lexicon: Lexicon::global(),
            config: &config,
        };
        let order = ParsedOrder::new("Metformin 500 mg daily - 1 tab");
        let state = run(ParseState::new("Metformin 500 mg daily".into(), order), &ctx);
        assert_eq!(state.order.qty, Some(1.0));
        assert_eq!(state.order.qty_unit, "tablet");
        assert_eq!(state.order.dose.total, Some(500.0));
    }

    #[test]
    fn countable_dose_is_its_own_quantity() {
        let state = apply("Acetaminophen 2 tabs q6h");
        assert_eq!(state.order.dose.unit, "tablet");
        assert_eq!(state.order.qty, Some(2.0));
        assert_eq!(state.order.dose.total, Some(2.0));
        assert_eq!(state.order.form, "tablet");
    }

    #[test]
    fn fallback_bare_number() {
        let state = apply("Lactulose 2 tbsp bid");
        assert_eq!(state.order.dose.unit, "tbsp");
        assert_eq!(state.order.dose.value, Some(DoseValue::Single(2.0)));
        assert_eq!(state.residual, "Lactulose bid");
    }

    #[test]
    fn fallback_skips_time_counts() {
        let state = apply("Ondansetron every 8 hours");
        assert!(state.order.dose.is_empty());
        assert_eq!(state.residual, "Ondansetron every 8 hours");
    }

    #[test]
    fn no_numbers_no_dose() {
        let state = apply("Multivitamin daily");
        assert!(state.order.dose.is_empty());
        assert_eq!(state.order.dose.total, None);
    }
}
