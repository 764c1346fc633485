//! Free-text medication order parser.
//!
//! An order string is preprocessed, then passed through a fixed list of
//! extraction stages. Each stage reads the residual text, fills fields of the
//! order and removes what it consumed, so later stages never see text an
//! earlier stage already claimed. Stage order is part of the contract:
//! time-of-day wording must be gone before frequency parsing, PRN conditions
//! before quantities, refill counts before doses, and doses before dosage
//! forms.

pub mod administration;
pub mod dose;
pub mod drug;
pub mod form;
pub mod frequency;
pub mod indication;
pub mod metadata;
pub mod preprocess;
pub mod quantity;
pub mod route;
pub mod timing;

pub use preprocess::{preprocess, Preprocessed};
pub use quantity::parse_quantity;

use crate::config::ParserConfig;
use crate::lexicon::Lexicon;
use crate::models::ParsedOrder;

// ═══════════════════════════════════════════════════════════
// Pipeline types
// ═══════════════════════════════════════════════════════════

/// Text not yet claimed by any stage, plus the order built so far.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseState {
    pub residual: String,
    pub order: ParsedOrder,
}

impl ParseState {
    pub fn new(residual: String, order: ParsedOrder) -> Self {
        Self { residual, order }
    }

    /// Remove the given byte spans from the residual.
    pub fn excise(&mut self, spans: &[(usize, usize)]) {
        self.residual = excise_spans(&self.residual, spans);
    }
}

/// Read-only inputs shared by every stage.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub lexicon: &'a Lexicon,
    pub config: &'a ParserConfig,
}

pub type StageFn = fn(ParseState, &ParseContext<'_>) -> ParseState;

/// A named extraction step.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub run: StageFn,
}

/// Extraction stages in execution order.
pub const STAGES: &[Stage] = &[
    Stage { name: "taper", run: metadata::taper },
    Stage { name: "dates", run: metadata::dates },
    Stage { name: "refills", run: metadata::refills },
    Stage { name: "time_of_day", run: timing::run },
    Stage { name: "formulation", run: form::formulation },
    Stage { name: "prn_indication", run: indication::run },
    Stage { name: "quantity", run: quantity::run },
    Stage { name: "dose", run: dose::run },
    Stage { name: "form", run: form::form },
    Stage { name: "route", run: route::run },
    Stage { name: "frequency", run: frequency::run },
    Stage { name: "administration", run: administration::run },
    Stage { name: "drug", run: drug::run },
    Stage { name: "finalize", run: finalize },
];

// ═══════════════════════════════════════════════════════════
// Parser
// ═══════════════════════════════════════════════════════════

/// Parses order strings against one lexicon and configuration.
#[derive(Debug, Clone)]
pub struct OrderParser<'a> {
    lexicon: &'a Lexicon,
    config: ParserConfig,
}

impl<'a> OrderParser<'a> {
    pub fn new(lexicon: &'a Lexicon, config: ParserConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn parse(&self, raw: &str) -> ParsedOrder {
        let pre = preprocess(raw, self.lexicon);
        let mut order = ParsedOrder::new(raw);
        order.trough_note = pre.trough_note;

        let ctx = ParseContext {
            lexicon: self.lexicon,
            config: &self.config,
        };
        let mut state = ParseState::new(pre.cleaned, order);
        for stage in STAGES {
            state = (stage.run)(state, &ctx);
            tracing::trace!(
                stage = stage.name,
                residual_len = state.residual.len(),
                "Parse stage applied"
            );
        }
        state.order
    }
}

impl Default for OrderParser<'static> {
    fn default() -> Self {
        Self::new(Lexicon::global(), ParserConfig::default())
    }
}

/// Parse one order with the built-in lexicon and default configuration.
pub fn parse_order(raw: &str) -> ParsedOrder {
    OrderParser::default().parse(raw)
}

/// Cross-field inferences once every field is extracted.
fn finalize(mut state: ParseState, _ctx: &ParseContext<'_>) -> ParseState {
    let order = &mut state.order;
    // Inhalers go to the lungs even when written "by mouth".
    if order.form == "inhaler" && (order.route.is_empty() || order.route == "oral") {
        order.route = "inhalation".into();
    }

    tracing::debug!(
        drug = %order.drug,
        dose_unit = %order.dose.unit,
        frequency = %order.frequency,
        route = %order.route,
        form = %order.form,
        prn = order.prn,
        "Order parsed"
    );
    state
}

// ═══════════════════════════════════════════════════════════
// Text helpers
// ═══════════════════════════════════════════════════════════

/// Collapse runs of whitespace and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove byte spans from `text`, leaving a single space at each cut.
/// Overlapping spans are merged into the earlier one.
pub fn excise_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut sorted: Vec<(usize, usize)> = spans
        .iter()
        .copied()
        .filter(|(start, end)| start < end && *end <= text.len())
        .collect();
    sorted.sort_unstable();

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in sorted {
        if start < cursor {
            cursor = cursor.max(end);
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push(' ');
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    collapse_whitespace(&out)
}

pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DoseValue;

    #[test]
    fn excise_removes_spans_and_collapses() {
        let text = "Warfarin 2.5 mg 1 tab po daily";
        let out = excise_spans(text, &[(16, 21), (9, 15)]);
        assert_eq!(out, "Warfarin po daily");
    }

    #[test]
    fn excise_ignores_overlaps_and_bad_spans() {
        let text = "abc def ghi";
        assert_eq!(excise_spans(text, &[(0, 5), (2, 7), (9, 99)]), "ghi");
    }

    #[test]
    fn stages_run_in_documented_order() {
        let names: Vec<&str> = STAGES.iter().map(|s| s.name).collect();
        let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
        assert!(pos("time_of_day") < pos("frequency"));
        assert!(pos("prn_indication") < pos("quantity"));
        assert!(pos("quantity") < pos("dose"));
        assert!(pos("refills") < pos("dose"));
        assert!(pos("dose") < pos("form"));
        assert_eq!(names.last(), Some(&"finalize"));
    }

    #[test]
    fn parses_basic_tablet_order() {
        let order = parse_order("Metformin 500 mg tablet - take 1 tablet daily in the morning");
        assert_eq!(order.drug, "metformin");
        assert_eq!(order.dose.value, Some(DoseValue::Single(500.0)));
        assert_eq!(order.dose.unit, "mg");
        assert_eq!(order.qty, Some(1.0));
        assert_eq!(order.dose.total, Some(500.0));
        assert_eq!(order.form, "tablet");
        assert_eq!(order.frequency, "daily");
        assert_eq!(order.time_of_day, "morning");
        assert_eq!(order.time_of_day_original, "in the morning");
        assert!(order.brand_tokens.is_empty());
    }

    #[test]
    fn parses_prn_inhaler_order() {
        let order = parse_order(
            "Albuterol HFA Inhaler 90 mcg/puff - 2 puffs by mouth every 4-6 hours as needed for wheezing",
        );
        assert_eq!(order.drug, "albuterol");
        assert!(order.prn);
        assert_eq!(order.prn_condition, "wheezing");
        assert_eq!(order.indication, "wheezing");
        assert_eq!(order.qty, Some(2.0));
        assert_eq!(order.dose.value, Some(DoseValue::Single(0.09)));
        assert_eq!(order.dose.unit, "mg");
        assert_eq!(order.raw_unit, "mg");
        assert_eq!(order.frequency, "q4-6h");
        assert_eq!(order.form, "inhaler");
        assert_eq!(order.route, "inhalation");
    }

    #[test]
    fn parses_brand_order() {
        let order = parse_order("Lasix 20 mg qAM");
        assert_eq!(order.drug, "lasix");
        assert_eq!(order.brand_tokens, vec!["lasix"]);
        assert_eq!(order.time_of_day, "morning");
        assert_eq!(order.frequency, "daily");
        assert_eq!(order.dose.value, Some(DoseValue::Single(20.0)));
    }

    #[test]
    fn parses_combination_order() {
        let order = parse_order("Lisinopril/HCTZ 20-12.5mg - 1 tab daily");
        assert_eq!(order.dose.value, Some(DoseValue::Multiple(vec![20.0, 12.5])));
        assert_eq!(order.dose.total, None);
        assert_eq!(order.qty, Some(1.0));
        assert_eq!(order.form, "tablet");
        assert_eq!(order.drug, "lisinoprilhctz");
    }

    #[test]
    fn trough_note_is_kept_on_the_order() {
        let order = parse_order("Vancomycin 1 g IV q12h - target trough 15-20");
        assert_eq!(order.trough_note.as_deref(), Some("target trough 15-20"));
        assert_eq!(order.dose.value, Some(DoseValue::Single(1000.0)));
        assert_eq!(order.route, "intravenous");
        assert_eq!(order.frequency, "bid");
    }

    #[test]
    fn original_raw_is_untouched() {
        let raw = "Tiotropium Bromide (Spiriva HandiHaler) 18 mcg capsule \u{2013} inhale contents of one capsule via HandiHaler device once daily";
        let order = parse_order(raw);
        assert_eq!(order.original_raw, raw);
        assert_eq!(order.form, "capsule");
        assert_eq!(order.route, "inhalation");
        assert_eq!(order.qty, Some(1.0));
        assert_eq!(order.salt, "bromide");
        assert_eq!(order.brand_tokens, vec!["spiriva"]);
    }

    #[test]
    fn mixed_quantity_scales_the_total() {
        let order = parse_order("Metformin 500 mg tab; take one and one-half tablets daily");
        assert_eq!(order.qty, Some(1.5));
        assert_eq!(order.dose.value, Some(DoseValue::Single(500.0)));
        assert_eq!(order.dose.total, Some(750.0));
        assert_eq!(order.drug, "metformin");
    }

    #[test]
    fn refill_count_is_not_a_dose() {
        let order = parse_order("Multivitamin daily refills: 2");
        assert_eq!(order.refills, Some(2));
        assert_eq!(order.drug, "multivitamin");
        assert!(order.dose.is_empty());
        assert_eq!(order.frequency, "daily");
    }

    #[test]
    fn hyphenated_drug_name_survives() {
        let order = parse_order("Omega-3 1 g bid");
        assert_eq!(order.drug, "omega3");
        assert_eq!(order.dose.value, Some(DoseValue::Single(1000.0)));
        assert_eq!(order.frequency, "bid");
    }

    #[test]
    fn greek_mu_micrograms() {
        let order = parse_order("Levothyroxine 75 \u{3bc}g daily");
        assert_eq!(order.dose.value, Some(DoseValue::Single(0.075)));
        assert_eq!(order.dose.unit, "mg");
        assert_eq!(order.drug, "levothyroxine");
    }

    #[test]
    fn empty_input_yields_empty_order() {
        let order = parse_order("");
        assert_eq!(order.drug, "");
        assert!(order.dose.is_empty());
        assert_eq!(order.frequency, "");
    }

    #[test]
    fn parser_is_deterministic() {
        let raw = "ProAir Respiclick 90 mcg/inhalation - Inhale 2 puffs Q6H PRN for shortness of breath";
        assert_eq!(parse_order(raw), parse_order(raw));
    }
}
